//! Score bookkeeping
//!
//! Owned by `GameState` and reset on every level load.

use serde::{Deserialize, Serialize};

/// Running score for the current level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    points: u64,
    kills: u32,
}

impl Score {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Add points for a kill. Non-positive awards are ignored.
    pub fn add(&mut self, points: i64) {
        if points > 0 {
            self.points += points as u64;
            self.kills += 1;
        }
    }

    #[inline]
    pub fn points(&self) -> u64 {
        self.points
    }

    /// Number of scoring kills
    #[inline]
    pub fn kills(&self) -> u32 {
        self.kills
    }
}
