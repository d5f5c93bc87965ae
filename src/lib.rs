//! Asteroid Field - a destructible asteroid field with a uniform-grid broad phase
//!
//! Core modules:
//! - `grid`: Uniform grid spatial index (neighbor and ray queries)
//! - `sim`: Deterministic simulation (field generation, collisions, game state)
//! - `settings`: Data-driven tuning loaded from JSON

pub mod grid;
pub mod settings;
pub mod sim;

pub use grid::UniformGrid;
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Nominal frame time (60 FPS)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
}

/// Wrap an angle in degrees into `[0, 360)`
#[inline]
pub fn wrap_degrees(angle: f32) -> f32 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}
