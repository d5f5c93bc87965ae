//! Game state and core simulation types
//!
//! Everything the per-frame step reads or writes lives here. The spatial grid
//! is derived data: it is rebuilt on every level load and never serialized.

use glam::Vec3;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::particles::ParticlePool;
use super::score::Score;
use crate::grid::{Bounded, UniformGrid};
use crate::settings::Settings;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Field and grid are (re)generated on the next tick
    Loading,
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
}

/// A destructible asteroid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asteroid {
    pub id: u32,
    pub position: Vec3,
    /// Bounding sphere radius used for the grid and narrow phase
    pub collision_radius: f32,
    pub is_active: bool,
    pub hit_points: u8,
    /// Gray level of the rock (50-200)
    pub shade: u8,
    /// Drawn red while true (hit, shaking, or touching the player)
    pub highlighted: bool,
    /// Degrees, kept in `[0, 360)`
    pub rotation_angle: f32,
    pub rotation_axis: Vec3,
    /// Degrees per second, signed
    pub rotation_speed: f32,
    /// Seconds of shake left (0 = still)
    pub shake_timer: f32,
    pub shake_intensity: f32,
}

impl Asteroid {
    #[inline]
    pub fn is_shaking(&self) -> bool {
        self.shake_timer > 0.0
    }

    /// Apply one hit. Returns true if this hit destroyed the asteroid.
    pub fn take_hit(&mut self, shake_duration: f32) -> bool {
        self.hit_points = self.hit_points.saturating_sub(1);
        self.shake_timer = shake_duration;
        self.highlighted = true;
        if self.hit_points == 0 {
            self.is_active = false;
            return true;
        }
        false
    }

    /// Count down the shake timer
    pub fn update_shake(&mut self, dt: f32) {
        if self.shake_timer > 0.0 {
            self.shake_timer = (self.shake_timer - dt).max(0.0);
        }
    }

    /// Advance rotation by its speed * dt
    pub fn rotate(&mut self, dt: f32) {
        self.rotation_angle = crate::wrap_degrees(self.rotation_angle + self.rotation_speed * dt);
    }
}

impl Bounded for Asteroid {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn bounding_radius(&self) -> f32 {
        self.collision_radius
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

/// Bounce-back after the player body hits an asteroid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounce {
    /// Seconds remaining
    pub timer: f32,
    /// Unit direction away from the asteroid
    pub direction: Vec3,
}

/// The player's body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub position: Vec3,
    pub radius: f32,
    pub bounce: Option<Bounce>,
}

impl Player {
    pub fn new(position: Vec3, radius: f32) -> Self {
        Self {
            position,
            radius,
            bounce: None,
        }
    }

    #[inline]
    pub fn is_bouncing(&self) -> bool {
        self.bounce.is_some()
    }

    /// Apply decaying bounce movement; clears the bounce when it runs out
    pub fn update_bounce(&mut self, dt: f32, duration: f32, initial_speed: f32) {
        let Some(bounce) = self.bounce.as_mut() else {
            return;
        };
        bounce.timer -= dt;
        if bounce.timer <= 0.0 {
            self.bounce = None;
            return;
        }
        let decay = bounce.timer / duration;
        self.position += bounce.direction * initial_speed * decay * dt;
    }
}

/// Something that happened during a tick, for the presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    LevelLoaded { asteroids: usize },
    PlayerCollided { index: usize },
    AsteroidHit {
        index: usize,
        hit_points: u8,
        distance: f32,
        /// Impact point on the bounding sphere
        point: Vec3,
        /// Surface normal at the impact, facing the shooter
        normal: Vec3,
    },
    AsteroidDestroyed { index: usize, position: Vec3 },
    Miss,
}

/// Seed plus a stream counter; every consumer gets its own PCG stream so
/// draws in one system never shift another's sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    /// Hand out a generator on the next unused stream
    pub fn next_rng(&mut self) -> Pcg32 {
        let rng = Pcg32::new(self.seed, self.stream);
        self.stream += 1;
        rng
    }
}

/// Complete session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng_state: RngState,
    pub settings: Settings,
    pub phase: GamePhase,
    /// Number of level loads so far
    pub level: u32,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub player: Player,
    /// Every asteroid of the level; index in this vec is the grid index
    pub asteroids: Vec<Asteroid>,
    /// Broad phase over `asteroids`; `None` until the first level load
    #[serde(skip)]
    pub grid: Option<UniformGrid>,
    pub score: Score,
    #[serde(skip)]
    pub particles: ParticlePool,
    /// Events produced by the most recent tick
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a session that loads its first level on the next tick
    pub fn new(seed: u64, settings: Settings) -> Self {
        let player = Player::new(settings.player.start_position, settings.player.body_radius);
        let particles = ParticlePool::new(settings.particles.capacity);
        Self {
            seed,
            rng_state: RngState::new(seed),
            settings,
            phase: GamePhase::Loading,
            level: 0,
            time_ticks: 0,
            player,
            asteroids: Vec::new(),
            grid: None,
            score: Score::default(),
            particles,
            events: Vec::new(),
        }
    }

    /// Full grid rebuild from the current asteroid positions and activity.
    ///
    /// Does nothing before the first level load.
    pub fn rebuild_grid(&mut self) {
        if let Some(grid) = self.grid.as_mut() {
            grid.build_all(&self.asteroids);
        }
    }

    /// Asteroids still in play
    pub fn active_count(&self) -> usize {
        self.asteroids.iter().filter(|a| a.is_active).count()
    }
}
