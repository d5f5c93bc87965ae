//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied timestep only
//! - Seeded RNG only, one stream per consumer
//! - Stable iteration order (asteroid index)
//! - No rendering or platform dependencies

pub mod collision;
pub mod field;
pub mod particles;
pub mod score;
pub mod state;
pub mod tick;

pub use collision::{Ray, RayHit, closest_ray_hit, first_overlap, ray_sphere, spheres_overlap};
pub use field::generate_field;
pub use particles::{Particle, ParticlePool};
pub use score::Score;
pub use state::{Asteroid, Bounce, GameEvent, GamePhase, GameState, Player, RngState};
pub use tick::{TickInput, load_level, tick};
