//! Destruction particle bursts
//!
//! Fixed-size pool with a wrapping cursor: new bursts overwrite the oldest
//! slots instead of allocating. Purely visual, never affects gameplay.

use glam::Vec3;
use rand::Rng;

/// Default pool size
pub const DEFAULT_CAPACITY: usize = 500;

/// A single debris particle
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Gray level inherited from the destroyed asteroid
    pub shade: u8,
    /// Seconds left to live
    pub life: f32,
    pub is_active: bool,
}

/// Ring buffer of particles
#[derive(Debug, Clone)]
pub struct ParticlePool {
    particles: Vec<Particle>,
    next: usize,
}

impl Default for ParticlePool {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ParticlePool {
    pub fn new(capacity: usize) -> Self {
        Self {
            particles: vec![Particle::default(); capacity],
            next: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.particles.len()
    }

    /// Deactivate every particle and rewind the cursor
    pub fn reset(&mut self) {
        for p in &mut self.particles {
            p.is_active = false;
        }
        self.next = 0;
    }

    /// Emit `count` particles from `position`.
    ///
    /// Lifetimes vary in `duration * [0.5, 1.5)`, speeds in
    /// `speed * [0.5, 1.5)`, directions uniform over the unit cube and
    /// normalized.
    pub fn emit<R: Rng>(&mut self, position: Vec3, count: usize, speed: f32, duration: f32, shade: u8, rng: &mut R) {
        if self.particles.is_empty() {
            return;
        }
        for _ in 0..count {
            let mut dir = Vec3::new(
                rng.random_range(-1.0..=1.0),
                rng.random_range(-1.0..=1.0),
                rng.random_range(-1.0..=1.0),
            );
            if dir.length_squared() < 0.001 {
                dir = Vec3::X;
            }
            let life = duration * rng.random_range(0.5..1.5_f32);
            let speed = speed * rng.random_range(0.5..1.5_f32);

            self.particles[self.next] = Particle {
                position,
                velocity: dir.normalize() * speed,
                shade,
                life,
                is_active: true,
            };
            self.next = (self.next + 1) % self.particles.len();
        }
    }

    /// Integrate positions and expire dead particles
    pub fn update(&mut self, dt: f32) {
        for p in self.particles.iter_mut().filter(|p| p.is_active) {
            p.life -= dt;
            if p.life <= 0.0 {
                p.is_active = false;
            } else {
                p.position += p.velocity * dt;
            }
        }
    }

    pub fn active_count(&self) -> usize {
        self.active().count()
    }

    pub fn active(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(|p| p.is_active)
    }
}
