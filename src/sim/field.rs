//! Procedural asteroid field
//!
//! Asteroids are scattered around a handful of random cluster centers. Only
//! the collision-relevant shape is generated: the rock's bounding radius is
//! estimated from how far its perturbed surface would push out.

use glam::Vec3;
use rand::Rng;

use super::state::Asteroid;
use crate::settings::FieldSettings;

fn random_vec3<R: Rng>(rng: &mut R, half_extent: f32) -> Vec3 {
    if !(half_extent > 0.0) || !(half_extent * 2.0).is_finite() {
        return Vec3::ZERO;
    }
    Vec3::new(
        rng.random_range(-half_extent..=half_extent),
        rng.random_range(-half_extent..=half_extent),
        rng.random_range(-half_extent..=half_extent),
    )
}

/// Uniform sample in `[min, max]`, or `min` for an empty or unbounded range
fn random_between<R: Rng>(rng: &mut R, min: f32, max: f32) -> f32 {
    if !(max > min) || !(max - min).is_finite() {
        return min;
    }
    rng.random_range(min..=max)
}

/// Random unit rotation axis, rejecting near-zero samples
fn random_axis<R: Rng>(rng: &mut R) -> Vec3 {
    loop {
        let v = random_vec3(rng, 1.0);
        if v.length_squared() >= 0.01 {
            return v.normalize();
        }
    }
}

/// Generate a field of active asteroids.
///
/// Deterministic for a given `rng` state. Returns an empty field when
/// `asteroid_count` or `cluster_count` is zero.
pub fn generate_field<R: Rng>(settings: &FieldSettings, rng: &mut R) -> Vec<Asteroid> {
    if settings.asteroid_count == 0 || settings.cluster_count == 0 {
        log::warn!("Field settings produce no asteroids");
        return Vec::new();
    }

    let clusters: Vec<Vec3> = (0..settings.cluster_count)
        .map(|_| random_vec3(rng, settings.cluster_spread))
        .collect();

    let large_chance = if settings.large_chance.is_nan() {
        0.0
    } else {
        settings.large_chance.clamp(0.0, 1.0) as f64
    };

    let mut asteroids = Vec::with_capacity(settings.asteroid_count);
    for i in 0..settings.asteroid_count {
        let center = clusters[rng.random_range(0..clusters.len())];
        let position = center + random_vec3(rng, settings.scatter_radius);

        let size_multiplier = if rng.random_bool(large_chance) {
            random_between(rng, settings.large_multiplier_min, settings.large_multiplier_max)
        } else {
            1.0
        };
        let radius = settings.base_radius * size_multiplier;
        let irregularity = settings.irregularity * random_between(rng, 0.8, 1.2);
        // Vertices push out by up to radius * irregularity; the bounding
        // sphere follows the furthest outcrop
        let collision_radius = radius * (1.0 + irregularity * random_between(rng, 0.5, 1.0));

        let shade = random_between(rng, 50.0, 200.0) as u8;
        let spin = random_between(rng, settings.min_rotation_speed, settings.max_rotation_speed);
        let rotation_speed = if rng.random_bool(0.5) { spin } else { -spin };

        asteroids.push(Asteroid {
            id: i as u32,
            position,
            collision_radius,
            is_active: true,
            hit_points: settings.hit_points.max(1),
            shade,
            highlighted: false,
            rotation_angle: random_between(rng, 0.0, 360.0) % 360.0,
            rotation_axis: random_axis(rng),
            rotation_speed,
            shake_timer: 0.0,
            shake_intensity: settings.shake_magnitude * size_multiplier,
        });
    }

    log::info!(
        "Generated {} asteroids in {} clusters",
        asteroids.len(),
        clusters.len()
    );
    asteroids
}
