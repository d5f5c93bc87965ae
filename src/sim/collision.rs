//! Narrow-phase tests for grid candidates
//!
//! The grid only says which asteroids *might* be involved. Everything here
//! re-validates a candidate (index in range, still active) before running the
//! exact sphere or ray test, since the grid can be stale between rebuilds.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::state::Asteroid;

/// A ray with an origin and a (not necessarily normalized) direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Point at distance `t` along the normalized direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction.normalize_or_zero() * t
    }
}

/// Result of a ray test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    /// Whether the ray hit
    pub hit: bool,
    /// Distance from the ray origin to the hit point (world units)
    pub distance: f32,
    pub point: Vec3,
    /// Surface normal at the hit, facing the ray origin
    pub normal: Vec3,
}

impl RayHit {
    pub fn miss() -> Self {
        Self {
            hit: false,
            distance: f32::INFINITY,
            point: Vec3::ZERO,
            normal: Vec3::ZERO,
        }
    }
}

/// Whether two spheres overlap (touching counts)
#[inline]
pub fn spheres_overlap(center_a: Vec3, radius_a: f32, center_b: Vec3, radius_b: f32) -> bool {
    let r = radius_a + radius_b;
    center_a.distance_squared(center_b) <= r * r
}

/// Intersect a ray with a sphere.
///
/// Returns the nearest intersection in front of the origin. When the origin
/// is inside the sphere the exit point is returned, with the normal flipped
/// to face inward.
pub fn ray_sphere(ray: &Ray, center: Vec3, radius: f32) -> RayHit {
    let dir = ray.direction.normalize_or_zero();
    if dir == Vec3::ZERO {
        return RayHit::miss();
    }

    let oc = ray.origin - center;
    let b = oc.dot(dir);
    let c = oc.length_squared() - radius * radius;
    let discriminant = b * b - c;
    if discriminant < 0.0 {
        return RayHit::miss();
    }

    let s = discriminant.sqrt();
    let t_near = -b - s;
    let t_far = -b + s;
    if t_far < 0.0 {
        // Sphere is entirely behind the origin
        return RayHit::miss();
    }

    let inside = t_near < 0.0;
    let distance = if inside { t_far } else { t_near };
    let point = ray.at(distance);
    let outward = (point - center).normalize_or_zero();

    RayHit {
        hit: true,
        distance,
        point,
        normal: if inside { -outward } else { outward },
    }
}

/// Look up a candidate, rejecting stale indices and destroyed asteroids
#[inline]
fn live(asteroids: &[Asteroid], index: usize) -> Option<&Asteroid> {
    asteroids.get(index).filter(|a| a.is_active)
}

/// First candidate whose bounding sphere overlaps the sphere at `position`
pub fn first_overlap(
    position: Vec3,
    radius: f32,
    candidates: &[usize],
    asteroids: &[Asteroid],
) -> Option<usize> {
    candidates.iter().copied().find(|&index| {
        live(asteroids, index)
            .is_some_and(|a| spheres_overlap(position, radius, a.position, a.collision_radius))
    })
}

/// Closest candidate hit by `ray` within `max_distance`
pub fn closest_ray_hit(
    ray: &Ray,
    candidates: &[usize],
    asteroids: &[Asteroid],
    max_distance: f32,
) -> Option<(usize, RayHit)> {
    let mut best: Option<(usize, RayHit)> = None;
    for &index in candidates {
        let Some(asteroid) = live(asteroids, index) else {
            continue;
        };
        let hit = ray_sphere(ray, asteroid.position, asteroid.collision_radius);
        if !hit.hit || hit.distance > max_distance {
            continue;
        }
        if best.is_none_or(|(_, b)| hit.distance < b.distance) {
            best = Some((index, hit));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rock(position: Vec3, radius: f32) -> Asteroid {
        Asteroid {
            id: 0,
            position,
            collision_radius: radius,
            is_active: true,
            hit_points: 3,
            shade: 128,
            highlighted: false,
            rotation_angle: 0.0,
            rotation_axis: Vec3::Y,
            rotation_speed: 0.0,
            shake_timer: 0.0,
            shake_intensity: 0.0,
        }
    }

    #[test]
    fn test_spheres_overlap() {
        assert!(spheres_overlap(Vec3::ZERO, 1.0, Vec3::new(1.5, 0.0, 0.0), 1.0));
        assert!(spheres_overlap(Vec3::ZERO, 1.0, Vec3::new(2.0, 0.0, 0.0), 1.0));
        assert!(!spheres_overlap(Vec3::ZERO, 1.0, Vec3::new(2.1, 0.0, 0.0), 1.0));
    }

    #[test]
    fn test_ray_sphere_front_hit() {
        let ray = Ray::new(Vec3::new(-10.0, 0.0, 0.0), Vec3::new(3.0, 0.0, 0.0));
        let hit = ray_sphere(&ray, Vec3::ZERO, 2.0);
        assert!(hit.hit);
        assert!((hit.distance - 8.0).abs() < 1e-5);
        assert!((hit.point - Vec3::new(-2.0, 0.0, 0.0)).length() < 1e-5);
        assert!((hit.normal - Vec3::new(-1.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_ray_sphere_miss_and_behind() {
        let sideways = Ray::new(Vec3::new(-10.0, 5.0, 0.0), Vec3::X);
        assert!(!ray_sphere(&sideways, Vec3::ZERO, 2.0).hit);

        let behind = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::X);
        assert!(!ray_sphere(&behind, Vec3::ZERO, 2.0).hit);

        let no_direction = Ray::new(Vec3::ZERO, Vec3::ZERO);
        assert!(!ray_sphere(&no_direction, Vec3::ZERO, 2.0).hit);
    }

    #[test]
    fn test_ray_sphere_from_inside() {
        let ray = Ray::new(Vec3::ZERO, Vec3::Y);
        let hit = ray_sphere(&ray, Vec3::ZERO, 3.0);
        assert!(hit.hit);
        assert!((hit.distance - 3.0).abs() < 1e-5);
        assert!(hit.normal.y < 0.0);
    }

    #[test]
    fn test_closest_ray_hit_picks_nearest_live() {
        let mut asteroids = vec![
            rock(Vec3::new(20.0, 0.0, 0.0), 1.0),
            rock(Vec3::new(10.0, 0.0, 0.0), 1.0),
            rock(Vec3::new(5.0, 0.0, 0.0), 1.0),
        ];
        asteroids[2].is_active = false;
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        // Stale index 7 and the destroyed asteroid are both skipped
        let (index, hit) = closest_ray_hit(&ray, &[0, 1, 2, 7], &asteroids, 50.0).unwrap();
        assert_eq!(index, 1);
        assert!((hit.distance - 9.0).abs() < 1e-5);

        assert!(closest_ray_hit(&ray, &[0, 1], &asteroids, 5.0).is_none());
    }

    #[test]
    fn test_first_overlap() {
        let asteroids = vec![
            rock(Vec3::new(3.0, 0.0, 0.0), 1.0),
            rock(Vec3::new(1.0, 0.0, 0.0), 1.0),
        ];
        assert_eq!(first_overlap(Vec3::ZERO, 0.5, &[0, 1], &asteroids), Some(1));
        assert_eq!(first_overlap(Vec3::ZERO, 0.5, &[0], &asteroids), None);
        assert_eq!(first_overlap(Vec3::ZERO, 0.5, &[9], &asteroids), None);
    }

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::ONE, Vec3::new(0.0, 0.0, 4.0));
        assert_eq!(ray.at(2.0), Vec3::new(1.0, 1.0, 3.0));
    }
}
