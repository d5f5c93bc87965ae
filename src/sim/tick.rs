//! Per-frame simulation step
//!
//! Uses the grid as broad phase for both player collision and click-to-hit,
//! then confirms every candidate with an exact test. Destroyed asteroids stay
//! in the grid until the next level load; the narrow phase skips them.

use glam::Vec3;

use super::collision::{Ray, closest_ray_hit, first_overlap, spheres_overlap};
use super::field::generate_field;
use super::state::{Bounce, GameEvent, GamePhase, GameState};
use crate::grid::UniformGrid;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Desired player displacement this tick
    pub movement: Vec3,
    /// Fire along this ray (click)
    pub fire: Option<Ray>,
    /// Pause toggle
    pub pause: bool,
    /// Throw away the field and load a fresh one
    pub reload: bool,
}

/// Advance the game state by one frame of `dt` seconds
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.events.clear();

    if input.reload {
        log::info!("Reloading level");
        state.phase = GamePhase::Loading;
    }

    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => state.phase = GamePhase::Playing,
            GamePhase::Loading => {}
        }
    }

    match state.phase {
        GamePhase::Paused => return,
        GamePhase::Loading => {
            load_level(state);
            return;
        }
        GamePhase::Playing => {}
    }

    state.time_ticks += 1;

    for asteroid in &mut state.asteroids {
        asteroid.update_shake(dt);
    }
    state.particles.update(dt);

    let player_settings = state.settings.player.clone();
    let mut collided = false;

    if state.player.is_bouncing() {
        state
            .player
            .update_bounce(dt, player_settings.bounce_duration, player_settings.bounce_speed);
    } else {
        let previous = state.player.position;
        state.player.position += input.movement;
        collided = check_player_collision(state, previous);

        if !state.player.is_bouncing() {
            if let Some(ray) = input.fire {
                fire(state, &ray, collided);
            }
        }
    }

    // Red while shaking or touching the player
    let player_pos = state.player.position;
    let player_radius = state.player.radius;
    for asteroid in state.asteroids.iter_mut().filter(|a| a.is_active) {
        let touching = spheres_overlap(
            player_pos,
            player_radius,
            asteroid.position,
            asteroid.collision_radius,
        );
        asteroid.highlighted = asteroid.is_shaking() || touching;
        asteroid.rotate(dt);
    }
}

/// Regenerate the field and rebuild the grid from scratch
pub fn load_level(state: &mut GameState) {
    state.level += 1;
    log::info!("Loading level {} (seed {})", state.level, state.seed);

    let mut rng = state.rng_state.next_rng();
    state.asteroids = generate_field(&state.settings.field, &mut rng);
    state.score.reset();
    state.particles.reset();
    state.player.position = state.settings.player.start_position;
    state.player.bounce = None;

    let (min, max) = state.settings.grid_bounds();
    log::info!("Grid bounds: min {} max {}", min, max);
    let mut grid = UniformGrid::new(min, max, state.settings.grid.cell_size);
    if state.asteroids.is_empty() {
        log::warn!("No asteroids loaded, grid left empty");
    } else {
        grid.build_all(&state.asteroids);
    }
    state.grid = Some(grid);

    state.events.push(GameEvent::LevelLoaded {
        asteroids: state.asteroids.len(),
    });
    state.phase = GamePhase::Playing;
}

/// Broad + narrow phase for the player body. On contact the player is put
/// back at `previous` and starts bouncing away from the asteroid.
fn check_player_collision(state: &mut GameState, previous: Vec3) -> bool {
    let Some(grid) = state.grid.as_ref() else {
        log::warn!("Collision grid missing, skipping player collision");
        return false;
    };
    let position = state.player.position;
    let candidates = grid.query(position);

    let Some(index) = first_overlap(position, state.player.radius, &candidates, &state.asteroids)
    else {
        return false;
    };

    let away = (position - state.asteroids[index].position).normalize_or_zero();
    state.player.bounce = Some(Bounce {
        timer: state.settings.player.bounce_duration,
        direction: if away == Vec3::ZERO { Vec3::Y } else { away },
    });
    state.player.position = previous;
    state.events.push(GameEvent::PlayerCollided { index });
    log::info!("Player collided with asteroid {}, bouncing", index);
    true
}

/// Click-to-hit: damage the closest asteroid along `ray`
fn fire(state: &mut GameState, ray: &Ray, collided: bool) {
    let Some(grid) = state.grid.as_ref() else {
        log::warn!("Collision grid missing, skipping raycast");
        return;
    };
    let max_distance = state.settings.player.hit_max_distance;
    let candidates = grid.query_ray(ray.origin, ray.direction, max_distance);

    let Some((index, hit)) = closest_ray_hit(ray, &candidates, &state.asteroids, max_distance) else {
        if !collided {
            state.events.push(GameEvent::Miss);
            log::debug!("Click missed ({} candidates)", candidates.len());
        }
        return;
    };

    let asteroid = &mut state.asteroids[index];
    let destroyed = asteroid.take_hit(state.settings.player.shake_duration);
    let position = asteroid.position;
    let shade = asteroid.shade;
    state.events.push(GameEvent::AsteroidHit {
        index,
        hit_points: asteroid.hit_points,
        distance: hit.distance,
        point: hit.point,
        normal: hit.normal,
    });
    log::info!(
        "Asteroid {} hit, {} hp left, distance {:.2}",
        index,
        asteroid.hit_points,
        hit.distance
    );

    if destroyed {
        state.score.add(state.settings.player.points_per_kill);
        let burst = &state.settings.particles;
        let mut rng = state.rng_state.next_rng();
        state.particles.emit(
            position,
            burst.burst_count,
            burst.burst_speed,
            burst.burst_duration,
            shade,
            &mut rng,
        );
        state.events.push(GameEvent::AsteroidDestroyed { index, position });
        log::info!("Asteroid {} destroyed, score {}", index, state.score.points());
    }
}
