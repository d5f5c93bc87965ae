//! Asteroid Field entry point
//!
//! Headless driver: loads a level, flies the player through the field and
//! shoots whatever is ahead, then prints a summary.
//!
//! Usage: `asteroid-field [settings.json] [seed]`

use std::path::Path;

use glam::Vec3;

use asteroid_field::Settings;
use asteroid_field::consts::FRAME_DT;
use asteroid_field::sim::{GameEvent, GameState, Ray, TickInput, tick};

const DEFAULT_SEED: u64 = 0x5eed_a57e;
/// One minute at 60 FPS
const FRAMES: u32 = 60 * 60;
/// Player speed in units per second
const FLY_SPEED: f32 = 9.0;
const FIRE_INTERVAL: u32 = 10;
/// Stop approaching a target inside this range and start shooting
const ENGAGE_RANGE: f32 = 20.0;

#[derive(Debug, Default)]
struct Summary {
    shots: u32,
    hits: u32,
    misses: u32,
    kills: u32,
    collisions: u32,
    neighbor_candidates: usize,
    ray_candidates: usize,
    ray_queries: usize,
}

/// Index of the nearest active asteroid
fn nearest_target(state: &GameState) -> Option<usize> {
    let player = state.player.position;
    state
        .asteroids
        .iter()
        .enumerate()
        .filter(|(_, a)| a.is_active)
        .min_by(|(_, a), (_, b)| {
            a.position
                .distance_squared(player)
                .total_cmp(&b.position.distance_squared(player))
        })
        .map(|(i, _)| i)
}

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let settings = args
        .next()
        .map(|path| Settings::load(Path::new(&path)))
        .unwrap_or_default();
    let seed = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_SEED);

    log::info!("Asteroid Field (native) starting with seed {}", seed);

    let mut state = GameState::new(seed, settings);
    let mut summary = Summary::default();
    let dt = FRAME_DT;

    for frame in 0..FRAMES {
        let mut input = TickInput::default();

        if let Some(target) = nearest_target(&state) {
            let to_target = state.asteroids[target].position - state.player.position;
            let distance = to_target.length();
            let heading = to_target.normalize_or_zero();

            if distance > ENGAGE_RANGE {
                input.movement = heading * FLY_SPEED * dt;
            } else if frame % FIRE_INTERVAL == 0 && heading != Vec3::ZERO {
                input.fire = Some(Ray::new(state.player.position, heading));
                summary.shots += 1;
            }
        }

        tick(&mut state, &input, dt);

        if let Some(grid) = state.grid.as_ref() {
            summary.neighbor_candidates += grid.query(state.player.position).len();
            if let Some(ray) = input.fire {
                summary.ray_candidates += grid
                    .query_ray(ray.origin, ray.direction, state.settings.player.hit_max_distance)
                    .len();
                summary.ray_queries += 1;
            }
        }

        for event in &state.events {
            match event {
                GameEvent::AsteroidHit { .. } => summary.hits += 1,
                GameEvent::AsteroidDestroyed { .. } => summary.kills += 1,
                GameEvent::PlayerCollided { .. } => summary.collisions += 1,
                GameEvent::Miss => summary.misses += 1,
                GameEvent::LevelLoaded { asteroids } => {
                    log::info!("Level loaded with {} asteroids", asteroids)
                }
            }
        }
    }

    println!("Asteroid Field - {} frames, seed {}", FRAMES, seed);
    println!(
        "  shots {}  hits {}  misses {}  kills {}  collisions {}",
        summary.shots, summary.hits, summary.misses, summary.kills, summary.collisions
    );
    println!(
        "  score {} ({} kills)  active {}/{}",
        state.score.points(),
        state.score.kills(),
        state.active_count(),
        state.asteroids.len()
    );
    println!(
        "  avg neighbor candidates {:.2}  avg ray candidates {:.2}  (population {})",
        summary.neighbor_candidates as f32 / FRAMES as f32,
        summary.ray_candidates as f32 / summary.ray_queries.max(1) as f32,
        state.asteroids.len()
    );
    if let Some(grid) = state.grid.as_ref() {
        println!(
            "  grid {:?} cells, {} entries in {} occupied cells",
            grid.dims().to_array(),
            grid.store().entry_count(),
            grid.store().occupied_cells()
        );
    }
}
