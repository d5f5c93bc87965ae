//! Simulation settings
//!
//! Loaded from a JSON file on native builds. Every field has a default, so a
//! partial file only overrides what it names.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Spatial grid parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    /// Size of one grid cell along each axis
    pub cell_size: Vec3,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            cell_size: Vec3::splat(10.0),
        }
    }
}

/// Asteroid field generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldSettings {
    pub asteroid_count: usize,
    pub cluster_count: usize,
    /// Cluster centers are uniform in `[-spread, spread]` per axis
    pub cluster_spread: f32,
    /// Asteroids scatter uniformly within `±scatter` of their cluster center
    pub scatter_radius: f32,
    /// Probability an asteroid rolls a large size multiplier
    pub large_chance: f32,
    pub large_multiplier_min: f32,
    pub large_multiplier_max: f32,
    pub base_radius: f32,
    /// How far vertices of the procedural rock push out, relative to its radius
    pub irregularity: f32,
    /// Degrees per second
    pub min_rotation_speed: f32,
    pub max_rotation_speed: f32,
    pub hit_points: u8,
    pub shake_magnitude: f32,
}

impl Default for FieldSettings {
    fn default() -> Self {
        Self {
            asteroid_count: 1000,
            cluster_count: 10,
            cluster_spread: 125.0,
            scatter_radius: 8.0,
            large_chance: 0.1,
            large_multiplier_min: 1.8,
            large_multiplier_max: 3.0,
            base_radius: 0.5,
            irregularity: 0.7,
            min_rotation_speed: 5.0,
            max_rotation_speed: 30.0,
            hit_points: 3,
            shake_magnitude: 0.08,
        }
    }
}

impl FieldSettings {
    /// Half-width of the cube that contains every generated asteroid, plus
    /// one cell of padding
    pub fn world_extent(&self, cell_size: Vec3) -> f32 {
        let max_radius = self.base_radius * self.large_multiplier_max;
        self.cluster_spread + self.scatter_radius + max_radius + cell_size.x
    }
}

/// Player body and interaction tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSettings {
    pub start_position: Vec3,
    pub body_radius: f32,
    /// Seconds the bounce-back after a collision lasts
    pub bounce_duration: f32,
    pub bounce_speed: f32,
    /// Farthest distance a click can hit an asteroid
    pub hit_max_distance: f32,
    /// Seconds an asteroid shakes after being hit
    pub shake_duration: f32,
    pub points_per_kill: i64,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            start_position: Vec3::new(0.0, 2.0, 5.0),
            body_radius: 0.5,
            bounce_duration: 0.4,
            bounce_speed: 10.0,
            hit_max_distance: 50.0,
            shake_duration: 0.25,
            points_per_kill: 10,
        }
    }
}

/// Destruction burst tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleSettings {
    pub capacity: usize,
    pub burst_count: usize,
    pub burst_speed: f32,
    pub burst_duration: f32,
}

impl Default for ParticleSettings {
    fn default() -> Self {
        Self {
            capacity: 500,
            burst_count: 50,
            burst_speed: 2.0,
            burst_duration: 1.0,
        }
    }
}

/// All simulation settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub grid: GridSettings,
    pub field: FieldSettings,
    pub player: PlayerSettings,
    pub particles: ParticleSettings,
}

impl Settings {
    /// Parse settings from JSON text
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Load settings from a JSON file, falling back to defaults on any error
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Invalid settings in {}: {} - using defaults", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read {}: {} - using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// World-space bounds `(min, max)` of the grid for the configured field
    pub fn grid_bounds(&self) -> (Vec3, Vec3) {
        let extent = self.field.world_extent(self.grid.cell_size);
        (Vec3::splat(-extent), Vec3::splat(extent))
    }
}
