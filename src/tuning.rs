//! Data-driven game balance
//!
//! Every gameplay constant the simulation reads lives here so a level
//! designer can override it from a JSON file without a rebuild.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// What happens to the player when an enemy reaches the end tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LeakPolicy {
    /// Enemy is removed and difficulty drops, the player keeps their health
    #[default]
    NoPenalty,
    /// Enemy is removed, difficulty drops and the player loses this much health
    LoseHealth(i32),
}

impl LeakPolicy {
    /// Health the player loses for a single leaked enemy
    pub fn health_loss(&self) -> i32 {
        match self {
            LeakPolicy::NoPenalty => 0,
            LeakPolicy::LoseHealth(amount) => *amount,
        }
    }
}

/// Game balance values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Physics ===
    /// Upper bound on the physics step, in seconds
    pub max_physics_dt: f32,
    /// Impulse applied to an enemy struck by a projectile
    pub knockback_impulse: f32,

    // === Bodies ===
    /// Radius shared by tower, enemy and projectile circles
    pub body_radius: f32,

    // === Enemies ===
    pub enemy_health: i32,
    pub enemy_speed: f32,
    /// Live enemy cap; spawning pauses while the cap is reached
    pub max_enemies: usize,
    /// Spawn timer value that triggers a spawn
    pub spawn_threshold: f32,
    /// Distance to the last path tile at which a leaking enemy is removed
    pub leak_distance: f32,
    pub leak_policy: LeakPolicy,

    // === Towers & projectiles ===
    pub tower_cost: i32,
    pub tower_cooldown: f32,
    pub projectile_speed: f32,
    pub projectile_ttl: f32,
    /// Projectile sprite spin, degrees per second
    pub projectile_spin: f32,
    pub hit_damage: i32,

    // === Economy & difficulty ===
    pub initial_gold: i32,
    pub initial_health: i32,
    pub kill_reward: i32,
    /// Difficulty gained per second of play
    pub difficulty_growth: f32,
    /// Multiplier applied to difficulty whenever an enemy leaks
    pub leak_difficulty_factor: f32,
    /// Gold-per-second metric refresh cadence, in seconds
    pub gold_rate_interval: f32,
    /// Weight kept from the previous gold-per-second value
    pub gold_rate_smoothing: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            max_physics_dt: 0.1,
            knockback_impulse: 80.0,

            body_radius: 40.0,

            enemy_health: 3,
            enemy_speed: 250.0,
            max_enemies: 30,
            spawn_threshold: 1.0,
            leak_distance: 40.0,
            leak_policy: LeakPolicy::NoPenalty,

            tower_cost: 3,
            tower_cooldown: 1.0,
            projectile_speed: 500.0,
            projectile_ttl: 3.0,
            projectile_spin: 360.0,
            hit_damage: 1,

            initial_gold: 10,
            initial_health: 10,
            kill_reward: 1,
            difficulty_growth: 0.1,
            leak_difficulty_factor: 0.9,
            gold_rate_interval: 0.05,
            gold_rate_smoothing: 0.9,
        }
    }
}

impl Tuning {
    /// Load tuning overrides from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path.display());
                    tuning
                }
                Err(e) => {
                    log::warn!("Malformed tuning file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("No tuning file at {}, using defaults", path.display());
                Self::default()
            }
        }
    }
}
