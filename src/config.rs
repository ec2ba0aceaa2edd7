//! Tunable simulation and training parameters
//!
//! Every empirically-tuned constant (physics limits, damage shaping, reward
//! weights, pacing) lives here so training runs can tweak them from a RON file
//! instead of recompiling.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Axis-aligned spawn rectangle for one combatant
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SpawnArea {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Physics arena parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Arena extent in world units (toroidal wrap boundary)
    pub width: f32,
    pub height: f32,

    /// Force-based control: intents are scaled to forces, never direct
    /// velocity writes
    pub acceleration: f32,
    pub angular_accel: f32,
    /// Hard caps applied after force integration
    pub max_speed: f32,
    pub max_angular_speed: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,

    /// Core ball radius
    pub core_radius: f32,
    /// Weapon box half extents
    pub weapon_half_extents: (f32, f32),
    /// Guard sector radius and opening angle (radians)
    pub guard_radius: f32,
    pub guard_angle: f32,
    /// Arc samples used to build the guard collision hull
    pub guard_segments: u32,

    /// Minimum simulated time between two hits on the same defender
    pub hit_cooldown_ms: f64,
    /// Damage shaping: `min(sqrt(|v_rel|*a + |w|*b) * part_factor, cap)`
    pub rel_speed_damage_scale: f32,
    pub angular_damage_scale: f32,
    pub guard_damage_factor: f32,
    pub max_damage: f32,

    /// Cosmetic damage popup lifetime
    pub popup_lifetime_ms: f64,

    pub red_spawn: SpawnArea,
    pub blue_spawn: SpawnArea,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 20.0,
            height: 15.0,
            acceleration: 15.0,
            angular_accel: 5.0,
            max_speed: 10.0,
            max_angular_speed: 10.0,
            linear_damping: 2.0,
            angular_damping: 5.0,
            core_radius: 0.5,
            weapon_half_extents: (0.5, 0.2),
            guard_radius: 0.7,
            guard_angle: std::f32::consts::TAU / 3.0,
            guard_segments: 8,
            hit_cooldown_ms: 500.0,
            rel_speed_damage_scale: 20.0,
            angular_damage_scale: 10.0,
            guard_damage_factor: 0.25,
            max_damage: 20.0,
            popup_lifetime_ms: 2000.0,
            red_spawn: SpawnArea {
                x: 0.5,
                y: 0.5,
                width: 9.0,
                height: 14.0,
            },
            blue_spawn: SpawnArea {
                x: 10.5,
                y: 0.5,
                width: 9.0,
                height: 14.0,
            },
        }
    }
}

/// Reward shaping weights
///
/// Defaults reproduce the tuned values the duel was trained with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardConfig {
    /// Weight of the early-episode proximity-closing incentive
    pub approach_weight: f32,
    /// Episodes after which the approach incentive is dropped
    pub approach_episode_limit: u32,
    /// Positive weight per point of damage dealt since the last decision
    pub damage_dealt_weight: f32,
    /// Negative weight per point of damage received since the last decision
    pub damage_received_weight: f32,
    /// No-contact time before the idle penalty kicks in
    pub idle_threshold_ms: f64,
    /// Episode at which the idle penalty has fully decayed to zero
    pub idle_episode_limit: u32,
    /// Flat penalty when the episode exceeds its time budget
    pub timeout_penalty: f32,
    /// Base terminal win bonus
    pub win_bonus: f32,
    /// Extra win bonus per second of unspent episode time
    pub win_time_bonus_per_sec: f32,
    /// Terminal penalty on the losing side
    pub lose_penalty: f32,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            approach_weight: 0.1,
            approach_episode_limit: 20,
            damage_dealt_weight: 0.2,
            damage_received_weight: 0.03,
            idle_threshold_ms: 10_000.0,
            idle_episode_limit: 50,
            timeout_penalty: 20.0,
            win_bonus: 40.0,
            win_time_bonus_per_sec: 1.0,
            lose_penalty: 10.0,
        }
    }
}

/// Pacing and connection parameters of the training pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Minimum simulated gap between two decision ticks
    pub decision_interval_ms: f64,
    /// Episode time budget before truncation
    pub episode_timeout_ms: f64,
    /// Trainer WebSocket endpoint (the trainer hosts the server)
    pub socket_url: String,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            decision_interval_ms: 100.0,
            episode_timeout_ms: 120_000.0,
            socket_url: "ws://localhost:7725".to_string(),
        }
    }
}

/// Top-level configuration loaded from a RON file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub arena: ArenaConfig,
    pub reward: RewardConfig,
    pub train: TrainConfig,
}

impl Config {
    /// Load configuration from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file {:?}", path.as_ref()))?;
        ron::from_str(&text).context("Failed to parse config RON")
    }
}
