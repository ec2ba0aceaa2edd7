//! Observation vectors handed to the trainer
//!
//! Each agent sees its own state followed by the opponent's, every feature
//! normalized into roughly [-1, 1] by the corresponding arena limit.

use std::collections::HashMap;

use crate::arena::{CombatantState, TeamColor, MAX_HEALTH};
use crate::config::ArenaConfig;

/// Features describing one combatant
pub const FEATURES_PER_SIDE: usize = 8;
/// Full per-agent observation: own side then opponent side
pub const OBSERVATION_LEN: usize = FEATURES_PER_SIDE * 2;

/// Normalized feature block for one combatant.
///
/// Order: hp, x, y, vx, vy, angle, angular velocity, elapsed episode time.
pub fn side_features(
    state: &CombatantState,
    cfg: &ArenaConfig,
    elapsed_ms: f64,
    timeout_ms: f64,
) -> [f32; FEATURES_PER_SIDE] {
    [
        state.hp / MAX_HEALTH,
        state.pos.x / cfg.width,
        state.pos.y / cfg.height,
        state.vel.x / cfg.max_speed,
        state.vel.y / cfg.max_speed,
        state.angle / std::f32::consts::TAU,
        state.angular_vel / cfg.max_angular_speed,
        (elapsed_ms / timeout_ms) as f32,
    ]
}

/// Builds both agents' observation vectors keyed by color string
pub fn paired_observation(
    red: &CombatantState,
    blue: &CombatantState,
    cfg: &ArenaConfig,
    elapsed_ms: f64,
    timeout_ms: f64,
) -> HashMap<String, Vec<f32>> {
    let red_side = side_features(red, cfg, elapsed_ms, timeout_ms);
    let blue_side = side_features(blue, cfg, elapsed_ms, timeout_ms);

    let mut observation = HashMap::with_capacity(2);
    let mut red_vec = Vec::with_capacity(OBSERVATION_LEN);
    red_vec.extend_from_slice(&red_side);
    red_vec.extend_from_slice(&blue_side);
    let mut blue_vec = Vec::with_capacity(OBSERVATION_LEN);
    blue_vec.extend_from_slice(&blue_side);
    blue_vec.extend_from_slice(&red_side);

    observation.insert(TeamColor::Red.as_str().to_string(), red_vec);
    observation.insert(TeamColor::Blue.as_str().to_string(), blue_vec);
    observation
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn state(color: TeamColor) -> CombatantState {
        CombatantState {
            color,
            hp: 50.0,
            pos: Vec2::new(10.0, 7.5),
            vel: Vec2::new(5.0, -2.5),
            angle: std::f32::consts::PI,
            angular_vel: -5.0,
        }
    }

    #[test]
    fn test_side_features_are_normalized() {
        let cfg = ArenaConfig::default();
        let features = side_features(&state(TeamColor::Red), &cfg, 60_000.0, 120_000.0);
        assert_eq!(features[0], 0.5);
        assert_eq!(features[1], 0.5);
        assert_eq!(features[2], 0.5);
        assert_eq!(features[3], 0.5);
        assert_eq!(features[4], -0.25);
        assert_eq!(features[5], 0.5);
        assert_eq!(features[6], -0.5);
        assert_eq!(features[7], 0.5);
    }

    #[test]
    fn test_paired_observation_mirrors_sides() {
        let cfg = ArenaConfig::default();
        let red = state(TeamColor::Red);
        let mut blue = state(TeamColor::Blue);
        blue.hp = 100.0;

        let obs = paired_observation(&red, &blue, &cfg, 0.0, 120_000.0);
        let red_vec = &obs["red"];
        let blue_vec = &obs["blue"];
        assert_eq!(red_vec.len(), OBSERVATION_LEN);
        assert_eq!(blue_vec.len(), OBSERVATION_LEN);

        // Own block first, opponent block second
        assert_eq!(red_vec[0], 0.5);
        assert_eq!(red_vec[FEATURES_PER_SIDE], 1.0);
        assert_eq!(blue_vec[0], 1.0);
        assert_eq!(blue_vec[FEATURES_PER_SIDE], 0.5);

        // Right after a reset the elapsed feature is zero on both sides
        assert_eq!(red_vec[FEATURES_PER_SIDE - 1], 0.0);
        assert_eq!(blue_vec[FEATURES_PER_SIDE - 1], 0.0);
    }
}
