//! Shaped per-decision reward
//!
//! A pure function of the accumulated episode statistics so a given state
//! always maps to the same scalar, independent of call order or wall time.

use crate::config::RewardConfig;

/// Everything one side's reward depends on at a decision tick
#[derive(Debug, Clone, Copy)]
pub struct RewardInputs {
    pub episode: u32,
    /// Total damage dealt since the previous decision
    pub damage_dealt: f32,
    /// Total damage received since the previous decision
    pub damage_received: f32,
    /// Wraparound teleports since the previous decision
    pub teleports_since_decision: u32,
    /// Wraparound teleports over the whole episode
    pub teleports_this_episode: u32,
    /// Core distance at the previous decision minus the current one;
    /// positive when the combatants closed in
    pub approach_delta: f32,
    /// True when either side wrapped since the previous decision, which makes
    /// the distance delta meaningless
    pub teleport_invalidates_approach: bool,
    /// Simulated time of this side's last contact of any kind
    pub last_contact_ms: f64,
    pub now_ms: f64,
    pub elapsed_ms: f64,
    pub timeout_ms: f64,
    /// The match was decided this decision
    pub decided: bool,
    pub is_winner: bool,
}

/// Computes one side's reward for a single decision tick
pub fn shaped_reward(cfg: &RewardConfig, input: &RewardInputs) -> f32 {
    let mut reward = 0.0f32;

    // Early-training incentive to close distance; meaningless across a wrap
    if input.episode < cfg.approach_episode_limit && !input.teleport_invalidates_approach {
        reward += input.approach_delta * cfg.approach_weight;
    }

    reward += input.damage_dealt * cfg.damage_dealt_weight;
    reward -= input.damage_received * cfg.damage_received_weight;

    // Discourage camping at the boundary, harder the more it recurs
    reward -= (input.teleports_since_decision * input.teleports_this_episode) as f32;

    // Idle penalty, fading out as training matures
    if input.now_ms - input.last_contact_ms > cfg.idle_threshold_ms {
        let decay = 1.0 - input.episode as f32 / cfg.idle_episode_limit as f32;
        reward -= decay.max(0.0);
    }

    if input.elapsed_ms > input.timeout_ms {
        reward -= cfg.timeout_penalty;
    }

    if input.decided {
        if input.is_winner {
            let remaining_sec = ((input.timeout_ms - input.elapsed_ms) / 1000.0) as f32;
            reward += cfg.win_bonus + remaining_sec * cfg.win_time_bonus_per_sec;
        } else {
            reward -= cfg.lose_penalty;
        }
    }

    reward
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_inputs() -> RewardInputs {
        RewardInputs {
            episode: 100,
            damage_dealt: 0.0,
            damage_received: 0.0,
            teleports_since_decision: 0,
            teleports_this_episode: 0,
            approach_delta: 0.0,
            teleport_invalidates_approach: false,
            last_contact_ms: 0.0,
            now_ms: 1000.0,
            elapsed_ms: 1000.0,
            timeout_ms: 120_000.0,
            decided: false,
            is_winner: false,
        }
    }

    #[test]
    fn test_quiet_decision_is_zero() {
        let cfg = RewardConfig::default();
        assert_eq!(shaped_reward(&cfg, &quiet_inputs()), 0.0);
    }

    #[test]
    fn test_damage_terms() {
        let cfg = RewardConfig::default();
        let mut input = quiet_inputs();
        input.damage_dealt = 10.0;
        input.damage_received = 5.0;
        let reward = shaped_reward(&cfg, &input);
        assert!((reward - (10.0 * 0.2 - 5.0 * 0.03)).abs() < 1e-6);
    }

    #[test]
    fn test_approach_only_in_early_episodes() {
        let cfg = RewardConfig::default();
        let mut input = quiet_inputs();
        input.approach_delta = 2.0;

        input.episode = 5;
        assert!((shaped_reward(&cfg, &input) - 0.2).abs() < 1e-6);

        input.episode = 20;
        assert_eq!(shaped_reward(&cfg, &input), 0.0);

        // A wrap during the window invalidates the distance delta
        input.episode = 5;
        input.teleport_invalidates_approach = true;
        input.teleports_since_decision = 0;
        assert_eq!(shaped_reward(&cfg, &input), 0.0);
    }

    #[test]
    fn test_teleport_penalty_scales_with_recurrence() {
        let cfg = RewardConfig::default();
        let mut input = quiet_inputs();
        input.teleports_since_decision = 2;
        input.teleports_this_episode = 7;
        input.teleport_invalidates_approach = true;
        assert_eq!(shaped_reward(&cfg, &input), -14.0);
    }

    #[test]
    fn test_idle_penalty_decays_with_episode() {
        let cfg = RewardConfig::default();
        let mut input = quiet_inputs();
        input.last_contact_ms = 0.0;
        input.now_ms = 15_000.0;
        input.elapsed_ms = 15_000.0;

        input.episode = 0;
        assert_eq!(shaped_reward(&cfg, &input), -1.0);

        input.episode = 25;
        assert!((shaped_reward(&cfg, &input) + 0.5).abs() < 1e-6);

        input.episode = 80;
        assert_eq!(shaped_reward(&cfg, &input), 0.0);
    }

    #[test]
    fn test_terminal_rewards() {
        let cfg = RewardConfig::default();

        let mut winner = quiet_inputs();
        winner.decided = true;
        winner.is_winner = true;
        winner.elapsed_ms = 60_000.0;
        winner.now_ms = 60_000.0;
        let reward = shaped_reward(&cfg, &winner);
        assert!((reward - (40.0 + 60.0)).abs() < 1e-4);

        let mut loser = winner;
        loser.is_winner = false;
        assert_eq!(shaped_reward(&cfg, &loser), -10.0);
    }

    #[test]
    fn test_timeout_penalty() {
        let cfg = RewardConfig::default();
        let mut input = quiet_inputs();
        input.elapsed_ms = 121_000.0;
        input.now_ms = 121_000.0;
        input.last_contact_ms = 120_000.0;
        assert_eq!(shaped_reward(&cfg, &input), -20.0);
    }

    #[test]
    fn test_reward_is_deterministic() {
        let cfg = RewardConfig::default();
        let mut input = quiet_inputs();
        input.episode = 3;
        input.damage_dealt = 7.25;
        input.damage_received = 1.5;
        input.approach_delta = 0.375;
        let first = shaped_reward(&cfg, &input);
        for _ in 0..100 {
            assert_eq!(shaped_reward(&cfg, &input).to_bits(), first.to_bits());
        }
    }
}
