//! JSON wire protocol exchanged with the remote trainer
//!
//! Inbound control messages are routed by `type`; outbound messages carry the
//! per-color observation/reward payloads of one decision step.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One agent's action: desired travel direction and spin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActionCommand {
    pub linear: [f32; 2],
    pub angular: f32,
}

/// Messages the trainer sends us
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Inbound {
    /// Start a new episode; replied to with fresh observations
    Reset,
    /// Zero the episode counter only
    ResetEpisode,
    /// Request the persistent statistics snapshot
    Save,
    /// Restore a previously saved statistics snapshot
    Load { data: SaveData },
    /// Per-color control intents for the next decision tick
    Action {
        actions: HashMap<String, ActionCommand>,
    },
}

/// Messages we send to the trainer
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Outbound {
    Reset { data: Option<ResetData> },
    ResetEpisode { status: &'static str },
    Save { data: SaveData },
    Load { status: &'static str },
    Step { data: StepData },
}

/// Reply to a reset: initial observations keyed by color
#[derive(Debug, Clone, Serialize)]
pub struct ResetData {
    pub observation: HashMap<String, Vec<f32>>,
    pub info: HashMap<String, StepInfo>,
}

/// One decision step's outcome, keyed by color throughout
#[derive(Debug, Clone, Serialize)]
pub struct StepData {
    pub observation: HashMap<String, Vec<f32>>,
    pub reward: HashMap<String, f32>,
    pub termination: HashMap<String, bool>,
    pub truncation: HashMap<String, bool>,
    pub info: HashMap<String, StepInfo>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StepInfo {
    pub reason: &'static str,
}

/// Persistent cross-episode statistics: win tallies only, episodes are never
/// resumable mid-match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveData {
    pub episode: u32,
    pub colors: Vec<String>,
    pub wins: Vec<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reset() {
        let msg: Inbound = serde_json::from_str(r#"{"type": "reset"}"#).unwrap();
        assert!(matches!(msg, Inbound::Reset));
    }

    #[test]
    fn test_parse_reset_episode() {
        let msg: Inbound = serde_json::from_str(r#"{"type": "resetEpisode"}"#).unwrap();
        assert!(matches!(msg, Inbound::ResetEpisode));
    }

    #[test]
    fn test_parse_action() {
        let text = r#"{
            "type": "action",
            "actions": {
                "red": {"linear": [0.5, -0.25], "angular": 1.0},
                "blue": {"linear": [0.0, 0.0], "angular": -0.5}
            }
        }"#;
        let msg: Inbound = serde_json::from_str(text).unwrap();
        let Inbound::Action { actions } = msg else {
            panic!("expected action");
        };
        assert_eq!(actions["red"].linear, [0.5, -0.25]);
        assert_eq!(actions["blue"].angular, -0.5);
    }

    #[test]
    fn test_parse_load() {
        let text = r#"{"type": "load", "data": {"episode": 12, "colors": ["red", "blue"], "wins": [7, 5]}}"#;
        let msg: Inbound = serde_json::from_str(text).unwrap();
        let Inbound::Load { data } = msg else {
            panic!("expected load");
        };
        assert_eq!(data.episode, 12);
        assert_eq!(data.wins, vec![7, 5]);
    }

    #[test]
    fn test_malformed_payload_is_an_error() {
        assert!(serde_json::from_str::<Inbound>(r#"{"type": "launchMissiles"}"#).is_err());
        assert!(serde_json::from_str::<Inbound>("not json").is_err());
    }

    #[test]
    fn test_step_serialization_shape() {
        let mut observation = HashMap::new();
        observation.insert("red".to_string(), vec![0.5f32; 16]);
        let mut reward = HashMap::new();
        reward.insert("red".to_string(), 1.5f32);
        let mut termination = HashMap::new();
        termination.insert("red".to_string(), false);
        let mut truncation = HashMap::new();
        truncation.insert("red".to_string(), false);
        let mut info = HashMap::new();
        info.insert("red".to_string(), StepInfo { reason: "win" });

        let msg = Outbound::Step {
            data: StepData {
                observation,
                reward,
                termination,
                truncation,
                info,
            },
        };
        let value: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "step");
        assert_eq!(value["data"]["observation"]["red"].as_array().unwrap().len(), 16);
        assert_eq!(value["data"]["info"]["red"]["reason"], "win");
    }

    #[test]
    fn test_reset_episode_reply_shape() {
        let value = serde_json::to_value(Outbound::ResetEpisode { status: "success" }).unwrap();
        assert_eq!(value["type"], "resetEpisode");
        assert_eq!(value["status"], "success");
    }
}
