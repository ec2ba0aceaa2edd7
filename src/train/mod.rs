//! Training pipeline: decision pacing, rewards, observations and routing
//!
//! A [`TrainManager`] owns every registered training engine plus the trainer
//! socket; the active engine runs the duel, shapes rewards and emits step
//! payloads on its own decision cadence.

mod engine;
mod manager;
mod observation;
mod reward;

pub use engine::{CombatantDisplay, DisplayInfo, SwordDuelTrain};
pub use manager::{TrainManager, TrainProcess};
pub use observation::{paired_observation, side_features, FEATURES_PER_SIDE, OBSERVATION_LEN};
pub use reward::{shaped_reward, RewardInputs};
