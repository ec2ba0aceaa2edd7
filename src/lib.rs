//! # Swordball - 2D Physics Sword-Duel Arena
//!
//! An interactive two-combatant physics match that doubles as a training
//! environment for external reinforcement-learning agents connected over a
//! WebSocket. The simulation, the reward/observation pipeline and the remote
//! trainer run on independent clocks; the workflow loop keeps them interleaved
//! so every virtual tick is fully simulated, rendered and recorded before the
//! next one is excited.

pub mod arena;
pub mod bridge;
pub mod config;
pub mod excite;
pub mod input;
pub mod record;
pub mod render;
pub mod train;
pub mod workflow;

pub use workflow::TrainWorkflow;

/// Common imports for internal use
pub mod prelude {
    pub use crate::arena::{Arena, ArenaEvent, PartKind, TeamColor};
    pub use crate::config::{ArenaConfig, RewardConfig, TrainConfig};
    pub use glam::Vec2;
}
