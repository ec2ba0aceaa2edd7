//! Enumerated arena event stream
//!
//! The training engine subscribes to a fixed set of event kinds; the arena
//! accumulates them during a tick and the engine drains them afterwards.

use super::parts::TeamColor;

/// Events raised by the arena while stepping
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArenaEvent {
    /// Any cross-color fixture contact (weapon or not)
    Contact { a: TeamColor, b: TeamColor },
    /// A weapon hit resolved into damage
    Attack {
        attacker: TeamColor,
        defender: TeamColor,
        damage: f32,
    },
    /// A combatant wrapped around the toroidal boundary
    Teleport { color: TeamColor },
    /// A combatant was eliminated; the match is over
    Over { winner: TeamColor },
}
