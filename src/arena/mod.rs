//! Physics arena hosting the two welded combatant composites
//!
//! Owns the rapier world, applies force-based control intents, detects
//! toroidal wraparound, resolves weapon contacts into attacks and raises the
//! enumerated event stream the training engine consumes.

mod combatant;
mod events;
mod parts;
mod world;

pub use combatant::{Combatant, CombatantState, Health, MoveIntent, MAX_HEALTH};
pub use events::ArenaEvent;
pub use parts::{PartKind, PartTag, TeamColor};
pub use world::{Arena, BodyRenderInfo, DamagePopup};
