//! Part descriptors recovered from collider handles
//!
//! Rapier only hands back opaque collider handles in collision events, so the
//! arena keeps a side table mapping each handle to the semantic part it
//! belongs to.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One side of the match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamColor {
    Red,
    Blue,
}

impl TeamColor {
    /// Both colors in combatant index order
    pub const ALL: [TeamColor; 2] = [TeamColor::Red, TeamColor::Blue];

    pub fn as_str(&self) -> &'static str {
        match self {
            TeamColor::Red => "red",
            TeamColor::Blue => "blue",
        }
    }

    /// Parse a wire-protocol color key. Unknown strings yield `None` so stale
    /// trainer messages degrade to no-ops.
    pub fn parse(s: &str) -> Option<TeamColor> {
        match s {
            "red" => Some(TeamColor::Red),
            "blue" => Some(TeamColor::Blue),
            _ => None,
        }
    }

    pub fn opponent(&self) -> TeamColor {
        match self {
            TeamColor::Red => TeamColor::Blue,
            TeamColor::Blue => TeamColor::Red,
        }
    }

    /// Index into per-combatant arrays
    pub fn index(&self) -> usize {
        match self {
            TeamColor::Red => 0,
            TeamColor::Blue => 1,
        }
    }
}

impl fmt::Display for TeamColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic role of a fixture within the welded composite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartKind {
    /// The ball carrying health
    Core,
    /// The sword blade; the only part that deals damage
    Weapon,
    /// The helmet arc; takes reduced damage
    Guard,
}

/// Side-table entry for one collider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartTag {
    pub kind: PartKind,
    pub color: TeamColor,
}
