//! Manual keyboard control
//!
//! Fallback driver for a combatant when no trainer is connected. Key
//! transitions are folded into a persistent movement intent: pressing a key
//! sets its axis, releasing it falls back to the opposite key if that one is
//! still held.
//!
//! The headless binary has no key source; an embedding host with a window
//! loop maps its key events onto [`ControlKey`] and forwards the
//! up/down transitions here.

use glam::Vec2;

use crate::arena::{Arena, MoveIntent, TeamColor};

/// Abstract movement keys, mapped from whatever the host's key codes are
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKey {
    Up,
    Down,
    Left,
    Right,
    SpinCcw,
    SpinCw,
}

/// Tracks held keys for one combatant and keeps its intent in sync
pub struct ManualController {
    color: TeamColor,
    held: [bool; 6],
    intent: MoveIntent,
}

impl ManualController {
    pub fn new(color: TeamColor) -> Self {
        Self {
            color,
            held: [false; 6],
            intent: MoveIntent::default(),
        }
    }

    pub fn color(&self) -> TeamColor {
        self.color
    }

    pub fn intent(&self) -> MoveIntent {
        self.intent
    }

    fn index(key: ControlKey) -> usize {
        match key {
            ControlKey::Up => 0,
            ControlKey::Down => 1,
            ControlKey::Left => 2,
            ControlKey::Right => 3,
            ControlKey::SpinCcw => 4,
            ControlKey::SpinCw => 5,
        }
    }

    fn is_held(&self, key: ControlKey) -> bool {
        self.held[Self::index(key)]
    }

    /// The most recent press wins its axis
    pub fn key_down(&mut self, key: ControlKey, arena: &mut Arena) {
        self.held[Self::index(key)] = true;
        match key {
            ControlKey::Up => self.intent.linear.y = -1.0,
            ControlKey::Down => self.intent.linear.y = 1.0,
            ControlKey::Left => self.intent.linear.x = -1.0,
            ControlKey::Right => self.intent.linear.x = 1.0,
            ControlKey::SpinCcw => self.intent.angular = -1.0,
            ControlKey::SpinCw => self.intent.angular = 1.0,
        }
        self.apply(arena);
    }

    /// Releasing a key yields the axis to the opposite key if held
    pub fn key_up(&mut self, key: ControlKey, arena: &mut Arena) {
        self.held[Self::index(key)] = false;
        match key {
            ControlKey::Up => {
                self.intent.linear.y = if self.is_held(ControlKey::Down) { 1.0 } else { 0.0 };
            }
            ControlKey::Down => {
                self.intent.linear.y = if self.is_held(ControlKey::Up) { -1.0 } else { 0.0 };
            }
            ControlKey::Left => {
                self.intent.linear.x = if self.is_held(ControlKey::Right) { 1.0 } else { 0.0 };
            }
            ControlKey::Right => {
                self.intent.linear.x = if self.is_held(ControlKey::Left) { -1.0 } else { 0.0 };
            }
            ControlKey::SpinCcw => {
                self.intent.angular = if self.is_held(ControlKey::SpinCw) { 1.0 } else { 0.0 };
            }
            ControlKey::SpinCw => {
                self.intent.angular = if self.is_held(ControlKey::SpinCcw) { -1.0 } else { 0.0 };
            }
        }
        self.apply(arena);
    }

    fn apply(&self, arena: &mut Arena) {
        arena.action_move(self.color, Vec2::new(self.intent.linear.x, self.intent.linear.y));
        arena.action_rotate(self.color, self.intent.angular);
    }
}
