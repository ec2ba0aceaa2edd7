//! Combatant state: the welded core/weapon/guard composite and its health

use glam::Vec2;
use rapier2d::prelude::{ColliderHandle, RigidBodyHandle};

use super::parts::TeamColor;

/// Starting (and maximum) health of every combatant
pub const MAX_HEALTH: f32 = 100.0;

/// Clamped health pool (0..=max); the match ends when it reaches zero
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    pub current: f32,
    pub max: f32,
}

impl Health {
    pub fn new(max: f32) -> Self {
        Health { current: max, max }
    }

    /// Deal damage. Returns true if the combatant was eliminated.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        self.current = (self.current - amount).max(0.0);
        self.is_dead()
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0.0
    }

    /// Health as a fraction (0.0 - 1.0)
    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            (self.current / self.max).clamp(0.0, 1.0)
        }
    }
}

impl Default for Health {
    fn default() -> Self {
        Self::new(MAX_HEALTH)
    }
}

/// Pending control intent, consumed every physics tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MoveIntent {
    /// Desired direction of travel, each component in [-1, 1]
    pub linear: Vec2,
    /// Desired spin, in [-1, 1]
    pub angular: f32,
}

/// One side of the match: handles into the rapier sets plus mutable combat
/// state. The three bodies are rigidly welded and only ever move together.
#[derive(Debug)]
pub struct Combatant {
    pub color: TeamColor,
    pub core: RigidBodyHandle,
    pub weapon: RigidBodyHandle,
    pub guard: RigidBodyHandle,
    pub core_collider: ColliderHandle,
    pub weapon_collider: ColliderHandle,
    pub guard_collider: ColliderHandle,
    pub health: Health,
    /// Simulated time of the last hit taken, gates the attack cooldown
    pub last_hit_ms: f64,
    pub intent: MoveIntent,
}

/// Snapshot of one combatant used for observations and display
#[derive(Debug, Clone, Copy)]
pub struct CombatantState {
    pub color: TeamColor,
    pub hp: f32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub angle: f32,
    pub angular_vel: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_clamps_at_zero() {
        let mut health = Health::default();
        assert!(!health.take_damage(60.0));
        assert_eq!(health.current, 40.0);
        assert!(health.take_damage(100.0));
        assert_eq!(health.current, 0.0);
        assert!(health.is_dead());
    }

    #[test]
    fn test_health_fraction() {
        let mut health = Health::new(100.0);
        health.take_damage(25.0);
        assert!((health.fraction() - 0.75).abs() < f32::EPSILON);

        let degenerate = Health::new(0.0);
        assert_eq!(degenerate.fraction(), 0.0);
    }
}
