//! Rapier-backed arena world
//!
//! The arena owns every body, collider and joint. It is rebuilt wholesale on
//! every episode reset and is the only component that mutates physics state;
//! the training engine and the renderer read from it through snapshots.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use rapier2d::crossbeam::channel::{unbounded, Receiver};
use rapier2d::prelude::*;
use std::collections::HashMap;

use crate::config::{ArenaConfig, SpawnArea};

use super::combatant::{Combatant, CombatantState, Health, MoveIntent};
use super::events::ArenaEvent;
use super::parts::{PartKind, PartTag, TeamColor};

/// Transient damage number floating above a hit combatant. Purely cosmetic.
#[derive(Debug, Clone, Copy)]
pub struct DamagePopup {
    pub pos: Vec2,
    pub spawned_ms: f64,
    pub value: f32,
}

/// Pose of one fixture for the renderer, keyed by part kind
#[derive(Debug, Clone, Copy)]
pub struct BodyRenderInfo {
    pub kind: PartKind,
    pub color: TeamColor,
    pub pos: Vec2,
    pub angle: f32,
    /// Core health fraction, 1.0 for non-core parts
    pub hp_fraction: f32,
}

/// The physics arena: a toroidal 20x15 world hosting two combatants
pub struct Arena {
    cfg: ArenaConfig,

    bodies: RigidBodySet,
    colliders: ColliderSet,
    pipeline: PhysicsPipeline,
    integration_parameters: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    query_pipeline: QueryPipeline,

    event_collector: ChannelEventCollector,
    collision_recv: Receiver<CollisionEvent>,
    force_recv: Receiver<ContactForceEvent>,

    /// Collider handle -> semantic part descriptor
    parts: HashMap<ColliderHandle, PartTag>,
    combatants: Vec<Combatant>,
    popups: Vec<DamagePopup>,
    events: Vec<ArenaEvent>,

    ended: bool,
    now_ms: f64,
    rng: Xoshiro256PlusPlus,
}

impl Arena {
    pub fn new(cfg: ArenaConfig, seed: u64) -> Self {
        let (collision_send, collision_recv) = unbounded();
        let (force_send, force_recv) = unbounded();

        let mut arena = Self {
            cfg,
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            pipeline: PhysicsPipeline::new(),
            integration_parameters: IntegrationParameters::default(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            event_collector: ChannelEventCollector::new(collision_send, force_send),
            collision_recv,
            force_recv,
            parts: HashMap::new(),
            combatants: Vec::new(),
            popups: Vec::new(),
            events: Vec::new(),
            ended: false,
            now_ms: 0.0,
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        };
        arena.reset_world();
        arena
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.cfg
    }

    /// Tear down and rebuild the world: fresh rapier sets, two freshly spawned
    /// combatants, cleared popups/intents/events, terminal flag lowered.
    pub fn reset_world(&mut self) {
        self.bodies = RigidBodySet::new();
        self.colliders = ColliderSet::new();
        self.island_manager = IslandManager::new();
        self.broad_phase = BroadPhase::new();
        self.narrow_phase = NarrowPhase::new();
        self.impulse_joints = ImpulseJointSet::new();
        self.multibody_joints = MultibodyJointSet::new();
        self.ccd_solver = CCDSolver::new();
        self.query_pipeline = QueryPipeline::new();

        // Fresh channels so stale collision events from the torn-down world
        // can never leak into the new episode.
        let (collision_send, collision_recv) = unbounded();
        let (force_send, force_recv) = unbounded();
        self.event_collector = ChannelEventCollector::new(collision_send, force_send);
        self.collision_recv = collision_recv;
        self.force_recv = force_recv;

        self.parts.clear();
        self.combatants.clear();
        self.popups.clear();
        self.events.clear();
        self.ended = false;

        let red_spawn = self.cfg.red_spawn;
        let blue_spawn = self.cfg.blue_spawn;
        self.spawn_combatant(TeamColor::Red, red_spawn);
        self.spawn_combatant(TeamColor::Blue, blue_spawn);

        log::debug!("Arena reset: spawned {} combatants", self.combatants.len());
    }

    /// Build one core+weapon+guard composite inside the given spawn rectangle
    fn spawn_combatant(&mut self, color: TeamColor, area: SpawnArea) {
        let x = self.rng.gen::<f32>() * area.width + area.x;
        let y = self.rng.gen::<f32>() * area.height + area.y;

        // Core ball carries the health and the damping
        let core = self.bodies.insert(
            RigidBodyBuilder::dynamic()
                .translation(vector![x, y])
                .linear_damping(self.cfg.linear_damping)
                .angular_damping(self.cfg.angular_damping)
                .build(),
        );
        let core_collider = self.colliders.insert_with_parent(
            ColliderBuilder::ball(self.cfg.core_radius)
                .density(1.0)
                .friction(1.0)
                .restitution(0.6)
                .active_events(ActiveEvents::COLLISION_EVENTS)
                .build(),
            core,
            &mut self.bodies,
        );

        // Weapon blade, welded to the core rim
        let (weapon_hx, weapon_hy) = self.cfg.weapon_half_extents;
        let weapon = self.bodies.insert(
            RigidBodyBuilder::dynamic()
                .translation(vector![x + self.cfg.core_radius + weapon_hx, y])
                .build(),
        );
        let weapon_collider = self.colliders.insert_with_parent(
            ColliderBuilder::cuboid(weapon_hx, weapon_hy)
                .density(0.5)
                .restitution(0.2)
                .active_events(ActiveEvents::COLLISION_EVENTS)
                .build(),
            weapon,
            &mut self.bodies,
        );
        self.impulse_joints.insert(
            core,
            weapon,
            FixedJointBuilder::new()
                .local_anchor1(point![self.cfg.core_radius, 0.0])
                .local_anchor2(point![-weapon_hx, 0.0])
                .contacts_enabled(false)
                .build(),
            true,
        );

        // Guard helmet, welded concentric with the core
        let guard = self
            .bodies
            .insert(RigidBodyBuilder::dynamic().translation(vector![x, y]).build());
        let hull = self.guard_hull_points();
        let guard_collider = self.colliders.insert_with_parent(
            ColliderBuilder::convex_hull(&hull)
                .expect("guard sector points form a convex hull")
                .density(0.2)
                .friction(0.4)
                .restitution(0.5)
                .active_events(ActiveEvents::COLLISION_EVENTS)
                .build(),
            guard,
            &mut self.bodies,
        );
        self.impulse_joints.insert(
            core,
            guard,
            FixedJointBuilder::new()
                .local_anchor1(point![0.0, 0.0])
                .local_anchor2(point![0.0, 0.0])
                .contacts_enabled(false)
                .build(),
            true,
        );

        self.parts.insert(
            core_collider,
            PartTag {
                kind: PartKind::Core,
                color,
            },
        );
        self.parts.insert(
            weapon_collider,
            PartTag {
                kind: PartKind::Weapon,
                color,
            },
        );
        self.parts.insert(
            guard_collider,
            PartTag {
                kind: PartKind::Guard,
                color,
            },
        );

        self.combatants.push(Combatant {
            color,
            core,
            weapon,
            guard,
            core_collider,
            weapon_collider,
            guard_collider,
            health: Health::default(),
            last_hit_ms: f64::NEG_INFINITY,
            intent: MoveIntent::default(),
        });
    }

    /// Sample the guard sector outline (apex + arc, opening upward)
    fn guard_hull_points(&self) -> Vec<Point<Real>> {
        let r = self.cfg.guard_radius;
        let segments = self.cfg.guard_segments.max(2);
        let mut points = vec![point![0.0, 0.0]];
        for i in 0..=segments {
            let theta = -self.cfg.guard_angle / 2.0
                + (i as f32 / segments as f32) * self.cfg.guard_angle;
            let dir = theta - std::f32::consts::FRAC_PI_2;
            points.push(point![r * dir.cos(), r * dir.sin()]);
        }
        points
    }

    /// Set the desired linear travel direction for a combatant
    pub fn action_move(&mut self, color: TeamColor, linear: Vec2) {
        if let Some(c) = self.combatants.iter_mut().find(|c| c.color == color) {
            c.intent.linear = linear;
        }
    }

    /// Set the desired spin for a combatant
    pub fn action_rotate(&mut self, color: TeamColor, angular: f32) {
        if let Some(c) = self.combatants.iter_mut().find(|c| c.color == color) {
            c.intent.angular = angular;
        }
    }

    /// Advance the simulation by `dt_ms`. No-op once the match has ended.
    ///
    /// Per combatant: proportional force toward the linear intent, torque
    /// toward the angular intent, speed clamps, toroidal wraparound of the
    /// whole welded composite; then one physics step and contact resolution.
    pub fn on_tick(&mut self, now_ms: f64, dt_ms: f64) {
        self.now_ms = now_ms;
        self.prune_popups();
        if self.ended {
            return;
        }

        let width = self.cfg.width;
        let height = self.cfg.height;

        for i in 0..self.combatants.len() {
            let (core, weapon, guard, color, intent) = {
                let c = &self.combatants[i];
                (c.core, c.weapon, c.guard, c.color, c.intent)
            };

            let Some(body) = self.bodies.get_mut(core) else {
                continue;
            };

            // Force-based control rather than direct velocity writes
            if intent.linear.length_squared() > 0.0 {
                let accel = intent.linear * self.cfg.acceleration;
                body.add_force(vector![accel.x, accel.y], true);
            }
            if intent.angular != 0.0 {
                body.add_torque(intent.angular * self.cfg.angular_accel, true);
            }

            // Speed caps
            let vel = *body.linvel();
            let speed = vel.magnitude();
            if speed > self.cfg.max_speed {
                body.set_linvel(vel * (self.cfg.max_speed / speed), true);
            }
            let ang_vel = body.angvel();
            if ang_vel.abs() > self.cfg.max_angular_speed {
                body.set_angvel(ang_vel.signum() * self.cfg.max_angular_speed, true);
            }

            // Toroidal wraparound: the whole composite moves atomically
            let pos = *body.translation();
            let mut offset = vector![0.0f32, 0.0];
            if pos.x < 0.0 {
                offset.x = width;
            } else if pos.x > width {
                offset.x = -width;
            }
            if pos.y < 0.0 {
                offset.y = height;
            } else if pos.y > height {
                offset.y = -height;
            }
            if offset != vector![0.0, 0.0] {
                for handle in [core, weapon, guard] {
                    if let Some(b) = self.bodies.get_mut(handle) {
                        let t = *b.translation();
                        b.set_translation(t + offset, true);
                    }
                }
                self.events.push(ArenaEvent::Teleport { color });
            }
        }

        self.integration_parameters.dt = (dt_ms / 1000.0) as f32;
        self.pipeline.step(
            &vector![0.0, 0.0],
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &(),
            &self.event_collector,
        );

        // Forces are one-tick impulses of intent, not persistent thrusters
        for i in 0..self.combatants.len() {
            let core = self.combatants[i].core;
            if let Some(body) = self.bodies.get_mut(core) {
                body.reset_forces(true);
                body.reset_torques(true);
            }
        }

        while let Ok(event) = self.collision_recv.try_recv() {
            if let CollisionEvent::Started(h1, h2, _) = event {
                self.handle_contact(h1, h2);
            }
        }
        // Contact force reports are not used, but the channel must be drained
        while self.force_recv.try_recv().is_ok() {}
    }

    /// Resolve one begin-contact pair. Missing tags and same-color pairs are
    /// tolerated no-ops; an exactly-one-weapon pair becomes an attack.
    fn handle_contact(&mut self, h1: ColliderHandle, h2: ColliderHandle) {
        let (Some(&tag_a), Some(&tag_b)) = (self.parts.get(&h1), self.parts.get(&h2)) else {
            return;
        };
        if tag_a.color == tag_b.color {
            return;
        }
        self.events.push(ArenaEvent::Contact {
            a: tag_a.color,
            b: tag_b.color,
        });

        let parent_a = self.colliders.get(h1).and_then(|c| c.parent());
        let parent_b = self.colliders.get(h2).and_then(|c| c.parent());
        let (Some(body_a), Some(body_b)) = (parent_a, parent_b) else {
            return;
        };

        if tag_a.kind == PartKind::Weapon {
            self.resolve_attack(body_a, body_b, tag_a, tag_b);
        } else if tag_b.kind == PartKind::Weapon {
            self.resolve_attack(body_b, body_a, tag_b, tag_a);
        }
    }

    /// Turn a weapon contact into damage, gated by the defender cooldown.
    /// Weapon-vs-weapon clashes never damage either side.
    fn resolve_attack(
        &mut self,
        attacker_body: RigidBodyHandle,
        defender_body: RigidBodyHandle,
        attacker: PartTag,
        defender: PartTag,
    ) {
        if defender.kind == PartKind::Weapon {
            return;
        }
        let idx = defender.color.index();
        if self.now_ms - self.combatants[idx].last_hit_ms < self.cfg.hit_cooldown_ms {
            return;
        }
        let (Some(att), Some(def)) = (self.bodies.get(attacker_body), self.bodies.get(defender_body))
        else {
            return;
        };

        let rel_speed = (att.linvel() - def.linvel()).magnitude();
        let ang_vel = att.angvel();
        let part_factor = if defender.kind == PartKind::Guard {
            self.cfg.guard_damage_factor
        } else {
            1.0
        };
        let damage = ((rel_speed * self.cfg.rel_speed_damage_scale
            + (ang_vel * self.cfg.angular_damage_scale).abs())
        .sqrt()
            * part_factor)
            .min(self.cfg.max_damage);

        let hit_pos = *def.translation();
        let now = self.now_ms;

        let combatant = &mut self.combatants[idx];
        let eliminated = combatant.health.take_damage(damage);
        combatant.last_hit_ms = now;

        self.popups.push(DamagePopup {
            pos: Vec2::new(hit_pos.x, hit_pos.y),
            spawned_ms: now,
            value: damage,
        });
        self.events.push(ArenaEvent::Attack {
            attacker: attacker.color,
            defender: defender.color,
            damage,
        });

        if eliminated {
            log::info!("{} eliminated {}", attacker.color, defender.color);
            self.events.push(ArenaEvent::Over {
                winner: attacker.color,
            });
            self.ended = true;
        }
    }

    fn prune_popups(&mut self) {
        let now = self.now_ms;
        let lifetime = self.cfg.popup_lifetime_ms;
        self.popups.retain(|p| now - p.spawned_ms < lifetime);
    }

    /// Force the match to its terminal state (timeout path)
    pub fn end_battle(&mut self) {
        self.ended = true;
    }

    pub fn has_ended(&self) -> bool {
        self.ended
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Take all events raised since the last drain
    pub fn drain_events(&mut self) -> Vec<ArenaEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn combatant(&self, color: TeamColor) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.color == color)
    }

    /// Snapshot one combatant's core state for observations and display
    pub fn observe(&self, color: TeamColor) -> Option<CombatantState> {
        let c = self.combatant(color)?;
        let body = self.bodies.get(c.core)?;
        let t = body.translation();
        let v = body.linvel();
        Some(CombatantState {
            color,
            hp: c.health.current,
            pos: Vec2::new(t.x, t.y),
            vel: Vec2::new(v.x, v.y),
            angle: body.rotation().angle(),
            angular_vel: body.angvel(),
        })
    }

    /// Distance between the two cores, used by the approach shaping term
    pub fn distance_between_cores(&self) -> f32 {
        match (
            self.observe(TeamColor::Red),
            self.observe(TeamColor::Blue),
        ) {
            (Some(a), Some(b)) => a.pos.distance(b.pos),
            _ => 0.0,
        }
    }

    /// Move a combatant's whole composite so its core sits at `pos`,
    /// preserving the relative weapon/guard offsets
    pub fn place_combatant(&mut self, color: TeamColor, pos: Vec2) {
        let Some(c) = self.combatants.iter().find(|c| c.color == color) else {
            return;
        };
        let (core, weapon, guard) = (c.core, c.weapon, c.guard);
        let Some(body) = self.bodies.get(core) else {
            return;
        };
        let current = *body.translation();
        let delta = vector![pos.x - current.x, pos.y - current.y];
        for handle in [core, weapon, guard] {
            if let Some(b) = self.bodies.get_mut(handle) {
                let t = *b.translation();
                b.set_translation(t + delta, true);
            }
        }
    }

    /// Poses of every fixture in render order
    pub fn render_bodies(&self) -> Vec<BodyRenderInfo> {
        let mut out = Vec::with_capacity(self.combatants.len() * 3);
        for c in &self.combatants {
            for (kind, handle) in [
                (PartKind::Core, c.core),
                (PartKind::Guard, c.guard),
                (PartKind::Weapon, c.weapon),
            ] {
                if let Some(body) = self.bodies.get(handle) {
                    let t = body.translation();
                    out.push(BodyRenderInfo {
                        kind,
                        color: c.color,
                        pos: Vec2::new(t.x, t.y),
                        angle: body.rotation().angle(),
                        hp_fraction: if kind == PartKind::Core {
                            c.health.fraction()
                        } else {
                            1.0
                        },
                    });
                }
            }
        }
        out
    }

    pub fn popups(&self) -> &[DamagePopup] {
        &self.popups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_arena() -> Arena {
        Arena::new(ArenaConfig::default(), 7)
    }

    #[test]
    fn test_reset_spawns_two_combatants_in_their_rects() {
        let arena = test_arena();
        let red = arena.observe(TeamColor::Red).unwrap();
        let blue = arena.observe(TeamColor::Blue).unwrap();

        assert_eq!(red.hp, 100.0);
        assert_eq!(blue.hp, 100.0);
        assert!(red.pos.x >= 0.5 && red.pos.x <= 9.5, "red x {}", red.pos.x);
        assert!(blue.pos.x >= 10.5 && blue.pos.x <= 19.5, "blue x {}", blue.pos.x);
        for state in [red, blue] {
            assert!(state.pos.y >= 0.5 && state.pos.y <= 14.5);
        }
        // Three tagged colliders per side
        assert_eq!(arena.parts.len(), 6);
    }

    #[test]
    fn test_reset_world_clears_transients() {
        let mut arena = test_arena();
        arena.events.push(ArenaEvent::Teleport {
            color: TeamColor::Red,
        });
        arena.popups.push(DamagePopup {
            pos: Vec2::ZERO,
            spawned_ms: 0.0,
            value: 5.0,
        });
        arena.ended = true;

        arena.reset_world();
        assert!(arena.events.is_empty());
        assert!(arena.popups.is_empty());
        assert!(!arena.has_ended());
    }

    #[test]
    fn test_wraparound_preserves_composite_offsets() {
        let mut arena = test_arena();
        arena.place_combatant(TeamColor::Red, Vec2::new(20.3, 5.0));

        let c = arena.combatant(TeamColor::Red).unwrap();
        let core_before = *arena.bodies[c.core].translation();
        let weapon_before = *arena.bodies[c.weapon].translation();
        let guard_before = *arena.bodies[c.guard].translation();
        let weapon_offset = weapon_before - core_before;
        let guard_offset = guard_before - core_before;

        arena.on_tick(16.0, 16.0);

        let c = arena.combatant(TeamColor::Red).unwrap();
        let core_after = *arena.bodies[c.core].translation();
        let weapon_after = *arena.bodies[c.weapon].translation();
        let guard_after = *arena.bodies[c.guard].translation();

        assert!(
            (core_after.x - (core_before.x - 20.0)).abs() < 1e-3,
            "core x after wrap: {}",
            core_after.x
        );
        assert!((core_after.y - core_before.y).abs() < 1e-3);
        assert!(((weapon_after - core_after) - weapon_offset).magnitude() < 0.05);
        assert!(((guard_after - core_after) - guard_offset).magnitude() < 0.05);

        let events = arena.drain_events();
        assert!(events.contains(&ArenaEvent::Teleport {
            color: TeamColor::Red
        }));
    }

    #[test]
    fn test_wraparound_negative_y() {
        let mut arena = test_arena();
        arena.place_combatant(TeamColor::Blue, Vec2::new(12.0, -0.4));
        arena.on_tick(16.0, 16.0);
        let blue = arena.observe(TeamColor::Blue).unwrap();
        assert!((blue.pos.y - 14.6).abs() < 1e-3, "blue y {}", blue.pos.y);
    }

    fn set_linvel(arena: &mut Arena, handle: RigidBodyHandle, vel: Vector<Real>) {
        arena.bodies.get_mut(handle).unwrap().set_linvel(vel, true);
    }

    #[test]
    fn test_attack_damage_formula() {
        let mut arena = test_arena();
        arena.now_ms = 1000.0;
        let (weapon, weapon_collider) = {
            let red = arena.combatant(TeamColor::Red).unwrap();
            (red.weapon, red.weapon_collider)
        };
        let core_collider = arena.combatant(TeamColor::Blue).unwrap().core_collider;

        set_linvel(&mut arena, weapon, vector![5.0, 0.0]);
        arena.bodies.get_mut(weapon).unwrap().set_angvel(2.0, true);

        arena.handle_contact(weapon_collider, core_collider);

        // min(sqrt(5*20 + |2*10|) * 1, 20) = sqrt(120) ~= 10.954
        let expected = 120.0f32.sqrt();
        let blue = arena.observe(TeamColor::Blue).unwrap();
        assert!(
            (blue.hp - (100.0 - expected)).abs() < 1e-3,
            "blue hp {}",
            blue.hp
        );

        let events = arena.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            ArenaEvent::Attack {
                attacker: TeamColor::Red,
                defender: TeamColor::Blue,
                ..
            }
        )));
        assert_eq!(arena.popups.len(), 1);
    }

    #[test]
    fn test_guard_hit_takes_quarter_damage() {
        let mut arena = test_arena();
        arena.now_ms = 1000.0;
        let (weapon, weapon_collider) = {
            let red = arena.combatant(TeamColor::Red).unwrap();
            (red.weapon, red.weapon_collider)
        };
        let guard_collider = arena.combatant(TeamColor::Blue).unwrap().guard_collider;

        set_linvel(&mut arena, weapon, vector![5.0, 0.0]);
        arena.handle_contact(weapon_collider, guard_collider);

        let expected = 100.0f32.sqrt() * 0.25;
        let blue = arena.observe(TeamColor::Blue).unwrap();
        assert!((blue.hp - (100.0 - expected)).abs() < 1e-3);
    }

    #[test]
    fn test_attack_cooldown_collapses_double_hits() {
        let mut arena = test_arena();
        arena.now_ms = 1000.0;
        let weapon_collider = arena.combatant(TeamColor::Red).unwrap().weapon_collider;
        let weapon = arena.combatant(TeamColor::Red).unwrap().weapon;
        let core_collider = arena.combatant(TeamColor::Blue).unwrap().core_collider;
        set_linvel(&mut arena, weapon, vector![5.0, 0.0]);

        arena.handle_contact(weapon_collider, core_collider);
        let hp_after_first = arena.observe(TeamColor::Blue).unwrap().hp;

        // 100 ms later: inside the 500 ms cooldown window
        arena.now_ms = 1100.0;
        arena.handle_contact(weapon_collider, core_collider);
        assert_eq!(arena.observe(TeamColor::Blue).unwrap().hp, hp_after_first);

        // Past the window the next hit lands
        arena.now_ms = 1600.0;
        arena.handle_contact(weapon_collider, core_collider);
        assert!(arena.observe(TeamColor::Blue).unwrap().hp < hp_after_first);
    }

    #[test]
    fn test_weapon_vs_weapon_never_damages() {
        let mut arena = test_arena();
        arena.now_ms = 1000.0;
        let red_weapon = arena.combatant(TeamColor::Red).unwrap().weapon;
        let red_weapon_collider = arena.combatant(TeamColor::Red).unwrap().weapon_collider;
        let blue_weapon_collider = arena.combatant(TeamColor::Blue).unwrap().weapon_collider;
        set_linvel(&mut arena, red_weapon, vector![9.0, 0.0]);

        arena.handle_contact(red_weapon_collider, blue_weapon_collider);

        assert_eq!(arena.observe(TeamColor::Red).unwrap().hp, 100.0);
        assert_eq!(arena.observe(TeamColor::Blue).unwrap().hp, 100.0);
        // The clash still counts as a contact
        let events = arena.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, ArenaEvent::Contact { .. })));
    }

    #[test]
    fn test_same_color_contact_ignored() {
        let mut arena = test_arena();
        arena.now_ms = 1000.0;
        let red = arena.combatant(TeamColor::Red).unwrap();
        let (weapon_collider, core_collider) = (red.weapon_collider, red.core_collider);

        arena.handle_contact(weapon_collider, core_collider);
        assert!(arena.drain_events().is_empty());
    }

    #[test]
    fn test_lethal_hit_raises_over_and_ends_match() {
        let mut arena = test_arena();
        arena.now_ms = 1000.0;
        arena.combatants[TeamColor::Blue.index()].health.current = 1.0;
        let weapon = arena.combatant(TeamColor::Red).unwrap().weapon;
        let weapon_collider = arena.combatant(TeamColor::Red).unwrap().weapon_collider;
        let core_collider = arena.combatant(TeamColor::Blue).unwrap().core_collider;
        set_linvel(&mut arena, weapon, vector![5.0, 0.0]);

        arena.handle_contact(weapon_collider, core_collider);

        assert!(arena.has_ended());
        assert_eq!(arena.observe(TeamColor::Blue).unwrap().hp, 0.0);
        let events = arena.drain_events();
        assert!(events.contains(&ArenaEvent::Over {
            winner: TeamColor::Red
        }));

        // Ended matches no longer advance
        let before = arena.observe(TeamColor::Red).unwrap().pos;
        arena.action_move(TeamColor::Red, Vec2::new(1.0, 0.0));
        arena.on_tick(1100.0, 100.0);
        let after = arena.observe(TeamColor::Red).unwrap().pos;
        assert_eq!(before, after);
    }

    #[test]
    fn test_health_monotone_over_ticks() {
        let mut arena = test_arena();
        arena.action_move(TeamColor::Red, Vec2::new(1.0, 0.0));
        arena.action_move(TeamColor::Blue, Vec2::new(-1.0, 0.0));
        let mut last_red = 100.0f32;
        let mut last_blue = 100.0f32;
        let mut now = 0.0;
        for _ in 0..300 {
            now += 16.67;
            arena.on_tick(now, 16.67);
            let red = arena.observe(TeamColor::Red).unwrap().hp;
            let blue = arena.observe(TeamColor::Blue).unwrap().hp;
            assert!(red <= last_red && (0.0..=100.0).contains(&red));
            assert!(blue <= last_blue && (0.0..=100.0).contains(&blue));
            last_red = red;
            last_blue = blue;
            if arena.has_ended() {
                break;
            }
        }
    }

    #[test]
    fn test_speed_clamp() {
        let mut arena = test_arena();
        let core = arena.combatant(TeamColor::Red).unwrap().core;
        set_linvel(&mut arena, core, vector![50.0, 0.0]);
        arena.bodies.get_mut(core).unwrap().set_angvel(40.0, true);

        arena.on_tick(16.0, 16.0);

        let red = arena.observe(TeamColor::Red).unwrap();
        // Clamped before the step; damping only shrinks it further
        assert!(red.vel.length() <= 10.0 + 1e-3);
        assert!(red.angular_vel.abs() <= 10.0 + 1e-3);
    }

    #[test]
    fn test_popups_expire() {
        let mut arena = test_arena();
        arena.popups.push(DamagePopup {
            pos: Vec2::new(1.0, 1.0),
            spawned_ms: 0.0,
            value: 3.0,
        });
        arena.on_tick(1000.0, 16.0);
        assert_eq!(arena.popups().len(), 1);
        arena.on_tick(2500.0, 16.0);
        assert!(arena.popups().is_empty());
    }
}
