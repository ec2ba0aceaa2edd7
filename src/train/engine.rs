//! The sword-duel training engine
//!
//! Owns the arena and runs the decision cycle: an action from the trainer is
//! applied, the physics settles for at least the decision interval, then the
//! accumulated events are folded into rewards and a step payload is emitted.
//! Trainer actions that arrive mid-settle are held for the next cycle.

use std::collections::HashMap;

use glam::Vec2;

use crate::arena::{Arena, ArenaEvent, TeamColor};
use crate::bridge::protocol::{
    ActionCommand, Inbound, Outbound, ResetData, SaveData, StepData, StepInfo,
};
use crate::config::{Config, RewardConfig, TrainConfig};
use crate::render::{ArenaRenderer, PixelFrame};

use super::manager::TrainProcess;
use super::observation::paired_observation;
use super::reward::{shaped_reward, RewardInputs};

/// Per-side accumulators, drained at every decision tick
#[derive(Debug, Clone, Copy)]
struct SideStats {
    damage_dealt: f32,
    damage_received: f32,
    teleports_since_decision: u32,
    teleports_this_episode: u32,
    last_contact_ms: f64,
}

impl SideStats {
    fn fresh(now_ms: f64) -> Self {
        Self {
            damage_dealt: 0.0,
            damage_received: 0.0,
            teleports_since_decision: 0,
            teleports_this_episode: 0,
            last_contact_ms: now_ms,
        }
    }
}

/// Where the engine sits in its decision cycle
#[derive(Debug, Clone, Copy)]
enum DecisionPhase {
    /// No action in flight; waiting for the trainer
    Awaiting,
    /// An action was applied; the physics is settling until the decision
    /// interval has elapsed
    Settling { since_ms: f64, prev_distance: f32 },
}

/// One combatant's row in the live status readout
#[derive(Debug, Clone, Copy, Default)]
pub struct CombatantDisplay {
    pub wins: u32,
    pub hp: f32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub angle: f32,
    pub angular_vel: f32,
    pub intent_linear: Vec2,
    pub intent_angular: f32,
}

/// Live status readout refreshed every tick
#[derive(Debug, Clone, Copy, Default)]
pub struct DisplayInfo {
    pub episode: u32,
    pub remaining_ms: f64,
    pub red: CombatantDisplay,
    pub blue: CombatantDisplay,
}

impl DisplayInfo {
    /// Win share of one side. NaN until any match has been decided, which the
    /// readout renders as a dash.
    pub fn win_ratio(&self, color: TeamColor) -> f32 {
        let total = (self.red.wins + self.blue.wins) as f32;
        let own = match color {
            TeamColor::Red => self.red.wins,
            TeamColor::Blue => self.blue.wins,
        } as f32;
        own / total
    }
}

/// Two-agent sword duel exposed as a training process
pub struct SwordDuelTrain {
    arena: Arena,
    reward_cfg: RewardConfig,
    train_cfg: TrainConfig,
    episode: u32,
    last_reset_ms: f64,
    stats: [SideStats; 2],
    wins: [u32; 2],
    winner: Option<TeamColor>,
    phase: DecisionPhase,
    pending_actions: Option<HashMap<String, ActionCommand>>,
    display: DisplayInfo,
}

impl SwordDuelTrain {
    pub fn new(cfg: &Config, seed: u64) -> Self {
        Self {
            arena: Arena::new(cfg.arena.clone(), seed),
            reward_cfg: cfg.reward.clone(),
            train_cfg: cfg.train.clone(),
            episode: 0,
            last_reset_ms: 0.0,
            stats: [SideStats::fresh(0.0); 2],
            wins: [0, 0],
            winner: None,
            phase: DecisionPhase::Awaiting,
            pending_actions: None,
            display: DisplayInfo::default(),
        }
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    pub fn episode(&self) -> u32 {
        self.episode
    }

    pub fn display(&self) -> &DisplayInfo {
        &self.display
    }

    fn elapsed_ms(&self, now_ms: f64) -> f64 {
        now_ms - self.last_reset_ms
    }

    /// Folds the arena's event stream into the per-side accumulators
    fn ingest_events(&mut self, now_ms: f64) {
        for event in self.arena.drain_events() {
            match event {
                ArenaEvent::Contact { a, b } => {
                    self.stats[a.index()].last_contact_ms = now_ms;
                    self.stats[b.index()].last_contact_ms = now_ms;
                }
                ArenaEvent::Attack {
                    attacker,
                    defender,
                    damage,
                } => {
                    self.stats[attacker.index()].damage_dealt += damage;
                    self.stats[attacker.index()].last_contact_ms = now_ms;
                    self.stats[defender.index()].damage_received += damage;
                    self.stats[defender.index()].last_contact_ms = now_ms;
                }
                ArenaEvent::Teleport { color } => {
                    let stats = &mut self.stats[color.index()];
                    stats.teleports_since_decision += 1;
                    stats.teleports_this_episode += 1;
                }
                ArenaEvent::Over { winner } => {
                    self.winner = Some(winner);
                    self.wins[winner.index()] += 1;
                    log::info!("Episode {} decided, {} wins", self.episode, winner);
                }
            }
        }
    }

    fn apply_actions(&mut self, actions: &HashMap<String, ActionCommand>) {
        for (key, command) in actions {
            match TeamColor::parse(key) {
                Some(color) => {
                    let linear = Vec2::new(command.linear[0], command.linear[1]);
                    self.arena.action_move(color, linear);
                    self.arena.action_rotate(color, command.angular);
                }
                None => log::debug!("Ignoring action for unknown color {key:?}"),
            }
        }
    }

    fn build_observation(&self, now_ms: f64) -> HashMap<String, Vec<f32>> {
        let (Some(red), Some(blue)) = (
            self.arena.observe(TeamColor::Red),
            self.arena.observe(TeamColor::Blue),
        ) else {
            return HashMap::new();
        };
        paired_observation(
            &red,
            &blue,
            self.arena.config(),
            self.elapsed_ms(now_ms),
            self.train_cfg.episode_timeout_ms,
        )
    }

    /// Closes the settling window: rewards, flags and a fresh observation
    fn complete_decision(&mut self, now_ms: f64, prev_distance: f32) -> StepData {
        let elapsed = self.elapsed_ms(now_ms);
        let timed_out = elapsed > self.train_cfg.episode_timeout_ms;
        let decided = self.winner.is_some();
        if decided || timed_out {
            self.arena.end_battle();
        }

        let current_distance = self.arena.distance_between_cores();
        let wrap_happened = self.stats.iter().any(|s| s.teleports_since_decision > 0);
        let reason = if decided {
            "win"
        } else if timed_out {
            "timeout"
        } else {
            "step"
        };

        let mut reward = HashMap::with_capacity(2);
        let mut termination = HashMap::with_capacity(2);
        let mut truncation = HashMap::with_capacity(2);
        let mut info = HashMap::with_capacity(2);
        for color in TeamColor::ALL {
            let stats = &self.stats[color.index()];
            let input = RewardInputs {
                episode: self.episode,
                damage_dealt: stats.damage_dealt,
                damage_received: stats.damage_received,
                teleports_since_decision: stats.teleports_since_decision,
                teleports_this_episode: stats.teleports_this_episode,
                approach_delta: prev_distance - current_distance,
                teleport_invalidates_approach: wrap_happened,
                last_contact_ms: stats.last_contact_ms,
                now_ms,
                elapsed_ms: elapsed,
                timeout_ms: self.train_cfg.episode_timeout_ms,
                decided,
                is_winner: self.winner == Some(color),
            };
            let key = color.as_str().to_string();
            reward.insert(key.clone(), shaped_reward(&self.reward_cfg, &input));
            termination.insert(key.clone(), decided);
            truncation.insert(key.clone(), timed_out);
            info.insert(key, StepInfo { reason });
        }

        for stats in &mut self.stats {
            stats.damage_dealt = 0.0;
            stats.damage_received = 0.0;
            stats.teleports_since_decision = 0;
        }

        StepData {
            observation: self.build_observation(now_ms),
            reward,
            termination,
            truncation,
            info,
        }
    }

    fn refresh_display(&mut self, now_ms: f64) {
        self.display.episode = self.episode;
        self.display.remaining_ms =
            (self.train_cfg.episode_timeout_ms - self.elapsed_ms(now_ms)).max(0.0);
        for color in TeamColor::ALL {
            let row = match color {
                TeamColor::Red => &mut self.display.red,
                TeamColor::Blue => &mut self.display.blue,
            };
            row.wins = self.wins[color.index()];
            if let Some(state) = self.arena.observe(color) {
                row.hp = state.hp;
                row.pos = state.pos;
                row.vel = state.vel;
                row.angle = state.angle;
                row.angular_vel = state.angular_vel;
            }
            if let Some(combatant) = self.arena.combatant(color) {
                row.intent_linear = combatant.intent.linear;
                row.intent_angular = combatant.intent.angular;
            }
        }
    }

    #[cfg(test)]
    fn declare_winner(&mut self, color: TeamColor) {
        self.winner = Some(color);
        self.wins[color.index()] += 1;
    }
}

impl TrainProcess for SwordDuelTrain {
    fn id(&self) -> &'static str {
        "sword-duel"
    }

    fn initialize(&mut self) {
        let _ = self.reset(0.0);
    }

    fn reset(&mut self, now_ms: f64) -> ResetData {
        self.episode += 1;
        self.last_reset_ms = now_ms;
        self.arena.reset_world();
        self.winner = None;
        self.phase = DecisionPhase::Awaiting;
        self.pending_actions = None;
        self.stats = [SideStats::fresh(now_ms); 2];
        log::debug!("Episode {} starts", self.episode);

        let mut info = HashMap::with_capacity(2);
        for color in TeamColor::ALL {
            info.insert(color.as_str().to_string(), StepInfo { reason: "reset" });
        }
        ResetData {
            observation: self.build_observation(now_ms),
            info,
        }
    }

    fn set_episode(&mut self, episode: u32) {
        self.episode = episode;
    }

    fn on_message(&mut self, msg: Inbound, _now_ms: f64) {
        if let Inbound::Action { actions } = msg {
            if self.pending_actions.is_some() {
                log::warn!("Action arrived before the previous decision completed");
            }
            self.pending_actions = Some(actions);
        }
    }

    fn tick(&mut self, now_ms: f64, dt_ms: f64, outbound: &mut Vec<Outbound>) {
        self.arena.on_tick(now_ms, dt_ms);
        self.ingest_events(now_ms);

        match self.phase {
            DecisionPhase::Awaiting => {
                if let Some(actions) = self.pending_actions.take() {
                    self.apply_actions(&actions);
                    self.phase = DecisionPhase::Settling {
                        since_ms: now_ms,
                        prev_distance: self.arena.distance_between_cores(),
                    };
                }
            }
            DecisionPhase::Settling {
                since_ms,
                prev_distance,
            } => {
                if now_ms - since_ms >= self.train_cfg.decision_interval_ms {
                    let data = self.complete_decision(now_ms, prev_distance);
                    outbound.push(Outbound::Step { data });
                    self.phase = DecisionPhase::Awaiting;
                }
            }
        }

        self.refresh_display(now_ms);
    }

    fn save(&self) -> SaveData {
        SaveData {
            episode: self.episode,
            colors: TeamColor::ALL
                .iter()
                .map(|c| c.as_str().to_string())
                .collect(),
            wins: self.wins.to_vec(),
        }
    }

    fn load(&mut self, data: SaveData) {
        self.episode = data.episode;
        for (color, wins) in data.colors.iter().zip(&data.wins) {
            match TeamColor::parse(color) {
                Some(color) => self.wins[color.index()] = *wins,
                None => log::warn!("Ignoring saved wins for unknown color {color:?}"),
            }
        }
        log::info!(
            "Restored training state: episode {}, wins {:?}",
            self.episode,
            self.wins
        );
    }

    fn render(&self, frame: &mut PixelFrame) {
        ArenaRenderer::render(&self.arena, frame);
    }
}
