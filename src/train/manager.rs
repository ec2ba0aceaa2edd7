//! Training process registry and trainer message routing
//!
//! The manager is the single [`Tickable`] the excitation source drives: each
//! tick it drains pending trainer messages, routes the control ones itself,
//! forwards the rest to the active process, then lets the process advance and
//! flushes whatever it produced back over the bridge.

use std::collections::HashMap;

use crate::bridge::protocol::{Inbound, Outbound, ResetData, SaveData};
use crate::bridge::SocketBridge;
use crate::excite::Tickable;
use crate::render::PixelFrame;

/// One registered training engine
pub trait TrainProcess {
    /// Stable identifier used for registry lookup
    fn id(&self) -> &'static str;

    /// One-time setup after registration; runs the first world reset
    fn initialize(&mut self);

    /// Start a fresh episode and return the initial observations
    fn reset(&mut self, now_ms: f64) -> ResetData;

    /// Overwrite the episode counter
    fn set_episode(&mut self, episode: u32);

    /// Non-control trainer messages (actions)
    fn on_message(&mut self, msg: Inbound, now_ms: f64);

    /// Advance one simulation tick; completed decision steps are pushed into
    /// `outbound`
    fn tick(&mut self, now_ms: f64, dt_ms: f64, outbound: &mut Vec<Outbound>);

    /// Snapshot the persistent cross-episode statistics
    fn save(&self) -> SaveData;

    /// Restore a statistics snapshot
    fn load(&mut self, data: SaveData);

    /// Draw the current world state
    fn render(&self, frame: &mut PixelFrame);
}

/// Owns the registered processes and the trainer connection
pub struct TrainManager {
    bridge: Option<SocketBridge>,
    processes: HashMap<&'static str, Box<dyn TrainProcess>>,
    active: Option<&'static str>,
    outbound: Vec<Outbound>,
}

impl TrainManager {
    /// A manager without a bridge runs the simulation standalone; every
    /// outbound payload is dropped.
    pub fn new(bridge: Option<SocketBridge>) -> Self {
        Self {
            bridge,
            processes: HashMap::new(),
            active: None,
            outbound: Vec::new(),
        }
    }

    /// Register a process. The first one registered becomes active.
    pub fn add(&mut self, mut process: Box<dyn TrainProcess>) {
        process.initialize();
        let id = process.id();
        if self.active.is_none() {
            self.active = Some(id);
        }
        if self.processes.insert(id, process).is_some() {
            log::warn!("Replaced already-registered train process {id:?}");
        }
    }

    /// Switch the active process. Returns false for an unknown id.
    pub fn change_to(&mut self, id: &str) -> bool {
        match self.processes.get_key_value(id) {
            Some((&key, _)) => {
                self.active = Some(key);
                true
            }
            None => {
                log::error!("Unknown train process {id:?}");
                false
            }
        }
    }

    pub fn active(&self) -> Option<&dyn TrainProcess> {
        self.active
            .and_then(|id| self.processes.get(id))
            .map(|p| p.as_ref())
    }

    fn active_mut(&mut self) -> Option<&mut Box<dyn TrainProcess>> {
        let id = self.active?;
        self.processes.get_mut(id)
    }

    pub fn is_connected(&self) -> bool {
        self.bridge.is_some()
    }

    /// Draw the active process's world
    pub fn render(&self, frame: &mut PixelFrame) {
        if let Some(process) = self.active() {
            process.render(frame);
        }
    }

    fn reply(&mut self, msg: Outbound) {
        if let Some(bridge) = &self.bridge {
            if let Err(e) = bridge.send(&msg) {
                log::error!("Failed to queue trainer reply: {e}");
            }
        }
    }

    fn route(&mut self, msg: Inbound, now_ms: f64) {
        if self.active.is_none() {
            log::error!("Trainer message arrived with no active train process");
            return;
        }
        match msg {
            Inbound::Reset => {
                let data = self.active_mut().map(|p| p.reset(now_ms));
                self.reply(Outbound::Reset { data });
            }
            Inbound::ResetEpisode => {
                if let Some(process) = self.active_mut() {
                    process.set_episode(0);
                }
                self.reply(Outbound::ResetEpisode { status: "success" });
            }
            Inbound::Save => {
                if let Some(data) = self.active().map(|p| p.save()) {
                    self.reply(Outbound::Save { data });
                }
            }
            Inbound::Load { data } => {
                if let Some(process) = self.active_mut() {
                    process.load(data);
                }
                self.reply(Outbound::Load { status: "success" });
            }
            other => {
                if let Some(process) = self.active_mut() {
                    process.on_message(other, now_ms);
                }
            }
        }
    }
}

impl Tickable for TrainManager {
    fn tick(&mut self, now_ms: f64, dt_ms: f64) {
        // Route trainer messages first so actions land before the step
        let mut pending = Vec::new();
        if let Some(bridge) = &self.bridge {
            while let Some(msg) = bridge.try_recv() {
                pending.push(msg);
            }
        }
        for msg in pending {
            self.route(msg, now_ms);
        }

        let mut outbound = std::mem::take(&mut self.outbound);
        if let Some(process) = self.active_mut() {
            process.tick(now_ms, dt_ms, &mut outbound);
        }
        for msg in outbound.drain(..) {
            self.reply(msg);
        }
        self.outbound = outbound;
    }
}
