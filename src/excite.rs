//! Tick excitation sources
//!
//! Everything that advances with time implements [`Tickable`] and registers
//! with an excitation source. [`FixedFrameExcitation`] runs a virtual clock
//! that advances a constant amount per tick regardless of wall time, so
//! headless training is deterministic and as fast as the host allows.
//! [`RealtimeExcitation`] follows the wall clock for interactive runs.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

/// A consumer of simulated time
pub trait Tickable {
    fn tick(&mut self, now_ms: f64, dt_ms: f64);
}

/// Shared registration handle for tick targets
pub type SharedTickable = Rc<RefCell<dyn Tickable>>;

/// Fixed virtual-clock excitation: every tick advances exactly `interval_ms`
pub struct FixedFrameExcitation {
    targets: Vec<SharedTickable>,
    now_ms: f64,
    interval_ms: f64,
}

impl FixedFrameExcitation {
    pub fn new(interval_ms: f64) -> Self {
        Self {
            targets: Vec::new(),
            now_ms: 0.0,
            interval_ms,
        }
    }

    /// 60 virtual frames per simulated second
    pub fn sixty_fps() -> Self {
        Self::new(1000.0 / 60.0)
    }

    pub fn excite(&mut self, target: SharedTickable) {
        self.targets.push(target);
    }

    pub fn unexcite(&mut self, target: &SharedTickable) {
        self.targets.retain(|t| !Rc::ptr_eq(t, target));
    }

    pub fn now_ms(&self) -> f64 {
        self.now_ms
    }

    /// Drives every target once, then advances the virtual clock
    pub fn tick(&mut self) {
        let now = self.now_ms;
        for target in &self.targets {
            target.borrow_mut().tick(now, self.interval_ms);
        }
        self.now_ms += self.interval_ms;
    }
}

/// Wall-clock excitation for interactive runs; `pump` is called from the
/// host's frame loop and forwards the measured frame delta
pub struct RealtimeExcitation {
    targets: Vec<SharedTickable>,
    start: Instant,
    last_ms: f64,
}

impl RealtimeExcitation {
    pub fn new() -> Self {
        Self {
            targets: Vec::new(),
            start: Instant::now(),
            last_ms: 0.0,
        }
    }

    pub fn excite(&mut self, target: SharedTickable) {
        self.targets.push(target);
    }

    pub fn unexcite(&mut self, target: &SharedTickable) {
        self.targets.retain(|t| !Rc::ptr_eq(t, target));
    }

    pub fn now_ms(&self) -> f64 {
        self.last_ms
    }

    pub fn pump(&mut self) {
        let now = self.start.elapsed().as_secs_f64() * 1000.0;
        let dt = now - self.last_ms;
        self.last_ms = now;
        for target in &self.targets {
            target.borrow_mut().tick(now, dt);
        }
    }
}

impl Default for RealtimeExcitation {
    fn default() -> Self {
        Self::new()
    }
}
