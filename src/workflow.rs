//! The headless training workflow
//!
//! One loop interleaves the three independent clocks: excite a virtual tick
//! (simulation plus trainer message routing), render the resulting state, and
//! capture exactly one frame. The loop never outruns the recording and never
//! skips a tick's frame.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::excite::FixedFrameExcitation;
use crate::record::Recorder;
use crate::render::PixelFrame;
use crate::train::TrainManager;

/// Remote stop switch for a running workflow
#[derive(Clone)]
pub struct WorkflowHandle {
    running: Arc<AtomicBool>,
}

impl WorkflowHandle {
    /// Stops the loop after the current tick completes
    pub fn end(&self) {
        self.running.store(false, Ordering::Relaxed);
    }
}

/// Drives the tick/render/capture loop to completion
pub struct TrainWorkflow {
    manager: Rc<RefCell<TrainManager>>,
    excitation: FixedFrameExcitation,
    frame: PixelFrame,
    recorder: Recorder,
    running: Arc<AtomicBool>,
}

impl TrainWorkflow {
    /// The manager must already be registered with the excitation source.
    pub fn new(
        manager: Rc<RefCell<TrainManager>>,
        excitation: FixedFrameExcitation,
        frame: PixelFrame,
        recorder: Recorder,
    ) -> Self {
        Self {
            manager,
            excitation,
            frame,
            recorder,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn handle(&self) -> WorkflowHandle {
        WorkflowHandle {
            running: self.running.clone(),
        }
    }

    /// Runs until the handle ends it or `max_ticks` elapse
    pub fn run(&mut self, max_ticks: Option<u64>) -> Result<u64> {
        self.running.store(true, Ordering::Relaxed);
        let mut ticks = 0u64;

        while self.running.load(Ordering::Relaxed) {
            // The tick fully completes (messages routed, physics stepped,
            // steps flushed) before anything is drawn
            self.excitation.tick();
            self.manager.borrow().render(&mut self.frame);
            self.recorder
                .capture(&self.frame)
                .context("Frame capture failed")?;

            ticks += 1;
            if let Some(max) = max_ticks {
                if ticks >= max {
                    break;
                }
            }
        }

        self.recorder.finish().context("Recorder shutdown failed")?;
        log::info!("Workflow finished after {ticks} ticks");
        Ok(ticks)
    }
}
