// SPDX-FileCopyrightText: 2025 Contributors to the SCTE-35 Inserter project.
// SPDX-License-Identifier: Apache-2.0

//! Glue between the engine's main loop and the scheduler / health monitor.

use tracing::{debug, error, info};

use crate::intent::SpliceIntent;
use crate::{
    EngineMessage, EngineState, HealthAction, HealthMonitor, SpliceEngine, SpliceScheduler,
    SpliceSettings,
};

/// Per-pipeline splice controller.
///
/// The engine binding registers this as the target of its status channel
/// ([`on_engine_message`](Self::on_engine_message)) and of the timers it arms
/// ([`on_timer`](Self::on_timer)). Both are delivered on the same loop, so the
/// controller is never entered concurrently.
pub struct SpliceController<E: SpliceEngine> {
    engine: E,
    scheduler: SpliceScheduler<E::Timer>,
    health: HealthMonitor,
}

impl<E: SpliceEngine> SpliceController<E> {
    pub fn new(engine: E, settings: SpliceSettings) -> Self {
        SpliceController {
            engine,
            scheduler: SpliceScheduler::new(settings),
            health: HealthMonitor::new(),
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn scheduler(&self) -> &SpliceScheduler<E::Timer> {
        &self.scheduler
    }

    pub fn health(&self) -> &HealthMonitor {
        &self.health
    }

    pub fn on_engine_message(&mut self, message: &EngineMessage) {
        match self.health.observe(message) {
            HealthAction::StartSchedule => self.start(),
            HealthAction::Shutdown => {
                self.scheduler.halt(&self.engine);
                if let Err(err) = self.engine.set_state(EngineState::Null) {
                    error!("{}", err);
                }
            }
            HealthAction::RecoverClock => {
                // Failure is logged and recorded by the monitor.
                let _ = self.health.recover_clock(&self.engine);
            }
            HealthAction::Nothing => {}
        }
    }

    /// Timer callback: emits the due cue and re-arms.
    pub fn on_timer(&mut self) -> Option<SpliceIntent> {
        self.scheduler.on_timer(&self.engine)
    }

    /// Disarms the pending timer; later callbacks become no-ops.
    ///
    /// Must run before the engine releases the resources the timer and
    /// position query refer to.
    pub fn shutdown(&mut self) {
        self.scheduler.halt(&self.engine);
    }

    fn start(&mut self) {
        if self.scheduler.is_started() {
            debug!("Pipeline playing again, splice schedule already running");
            return;
        }

        match self.engine.query_position() {
            Some(position) => info!("Play started at position {:?}", position),
            None => info!("Play started, position unknown"),
        }
        self.scheduler.start(&self.engine);
    }
}
