// SPDX-FileCopyrightText: 2025 Contributors to the SCTE-35 Inserter project.
// SPDX-License-Identifier: Apache-2.0

//! Splice Scheduler: the timed splice-out / splice-in state machine.
//!
//! ```text
//!            start()                    timer (auto-return off)
//!   Idle ─────────────► AwaitingOut ──────────────────────────► AwaitingIn
//!          arm(interval)    ▲  │  emit OUT, arm(duration)            │
//!                           │  │                                     │
//!                           │  └─ timer (auto-return on) ─┐          │
//!                           │     emit OUT,               │          │
//!                           │     arm(interval+duration) ◄┘          │
//!                           └────────────────────────────────────────┘
//!                                emit IN, arm(interval)
//! ```
//!
//! Exactly one timer is pending at any time. A firing timer's handle is
//! consumed before the next one is armed, so callbacks never overlap and
//! the identifiers need no locking.

use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::intent::{SpliceIds, SpliceIntent, SpliceType};
use crate::{SpliceEngine, SpliceSettings};

/// Which cue the next timer expiry emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpliceMode {
    AwaitingOut,
    AwaitingIn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Constructed, waiting for the pipeline to play.
    Idle,
    Running,
    /// Halted for good (end of stream or teardown).
    Halted,
}

/// Mutable state owned by the scheduler.
struct SpliceState<T> {
    ids: SpliceIds,
    mode: SpliceMode,
    armed: Option<T>,
}

/// Drives splice emissions for one pipeline.
///
/// `T` is the engine's timer handle type.
pub struct SpliceScheduler<T> {
    settings: SpliceSettings,
    state: SpliceState<T>,
    phase: Phase,
    /// Last position the engine reported, used when a query fails.
    last_position: Duration,
}

impl<T> SpliceScheduler<T> {
    pub fn new(settings: SpliceSettings) -> Self {
        SpliceScheduler {
            settings,
            state: SpliceState {
                ids: SpliceIds::default(),
                mode: SpliceMode::AwaitingOut,
                armed: None,
            },
            phase: Phase::Idle,
            last_position: Duration::ZERO,
        }
    }

    pub fn settings(&self) -> &SpliceSettings {
        &self.settings
    }

    pub fn mode(&self) -> SpliceMode {
        self.state.mode
    }

    /// True once [`start`](Self::start) has armed the first timer.
    pub fn is_started(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn is_halted(&self) -> bool {
        self.phase == Phase::Halted
    }

    pub fn is_armed(&self) -> bool {
        self.state.armed.is_some()
    }

    /// Arms the first splice-out timer.
    ///
    /// Only the first call has an effect; returns `false` when the scheduler
    /// was already started (or halted) so repeated "playing" transitions do
    /// not stack timers.
    pub fn start<E>(&mut self, engine: &E) -> bool
    where
        E: SpliceEngine<Timer = T>,
    {
        if self.phase != Phase::Idle {
            return false;
        }

        self.phase = Phase::Running;
        self.state.mode = SpliceMode::AwaitingOut;
        self.arm(engine, self.settings.interval);
        info!(
            "Splice schedule started, first splice-out in {:?}",
            self.settings.interval
        );
        true
    }

    /// Handles expiry of the pending timer: emits the due cue and re-arms.
    ///
    /// Returns the emitted intent, or `None` when the scheduler is not
    /// running (a late callback after halt is a no-op).
    pub fn on_timer<E>(&mut self, engine: &E) -> Option<SpliceIntent>
    where
        E: SpliceEngine<Timer = T>,
    {
        // The firing timer is done; its handle must not be disarmed later.
        self.state.armed = None;

        if self.phase != Phase::Running {
            debug!("Splice timer fired while {:?}, ignoring", self.phase);
            return None;
        }

        let intent = match self.state.mode {
            SpliceMode::AwaitingOut => {
                let intent = self.emit(engine, SpliceType::Out);
                if self.settings.auto_return {
                    let Some(period) = self.settings.interval.checked_add(self.settings.duration)
                    else {
                        error!(
                            "Splice period {:?} + {:?} overflows, stopping the schedule",
                            self.settings.interval, self.settings.duration
                        );
                        self.phase = Phase::Halted;
                        return Some(intent);
                    };
                    self.arm(engine, period);
                } else {
                    self.state.mode = SpliceMode::AwaitingIn;
                    self.arm(engine, self.settings.duration);
                }
                intent
            }
            SpliceMode::AwaitingIn => {
                let intent = self.emit(engine, SpliceType::In);
                self.state.mode = SpliceMode::AwaitingOut;
                self.arm(engine, self.settings.interval);
                intent
            }
        };

        Some(intent)
    }

    /// Stops scheduling for good, disarming the pending timer if any.
    pub fn halt<E>(&mut self, engine: &E)
    where
        E: SpliceEngine<Timer = T>,
    {
        if let Some(timer) = self.state.armed.take() {
            engine.disarm_timer(timer);
        }
        if self.phase != Phase::Halted {
            debug!("Splice schedule halted");
        }
        self.phase = Phase::Halted;
    }

    fn arm<E>(&mut self, engine: &E, delay: Duration)
    where
        E: SpliceEngine<Timer = T>,
    {
        if let Some(previous) = self.state.armed.take() {
            engine.disarm_timer(previous);
        }
        self.state.armed = Some(engine.arm_timer(delay));
    }

    fn emit<E>(&mut self, engine: &E, splice_type: SpliceType) -> SpliceIntent
    where
        E: SpliceEngine<Timer = T>,
    {
        let position = match engine.query_position() {
            Some(position) => {
                self.last_position = position;
                position
            }
            None => {
                warn!(
                    "Could not query current position, using last known {:?}",
                    self.last_position
                );
                self.last_position
            }
        };

        let intent = SpliceIntent::new(splice_type, &mut self.state.ids, position, &self.settings);
        info!(
            "Sending SCTE-35 splice {} at position {:?}: event {}, program {}",
            splice_type, position, intent.event_id, intent.unique_program_id
        );

        if let Err(err) = engine.carry_section(&intent, self.settings.pid) {
            warn!("Splice {} event {} not delivered: {}", splice_type, intent.event_id, err);
        }

        intent
    }
}
