// SPDX-FileCopyrightText: 2025 Contributors to the SCTE-35 Inserter project.
// SPDX-License-Identifier: Apache-2.0

//! Pipeline Health Monitor.
//!
//! Classifies messages from the engine's status channel into the few things
//! the controller acts on. Only three of them have consequences:
//!
//! - the whole pipeline reaching PLAYING starts the splice schedule,
//! - end-of-stream stops it and tears the pipeline down to NULL,
//! - a lost clock gets one PAUSED → PLAYING restart attempt. After the first
//!   failed attempt recovery is never tried again.
//!
//! Errors are logged with the reporting element and left alone.

use tracing::{error, info, warn};

use crate::{EngineState, SpliceEngine};

/// Engine status message, already stripped of engine-specific types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineMessage {
    StateChanged {
        /// The message comes from the top-level pipeline, not a child element.
        pipeline: bool,
        old: EngineState,
        current: EngineState,
    },
    Error {
        source: String,
        message: String,
        debug: Option<String>,
    },
    EndOfStream,
    NewClock,
    ClockLost,
}

/// What the controller has to do in response to a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthAction {
    StartSchedule,
    Shutdown,
    RecoverClock,
    Nothing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClockRecovery {
    Available,
    Exhausted,
}

/// Tracks pipeline health across status messages.
#[derive(Debug)]
pub struct HealthMonitor {
    clock_recovery: ClockRecovery,
    eos: bool,
}

impl Default for HealthMonitor {
    fn default() -> Self {
        HealthMonitor {
            clock_recovery: ClockRecovery::Available,
            eos: false,
        }
    }
}

impl HealthMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once end-of-stream was observed.
    pub fn is_eos(&self) -> bool {
        self.eos
    }

    /// False after a clock recovery attempt failed.
    pub fn can_recover_clock(&self) -> bool {
        self.clock_recovery == ClockRecovery::Available
    }

    /// Logs `message` and decides the resulting action.
    pub fn observe(&mut self, message: &EngineMessage) -> HealthAction {
        match message {
            EngineMessage::StateChanged {
                pipeline: true,
                old,
                current,
            } => {
                info!("Pipeline state changed {} -> {}", old, current);
                if *current == EngineState::Playing && !self.eos {
                    HealthAction::StartSchedule
                } else {
                    HealthAction::Nothing
                }
            }
            EngineMessage::StateChanged { pipeline: false, .. } => HealthAction::Nothing,
            EngineMessage::Error {
                source,
                message,
                debug: debug_info,
            } => {
                error!("ERROR from element {}: {}", source, message);
                error!("Debugging info: {}", debug_info.as_deref().unwrap_or("none"));
                HealthAction::Nothing
            }
            EngineMessage::EndOfStream => {
                info!("EOS received");
                self.eos = true;
                HealthAction::Shutdown
            }
            EngineMessage::NewClock => {
                info!("New pipeline clock");
                HealthAction::Nothing
            }
            EngineMessage::ClockLost => match self.clock_recovery {
                ClockRecovery::Available => {
                    warn!("Clock lost, restarting pipeline");
                    HealthAction::RecoverClock
                }
                ClockRecovery::Exhausted => {
                    warn!("Clock lost, recovery already failed once, not retrying");
                    HealthAction::Nothing
                }
            },
        }
    }

    /// Performs the single PAUSED → PLAYING restart for a lost clock.
    ///
    /// On failure recovery is marked as exhausted and the error is returned.
    pub fn recover_clock<E: SpliceEngine>(&mut self, engine: &E) -> crate::Result<()> {
        let result = engine
            .set_state(EngineState::Paused)
            .and_then(|_| engine.set_state(EngineState::Playing));

        if let Err(err) = &result {
            error!("Unable to restart the pipeline: {}", err);
            self.clock_recovery = ClockRecovery::Exhausted;
        }
        result
    }
}
