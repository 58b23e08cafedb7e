// SPDX-FileCopyrightText: 2025 Contributors to the SCTE-35 Inserter project.
// SPDX-License-Identifier: Apache-2.0

//! The media engine surface consumed by the scheduler and the health monitor.

use std::fmt;
use std::time::Duration;

use crate::{Result, SpliceIntent};

/// Pipeline-wide state as reported by (and requested from) the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Null,
    Ready,
    Paused,
    Playing,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EngineState::Null => "NULL",
            EngineState::Ready => "READY",
            EngineState::Paused => "PAUSED",
            EngineState::Playing => "PLAYING",
        };
        f.write_str(name)
    }
}

/// Operations the splice controller needs from the media engine.
///
/// All methods are called from the engine's main loop, never concurrently,
/// so implementations are free to use single-threaded interior mutability.
///
/// # Timers
///
/// [`arm_timer`](SpliceEngine::arm_timer) schedules a one-shot callback on the
/// same loop that delivers engine messages. When it fires the implementation
/// must call [`SpliceController::on_timer`](crate::SpliceController::on_timer).
/// A timer that already fired is simply dropped by the controller; only timers
/// that are still pending are passed to
/// [`disarm_timer`](SpliceEngine::disarm_timer).
pub trait SpliceEngine {
    /// Handle to a pending one-shot timer.
    type Timer;

    /// Current output-side presentation position, or `None` if the engine
    /// cannot answer right now (not prerolled, already torn down, ...).
    fn query_position(&self) -> Option<Duration>;

    /// Serializes `intent` with the engine's section encoder and carries the
    /// resulting `splice_info_section` into the multiplexer on `pid`.
    ///
    /// The intent's times are 90 kHz ticks of the positions this engine
    /// reported, so the encoder can map them into the output's PTS domain.
    fn carry_section(&self, intent: &SpliceIntent, pid: u16) -> Result<()>;

    /// Schedules a one-shot timer `delay` from now.
    fn arm_timer(&self, delay: Duration) -> Self::Timer;

    /// Cancels a timer that has not fired yet.
    fn disarm_timer(&self, timer: Self::Timer);

    /// Requests a pipeline-wide state change.
    fn set_state(&self, state: EngineState) -> Result<()>;
}
