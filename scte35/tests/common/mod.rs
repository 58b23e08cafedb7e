// SPDX-FileCopyrightText: 2025 Contributors to the SCTE-35 Inserter project.
// SPDX-License-Identifier: Apache-2.0

//! In-memory engine used by the integration tests.
//!
//! Time is virtual: [`MockEngine::fire_next`] jumps the clock to the deadline
//! of the pending timer and hands control back to the test, which then calls
//! the controller's timer callback, just like the real main loop would.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::time::Duration;

use scte35::{EngineState, Error, Result, SpliceEngine, SpliceIntent};

/// Ensures logging is initialized only once across all tests.
static LOG_ONCE: std::sync::Once = std::sync::Once::new();

pub fn setup_logging() {
    LOG_ONCE.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::builder()
                    .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
                    .from_env_lossy(),
            )
            .with_test_writer()
            .init();
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerId(pub u64);

#[derive(Debug, Clone)]
pub struct CarriedSection {
    pub at: Duration,
    pub pid: u16,
    pub intent: SpliceIntent,
    /// Wire image of `intent`.
    pub bytes: Vec<u8>,
}

#[derive(Default)]
pub struct MockEngine {
    now: Cell<Duration>,
    next_timer: Cell<u64>,
    /// Pending timers: id and absolute deadline.
    pending: RefCell<Vec<(TimerId, Duration)>>,
    pub armed_total: Cell<usize>,
    pub disarmed: RefCell<Vec<TimerId>>,
    pub sections: RefCell<Vec<CarriedSection>>,
    pub states: RefCell<Vec<EngineState>>,
    /// Position reported by the engine; `None` makes queries fail.
    pub position: Cell<Option<Duration>>,
    /// Follow the virtual clock instead of `position`.
    pub position_follows_clock: Cell<bool>,
    pub fail_carrier: Cell<bool>,
    /// State changes to this state fail.
    pub fail_state: Cell<Option<EngineState>>,
}

impl MockEngine {
    pub fn new() -> Self {
        let engine = MockEngine::default();
        engine.position_follows_clock.set(true);
        engine
    }

    pub fn now(&self) -> Duration {
        self.now.get()
    }

    pub fn pending_timers(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Advances the clock to the earliest pending timer and consumes it.
    pub fn fire_next(&self) -> Option<TimerId> {
        let mut pending = self.pending.borrow_mut();
        let index = pending
            .iter()
            .enumerate()
            .min_by_key(|(_, (_, deadline))| *deadline)
            .map(|(index, _)| index)?;
        let (id, deadline) = pending.remove(index);
        self.now.set(deadline);
        Some(id)
    }
}

impl SpliceEngine for MockEngine {
    type Timer = TimerId;

    fn query_position(&self) -> Option<Duration> {
        if self.position_follows_clock.get() {
            Some(self.now.get())
        } else {
            self.position.get()
        }
    }

    fn carry_section(&self, intent: &SpliceIntent, pid: u16) -> Result<()> {
        if self.fail_carrier.get() {
            return Err(Error::Carrier("mux rejected the section".into()));
        }
        self.sections.borrow_mut().push(CarriedSection {
            at: self.now.get(),
            pid,
            intent: intent.clone(),
            bytes: scte35::section::encode(intent),
        });
        Ok(())
    }

    fn arm_timer(&self, delay: Duration) -> TimerId {
        let id = TimerId(self.next_timer.get());
        self.next_timer.set(id.0 + 1);
        self.pending
            .borrow_mut()
            .push((id, self.now.get() + delay));
        self.armed_total.set(self.armed_total.get() + 1);
        id
    }

    fn disarm_timer(&self, timer: TimerId) {
        self.pending.borrow_mut().retain(|(id, _)| *id != timer);
        self.disarmed.borrow_mut().push(timer);
    }

    fn set_state(&self, state: EngineState) -> Result<()> {
        self.states.borrow_mut().push(state);
        if self.fail_state.get() == Some(state) {
            return Err(Error::StateChange(state));
        }
        Ok(())
    }
}

/// Decoded fields of an emitted splice_insert section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSplice {
    pub event_id: u32,
    pub out_of_network: bool,
    pub immediate: bool,
    pub splice_time: Option<u64>,
    pub duration: Option<(bool, u64)>,
    pub unique_program_id: u16,
}

fn read_33(bytes: &[u8]) -> u64 {
    ((bytes[0] as u64 & 0x01) << 32)
        | (bytes[1] as u64) << 24
        | (bytes[2] as u64) << 16
        | (bytes[3] as u64) << 8
        | bytes[4] as u64
}

/// Minimal splice_insert reader for assertions.
pub fn decode_splice_insert(section: &[u8]) -> DecodedSplice {
    assert_eq!(section[0], 0xFC, "table_id");
    assert_eq!(section[13], 0x05, "splice_command_type");
    assert_eq!(scte35::section::crc32_mpeg2(section), 0, "CRC_32");

    let body = &section[14..];
    let event_id = u32::from_be_bytes([body[0], body[1], body[2], body[3]]);
    let flags = body[5];
    let out_of_network = flags & 0x80 != 0;
    let has_duration = flags & 0x20 != 0;
    let immediate = flags & 0x10 != 0;

    let mut offset = 6;
    let splice_time = if immediate {
        None
    } else {
        let time = read_33(&body[offset..offset + 5]);
        offset += 5;
        Some(time)
    };
    let duration = if has_duration {
        let auto_return = body[offset] & 0x80 != 0;
        let duration = read_33(&body[offset..offset + 5]);
        offset += 5;
        Some((auto_return, duration))
    } else {
        None
    };
    let unique_program_id = u16::from_be_bytes([body[offset], body[offset + 1]]);

    DecodedSplice {
        event_id,
        out_of_network,
        immediate,
        splice_time,
        duration,
        unique_program_id,
    }
}
