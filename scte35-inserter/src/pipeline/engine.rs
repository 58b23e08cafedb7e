// SPDX-FileCopyrightText: 2025 Contributors to the SCTE-35 Inserter project.
// SPDX-License-Identifier: Apache-2.0

//! [`SpliceEngine`] backed by a GStreamer pipeline and the GLib main loop.
//!
//! Timers are GLib timeout sources on the thread-default main context, the
//! same context the bus watch is dispatched on. The engine only keeps a weak
//! reference to the controller that owns it; a timer that outlives the
//! controller does nothing.

use std::cell::RefCell;
use std::rc::Weak;
use std::time::Duration;

use gst::prelude::*;
use gstreamer as gst;
use scte35::{EngineState, SpliceController, SpliceEngine, SpliceIntent};
use tracing::error;

use crate::carrier::SectionCarrier;
use crate::pipeline::messages::gst_state;

pub type Controller = SpliceController<PipelineEngine>;

pub struct PipelineEngine {
    pipeline: gst::Pipeline,
    /// Element whose running time positions splices (the TS parser).
    position_source: gst::Element,
    mux: gst::Element,
    carrier: SectionCarrier,
    controller: Weak<RefCell<Controller>>,
}

impl PipelineEngine {
    pub fn new(
        pipeline: gst::Pipeline,
        position_source: gst::Element,
        mux: gst::Element,
        carrier: SectionCarrier,
        controller: Weak<RefCell<Controller>>,
    ) -> Self {
        PipelineEngine {
            pipeline,
            position_source,
            mux,
            carrier,
            controller,
        }
    }
}

impl SpliceEngine for PipelineEngine {
    type Timer = glib::SourceId;

    /// Running time of the TS parser: the time domain the multiplexer
    /// translates splice times from.
    fn query_position(&self) -> Option<Duration> {
        self.position_source
            .current_running_time()
            .map(|position| Duration::from_nanos(position.nseconds()))
    }

    fn carry_section(&self, intent: &SpliceIntent, pid: u16) -> scte35::Result<()> {
        self.carrier.send(intent, pid, &self.mux)
    }

    fn arm_timer(&self, delay: Duration) -> glib::SourceId {
        let controller = self.controller.clone();
        glib::timeout_add_local_once(delay, move || {
            let Some(controller) = controller.upgrade() else {
                return;
            };
            match controller.try_borrow_mut() {
                Ok(mut controller) => {
                    controller.on_timer();
                }
                Err(_) => error!("Splice controller busy, timer expiry dropped"),
            }
        })
    }

    fn disarm_timer(&self, timer: glib::SourceId) {
        // Looked up rather than removed blindly: removing a source that is
        // already gone is a GLib critical.
        if let Some(source) = glib::MainContext::ref_thread_default().find_source_by_id(&timer) {
            source.destroy();
        }
    }

    fn set_state(&self, state: EngineState) -> scte35::Result<()> {
        self.pipeline
            .set_state(gst_state(state))
            .map(|_| ())
            .map_err(|_| scte35::Error::StateChange(state))
    }
}
