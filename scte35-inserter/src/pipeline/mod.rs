// SPDX-FileCopyrightText: 2025 Contributors to the SCTE-35 Inserter project.
// SPDX-License-Identifier: Apache-2.0

//! The inserter pipeline.
//!
//! [`Inserter`] owns the GStreamer pipeline and wires it to the engine
//! independent parts of the [`scte35`] crate:
//!
//! - the demuxer's `pad-added` signal feeds a [`TopologyBuilder`], guarded by
//!   its own mutex because the signal is emitted on a streaming thread;
//! - the pipeline bus feeds the [`SpliceController`](scte35::SpliceController)
//!   through a main-loop-local watch;
//! - the controller arms its timers on the same main loop.
//!
//! ## Teardown
//!
//! Dropping the inserter halts the splice schedule (removing the pending
//! timer), removes the bus watch and the `pad-added` handler and only then
//! sets the pipeline to NULL.

mod elements;
mod engine;
mod linker;
mod messages;

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::{Arc, LazyLock, Mutex};

use gst::prelude::*;
use gstreamer as gst;
use scte35::{ElementRole, EngineMessage, PipelineConfig, SpliceController, TopologyBuilder};
use tracing::{error, info, warn};

pub use elements::{Elements, SOURCE_BUFFER_SIZE, factory_name};
pub use engine::{Controller, PipelineEngine};
pub use linker::{GstLinker, fingerprint_from_caps};
pub use messages::{engine_state, gst_state, to_engine_message};

use crate::carrier::SectionCarrier;
use crate::{Error, Result};

/// GStreamer debug category for graph operations.
///
/// Set `GST_DEBUG=scte35inserter:5` to see them.
pub(crate) static CAT: LazyLock<gst::DebugCategory> = LazyLock::new(|| {
    gst::DebugCategory::new(
        "scte35inserter",
        gst::DebugColorFlags::empty(),
        Some("SCTE-35 inserter"),
    )
});

pub const PIPELINE_NAME: &str = "scte35-insert-pipeline";

type Topology = Arc<Mutex<TopologyBuilder<GstLinker>>>;

pub struct Inserter {
    pipeline: gst::Pipeline,
    demux: gst::Element,
    controller: Rc<RefCell<Controller>>,
    bus_watch: Option<gst::bus::BusWatchGuard>,
    pad_added: Option<glib::SignalHandlerId>,
}

impl Inserter {
    /// Builds the pipeline for `config` in the NULL state.
    ///
    /// `main_loop` is quit when the stream ends. GStreamer must be
    /// initialized and the calling thread must own the default main context.
    ///
    /// # Errors
    ///
    /// Fails if an element is missing, the static graph cannot be linked or
    /// `libgstmpegts-1.0` cannot be loaded.
    pub fn new(config: &PipelineConfig, main_loop: &glib::MainLoop) -> Result<Self> {
        let carrier = SectionCarrier::load()?;
        let elements = Elements::build(config)?;

        let pipeline = gst::Pipeline::with_name(PIPELINE_NAME);
        elements.add_to(&pipeline)?;
        elements.link_static()?;

        let demux = elements.get(ElementRole::TsDemux)?.clone();
        let position_source = elements.get(ElementRole::TsParse)?.clone();
        let mux = elements.get(ElementRole::TsMux)?.clone();

        let topology: Topology = Arc::new(Mutex::new(TopologyBuilder::new(GstLinker::new(
            elements.clone(),
        ))));
        let pad_added = connect_pad_added(&demux, &topology);

        let controller = Rc::new_cyclic(|weak| {
            RefCell::new(SpliceController::new(
                PipelineEngine::new(
                    pipeline.clone(),
                    position_source,
                    mux,
                    carrier,
                    weak.clone(),
                ),
                config.splice.clone(),
            ))
        });

        let bus_watch = watch_bus(&pipeline, &controller, main_loop)?;

        info!(
            "Pipeline {} built: {} -> {}, splice every {:?} for {:?}",
            PIPELINE_NAME, config.input, config.output, config.splice.interval, config.splice.duration
        );

        Ok(Inserter {
            pipeline,
            demux,
            controller,
            bus_watch: Some(bus_watch),
            pad_added: Some(pad_added),
        })
    }

    /// Sets the pipeline to PLAYING. The splice schedule starts once the
    /// pipeline reports the transition.
    pub fn start(&self) -> Result<()> {
        self.pipeline.set_state(gst::State::Playing)?;
        Ok(())
    }

}

impl Drop for Inserter {
    fn drop(&mut self) {
        match self.controller.try_borrow_mut() {
            Ok(mut controller) => controller.shutdown(),
            Err(_) => error!("Splice controller busy during teardown"),
        }

        self.bus_watch.take();
        if let Some(handler) = self.pad_added.take() {
            self.demux.disconnect(handler);
        }

        if let Err(err) = self.pipeline.set_state(gst::State::Null) {
            error!("Unable to set the pipeline to the NULL state: {}", err);
        }
    }
}

fn connect_pad_added(demux: &gst::Element, topology: &Topology) -> glib::SignalHandlerId {
    let topology = Arc::clone(topology);
    demux.connect_pad_added(move |demux, pad| {
        let caps = pad.current_caps().unwrap_or_else(|| pad.query_caps(None));
        let Some(fingerprint) = fingerprint_from_caps(&caps) else {
            gst::warning!(CAT, obj = pad, "Demuxer pad without usable caps: {}", caps);
            return;
        };

        if let Ok(mut topology) = topology.lock() {
            topology.on_stream_discovered(&fingerprint, pad);
        } else {
            gst::error!(
                CAT,
                obj = demux,
                "Topology mutex poisoned, pad {} ignored",
                pad.name()
            );
        }
    })
}

fn watch_bus(
    pipeline: &gst::Pipeline,
    controller: &Rc<RefCell<Controller>>,
    main_loop: &glib::MainLoop,
) -> Result<gst::bus::BusWatchGuard> {
    let bus = pipeline
        .bus()
        .ok_or_else(|| Error::Other("Pipeline without bus".to_owned()))?;

    let pipeline_weak = pipeline.downgrade();
    let controller = Rc::downgrade(controller);
    let main_loop = main_loop.clone();

    let guard = bus.add_watch_local(move |_bus, message| {
        let (Some(pipeline), Some(controller)) = (pipeline_weak.upgrade(), controller.upgrade())
        else {
            return glib::ControlFlow::Break;
        };
        let Some(message) = to_engine_message(message, &pipeline) else {
            return glib::ControlFlow::Continue;
        };

        if let EngineMessage::StateChanged {
            pipeline: true,
            old,
            current,
        } = &message
        {
            pipeline.debug_to_dot_file_with_ts(
                gst::DebugGraphDetails::all(),
                format!("state_changed-{old}_{current}"),
            );
        }

        match controller.try_borrow_mut() {
            Ok(mut controller) => {
                controller.on_engine_message(&message);
                if controller.health().is_eos() {
                    info!("Stream ended, leaving the main loop");
                    main_loop.quit();
                }
            }
            Err(_) => warn!("Splice controller busy, bus message {:?} dropped", message),
        }

        glib::ControlFlow::Continue
    })?;

    Ok(guard)
}
