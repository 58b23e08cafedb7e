// SPDX-FileCopyrightText: 2025 Contributors to the SCTE-35 Inserter project.
// SPDX-License-Identifier: Apache-2.0

//! Element graph construction.
//!
//! ```text
//! udpsrc ─► queue ─► tsparse ─► tsdemux ┄┄ (pad-added) ┄┄► parser ─► queue ─┐
//!                                                                           ▼
//!                                      udpsink | filesink ◄─ queue ◄─ mpegtsmux
//! ```
//!
//! Every role gets exactly one element, named after the role's label, so that
//! bus messages and graph dumps read the same way as the logs.

use std::collections::BTreeMap;

use gst::prelude::*;
use gstreamer as gst;
use scte35::{ElementRole, Output, PipelineConfig};

use crate::pipeline::CAT;
use crate::{Error, Result};

/// Kernel receive buffer requested by the UDP source, in bytes.
pub const SOURCE_BUFFER_SIZE: i32 = 825_984;

/// Factory name of the element playing `role`.
pub fn factory_name(role: ElementRole, output: &Output) -> &'static str {
    match role {
        ElementRole::Source => "udpsrc",
        ElementRole::SourceQueue
        | ElementRole::VideoQueue
        | ElementRole::AudioQueue
        | ElementRole::MuxQueue => "queue",
        ElementRole::TsParse => "tsparse",
        ElementRole::TsDemux => "tsdemux",
        ElementRole::H264Parse => "h264parse",
        ElementRole::Mpeg2Parse => "mpegvideoparse",
        ElementRole::AacParse => "aacparse",
        ElementRole::TsMux => "mpegtsmux",
        ElementRole::Sink => match output {
            Output::Network(_) => "udpsink",
            Output::File(_) => "filesink",
        },
    }
}

/// The elements of one inserter pipeline, by role.
///
/// Cloning is cheap: elements are reference counted.
#[derive(Clone, Debug)]
pub struct Elements {
    by_role: BTreeMap<ElementRole, gst::Element>,
}

impl Elements {
    /// Creates and configures every element for `config`.
    ///
    /// # Errors
    ///
    /// [`Error::MissingElement`] when a factory is not installed.
    pub fn build(config: &PipelineConfig) -> Result<Self> {
        let mut by_role = BTreeMap::new();
        for role in ElementRole::ALL {
            let factory = factory_name(role, &config.output);
            let element = gst::ElementFactory::make(factory)
                .name(role.label())
                .build()
                .map_err(|source| Error::MissingElement { factory, source })?;

            if role.is_buffer() {
                // Unbounded; only the latency threshold below holds data back.
                element.set_property("max-size-buffers", 0u32);
                element.set_property("max-size-bytes", 0u32);
                element.set_property("max-size-time", 0u64);
            }
            by_role.insert(role, element);
        }

        let elements = Elements { by_role };
        elements.configure(config)?;
        Ok(elements)
    }

    fn configure(&self, config: &PipelineConfig) -> Result<()> {
        let source = self.get(ElementRole::Source)?;
        source.set_property("address", config.input.host.as_str());
        source.set_property("port", i32::from(config.input.port));
        source.set_property("auto-multicast", true);
        source.set_property("buffer-size", SOURCE_BUFFER_SIZE);

        let latency = u64::try_from(config.latency.as_nanos()).unwrap_or(u64::MAX);
        for role in [ElementRole::SourceQueue, ElementRole::MuxQueue] {
            self.get(role)?.set_property("min-threshold-time", latency);
        }

        self.get(ElementRole::TsMux)?
            .set_property("scte-35-pid", u32::from(config.splice.pid));

        let sink = self.get(ElementRole::Sink)?;
        match &config.output {
            Output::Network(endpoint) => {
                sink.set_property("host", endpoint.host.as_str());
                sink.set_property("port", i32::from(endpoint.port));
            }
            Output::File(path) => {
                sink.set_property("location", path.to_string_lossy().as_ref());
            }
        }

        gst::debug!(
            CAT,
            "Configured {} -> {} with {:?} latency, SCTE-35 on PID {}",
            config.input,
            config.output,
            config.latency,
            config.splice.pid
        );
        Ok(())
    }

    /// Element playing `role`.
    pub fn get(&self, role: ElementRole) -> Result<&gst::Element> {
        self.by_role
            .get(&role)
            .ok_or_else(|| Error::Other(format!("No element for {role}")))
    }

    /// Adds every element to `pipeline`.
    pub fn add_to(&self, pipeline: &gst::Pipeline) -> Result<()> {
        pipeline.add_many(self.by_role.values())?;
        Ok(())
    }

    /// Links the static parts of the graph: the input chain up to the demuxer
    /// and the output chain from the multiplexer.
    pub fn link_static(&self) -> Result<()> {
        gst::Element::link_many([
            self.get(ElementRole::Source)?,
            self.get(ElementRole::SourceQueue)?,
            self.get(ElementRole::TsParse)?,
            self.get(ElementRole::TsDemux)?,
        ])?;
        gst::Element::link_many([
            self.get(ElementRole::TsMux)?,
            self.get(ElementRole::MuxQueue)?,
            self.get(ElementRole::Sink)?,
        ])?;
        Ok(())
    }
}
