// SPDX-FileCopyrightText: 2025 Contributors to the SCTE-35 Inserter project.
// SPDX-License-Identifier: Apache-2.0

//! [`StreamLinker`] on top of GStreamer pads.
//!
//! Runs on the demuxer's streaming thread, from its `pad-added` signal.

use gst::prelude::*;
use gstreamer as gst;
use scte35::{ElementRole, Fingerprint, StreamLinker};

use crate::pipeline::CAT;
use crate::pipeline::elements::Elements;

/// Extracts the topology fingerprint from the first structure of `caps`.
///
/// Returns `None` for empty or ANY caps.
pub fn fingerprint_from_caps(caps: &gst::CapsRef) -> Option<Fingerprint> {
    if caps.is_any() {
        return None;
    }
    let structure = caps.structure(0)?;
    let fingerprint = Fingerprint::new(structure.name().as_str());
    Some(match structure.get::<i32>("mpegversion") {
        Ok(version) => fingerprint.with_mpeg_version(version),
        Err(_) => fingerprint,
    })
}

/// Links demuxer pads through the pre-built parser and queue elements.
pub struct GstLinker {
    elements: Elements,
}

impl GstLinker {
    pub fn new(elements: Elements) -> Self {
        GstLinker { elements }
    }

    fn element(&self, role: ElementRole) -> scte35::Result<&gst::Element> {
        self.elements
            .get(role)
            .map_err(|err| scte35::Error::Link(err.to_string()))
    }

    fn static_pad(&self, role: ElementRole, name: &str) -> scte35::Result<gst::Pad> {
        self.element(role)?
            .static_pad(name)
            .ok_or_else(|| scte35::Error::Link(format!("{role} has no {name} pad")))
    }
}

impl StreamLinker for GstLinker {
    type Stream = gst::Pad;

    fn link_stream(&self, stream: &gst::Pad, parser: ElementRole) -> scte35::Result<()> {
        let sink = self.static_pad(parser, "sink")?;
        if sink.is_linked() {
            return Err(scte35::Error::Link(format!(
                "{parser} already takes another stream"
            )));
        }
        stream.link(&sink).map_err(|err| {
            scte35::Error::Link(format!("{} -> {parser}: {err:?}", stream.name()))
        })?;
        gst::debug!(CAT, obj = stream, "Linked to {}", parser);
        Ok(())
    }

    fn link_elements(&self, upstream: ElementRole, downstream: ElementRole) -> scte35::Result<()> {
        let up = self.element(upstream)?;
        let down = self.element(downstream)?;
        up.link(down)
            .map_err(|err| scte35::Error::Link(format!("{upstream} -> {downstream}: {err}")))
    }

    fn link_to_mux(&self, buffer: ElementRole) -> scte35::Result<()> {
        let src = self.static_pad(buffer, "src")?;
        let mux = self.element(ElementRole::TsMux)?;
        let sink = mux.compatible_pad(&src, None).ok_or_else(|| {
            scte35::Error::Link(format!("{} has no input compatible with {buffer}", mux.name()))
        })?;
        src.link(&sink).map_err(|err| {
            scte35::Error::Link(format!("{buffer} -> {}: {err:?}", sink.name()))
        })?;
        gst::debug!(CAT, obj = sink, "Linked from {}", buffer);
        Ok(())
    }
}
