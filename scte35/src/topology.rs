// SPDX-FileCopyrightText: 2025 Contributors to the SCTE-35 Inserter project.
// SPDX-License-Identifier: Apache-2.0

//! Dynamic Stream Topology Builder.
//!
//! The demultiplexer announces each elementary stream once, with a content
//! type fingerprint. The builder looks the fingerprint up in a fixed route
//! table and, on a match, links
//!
//! ```text
//! stream ──► parser ──► buffer stage ──► first compatible mux input
//! ```
//!
//! Streams without a route are logged and left out of the output. Link
//! failures are logged and not retried; the stream then stays out of the
//! output for the lifetime of the pipeline.

use std::fmt;

use tracing::{info, warn};

use crate::Result;

/// Fixed roles of the nodes in the inserter's element graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementRole {
    Source,
    SourceQueue,
    TsParse,
    TsDemux,
    H264Parse,
    Mpeg2Parse,
    AacParse,
    VideoQueue,
    AudioQueue,
    TsMux,
    MuxQueue,
    Sink,
}

impl ElementRole {
    pub const ALL: [ElementRole; 12] = [
        ElementRole::Source,
        ElementRole::SourceQueue,
        ElementRole::TsParse,
        ElementRole::TsDemux,
        ElementRole::H264Parse,
        ElementRole::Mpeg2Parse,
        ElementRole::AacParse,
        ElementRole::VideoQueue,
        ElementRole::AudioQueue,
        ElementRole::TsMux,
        ElementRole::MuxQueue,
        ElementRole::Sink,
    ];

    /// Element name used inside the graph.
    pub fn label(&self) -> &'static str {
        match self {
            ElementRole::Source => "SOURCE",
            ElementRole::SourceQueue => "SOURCE_QUEUE",
            ElementRole::TsParse => "TS_PARSE",
            ElementRole::TsDemux => "TS_DEMUX",
            ElementRole::H264Parse => "H264_PARSE",
            ElementRole::Mpeg2Parse => "MPEG2_PARSE",
            ElementRole::AacParse => "AAC_PARSE",
            ElementRole::VideoQueue => "VIDEO_PARSE_QUEUE",
            ElementRole::AudioQueue => "AUDIO_PARSE_QUEUE",
            ElementRole::TsMux => "TS_MUX",
            ElementRole::MuxQueue => "TS_MUX_QUEUE",
            ElementRole::Sink => "SINK",
        }
    }

    /// Buffer stages (queues) as opposed to processing nodes.
    pub fn is_buffer(&self) -> bool {
        matches!(
            self,
            ElementRole::SourceQueue
                | ElementRole::VideoQueue
                | ElementRole::AudioQueue
                | ElementRole::MuxQueue
        )
    }
}

impl fmt::Display for ElementRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Content type of a discovered elementary stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    /// Media type name, e.g. `video/x-h264`.
    pub media_type: String,
    /// `mpegversion` of `video/mpeg` and `audio/mpeg` streams, when known.
    pub mpeg_version: Option<i32>,
}

impl Fingerprint {
    pub fn new(media_type: impl Into<String>) -> Self {
        Fingerprint {
            media_type: media_type.into(),
            mpeg_version: None,
        }
    }

    pub fn with_mpeg_version(mut self, version: i32) -> Self {
        self.mpeg_version = Some(version);
        self
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mpeg_version {
            Some(version) => write!(f, "{}, mpegversion={}", self.media_type, version),
            None => f.write_str(&self.media_type),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Audio,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaKind::Video => f.write_str("video"),
            MediaKind::Audio => f.write_str("audio"),
        }
    }
}

/// One entry of the route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamRoute {
    /// Matched against the start of the fingerprint's media type.
    pub prefix: &'static str,
    /// Accepted `mpegversion` values; `None` accepts any.
    pub mpeg_versions: Option<&'static [i32]>,
    pub kind: MediaKind,
    pub parser: ElementRole,
    pub buffer: ElementRole,
}

impl StreamRoute {
    pub fn matches(&self, fingerprint: &Fingerprint) -> bool {
        if !fingerprint.media_type.starts_with(self.prefix) {
            return false;
        }
        match (self.mpeg_versions, fingerprint.mpeg_version) {
            (Some(accepted), Some(version)) => accepted.contains(&version),
            _ => true,
        }
    }
}

/// Streams that make it into the output multiplex. First match wins.
pub const STREAM_ROUTES: [StreamRoute; 3] = [
    StreamRoute {
        prefix: "video/x-h264",
        mpeg_versions: None,
        kind: MediaKind::Video,
        parser: ElementRole::H264Parse,
        buffer: ElementRole::VideoQueue,
    },
    StreamRoute {
        prefix: "video/mpeg",
        mpeg_versions: Some(&[1, 2]),
        kind: MediaKind::Video,
        parser: ElementRole::Mpeg2Parse,
        buffer: ElementRole::VideoQueue,
    },
    StreamRoute {
        prefix: "audio/mpeg",
        mpeg_versions: Some(&[2, 4]),
        kind: MediaKind::Audio,
        parser: ElementRole::AacParse,
        buffer: ElementRole::AudioQueue,
    },
];

/// Looks up the route for `fingerprint`.
pub fn route_for(fingerprint: &Fingerprint) -> Option<&'static StreamRoute> {
    STREAM_ROUTES.iter().find(|route| route.matches(fingerprint))
}

/// Graph mutations the builder needs from the engine.
///
/// Called from the thread the engine announces streams on, hence no
/// `&mut self`.
pub trait StreamLinker {
    /// Engine handle of a discovered stream (a demuxer output).
    type Stream: ?Sized;

    /// Links `stream` to the input of the `parser` node.
    fn link_stream(&self, stream: &Self::Stream, parser: ElementRole) -> Result<()>;

    /// Links the output of `upstream` to the input of `downstream`.
    fn link_elements(&self, upstream: ElementRole, downstream: ElementRole) -> Result<()>;

    /// Links the output of `buffer` to the first compatible free input of the
    /// multiplexer.
    fn link_to_mux(&self, buffer: ElementRole) -> Result<()>;
}

/// Result of handling one discovered stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discovery {
    Linked(MediaKind),
    Unsupported,
    LinkFailed(MediaKind),
}

/// Wires discovered streams into the multiplexer.
pub struct TopologyBuilder<L> {
    linker: L,
    video_linked: bool,
    audio_linked: bool,
}

impl<L: StreamLinker> TopologyBuilder<L> {
    pub fn new(linker: L) -> Self {
        TopologyBuilder {
            linker,
            video_linked: false,
            audio_linked: false,
        }
    }

    pub fn linker(&self) -> &L {
        &self.linker
    }

    pub fn is_linked(&self, kind: MediaKind) -> bool {
        match kind {
            MediaKind::Video => self.video_linked,
            MediaKind::Audio => self.audio_linked,
        }
    }

    /// Both an audio and a video path reach the multiplexer.
    pub fn is_complete(&self) -> bool {
        self.video_linked && self.audio_linked
    }

    pub fn on_stream_discovered(&mut self, fingerprint: &Fingerprint, stream: &L::Stream) -> Discovery {
        info!("Dynamic pad created, type {}", fingerprint);

        let Some(route) = route_for(fingerprint) else {
            info!("Unsupported MPEG-TS demux pad type {}, not multiplexed", fingerprint);
            return Discovery::Unsupported;
        };

        if let Err(err) = self.link(route, stream) {
            warn!(
                "Failed to link {} stream {} into the multiplexer: {}",
                route.kind, fingerprint, err
            );
            return Discovery::LinkFailed(route.kind);
        }

        match route.kind {
            MediaKind::Video => self.video_linked = true,
            MediaKind::Audio => self.audio_linked = true,
        }
        info!("Linked {} stream {} via {}", route.kind, fingerprint, route.parser);
        if self.is_complete() {
            info!("Audio and video paths attached to the multiplexer");
        }

        Discovery::Linked(route.kind)
    }

    fn link(&self, route: &StreamRoute, stream: &L::Stream) -> Result<()> {
        self.linker.link_stream(stream, route.parser)?;
        self.linker.link_elements(route.parser, route.buffer)?;
        self.linker.link_to_mux(route.buffer)
    }
}
