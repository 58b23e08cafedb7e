// SPDX-FileCopyrightText: 2025 Contributors to the SCTE-35 Inserter project.
// SPDX-License-Identifier: Apache-2.0

mod common;

use std::cell::RefCell;
use std::time::Duration;

use common::{MockEngine, decode_splice_insert, setup_logging};
use scte35::{
    Discovery, ElementRole, EngineMessage, EngineState, Error, Fingerprint, MediaKind, Result,
    SpliceController, SpliceSettings, StreamLinker, TopologyBuilder,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Link {
    Stream(String, ElementRole),
    Elements(ElementRole, ElementRole),
    Mux(ElementRole),
}

/// Records every link request; can be told to refuse mux links. Like a real
/// parser sink pad, each parser accepts a single stream.
#[derive(Default)]
struct MockLinker {
    links: RefCell<Vec<Link>>,
    refuse_mux: RefCell<Option<ElementRole>>,
}

impl StreamLinker for MockLinker {
    type Stream = str;

    fn link_stream(&self, stream: &str, parser: ElementRole) -> Result<()> {
        let taken = self
            .links
            .borrow()
            .iter()
            .any(|link| matches!(link, Link::Stream(_, role) if *role == parser));
        if taken {
            return Err(Error::Link(format!("{parser} sink pad already linked")));
        }
        self.links
            .borrow_mut()
            .push(Link::Stream(stream.to_string(), parser));
        Ok(())
    }

    fn link_elements(&self, upstream: ElementRole, downstream: ElementRole) -> Result<()> {
        self.links
            .borrow_mut()
            .push(Link::Elements(upstream, downstream));
        Ok(())
    }

    fn link_to_mux(&self, buffer: ElementRole) -> Result<()> {
        if *self.refuse_mux.borrow() == Some(buffer) {
            return Err(Error::Link(format!("no compatible mux pad for {buffer}")));
        }
        self.links.borrow_mut().push(Link::Mux(buffer));
        Ok(())
    }
}

fn builder() -> TopologyBuilder<MockLinker> {
    setup_logging();
    TopologyBuilder::new(MockLinker::default())
}

#[test]
fn h264_and_aac_reach_the_mux() {
    let mut topology = builder();

    let video = topology.on_stream_discovered(&Fingerprint::new("video/x-h264"), "video_0_0041");
    let audio = topology.on_stream_discovered(
        &Fingerprint::new("audio/mpeg").with_mpeg_version(4),
        "audio_0_0042",
    );

    assert_eq!(video, Discovery::Linked(MediaKind::Video));
    assert_eq!(audio, Discovery::Linked(MediaKind::Audio));
    assert!(topology.is_complete());
    assert_eq!(
        *topology.linker().links.borrow(),
        vec![
            Link::Stream("video_0_0041".into(), ElementRole::H264Parse),
            Link::Elements(ElementRole::H264Parse, ElementRole::VideoQueue),
            Link::Mux(ElementRole::VideoQueue),
            Link::Stream("audio_0_0042".into(), ElementRole::AacParse),
            Link::Elements(ElementRole::AacParse, ElementRole::AudioQueue),
            Link::Mux(ElementRole::AudioQueue),
        ]
    );
}

#[test]
fn mpeg2_video_uses_its_own_parser_and_the_video_queue() {
    let mut topology = builder();
    let discovery = topology.on_stream_discovered(
        &Fingerprint::new("video/mpeg").with_mpeg_version(2),
        "video_0_0100",
    );

    assert_eq!(discovery, Discovery::Linked(MediaKind::Video));
    assert!(topology.is_linked(MediaKind::Video));
    assert!(!topology.is_complete());
    assert!(
        topology
            .linker()
            .links
            .borrow()
            .contains(&Link::Elements(ElementRole::Mpeg2Parse, ElementRole::VideoQueue))
    );
}

#[test]
fn unsupported_streams_leave_the_graph_alone() {
    let mut topology = builder();

    for fingerprint in [
        Fingerprint::new("audio/x-ac3"),
        Fingerprint::new("private/x-dvbsub"),
        Fingerprint::new("audio/mpeg").with_mpeg_version(1),
    ] {
        assert_eq!(
            topology.on_stream_discovered(&fingerprint, "private_0_0200"),
            Discovery::Unsupported
        );
    }

    assert!(topology.linker().links.borrow().is_empty());
    assert!(!topology.is_linked(MediaKind::Video));
    assert!(!topology.is_linked(MediaKind::Audio));
}

#[test]
fn mux_refusal_is_reported_and_does_not_mark_the_kind_linked() {
    let mut topology = builder();
    *topology.linker().refuse_mux.borrow_mut() = Some(ElementRole::AudioQueue);

    let audio = topology.on_stream_discovered(
        &Fingerprint::new("audio/mpeg").with_mpeg_version(2),
        "audio_0_0042",
    );
    assert_eq!(audio, Discovery::LinkFailed(MediaKind::Audio));
    assert!(!topology.is_linked(MediaKind::Audio));

    // A failure on one stream does not affect the other path.
    let video = topology.on_stream_discovered(&Fingerprint::new("video/x-h264"), "video_0_0041");
    assert_eq!(video, Discovery::Linked(MediaKind::Video));
    assert!(!topology.is_complete());
}

#[test]
fn second_stream_of_a_linked_kind_is_refused_without_side_effects() {
    let mut topology = builder();
    let mut controller = SpliceController::new(
        MockEngine::new(),
        SpliceSettings::new(Duration::from_secs(60), Duration::from_secs(10)),
    );
    controller.on_engine_message(&EngineMessage::StateChanged {
        pipeline: true,
        old: EngineState::Paused,
        current: EngineState::Playing,
    });
    controller.engine().fire_next();
    controller.on_timer();

    let first = topology.on_stream_discovered(&Fingerprint::new("video/x-h264"), "video_0_0041");
    let second = topology.on_stream_discovered(&Fingerprint::new("video/x-h264"), "video_0_0044");

    assert_eq!(first, Discovery::Linked(MediaKind::Video));
    assert_eq!(second, Discovery::LinkFailed(MediaKind::Video));
    assert!(topology.is_linked(MediaKind::Video));
    assert_eq!(topology.linker().links.borrow().len(), 3);

    // The splice schedule keeps its identifiers and its single timer.
    assert_eq!(controller.engine().pending_timers(), 1);
    controller.engine().fire_next();
    controller.on_timer();
    let sections = controller.engine().sections.borrow();
    let ids: Vec<_> = sections
        .iter()
        .map(|section| decode_splice_insert(&section.bytes))
        .map(|splice| (splice.event_id, splice.unique_program_id))
        .collect();
    assert_eq!(ids, vec![(1, 1), (2, 1)]);
    assert_eq!(controller.engine().pending_timers(), 1);
}
