// SPDX-FileCopyrightText: 2025 Contributors to the SCTE-35 Inserter project.
// SPDX-License-Identifier: Apache-2.0

//! Translation between GStreamer bus messages / states and the engine-neutral
//! types of the splice controller.

use gst::prelude::*;
use gstreamer as gst;
use scte35::{EngineMessage, EngineState};

pub fn engine_state(state: gst::State) -> EngineState {
    match state {
        gst::State::VoidPending | gst::State::Null => EngineState::Null,
        gst::State::Ready => EngineState::Ready,
        gst::State::Paused => EngineState::Paused,
        gst::State::Playing => EngineState::Playing,
        _ => EngineState::Null,
    }
}

pub fn gst_state(state: EngineState) -> gst::State {
    match state {
        EngineState::Null => gst::State::Null,
        EngineState::Ready => gst::State::Ready,
        EngineState::Paused => gst::State::Paused,
        EngineState::Playing => gst::State::Playing,
    }
}

/// Maps the bus messages the controller cares about; everything else is
/// `None`.
///
/// `pipeline` decides whether a state change is pipeline-wide.
pub fn to_engine_message(message: &gst::Message, pipeline: &gst::Pipeline) -> Option<EngineMessage> {
    use gst::MessageView;

    match message.view() {
        MessageView::StateChanged(changed) => Some(EngineMessage::StateChanged {
            pipeline: message
                .src()
                .is_some_and(|src| src == pipeline.upcast_ref::<gst::Object>()),
            old: engine_state(changed.old()),
            current: engine_state(changed.current()),
        }),
        MessageView::Error(err) => Some(EngineMessage::Error {
            source: message
                .src()
                .map(|src| src.name().to_string())
                .unwrap_or_else(|| "unknown".to_owned()),
            message: err.error().to_string(),
            debug: err.debug().map(|debug| debug.to_string()),
        }),
        MessageView::Eos(_) => Some(EngineMessage::EndOfStream),
        MessageView::NewClock(_) => Some(EngineMessage::NewClock),
        MessageView::ClockLost(_) => Some(EngineMessage::ClockLost),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_map_both_ways() {
        for state in [
            EngineState::Null,
            EngineState::Ready,
            EngineState::Paused,
            EngineState::Playing,
        ] {
            assert_eq!(engine_state(gst_state(state)), state);
        }
        assert_eq!(engine_state(gst::State::VoidPending), EngineState::Null);
    }
}
