// SPDX-FileCopyrightText: 2025 Contributors to the SCTE-35 Inserter project.
// SPDX-License-Identifier: Apache-2.0

//! Section carrier: turns splice intents into SCTE-35 sections on the
//! multiplexer.
//!
//! The multiplexer accepts PSI/SI sections as custom events holding a
//! `GstMpegtsSection`. Splice sections are built with the splice_insert
//! constructors of `libgstmpegts-1.0`, loaded at runtime via [`mpegts_sys`].
//! Their times are running time, which the multiplexer translates into the
//! PTS domain of its output before serializing the section.

use std::ffi::OsStr;
use std::time::Duration;

use gst::prelude::*;
use gstreamer as gst;
use mpegts_sys::{GstMpegtsSCTESIT, GstMpegtsSCTESpliceEvent, libgstmpegts};
use scte35::intent::from_pts_ticks;
use scte35::{SpliceIntent, SpliceType};
use tracing::{debug, warn};

use crate::Result;

pub struct SectionCarrier {
    api: libgstmpegts,
}

impl SectionCarrier {
    /// Opens the system `libgstmpegts-1.0` and initializes it.
    ///
    /// GStreamer must be initialized before.
    pub fn load() -> Result<Self> {
        Self::load_from(mpegts_sys::LIBRARY_NAME)
    }

    /// Opens the library at `path` and initializes it.
    pub fn load_from(path: impl AsRef<OsStr>) -> Result<Self> {
        let api = unsafe { libgstmpegts::new(path)? };
        unsafe { api.gst_mpegts_initialize() };
        Ok(SectionCarrier { api })
    }

    /// Builds the splice_insert section for `intent` on `pid` and sends it to
    /// `element`.
    ///
    /// # Errors
    ///
    /// [`scte35::Error::Carrier`] if the library cannot build the section or
    /// the element does not handle the event.
    pub fn send(
        &self,
        intent: &SpliceIntent,
        pid: u16,
        element: &gst::Element,
    ) -> scte35::Result<()> {
        let splice_time = if intent.is_immediate() {
            mpegts_sys::GST_CLOCK_TIME_NONE
        } else {
            running_time(intent.target_time_ticks)
        };

        // Safety: the SIT returned by the constructors is ours until
        // gst_mpegts_section_from_scte_sit takes it over. The returned section
        // is a mini object we hold one reference to, dropped after the event
        // has taken its own.
        unsafe {
            let sit = match intent.splice_type {
                SpliceType::Out => self.api.gst_mpegts_scte_splice_out_new(
                    intent.event_id,
                    splice_time,
                    intent.duration_ticks.map_or(0, running_time),
                ),
                SpliceType::In => self
                    .api
                    .gst_mpegts_scte_splice_in_new(intent.event_id, splice_time),
            };
            if sit.is_null() {
                return Err(scte35::Error::Carrier(format!(
                    "libgstmpegts could not build splice {} event {}",
                    intent.splice_type, intent.event_id
                )));
            }

            match first_splice_event(sit) {
                Some(event) => fill_splice_event(&mut *event, intent),
                None => warn!(
                    "Splice {} event {} built without an event",
                    intent.splice_type, intent.event_id
                ),
            }

            let raw = self.api.gst_mpegts_section_from_scte_sit(sit, pid);
            if raw.is_null() {
                return Err(scte35::Error::Carrier(format!(
                    "libgstmpegts could not packetize splice event {}",
                    intent.event_id
                )));
            }

            let sent = self
                .api
                .gst_mpegts_section_send_event(raw, element.as_ptr() as *mut mpegts_sys::GstElement);
            gst::ffi::gst_mini_object_unref(raw as *mut gst::ffi::GstMiniObject);

            if sent == glib::ffi::GFALSE {
                return Err(scte35::Error::Carrier(format!(
                    "{} did not accept the section event",
                    element.name()
                )));
            }
        }

        debug!(
            "Sent splice {} event {} on PID {} to {}",
            intent.splice_type,
            intent.event_id,
            pid,
            element.name()
        );
        Ok(())
    }
}

/// Converts 90 kHz ticks back to nanoseconds of running time.
fn running_time(ticks: u64) -> mpegts_sys::GstClockTime {
    let time: Duration = from_pts_ticks(ticks);
    u64::try_from(time.as_nanos()).unwrap_or(mpegts_sys::GST_CLOCK_TIME_NONE - 1)
}

/// Copies the fields the splice constructors leave at their defaults.
fn fill_splice_event(event: &mut GstMpegtsSCTESpliceEvent, intent: &SpliceIntent) {
    event.unique_program_id = intent.unique_program_id;
    event.break_duration_auto_return =
        (intent.splice_type == SpliceType::Out && intent.auto_return) as mpegts_sys::gboolean;
    if intent.is_immediate() {
        event.splice_immediate_flag = glib::ffi::GTRUE;
        event.program_splice_time_specified = glib::ffi::GFALSE;
    }
}

unsafe fn first_splice_event(sit: *mut GstMpegtsSCTESIT) -> Option<*mut GstMpegtsSCTESpliceEvent> {
    let splices = (*sit).splices;
    if splices.is_null() || (*splices).len == 0 || (*splices).pdata.is_null() {
        return None;
    }
    let event = *(*splices).pdata as *mut GstMpegtsSCTESpliceEvent;
    (!event.is_null()).then_some(event)
}
