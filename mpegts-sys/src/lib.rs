// SPDX-FileCopyrightText: 2025 Contributors to the SCTE-35 Inserter project.
// SPDX-License-Identifier: Apache-2.0

//! # mpegts-sys: Raw FFI bindings to `libgstmpegts-1.0`
//!
//! Only the symbols needed to build an SCTE-35 splice_insert section and hand
//! it to an element are bound:
//!
//! - `gst_mpegts_initialize`
//! - `gst_mpegts_scte_splice_out_new`
//! - `gst_mpegts_scte_splice_in_new`
//! - `gst_mpegts_section_from_scte_sit`
//! - `gst_mpegts_section_send_event`
//!
//! The library is opened at runtime through `libloading`, like a
//! bindgen `dynamic_library_name` binding with `dynamic_link_require_all`:
//! every symbol is resolved when the library is opened, and a missing symbol
//! fails the load instead of the first call.
//!
//! Struct layouts follow the GStreamer 1.20 headers, the first release whose
//! splice constructors take running time and let the multiplexer translate
//! it into its own PTS domain.
//!
//! ## Safety
//!
//! All functions in this crate are `unsafe`. Callers must:
//! - call `gst_mpegts_initialize` once, after GStreamer itself is initialized,
//! - hand every SIT returned by the splice constructors to
//!   `gst_mpegts_section_from_scte_sit`, which takes ownership of it,
//! - release returned sections with `gst_mini_object_unref`.

#![allow(non_camel_case_types)]
#![allow(unsafe_op_in_unsafe_fn)]
#![allow(clippy::missing_safety_doc)]

extern crate libloading;

use std::ffi::{OsStr, c_int, c_uint, c_void};

/// Default name of the library, resolved through the system loader.
#[cfg(target_os = "macos")]
pub const LIBRARY_NAME: &str = "libgstmpegts-1.0.0.dylib";
#[cfg(target_os = "windows")]
pub const LIBRARY_NAME: &str = "gstmpegts-1.0-0.dll";
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
pub const LIBRARY_NAME: &str = "libgstmpegts-1.0.so.0";

pub type gboolean = c_int;
pub type guint8 = u8;
pub type guint16 = u16;
pub type guint32 = u32;
pub type guint64 = u64;
pub type gpointer = *mut c_void;
pub type GstClockTime = guint64;

pub const GST_CLOCK_TIME_NONE: GstClockTime = GstClockTime::MAX;

pub type GstMpegtsSCTESpliceCommandType = c_uint;
pub const GST_MTS_SCTE_SPLICE_COMMAND_NULL: GstMpegtsSCTESpliceCommandType = 0x00;
pub const GST_MTS_SCTE_SPLICE_COMMAND_SCHEDULE: GstMpegtsSCTESpliceCommandType = 0x04;
pub const GST_MTS_SCTE_SPLICE_COMMAND_INSERT: GstMpegtsSCTESpliceCommandType = 0x05;
pub const GST_MTS_SCTE_SPLICE_COMMAND_TIME: GstMpegtsSCTESpliceCommandType = 0x06;
pub const GST_MTS_SCTE_SPLICE_COMMAND_BANDWIDTH: GstMpegtsSCTESpliceCommandType = 0x07;
pub const GST_MTS_SCTE_SPLICE_COMMAND_PRIVATE: GstMpegtsSCTESpliceCommandType = 0xff;

/// `GPtrArray`.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct GPtrArray {
    pub pdata: *mut gpointer,
    pub len: c_uint,
}

/// `GstMpegtsSection`. Starts with a `GstMiniObject` header; otherwise opaque
/// on this side.
#[repr(C)]
pub struct GstMpegtsSection {
    _private: [u8; 0],
}

/// `GstElement`, opaque.
#[repr(C)]
pub struct GstElement {
    _private: [u8; 0],
}

/// `GstMpegtsSCTESpliceEvent`.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct GstMpegtsSCTESpliceEvent {
    pub insert_event: gboolean,
    pub splice_event_id: guint32,
    pub splice_event_cancel_indicator: gboolean,
    pub out_of_network_indicator: gboolean,
    pub program_splice_flag: gboolean,
    pub duration_flag: gboolean,
    pub splice_immediate_flag: gboolean,
    pub program_splice_time_specified: gboolean,
    pub program_splice_time: guint64,
    pub utc_splice_time: guint32,
    pub components: *mut GPtrArray,
    pub break_duration_auto_return: gboolean,
    pub break_duration: guint64,
    pub unique_program_id: guint16,
    pub avail_num: guint8,
    pub avails_expected: guint8,
}

/// `GstMpegtsSCTESIT`.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct GstMpegtsSCTESIT {
    pub encrypted_packet: gboolean,
    pub encryption_algorithm: guint8,
    pub pts_adjustment: guint64,
    pub cw_index: guint8,
    pub tier: guint16,
    pub splice_command_length: guint16,
    pub splice_command_type: GstMpegtsSCTESpliceCommandType,
    pub splice_time_specified: gboolean,
    pub splice_time: guint64,
    pub splices: *mut GPtrArray,
    pub descriptors: *mut GPtrArray,
    pub fully_parsed: gboolean,
    pub is_running_time: gboolean,
}

pub struct libgstmpegts {
    __library: ::libloading::Library,
    pub gst_mpegts_initialize: unsafe extern "C" fn(),
    pub gst_mpegts_scte_splice_out_new: unsafe extern "C" fn(
        event_id: guint32,
        splice_time: GstClockTime,
        duration: GstClockTime,
    ) -> *mut GstMpegtsSCTESIT,
    pub gst_mpegts_scte_splice_in_new: unsafe extern "C" fn(
        event_id: guint32,
        splice_time: GstClockTime,
    ) -> *mut GstMpegtsSCTESIT,
    pub gst_mpegts_section_from_scte_sit: unsafe extern "C" fn(
        sit: *mut GstMpegtsSCTESIT,
        pid: guint16,
    ) -> *mut GstMpegtsSection,
    pub gst_mpegts_section_send_event: unsafe extern "C" fn(
        section: *mut GstMpegtsSection,
        element: *mut GstElement,
    ) -> gboolean,
}

impl libgstmpegts {
    pub unsafe fn new<P>(path: P) -> Result<Self, ::libloading::Error>
    where
        P: AsRef<OsStr>,
    {
        let library = ::libloading::Library::new(path)?;
        Self::from_library(library)
    }

    pub unsafe fn from_library<L>(library: L) -> Result<Self, ::libloading::Error>
    where
        L: Into<::libloading::Library>,
    {
        let __library = library.into();
        let gst_mpegts_initialize = __library
            .get(b"gst_mpegts_initialize\0")
            .map(|sym| *sym)?;
        let gst_mpegts_scte_splice_out_new = __library
            .get(b"gst_mpegts_scte_splice_out_new\0")
            .map(|sym| *sym)?;
        let gst_mpegts_scte_splice_in_new = __library
            .get(b"gst_mpegts_scte_splice_in_new\0")
            .map(|sym| *sym)?;
        let gst_mpegts_section_from_scte_sit = __library
            .get(b"gst_mpegts_section_from_scte_sit\0")
            .map(|sym| *sym)?;
        let gst_mpegts_section_send_event = __library
            .get(b"gst_mpegts_section_send_event\0")
            .map(|sym| *sym)?;
        Ok(libgstmpegts {
            __library,
            gst_mpegts_initialize,
            gst_mpegts_scte_splice_out_new,
            gst_mpegts_scte_splice_in_new,
            gst_mpegts_section_from_scte_sit,
            gst_mpegts_section_send_event,
        })
    }

    pub unsafe fn gst_mpegts_initialize(&self) {
        (self.gst_mpegts_initialize)()
    }

    pub unsafe fn gst_mpegts_scte_splice_out_new(
        &self,
        event_id: guint32,
        splice_time: GstClockTime,
        duration: GstClockTime,
    ) -> *mut GstMpegtsSCTESIT {
        (self.gst_mpegts_scte_splice_out_new)(event_id, splice_time, duration)
    }

    pub unsafe fn gst_mpegts_scte_splice_in_new(
        &self,
        event_id: guint32,
        splice_time: GstClockTime,
    ) -> *mut GstMpegtsSCTESIT {
        (self.gst_mpegts_scte_splice_in_new)(event_id, splice_time)
    }

    pub unsafe fn gst_mpegts_section_from_scte_sit(
        &self,
        sit: *mut GstMpegtsSCTESIT,
        pid: guint16,
    ) -> *mut GstMpegtsSection {
        (self.gst_mpegts_section_from_scte_sit)(sit, pid)
    }

    pub unsafe fn gst_mpegts_section_send_event(
        &self,
        section: *mut GstMpegtsSection,
        element: *mut GstElement,
    ) -> gboolean {
        (self.gst_mpegts_section_send_event)(section, element)
    }
}
