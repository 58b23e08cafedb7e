// SPDX-FileCopyrightText: 2025 Contributors to the SCTE-35 Inserter project.
// SPDX-License-Identifier: Apache-2.0

//! # scte35-inserter
//!
//! Re-multiplexes an MPEG-TS stream received over UDP and inserts SCTE-35
//! `splice_insert` cues at a fixed cadence.
//!
//! ```text
//! udpsrc ─► queue ─► tsparse ─► tsdemux ─► {h264parse|mpegvideoparse|aacparse} ─► queue
//!                                                                                   │
//!                         udpsink | filesink ◄─ queue ◄─ mpegtsmux ◄────────────────┘
//!                                                            ▲
//!                                       splice_info_section ─┘ (PID 123 by default)
//! ```
//!
//! The splice logic lives in the [`scte35`] crate; this crate provides the
//! GStreamer engine it runs against, the command line and the process
//! lifecycle.
//!
//! ## Environment
//!
//! - `RUST_LOG`: application log filter (default `info`)
//! - `GST_DEBUG`: GStreamer log levels, `scte35inserter` for the graph code
//! - `GST_DEBUG_DUMP_DOT_DIR`: directory for the `state_changed-*` graph dumps

pub mod app;
pub mod carrier;
pub mod cli;
mod error;
pub mod pipeline;

pub use app::App;
pub use cli::Cli;
pub use error::{Error, Result};
pub use pipeline::Inserter;
