// SPDX-FileCopyrightText: 2025 Contributors to the SCTE-35 Inserter project.
// SPDX-License-Identifier: Apache-2.0

//! # scte35 - splice scheduling and stream topology
//!
//! Engine-independent core of the SCTE-35 inserter. It decides *when* a
//! splice-out or splice-in cue is due and builds the cue for the engine's
//! section encoder, and decides *how* newly discovered elementary streams are
//! wired into the output multiplexer.
//!
//! The media engine itself (element graph, buffering, bitstream parsing,
//! network I/O) stays outside this crate and is reached through two traits:
//!
//! - [`SpliceEngine`]: position queries, section encoding and carriage,
//!   one-shot timers and pipeline state changes. Driven from the engine's main loop.
//! - [`StreamLinker`]: graph linking for discovered streams. Driven from
//!   whatever thread the engine announces new streams on.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐  messages   ┌───────────────┐
//! │ SpliceController │◄────────────│ media engine  │
//! │  ├─ HealthMonitor│             │ (SpliceEngine)│
//! │  └─ SpliceScheduler ──timers──►│               │
//! └────────┬─────────┘             └───────▲───────┘
//!          │ SpliceIntent                   │
//!          └──────────── carry_section ─────┘
//!
//! ┌──────────────────┐  link_*     ┌───────────────┐
//! │ TopologyBuilder  │────────────►│ (StreamLinker)│
//! └──────────────────┘             └───────────────┘
//! ```
//!
//! ## Time base
//!
//! Engine positions and configured intervals are [`std::time::Duration`]s.
//! Intents carry 90 kHz ticks of the engine's position, see
//! [`intent::to_pts_ticks`]. [`section::encode`] is the matching wire image.

mod controller;
mod engine;
mod error;
mod health;
mod scheduler;

pub mod config;
pub mod intent;
pub mod section;
pub mod topology;

pub use config::{Endpoint, Output, PipelineConfig, SpliceSettings};
pub use controller::SpliceController;
pub use engine::{EngineState, SpliceEngine};
pub use error::{Error, Result};
pub use health::{EngineMessage, HealthAction, HealthMonitor};
pub use intent::{SpliceIds, SpliceIntent, SpliceType};
pub use scheduler::{SpliceMode, SpliceScheduler};
pub use topology::{
    Discovery, ElementRole, Fingerprint, MediaKind, StreamLinker, StreamRoute, TopologyBuilder,
};
