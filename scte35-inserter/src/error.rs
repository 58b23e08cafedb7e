// SPDX-FileCopyrightText: 2025 Contributors to the SCTE-35 Inserter project.
// SPDX-License-Identifier: Apache-2.0

//! Error types of the inserter application.

use gstreamer as gst;

/// Convenience result type using [`Error`] as the error variant.
pub type Result<T> = core::result::Result<T, Error>;

/// Failures while building or running the inserter pipeline.
///
/// Everything here is fatal at startup. Runtime problems go through the
/// pipeline bus and are handled (or logged) by the splice controller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// GStreamer could not be initialized.
    #[error("GStreamer initialization failed: {0}")]
    Init(#[from] glib::Error),

    /// An element factory is not installed.
    #[error("Unable to make gst element {factory}: {source}")]
    MissingElement {
        factory: &'static str,
        #[source]
        source: glib::BoolError,
    },

    /// A GLib/GStreamer call reported failure (adding or linking elements,
    /// installing the bus watch).
    #[error("{0}")]
    Bool(#[from] glib::BoolError),

    /// The pipeline refused a state change.
    #[error("Unable to set the pipeline state: {0}")]
    StateChange(#[from] gst::StateChangeError),

    /// `libgstmpegts-1.0` could not be opened or lacks a symbol.
    #[error("Loading library: {0}")]
    LibLoading(#[from] libloading::Error),

    /// Configuration or splice logic error.
    #[error(transparent)]
    Splice(#[from] scte35::Error),

    #[error("{0}")]
    Other(String),
}
