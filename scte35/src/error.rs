// SPDX-FileCopyrightText: 2025 Contributors to the SCTE-35 Inserter project.
// SPDX-License-Identifier: Apache-2.0

//! Error types for the splice controller.

use crate::engine::EngineState;

/// Convenience result type using [`Error`] as the error variant.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors raised by configuration validation and by the media engine
/// collaborators.
///
/// Only configuration errors are fatal. Everything else is reported back to
/// the controller, which logs it and carries on (see the individual call
/// sites for what "carry on" means in each case).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An endpoint string could not be parsed as `HOST:PORT`.
    #[error("Invalid endpoint '{0}', expected HOST:PORT")]
    InvalidEndpoint(String),

    /// The configuration is syntactically valid but violates an invariant
    /// (zero interval, PID out of range, ...).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The engine refused to link two nodes of the graph.
    #[error("Link failed: {0}")]
    Link(String),

    /// The engine could not serialize or deliver a signaling section.
    #[error("Section carrier failed: {0}")]
    Carrier(String),

    /// The engine reported a failed state transition.
    #[error("Unable to set the pipeline to the {0} state")]
    StateChange(EngineState),
}
