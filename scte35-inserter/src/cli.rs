// SPDX-FileCopyrightText: 2025 Contributors to the SCTE-35 Inserter project.
// SPDX-License-Identifier: Apache-2.0

//! Command line interface.
//!
//! Every option can also be given through the environment, which is handy
//! in containers.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use scte35::config::DEFAULT_SCTE35_PID;
use scte35::{Endpoint, Output, PipelineConfig, SpliceSettings};

pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), "-", env!("COMMIT_ID"));

#[derive(Parser, Debug, Clone)]
#[command(name = "scte35-inserter")]
#[command(version = VERSION, about = "Inserts SCTE-35 splice_insert cues into an MPEG-TS UDP stream")]
pub struct Cli {
    /// MPEG-TS input address
    #[arg(short, long, env = "SCTE35_INPUT", value_name = "HOST:PORT")]
    pub input: Endpoint,

    /// MPEG-TS output address
    #[arg(
        short,
        long,
        env = "SCTE35_OUTPUT",
        value_name = "HOST:PORT",
        conflicts_with = "file",
        required_unless_present = "file"
    )]
    pub output: Option<Endpoint>,

    /// Write the output to a file instead of UDP
    #[arg(short, long, env = "SCTE35_FILE", value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Seconds of content between two ad breaks
    #[arg(short = 'n', long, env = "SCTE35_INTERVAL", value_name = "SECONDS")]
    pub interval: u64,

    /// Seconds per ad break
    #[arg(short, long, env = "SCTE35_DURATION", value_name = "SECONDS")]
    pub duration: u64,

    /// Request an immediate splice-out instead of a timed one
    #[arg(long)]
    pub immediate: bool,

    /// Let the splice-out return automatically; no splice-in is sent
    #[arg(long)]
    pub auto_return: bool,

    /// Re-buffering latency of the input and output queues
    #[arg(long, env = "SCTE35_LATENCY_MS", value_name = "MS", default_value_t = 1000)]
    pub latency: u64,

    /// PID carrying the SCTE-35 sections
    #[arg(long, env = "SCTE35_PID", default_value_t = DEFAULT_SCTE35_PID)]
    pub pid: u16,
}

impl TryFrom<Cli> for PipelineConfig {
    type Error = scte35::Error;

    fn try_from(cli: Cli) -> scte35::Result<Self> {
        let output = match (cli.output, cli.file) {
            (Some(endpoint), None) => Output::Network(endpoint),
            (None, Some(path)) => Output::File(path),
            (Some(_), Some(_)) => {
                return Err(scte35::Error::InvalidConfig(
                    "--output and --file are mutually exclusive".into(),
                ));
            }
            (None, None) => {
                return Err(scte35::Error::InvalidConfig(
                    "one of --output or --file is required".into(),
                ));
            }
        };

        let mut splice = SpliceSettings::new(
            Duration::from_secs(cli.interval),
            Duration::from_secs(cli.duration),
        );
        splice.immediate = cli.immediate;
        splice.auto_return = cli.auto_return;
        splice.pid = cli.pid;

        PipelineConfig::new(
            cli.input,
            output,
            Duration::from_millis(cli.latency),
            splice,
        )
    }
}
