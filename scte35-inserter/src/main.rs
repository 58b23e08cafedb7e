// SPDX-FileCopyrightText: 2025 Contributors to the SCTE-35 Inserter project.
// SPDX-License-Identifier: Apache-2.0

use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use scte35::PipelineConfig;
use scte35_inserter::{App, Cli};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_target(false)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    let config = match PipelineConfig::try_from(cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}\n");
            let _ = <Cli as clap::CommandFactory>::command().print_help();
            return ExitCode::FAILURE;
        }
    };

    info!("Starting SCTE-35 inserter {}", scte35_inserter::cli::VERSION);
    match App::new(&config).and_then(App::run) {
        Ok(()) => {
            info!("Stopped");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
