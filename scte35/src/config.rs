// SPDX-FileCopyrightText: 2025 Contributors to the SCTE-35 Inserter project.
// SPDX-License-Identifier: Apache-2.0

//! Validated pipeline configuration.
//!
//! A [`PipelineConfig`] can only be obtained through [`PipelineConfig::new`],
//! which enforces the invariants the controller relies on: a usable input
//! endpoint, exactly one output, strictly positive splice timings and a
//! signaling PID the multiplexer can carry.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::{Error, Result};

/// Default re-buffering latency of the input and output queues.
pub const DEFAULT_LATENCY: Duration = Duration::from_millis(1000);

/// Default PID carrying the SCTE-35 sections.
pub const DEFAULT_SCTE35_PID: u16 = 123;

/// Lowest PID not reserved by ISO/IEC 13818-1.
pub const MIN_SIGNALING_PID: u16 = 0x0010;

/// Highest PID below the null packet PID.
pub const MAX_SIGNALING_PID: u16 = 0x1FFE;

/// Longest ad break a splice-out can describe: break_duration is a 33 bit
/// count of 90 kHz ticks.
pub const MAX_SPLICE_DURATION: Duration = Duration::from_secs(95_443);

/// Longest delay between two splice timers. Main loop timeouts count
/// milliseconds in 32 bits.
pub const MAX_TIMER_DELAY: Duration = Duration::from_millis(u32::MAX as u64);

/// A `HOST:PORT` pair for the UDP source or sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Endpoint {
            host: host.into(),
            port,
        }
    }
}

impl FromStr for Endpoint {
    type Err = Error;

    /// Splits on the last `:` so that the port is always the trailing field.
    /// Port 0 and an empty host are rejected.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidEndpoint(s.to_owned());

        let (host, port) = s.rsplit_once(':').ok_or_else(invalid)?;
        if host.is_empty() {
            return Err(invalid());
        }
        let port = port.parse::<u16>().map_err(|_| invalid())?;
        if port == 0 {
            return Err(invalid());
        }

        Ok(Endpoint::new(host, port))
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Where the re-multiplexed transport stream goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// UDP unicast or multicast destination.
    Network(Endpoint),
    /// Transport stream file.
    File(PathBuf),
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Network(endpoint) => write!(f, "udp://{endpoint}"),
            Output::File(path) => write!(f, "file://{}", path.display()),
        }
    }
}

/// Splice timing and signaling flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpliceSettings {
    /// Time spent in content between two ad breaks.
    pub interval: Duration,

    /// Length of one ad break.
    pub duration: Duration,

    /// Splice-out cues ask for an immediate splice instead of a PTS.
    pub immediate: bool,

    /// Splice-out cues set the break_duration auto_return flag; no splice-in
    /// cue is ever sent.
    pub auto_return: bool,

    /// PID the sections are carried on.
    pub pid: u16,
}

impl SpliceSettings {
    pub fn new(interval: Duration, duration: Duration) -> Self {
        SpliceSettings {
            interval,
            duration,
            immediate: false,
            auto_return: false,
            pid: DEFAULT_SCTE35_PID,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(Error::InvalidConfig(
                "splice interval must be strictly positive".into(),
            ));
        }
        if self.duration.is_zero() {
            return Err(Error::InvalidConfig(
                "splice duration must be strictly positive".into(),
            ));
        }
        if self.duration > MAX_SPLICE_DURATION {
            return Err(Error::InvalidConfig(format!(
                "splice duration {:?} exceeds {:?}",
                self.duration, MAX_SPLICE_DURATION
            )));
        }
        // The auto-return schedule waits interval + duration in one timer.
        match self.interval.checked_add(self.duration) {
            Some(period) if period <= MAX_TIMER_DELAY => {}
            _ => {
                return Err(Error::InvalidConfig(format!(
                    "splice interval {:?} plus duration {:?} exceeds {:?}",
                    self.interval, self.duration, MAX_TIMER_DELAY
                )));
            }
        }
        if !(MIN_SIGNALING_PID..=MAX_SIGNALING_PID).contains(&self.pid) {
            return Err(Error::InvalidConfig(format!(
                "signaling PID {} outside {}..={}",
                self.pid, MIN_SIGNALING_PID, MAX_SIGNALING_PID
            )));
        }
        Ok(())
    }
}

/// Complete configuration of one inserter pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub input: Endpoint,
    pub output: Output,
    /// Minimum fill level of the input and output queues.
    pub latency: Duration,
    pub splice: SpliceSettings,
}

impl PipelineConfig {
    /// Builds a configuration, rejecting anything the pipeline cannot run with.
    pub fn new(
        input: Endpoint,
        output: Output,
        latency: Duration,
        splice: SpliceSettings,
    ) -> Result<Self> {
        if let Output::File(path) = &output {
            if path.as_os_str().is_empty() {
                return Err(Error::InvalidConfig("output file path is empty".into()));
            }
        }
        splice.validate()?;

        Ok(PipelineConfig {
            input,
            output,
            latency,
            splice,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_parses_host_and_port() {
        let endpoint: Endpoint = "239.1.1.1:5000".parse().unwrap();
        assert_eq!(endpoint, Endpoint::new("239.1.1.1", 5000));
        assert_eq!(endpoint.to_string(), "239.1.1.1:5000");
    }

    #[test]
    fn endpoint_rejects_incomplete_input() {
        for raw in ["239.1.1.1", ":5000", "host:", "host:0", "host:70000", "host:abc"] {
            assert!(
                matches!(raw.parse::<Endpoint>(), Err(Error::InvalidEndpoint(_))),
                "{raw} should be rejected"
            );
        }
    }

    #[test]
    fn zero_timings_are_rejected() {
        let input = Endpoint::new("0.0.0.0", 1234);
        let output = Output::Network(Endpoint::new("127.0.0.1", 5678));

        let zero_interval = SpliceSettings::new(Duration::ZERO, Duration::from_secs(10));
        assert!(
            PipelineConfig::new(input.clone(), output.clone(), DEFAULT_LATENCY, zero_interval)
                .is_err()
        );

        let zero_duration = SpliceSettings::new(Duration::from_secs(60), Duration::ZERO);
        assert!(PipelineConfig::new(input, output, DEFAULT_LATENCY, zero_duration).is_err());
    }

    #[test]
    fn break_longer_than_33_bits_of_ticks_is_rejected() {
        let splice = SpliceSettings::new(Duration::from_secs(60), Duration::from_secs(27 * 3600));
        assert!(matches!(splice.validate(), Err(Error::InvalidConfig(_))));

        let splice = SpliceSettings::new(Duration::from_secs(60), MAX_SPLICE_DURATION);
        assert!(splice.validate().is_ok());
        assert!(crate::intent::to_pts_ticks(MAX_SPLICE_DURATION) < 1 << 33);
    }

    #[test]
    fn oversized_interval_is_rejected() {
        let splice = SpliceSettings::new(Duration::MAX, Duration::from_secs(10));
        assert!(matches!(splice.validate(), Err(Error::InvalidConfig(_))));

        let splice = SpliceSettings::new(Duration::from_secs(u64::MAX), Duration::from_secs(1));
        assert!(splice.validate().is_err());

        let splice = SpliceSettings::new(
            MAX_TIMER_DELAY - Duration::from_secs(10),
            Duration::from_secs(10),
        );
        assert!(splice.validate().is_ok());
    }

    #[test]
    fn reserved_pids_are_rejected() {
        let mut splice = SpliceSettings::new(Duration::from_secs(60), Duration::from_secs(10));
        splice.pid = 0x0000;
        assert!(splice.validate().is_err());
        splice.pid = 0x1FFF;
        assert!(splice.validate().is_err());
        splice.pid = 0x01F4;
        assert!(splice.validate().is_ok());
    }

    #[test]
    fn empty_file_output_is_rejected() {
        let splice = SpliceSettings::new(Duration::from_secs(60), Duration::from_secs(10));
        let result = PipelineConfig::new(
            Endpoint::new("0.0.0.0", 1234),
            Output::File(PathBuf::new()),
            DEFAULT_LATENCY,
            splice,
        );
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }
}
