// SPDX-FileCopyrightText: 2025 Contributors to the SCTE-35 Inserter project.
// SPDX-License-Identifier: Apache-2.0

//! Splice intents: the transient description of one cue to emit.
//!
//! An intent is built fresh for every emission from the scheduler's
//! identifiers, the current stream position and the configured flags, then
//! handed to the engine's section encoder and dropped.

use std::fmt;
use std::time::Duration;

use crate::SpliceSettings;

/// Presentation clock rate used by every time field of a section.
pub const PTS_CLOCK_HZ: u64 = 90_000;

/// Target time meaning "splice as soon as possible".
pub const SPLICE_TIME_IMMEDIATE: u64 = u64::MAX;

/// How far ahead of the current position a timed cue points, so that
/// decoders receive it before the boundary it marks.
pub const SPLICE_LOOKAHEAD: Duration = Duration::from_secs(4);

/// Converts a duration to 90 kHz ticks, truncating.
pub fn to_pts_ticks(duration: Duration) -> u64 {
    (duration.as_nanos() * PTS_CLOCK_HZ as u128 / 1_000_000_000) as u64
}

/// Converts 90 kHz ticks back to a duration, truncating to the nanosecond.
pub fn from_pts_ticks(ticks: u64) -> Duration {
    Duration::from_nanos((ticks as u128 * 1_000_000_000 / PTS_CLOCK_HZ as u128) as u64)
}

/// Direction of a splice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpliceType {
    /// Leave the network feed (start of an ad break).
    Out,
    /// Return to the network feed (end of an ad break).
    In,
}

impl fmt::Display for SpliceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpliceType::Out => f.write_str("OUT"),
            SpliceType::In => f.write_str("IN"),
        }
    }
}

/// Monotonic identifiers handed out to emitted cues.
///
/// Every emission consumes a new event id. Program ids advance only on
/// splice-out; a splice-in reuses the id of the splice-out it closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpliceIds {
    next_event_id: u32,
    next_unique_program_id: u16,
    current_unique_program_id: u16,
}

impl Default for SpliceIds {
    fn default() -> Self {
        SpliceIds {
            next_event_id: 1,
            next_unique_program_id: 1,
            current_unique_program_id: 0,
        }
    }
}

impl SpliceIds {
    /// Returns the next event id, wrapping at 2^32.
    pub fn next_event_id(&mut self) -> u32 {
        let id = self.next_event_id;
        self.next_event_id = id.wrapping_add(1);
        id
    }

    /// Assigns a fresh program id, wrapping at 2^16.
    pub fn next_unique_program_id(&mut self) -> u16 {
        let id = self.next_unique_program_id;
        self.next_unique_program_id = id.wrapping_add(1);
        self.current_unique_program_id = id;
        id
    }

    /// The most recently assigned program id (0 before the first splice-out).
    pub fn current_unique_program_id(&self) -> u16 {
        self.current_unique_program_id
    }
}

/// One cue, ready for serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpliceIntent {
    pub splice_type: SpliceType,
    pub event_id: u32,
    pub unique_program_id: u16,
    /// Splice PTS in 90 kHz ticks, or [`SPLICE_TIME_IMMEDIATE`].
    pub target_time_ticks: u64,
    /// Break duration in 90 kHz ticks; splice-out only.
    pub duration_ticks: Option<u64>,
    pub auto_return: bool,
}

impl SpliceIntent {
    /// Builds the intent for `splice_type` at stream `position`, consuming
    /// identifiers from `ids`.
    pub fn new(
        splice_type: SpliceType,
        ids: &mut SpliceIds,
        position: Duration,
        settings: &SpliceSettings,
    ) -> Self {
        let event_id = ids.next_event_id();

        match splice_type {
            SpliceType::Out => {
                let unique_program_id = ids.next_unique_program_id();
                let target_time_ticks = if settings.immediate {
                    SPLICE_TIME_IMMEDIATE
                } else {
                    to_pts_ticks(position.saturating_add(SPLICE_LOOKAHEAD))
                };
                SpliceIntent {
                    splice_type,
                    event_id,
                    unique_program_id,
                    target_time_ticks,
                    duration_ticks: Some(to_pts_ticks(settings.duration)),
                    auto_return: settings.auto_return,
                }
            }
            SpliceType::In => SpliceIntent {
                splice_type,
                event_id,
                unique_program_id: ids.current_unique_program_id(),
                target_time_ticks: to_pts_ticks(position.saturating_add(SPLICE_LOOKAHEAD)),
                duration_ticks: None,
                auto_return: false,
            },
        }
    }

    /// True when the target time is [`SPLICE_TIME_IMMEDIATE`].
    pub fn is_immediate(&self) -> bool {
        self.target_time_ticks == SPLICE_TIME_IMMEDIATE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SpliceSettings {
        SpliceSettings::new(Duration::from_secs(60), Duration::from_secs(10))
    }

    #[test]
    fn ticks_use_the_90khz_clock() {
        assert_eq!(to_pts_ticks(Duration::from_secs(1)), 90_000);
        assert_eq!(to_pts_ticks(Duration::from_millis(40)), 3_600);
        // 1 tick is 11111.1 ns; anything shorter truncates to zero.
        assert_eq!(to_pts_ticks(Duration::from_nanos(11_111)), 0);
        assert_eq!(to_pts_ticks(Duration::from_nanos(11_112)), 1);
    }

    #[test]
    fn ticks_convert_back_to_nanoseconds() {
        assert_eq!(from_pts_ticks(90_000), Duration::from_secs(1));
        assert_eq!(from_pts_ticks(1), Duration::from_nanos(11_111));
        assert_eq!(from_pts_ticks(to_pts_ticks(Duration::from_secs(14))), Duration::from_secs(14));
    }

    #[test]
    fn immediate_is_derived_from_the_target_time() {
        let mut settings = settings();
        settings.immediate = true;
        let mut ids = SpliceIds::default();
        let out = SpliceIntent::new(SpliceType::Out, &mut ids, Duration::ZERO, &settings);

        let retimed = SpliceIntent {
            target_time_ticks: 90_000,
            ..out.clone()
        };
        assert!(out.is_immediate());
        assert!(!retimed.is_immediate());
    }

    #[test]
    fn position_near_the_end_of_time_saturates() {
        let mut ids = SpliceIds::default();
        let intent = SpliceIntent::new(SpliceType::In, &mut ids, Duration::MAX, &settings());
        assert_eq!(intent.target_time_ticks, to_pts_ticks(Duration::MAX));
    }

    #[test]
    fn splice_out_points_past_the_lookahead() {
        let mut ids = SpliceIds::default();
        let intent = SpliceIntent::new(
            SpliceType::Out,
            &mut ids,
            Duration::from_secs(10),
            &settings(),
        );

        assert_eq!(intent.event_id, 1);
        assert_eq!(intent.unique_program_id, 1);
        assert_eq!(intent.target_time_ticks, 14 * 90_000);
        assert_eq!(intent.duration_ticks, Some(10 * 90_000));
        assert!(!intent.is_immediate());
    }

    #[test]
    fn immediate_splice_out_ignores_position() {
        let mut settings = settings();
        settings.immediate = true;
        let mut ids = SpliceIds::default();

        for position in [Duration::ZERO, Duration::from_secs(3600)] {
            let intent = SpliceIntent::new(SpliceType::Out, &mut ids, position, &settings);
            assert_eq!(intent.target_time_ticks, SPLICE_TIME_IMMEDIATE);
            assert!(intent.is_immediate());
        }
    }

    #[test]
    fn splice_in_reuses_program_id_and_drops_out_only_fields() {
        let mut settings = settings();
        settings.immediate = true;
        settings.auto_return = true;
        let mut ids = SpliceIds::default();

        let out = SpliceIntent::new(SpliceType::Out, &mut ids, Duration::ZERO, &settings);
        let back = SpliceIntent::new(
            SpliceType::In,
            &mut ids,
            Duration::from_secs(10),
            &settings,
        );

        assert_eq!(back.event_id, out.event_id + 1);
        assert_eq!(back.unique_program_id, out.unique_program_id);
        assert_eq!(back.duration_ticks, None);
        assert!(!back.auto_return);
        assert!(!back.is_immediate());
        assert_eq!(back.target_time_ticks, 14 * 90_000);
    }

    #[test]
    fn identifiers_wrap_at_their_protocol_width() {
        let mut ids = SpliceIds {
            next_event_id: u32::MAX,
            next_unique_program_id: u16::MAX,
            current_unique_program_id: 0,
        };
        assert_eq!(ids.next_event_id(), u32::MAX);
        assert_eq!(ids.next_event_id(), 0);
        assert_eq!(ids.next_unique_program_id(), u16::MAX);
        assert_eq!(ids.next_unique_program_id(), 0);
        assert_eq!(ids.current_unique_program_id(), 0);
    }
}
