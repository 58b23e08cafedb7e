// SPDX-FileCopyrightText: 2025 Contributors to the SCTE-35 Inserter project.
// SPDX-License-Identifier: Apache-2.0

//! SCTE-35 `splice_info_section` serialization.
//!
//! Every cue is a `splice_insert` command without descriptors:
//!
//! ```text
//! table_id 0xFC | flags + section_length | protocol_version
//! encryption + pts_adjustment(33) | cw_index | tier + splice_command_length
//! splice_command_type 0x05 | splice_insert() | descriptor_loop_length 0
//! CRC_32
//! ```
//!
//! This is the wire image an engine's section encoder produces for an
//! intent. Engines without a native encoder can carry these bytes directly;
//! the test engines use it to check what reaches the multiplexer.

mod checksum;
mod writer;

use crate::intent::{SpliceIntent, SpliceType};
use writer::BitWriter;

pub use checksum::crc32_mpeg2;

/// `table_id` of a splice_info_section.
pub const SPLICE_INFO_TABLE_ID: u8 = 0xFC;

/// `splice_command_type` of splice_insert().
pub const SPLICE_INSERT_COMMAND: u8 = 0x05;

/// sap_type 3: SAP type not specified.
const SAP_TYPE_UNSPECIFIED: u64 = 0b11;

/// All tiers authorized.
const TIER_ALL: u64 = 0xFFF;

const PTS_MASK: u64 = (1 << 33) - 1;

/// Bytes between section_length and the command body: protocol_version,
/// encryption and pts_adjustment, cw_index, tier and splice_command_length,
/// splice_command_type.
const HEADER_AFTER_LENGTH: usize = 1 + 5 + 1 + 3 + 1;

/// descriptor_loop_length plus CRC_32.
const TRAILER: usize = 2 + 4;

/// Serializes `intent` into a complete splice_info_section, CRC included.
pub fn encode(intent: &SpliceIntent) -> Vec<u8> {
    let command = splice_insert(intent);
    let section_length = HEADER_AFTER_LENGTH + command.len() + TRAILER;

    let mut w = BitWriter::with_capacity(3 + section_length);
    w.put(8, SPLICE_INFO_TABLE_ID as u64);
    w.put_flag(false); // section_syntax_indicator
    w.put_flag(false); // private_indicator
    w.put(2, SAP_TYPE_UNSPECIFIED);
    w.put(12, section_length as u64);

    w.put(8, 0); // protocol_version
    w.put_flag(false); // encrypted_packet
    w.put(6, 0); // encryption_algorithm
    w.put(33, 0); // pts_adjustment
    w.put(8, 0); // cw_index
    w.put(12, TIER_ALL);
    w.put(12, command.len() as u64);
    w.put(8, SPLICE_INSERT_COMMAND as u64);
    w.put_bytes(&command);
    w.put(16, 0); // descriptor_loop_length

    let mut section = w.into_bytes();
    let crc = crc32_mpeg2(&section);
    section.extend_from_slice(&crc.to_be_bytes());
    section
}

/// splice_insert() body, without the command type byte.
fn splice_insert(intent: &SpliceIntent) -> Vec<u8> {
    let immediate = intent.is_immediate();
    let mut w = BitWriter::with_capacity(20);

    w.put(32, intent.event_id as u64);
    w.put_flag(false); // splice_event_cancel_indicator
    w.reserved(7);

    w.put_flag(intent.splice_type == SpliceType::Out); // out_of_network_indicator
    w.put_flag(true); // program_splice_flag
    w.put_flag(intent.duration_ticks.is_some());
    w.put_flag(immediate);
    w.reserved(4);

    if !immediate {
        // splice_time()
        w.put_flag(true); // time_specified_flag
        w.reserved(6);
        w.put(33, intent.target_time_ticks & PTS_MASK);
    }

    if let Some(duration) = intent.duration_ticks {
        // break_duration()
        w.put_flag(intent.auto_return);
        w.reserved(6);
        w.put(33, duration & PTS_MASK);
    }

    w.put(16, intent.unique_program_id as u64);
    w.put(8, 0); // avail_num
    w.put(8, 0); // avails_expected

    w.into_bytes()
}
