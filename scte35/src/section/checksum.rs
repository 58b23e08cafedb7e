// SPDX-FileCopyrightText: 2025 Contributors to the SCTE-35 Inserter project.
// SPDX-License-Identifier: Apache-2.0

//! CRC-32/MPEG-2 as used by every PSI and SCTE-35 section.
//!
//! Running the CRC over a complete section including its trailing CRC_32
//! field yields zero.

use crc::{CRC_32_MPEG_2, Crc};

const MPEG_2: Crc<u32> = Crc::<u32>::new(&CRC_32_MPEG_2);

pub fn crc32_mpeg2(data: &[u8]) -> u32 {
    MPEG_2.checksum(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_value() {
        assert_eq!(crc32_mpeg2(b"123456789"), 0x0376_E6E7);
    }

    #[test]
    fn residue_is_zero_with_crc_appended() {
        let mut data = b"splice_info_section".to_vec();
        let crc = crc32_mpeg2(&data);
        data.extend_from_slice(&crc.to_be_bytes());
        assert_eq!(crc32_mpeg2(&data), 0);
    }
}
