// SPDX-FileCopyrightText: 2025 Contributors to the SCTE-35 Inserter project.
// SPDX-License-Identifier: Apache-2.0

/// MSB-first bit writer for section fields.
#[derive(Default)]
pub(crate) struct BitWriter {
    bytes: Vec<u8>,
    bit_len: usize,
}

impl BitWriter {
    pub(crate) fn with_capacity(bytes: usize) -> Self {
        BitWriter {
            bytes: Vec::with_capacity(bytes),
            bit_len: 0,
        }
    }

    /// Writes the low `width` bits of `value`, most significant first.
    pub(crate) fn put(&mut self, width: u32, value: u64) {
        debug_assert!(width <= 64);
        for shift in (0..width).rev() {
            self.put_bit((value >> shift) & 1 == 1);
        }
    }

    pub(crate) fn put_flag(&mut self, flag: bool) {
        self.put_bit(flag);
    }

    /// Sets `width` reserved bits, which SCTE-35 fills with ones.
    pub(crate) fn reserved(&mut self, width: u32) {
        self.put(width, u64::MAX);
    }

    pub(crate) fn put_bytes(&mut self, bytes: &[u8]) {
        if self.bit_len % 8 == 0 {
            self.bytes.extend_from_slice(bytes);
            self.bit_len += bytes.len() * 8;
        } else {
            for &byte in bytes {
                self.put(8, byte as u64);
            }
        }
    }

    fn put_bit(&mut self, bit: bool) {
        let offset = self.bit_len % 8;
        if offset == 0 {
            self.bytes.push(0);
        }
        if bit {
            if let Some(last) = self.bytes.last_mut() {
                *last |= 0x80 >> offset;
            }
        }
        self.bit_len += 1;
    }

    pub(crate) fn is_byte_aligned(&self) -> bool {
        self.bit_len % 8 == 0
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        debug_assert!(self.is_byte_aligned());
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packs_fields_msb_first() {
        let mut w = BitWriter::default();
        w.put(8, 0xFC);
        w.put_flag(false);
        w.put_flag(false);
        w.put(2, 3);
        w.put(12, 0x025);
        w.reserved(7);
        w.put_flag(true);
        assert!(w.is_byte_aligned());
        assert_eq!(w.into_bytes(), vec![0xFC, 0x30, 0x25, 0xFF]);
    }

    #[test]
    fn writes_33_bit_fields() {
        let mut w = BitWriter::default();
        w.reserved(7);
        w.put(33, 0x1_2345_6789);
        assert_eq!(w.into_bytes(), vec![0xFF, 0x23, 0x45, 0x67, 0x89]);
    }
}
