use crate::bits::Charset;
use crate::std::vec::Vec;
use crate::types::{apply_byte_order, truncate_to_bits, BigUint, Bitmap, Endian};
use crate::{Error, Result};

/// The encode-side mirror of [`super::BitReader`]: accumulates bits into a
/// growable byte buffer, flushing a cached partial byte only once it fills
/// (spec.md §4.1, component C1).
pub struct BitWriter {
    out: Vec<u8>,
    cache: u8,
    bits_in_cache: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        Self {
            out: Vec::new(),
            cache: 0,
            bits_in_cache: 0,
        }
    }

    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            out: Vec::with_capacity(bytes),
            cache: 0,
            bits_in_cache: 0,
        }
    }

    fn write_bit(&mut self, bit: bool) {
        self.cache = (self.cache << 1) | bit as u8;
        self.bits_in_cache += 1;
        if self.bits_in_cache == 8 {
            self.out.push(self.cache);
            self.cache = 0;
            self.bits_in_cache = 0;
        }
    }

    /// Writes a pre-assembled `Bitmap` bit by bit, in its stored order.
    pub fn write_bits(&mut self, bits: &Bitmap) {
        for i in 0..bits.len() {
            self.write_bit(bits.get(i));
        }
    }

    /// Writes the low `n` bits of `value` under `order` (spec.md §4.1).
    pub fn write_unsigned_bits(&mut self, value: u64, n: u32, order: Endian) {
        debug_assert!(n >= 1 && n <= 64);
        let ordered = apply_byte_order(value, n, order);
        for i in (0..n).rev() {
            self.write_bit((ordered >> i) & 1 == 1);
        }
    }

    pub fn write_signed(&mut self, value: i64, width: u32, order: Endian) {
        self.write_unsigned_bits(truncate_to_bits(value, width), width, order);
    }

    /// Writes an arbitrary-precision magnitude as `n` bits, left-padding
    /// with zero bits if the magnitude is narrower than `n`.
    pub fn write_big_unsigned(&mut self, value: &BigUint, n: u32, order: Endian) -> Result<()> {
        let nbytes = ((n + 7) / 8) as usize;
        let bytes = value.as_be_bytes();
        if bytes.len() > nbytes {
            return Err(Error::encode(format!(
                "bigint of {} bytes does not fit in {n} bits",
                bytes.len()
            )));
        }
        let mut padded = crate::std::vec![0u8; nbytes - bytes.len()];
        padded.extend_from_slice(bytes);
        if order == Endian::Little && n % 8 == 0 {
            padded.reverse();
        }
        let lead_bits = n % 8;
        let mut iter = padded.iter();
        if lead_bits != 0 {
            let first = *iter.next().unwrap_or(&0);
            for i in (0..lead_bits).rev() {
                self.write_bit((first >> i) & 1 == 1);
            }
        }
        for &byte in iter {
            for i in (0..8).rev() {
                self.write_bit((byte >> i) & 1 == 1);
            }
        }
        Ok(())
    }

    pub fn write_float32(&mut self, value: f32, order: Endian) {
        self.write_unsigned_bits(value.to_bits() as u64, 32, order);
    }

    pub fn write_float64(&mut self, value: f64, order: Endian) {
        self.write_unsigned_bits(value.to_bits(), 64, order);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        if self.bits_in_cache == 0 {
            self.out.extend_from_slice(bytes);
            return;
        }
        for &byte in bytes {
            for i in (0..8).rev() {
                self.write_bit((byte >> i) & 1 == 1);
            }
        }
    }

    pub fn write_text(&mut self, text: &str, charset: Charset) {
        self.write_bytes(&charset.encode(text));
    }

    /// Writes `text` followed by a single terminator byte (spec.md §4.5
    /// "String, terminated").
    pub fn write_text_then_terminator(&mut self, text: &str, charset: Charset, terminator: u8) {
        self.write_text(text, charset);
        self.write_bytes(&[terminator]);
    }

    /// Writes `n` zero bits; used to pad `Skip` bindings back out on encode.
    pub fn skip_bits(&mut self, n: u32) {
        for _ in 0..n {
            self.write_bit(false);
        }
    }

    /// Position in bits already written, including the partially filled
    /// cache byte; used by checksum codecs to find the span to cover.
    pub fn bit_position(&self) -> usize {
        self.out.len() * 8 + self.bits_in_cache as usize
    }

    /// Byte position of a fully flushed writer; panics if bits remain
    /// cached and unflushed, since a checksum span must land byte-aligned.
    pub fn byte_position(&self) -> usize {
        debug_assert_eq!(self.bits_in_cache, 0, "byte_position on an unflushed writer");
        self.out.len()
    }

    /// Overwrites `count` already-written bytes starting at `at`, used to
    /// back-patch a checksum field after the span it covers has been
    /// written (spec.md §4.3 checksum binding).
    pub fn patch_bytes(&mut self, at: usize, bytes: &[u8]) {
        self.out[at..at + bytes.len()].copy_from_slice(bytes);
    }

    /// Pads the cache with zero bits up to the next byte boundary and
    /// returns the completed buffer.
    pub fn into_bytes(mut self) -> Vec<u8> {
        if self.bits_in_cache > 0 {
            let pad = 8 - self.bits_in_cache;
            for _ in 0..pad {
                self.write_bit(false);
            }
        }
        self.out
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.out
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_2_bit_granular_round_trip() {
        let mut writer = BitWriter::new();
        writer.write_unsigned_bits(0b10100, 5, Endian::Big);
        writer.write_unsigned_bits(0b111, 3, Endian::Little);
        assert_eq!(writer.into_bytes(), crate::std::vec![0xA7u8]);
    }

    #[test]
    fn write_bytes_byte_aligned_is_a_direct_extend() {
        let mut writer = BitWriter::new();
        writer.write_bytes(&[1, 2, 3]);
        assert_eq!(writer.as_bytes(), &[1, 2, 3]);
    }

    #[test]
    fn patch_bytes_overwrites_in_place() {
        let mut writer = BitWriter::new();
        writer.write_bytes(&[0, 0, 0]);
        writer.patch_bytes(1, &[0xff]);
        assert_eq!(writer.as_bytes(), &[0, 0xff, 0]);
    }

    #[test]
    fn signed_round_trips_through_reader() {
        let mut writer = BitWriter::new();
        writer.write_signed(-5, 8, Endian::Big);
        let bytes = writer.into_bytes();
        let mut reader = crate::bits::BitReader::new(&bytes);
        assert_eq!(reader.read_signed(8, Endian::Big).unwrap(), -5);
    }

    #[test]
    fn float_round_trips_through_reader() {
        let mut writer = BitWriter::new();
        writer.write_float32(core::f32::consts::PI, Endian::Big);
        let bytes = writer.into_bytes();
        let mut reader = crate::bits::BitReader::new(&bytes);
        assert_eq!(
            reader.read_float32(Endian::Big).unwrap(),
            core::f32::consts::PI
        );
    }
}
