use crate::bits::{Charset, Savepoint};
use crate::std::string::String;
use crate::std::vec::Vec;
use crate::types::{apply_byte_order, sign_extend, BigUint, Bitmap, Endian};
use crate::{Error, Result};

/// A bit-granular cursor over a borrowed byte buffer (spec.md §4.1).
///
/// Not safe for concurrent use (spec.md §5): a reader is a short-lived
/// object tied to one decode pass.
pub struct BitReader<'a> {
    buf: &'a [u8],
    /// Index of the next byte to pull into the cache.
    next_byte: usize,
    /// Bits not yet consumed from `cache`, packed from the MSB down.
    bits_in_cache: u8,
    cache: u8,
    savepoint: Option<Savepoint>,
}

impl<'a> BitReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            next_byte: 0,
            bits_in_cache: 0,
            cache: 0,
            savepoint: None,
        }
    }

    /// The full underlying buffer, for codecs (checksum, header
    /// verification) that need to look at bytes outside their own span.
    pub fn buffer(&self) -> &'a [u8] {
        self.buf
    }

    pub fn has_remaining(&self) -> bool {
        self.bits_in_cache > 0 || self.next_byte < self.buf.len()
    }

    /// Number of whole bytes already fully consumed (spec.md §4.1
    /// `position()`).
    pub fn position(&self) -> usize {
        if self.bits_in_cache > 0 {
            self.next_byte - 1
        } else {
            self.next_byte
        }
    }

    /// Sets the position in bytes, discarding any residual bit cache.
    pub fn set_position(&mut self, pos: usize) {
        self.next_byte = pos;
        self.bits_in_cache = 0;
        self.cache = 0;
    }

    fn load_next_byte(&mut self) -> Result<()> {
        let byte = *self
            .buf
            .get(self.next_byte)
            .ok_or_else(|| Error::buffer_underflow("no more bytes to read"))?;
        self.cache = byte;
        self.bits_in_cache = 8;
        self.next_byte += 1;
        Ok(())
    }

    fn read_bit(&mut self) -> Result<bool> {
        if self.bits_in_cache == 0 {
            self.load_next_byte()?;
        }
        self.bits_in_cache -= 1;
        let bit = (self.cache >> self.bits_in_cache) & 1 == 1;
        Ok(bit)
    }

    /// Consumes `n` bits (0 ≤ n ≤ 2^31-1), returning them in read order.
    pub fn read_bits(&mut self, n: u32) -> Result<Bitmap> {
        let mut bits = Vec::with_capacity(n as usize);
        for _ in 0..n {
            bits.push(self.read_bit()?);
        }
        Ok(Bitmap::from_bits(bits))
    }

    /// Consumes `n` bits (1 ≤ n ≤ 64) and interprets them as an unsigned
    /// integer under `order` (spec.md §4.1).
    pub fn read_unsigned_bits(&mut self, n: u32, order: Endian) -> Result<u64> {
        debug_assert!(n >= 1 && n <= 64);
        let mut raw = 0u64;
        for _ in 0..n {
            raw = (raw << 1) | self.read_bit()? as u64;
        }
        Ok(apply_byte_order(raw, n, order))
    }

    /// Reads a sign-extended integer of `width` bits (8/16/32/64).
    pub fn read_signed(&mut self, width: u32, order: Endian) -> Result<i64> {
        let raw = self.read_unsigned_bits(width, order)?;
        Ok(sign_extend(raw, width))
    }

    /// Reads an arbitrary-precision unsigned magnitude of `n` bits.
    pub fn read_big_unsigned(&mut self, n: u32, order: Endian) -> Result<BigUint> {
        let nbytes = ((n + 7) / 8) as usize;
        let lead_bits = n % 8;
        let mut bytes = Vec::with_capacity(nbytes);
        if lead_bits != 0 {
            let mut b = 0u8;
            for _ in 0..lead_bits {
                b = (b << 1) | self.read_bit()? as u8;
            }
            bytes.push(b);
        }
        let whole_bytes = n / 8;
        for _ in 0..whole_bytes {
            let mut b = 0u8;
            for _ in 0..8 {
                b = (b << 1) | self.read_bit()? as u8;
            }
            bytes.push(b);
        }
        if order == Endian::Little && n % 8 == 0 {
            bytes.reverse();
        }
        Ok(BigUint::from_be_bytes(bytes))
    }

    pub fn read_float32(&mut self, order: Endian) -> Result<f32> {
        let bits = self.read_unsigned_bits(32, order)? as u32;
        Ok(f32::from_bits(bits))
    }

    pub fn read_float64(&mut self, order: Endian) -> Result<f64> {
        let bits = self.read_unsigned_bits(64, order)?;
        Ok(f64::from_bits(bits))
    }

    pub fn read_bytes(&mut self, k: usize) -> Result<Vec<u8>> {
        if self.bits_in_cache == 0 {
            let end = self
                .next_byte
                .checked_add(k)
                .filter(|&e| e <= self.buf.len())
                .ok_or_else(|| Error::buffer_underflow("not enough bytes remaining"))?;
            let slice = self.buf[self.next_byte..end].to_vec();
            self.next_byte = end;
            return Ok(slice);
        }
        let mut out = Vec::with_capacity(k);
        for _ in 0..k {
            let mut b = 0u8;
            for _ in 0..8 {
                b = (b << 1) | self.read_bit()? as u8;
            }
            out.push(b);
        }
        Ok(out)
    }

    pub fn read_text(&mut self, k: usize, charset: Charset) -> Result<String> {
        let bytes = self.read_bytes(k)?;
        charset.decode(&bytes)
    }

    /// Reads bytes up to (not including) a byte equal to `terminator`; the
    /// terminator itself is left unconsumed (spec.md §4.1 savepoint
    /// semantics: "create savepoint before each byte read... if equal to
    /// `t`, restore savepoint and stop").
    pub fn read_text_until_terminator(
        &mut self,
        terminator: u8,
        charset: Charset,
    ) -> Result<String> {
        let mut bytes = Vec::new();
        loop {
            self.create_savepoint();
            let byte = self.read_bytes(1)?[0];
            if byte == terminator {
                self.restore_savepoint();
                break;
            }
            bytes.push(byte);
        }
        charset.decode(&bytes)
    }

    /// Advances past one byte, asserting it equals `expected`.
    pub fn consume_byte(&mut self, expected: u8) -> Result<()> {
        let byte = self.read_bytes(1)?[0];
        if byte != expected {
            return Err(Error::decode(format!(
                "expected byte 0x{expected:02x}, have: 0x{byte:02x}"
            )));
        }
        Ok(())
    }

    /// Advances past `expected.len()` bytes, asserting they match exactly
    /// (used to verify a template's end marker).
    pub fn consume_bytes(&mut self, expected: &[u8]) -> Result<()> {
        let bytes = self.read_bytes(expected.len())?;
        if bytes != expected {
            return Err(Error::decode("end marker mismatch"));
        }
        Ok(())
    }

    /// Advances `n` bits without returning them (used by `Skip` bindings).
    pub fn skip_bits(&mut self, n: u32) -> Result<()> {
        for _ in 0..n {
            self.read_bit()?;
        }
        Ok(())
    }

    /// Advances bytes up to (not including) a byte equal to `terminator`,
    /// optionally consuming it.
    pub fn skip_until_terminator(&mut self, terminator: u8, consume: bool) -> Result<()> {
        loop {
            self.create_savepoint();
            let byte = self.read_bytes(1)?[0];
            if byte == terminator {
                if !consume {
                    self.restore_savepoint();
                }
                break;
            }
        }
        Ok(())
    }

    pub fn create_savepoint(&mut self) {
        self.savepoint = Some(Savepoint {
            byte_pos: self.next_byte,
            cache: self.cache,
            bits_in_cache: self.bits_in_cache,
        });
    }

    /// Restores the most recently created savepoint. Restoring twice in a
    /// row without an intervening `create_savepoint` is a no-op (spec.md
    /// §4.1 "`restoreSavepoint()` ... restoring after restoring is a
    /// no-op"), since the savepoint slot is left populated after a restore.
    pub fn restore_savepoint(&mut self) {
        if let Some(sp) = self.savepoint {
            self.next_byte = sp.byte_pos;
            self.cache = sp.cache;
            self.bits_in_cache = sp.bits_in_cache;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_2_bit_granular_integer() {
        // 0xA7 = 1010_0111
        let buf = [0xA7u8];
        let mut reader = BitReader::new(&buf);

        let first = reader.read_unsigned_bits(5, Endian::Big).unwrap();
        assert_eq!(first, 0b10100);

        let second = reader.read_unsigned_bits(3, Endian::Little).unwrap();
        assert_eq!(second, 0b111);
    }

    #[test]
    fn read_bytes_byte_aligned_is_a_direct_slice() {
        let buf = [1, 2, 3, 4];
        let mut reader = BitReader::new(&buf);
        assert_eq!(reader.read_bytes(2).unwrap(), crate::std::vec![1, 2]);
        assert_eq!(reader.position(), 2);
    }

    #[test]
    fn read_bytes_mid_byte_reassembles_bits() {
        let buf = [0b1010_1010, 0b0101_0101];
        let mut reader = BitReader::new(&buf);
        reader.read_bits(4).unwrap();
        let bytes = reader.read_bytes(1).unwrap();
        assert_eq!(bytes[0], 0b1010_0101);
    }

    #[test]
    fn terminated_text_leaves_terminator_unconsumed() {
        let buf = b"hello,world";
        let mut reader = BitReader::new(buf);
        let text = reader
            .read_text_until_terminator(b',', Charset::Utf8)
            .unwrap();
        assert_eq!(text, "hello");
        assert_eq!(reader.position(), 5);
        reader.consume_byte(b',').unwrap();
        assert_eq!(reader.position(), 6);
    }

    #[test]
    fn savepoint_restore_twice_is_idempotent() {
        let buf = [1, 2, 3];
        let mut reader = BitReader::new(&buf);
        reader.read_bytes(1).unwrap();
        reader.create_savepoint();
        reader.read_bytes(2).unwrap();
        reader.restore_savepoint();
        let after_first = reader.position();
        reader.restore_savepoint();
        assert_eq!(reader.position(), after_first);
    }

    #[test]
    fn underflow_signals_buffer_underflow_error() {
        let buf = [1u8];
        let mut reader = BitReader::new(&buf);
        let err = reader.read_bytes(2).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::BufferUnderflow);
    }

    #[test]
    fn big_unsigned_round_trip_big_endian() {
        let buf = [0x12, 0x34, 0x56];
        let mut reader = BitReader::new(&buf);
        let v = reader.read_big_unsigned(24, Endian::Big).unwrap();
        assert_eq!(v.as_be_bytes(), &[0x12, 0x34, 0x56]);
    }
}
