//! Checksum bindings (spec.md §4.5 "Checksum").
//!
//! Unlike every other kind, a `Checksum` binding is not walked through the
//! per-field loop in `engine.rs` — spec.md §4.3 step 3 routes it to a
//! dedicated template slot instead, since computing it requires the full
//! span of bytes the rest of the walk produced. `engine.rs` calls
//! [`reserve`]/[`verify_and_consume`]/[`compute_and_patch`] directly; the
//! [`ChecksumCodec`] `Codec` impl exists so the kind still has an entry in
//! the registry like every other binding kind (spec.md §4.4), even though
//! the engine's checksum handling bypasses generic dispatch.

use crate::bits::{BitReader, BitWriter};
use crate::engine::Engine;
use crate::template::{Binding, ChecksumBinding};
use crate::value::{FieldValue, Record};
use crate::{Error, Result};

use super::Codec;

fn width_bytes(binding: &ChecksumBinding) -> Result<usize> {
    binding
        .target
        .bit_width()
        .map(|w| (w / 8) as usize)
        .ok_or_else(|| Error::template("checksum target type has no fixed width"))
}

/// Reads the recorded checksum and verifies it against a freshly computed
/// value over `[msgStart + skipStart, totalBytes - skipEnd)` (spec.md §4.5
/// Checksum decode), where `totalBytes` is measured from `msgStart`. Called
/// once the rest of the template's fields have been decoded, so
/// `reader.position()` is exactly `totalBytes - skipEnd` for a tail-placed
/// checksum (spec.md invariant I2).
///
/// `msg_start` is the byte offset this message's header began at within
/// `reader.buffer()` — 0 for a standalone decode, but nonzero for the
/// second and later messages of a `Dispatcher::parse_all` scan, since the
/// reader is shared across the whole stream while `skipStart`/`skipEnd` are
/// defined relative to the message, not the buffer.
pub fn verify_and_consume(
    reader: &mut BitReader,
    binding: &ChecksumBinding,
    engine: &Engine,
    msg_start: usize,
) -> Result<FieldValue> {
    let width = width_bytes(binding)?;
    let span_end = reader.position();
    let span = &reader.buffer()[msg_start + binding.skip_start..span_end];
    let algorithm = engine.checksum_algorithm(&binding.algorithm)?;
    let expected = algorithm.compute(span, binding.init);
    let stored = reader.read_unsigned_bits((width * 8) as u32, binding.byte_order)?;
    if stored != expected {
        return Err(Error::decode(format!(
            "checksum mismatch: expected 0x{expected:x}, stored 0x{stored:x}"
        ))
        .with_field(binding.field_name.clone()));
    }
    Ok(FieldValue::Unsigned(stored))
}

/// Writes `width` zero bytes as a placeholder and returns the byte offset
/// they start at, for [`compute_and_patch`] to fill in later (spec.md §4.6
/// "the checksum slot is reserved during the walk").
pub fn reserve(writer: &mut BitWriter, binding: &ChecksumBinding) -> Result<usize> {
    let width = width_bytes(binding)?;
    let at = writer.byte_position();
    writer.write_bytes(&crate::std::vec![0u8; width]);
    Ok(at)
}

/// Computes the checksum over `[skipStart, len(writer) - skipEnd)` and
/// back-patches it into the bytes reserved by [`reserve`] (spec.md §4.6).
pub fn compute_and_patch(
    writer: &mut BitWriter,
    binding: &ChecksumBinding,
    reserved_at: usize,
    engine: &Engine,
) -> Result<()> {
    let width = width_bytes(binding)?;
    let total = writer.byte_position();
    let span_end = total.saturating_sub(binding.skip_end);
    let span = writer.as_bytes()[binding.skip_start..span_end].to_vec();
    let algorithm = engine.checksum_algorithm(&binding.algorithm)?;
    let value = algorithm.compute(&span, binding.init);
    let bytes = match binding.byte_order {
        crate::types::Endian::Big => value.to_be_bytes()[8 - width..].to_vec(),
        crate::types::Endian::Little => {
            let mut be = value.to_be_bytes()[8 - width..].to_vec();
            be.reverse();
            be
        }
    };
    writer.patch_bytes(reserved_at, &bytes);
    Ok(())
}

pub struct ChecksumCodec;

impl Codec for ChecksumCodec {
    fn decode(
        &self,
        reader: &mut BitReader,
        binding: &Binding,
        engine: &Engine,
        _root: &Record,
        _prefix: Option<i64>,
    ) -> Result<FieldValue> {
        match binding {
            // Unreachable via the engine's generic dispatch (a `Checksum`
            // binding never lands in `template.fields`, see
            // `template/builder.rs`); `msg_start = 0` only matters for a
            // hypothetical direct caller decoding from the start of its own
            // buffer.
            Binding::Checksum(b) => verify_and_consume(reader, b, engine, 0),
            _ => Err(Error::codec("checksum codec invoked on a non-checksum binding")),
        }
    }

    fn encode(
        &self,
        writer: &mut BitWriter,
        binding: &Binding,
        _engine: &Engine,
        _root: &Record,
        _value: &FieldValue,
    ) -> Result<()> {
        match binding {
            Binding::Checksum(b) => reserve(writer, b).map(|_| ()),
            _ => Err(Error::codec("checksum codec invoked on a non-checksum binding")),
        }
    }
}
