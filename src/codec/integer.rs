//! Integer-of-bits and fixed-width integer bindings (spec.md §4.5
//! "Integer-of-bits", "Fixed-width integer").

use crate::bits::{BitReader, BitWriter};
use crate::template::{Binding, IntegerBinding};
use crate::value::{FieldValue, Record};
use crate::{Error, Result};

use super::Codec;
use crate::engine::Engine;

pub struct IntegerCodec;

fn as_integer_binding(binding: &Binding) -> Result<&IntegerBinding> {
    match binding {
        Binding::Integer(b) => Ok(b),
        _ => Err(Error::codec("integer codec invoked on a non-integer binding")),
    }
}

impl Codec for IntegerCodec {
    fn decode(
        &self,
        reader: &mut BitReader,
        binding: &Binding,
        engine: &Engine,
        root: &Record,
        prefix: Option<i64>,
    ) -> Result<FieldValue> {
        let b = as_integer_binding(binding)?;
        let width = engine
            .eval(&b.bit_size, root, prefix)?
            .as_u32()
            .map_err(|e| e.with_field(b.common.field_name.clone()))?;
        if width > 64 {
            let big = reader.read_big_unsigned(width, b.byte_order)?;
            return engine.apply_converter(binding, root, prefix, FieldValue::BigInt(big));
        }
        if width == 0 {
            return Err(Error::annotation("bitSize must be at least 1")
                .with_field(b.common.field_name.clone()));
        }
        let raw = if b.target.is_signed() {
            FieldValue::Signed(reader.read_signed(width, b.byte_order)?)
        } else {
            FieldValue::Unsigned(reader.read_unsigned_bits(width, b.byte_order)?)
        };
        engine.apply_converter(binding, root, prefix, raw)
    }

    fn encode(
        &self,
        writer: &mut BitWriter,
        binding: &Binding,
        engine: &Engine,
        root: &Record,
        value: &FieldValue,
    ) -> Result<()> {
        let b = as_integer_binding(binding)?;
        let value = engine.apply_converter_inverse(binding, root, None, value)?;
        let width = engine.eval(&b.bit_size, root, None)?.as_u32()?;
        match &value {
            FieldValue::BigInt(big) => {
                writer.write_big_unsigned(big, width, b.byte_order)?;
            }
            FieldValue::Signed(v) => {
                check_signed_range(*v, width).map_err(|e| e.with_field(b.common.field_name.clone()))?;
                writer.write_signed(*v, width, b.byte_order);
            }
            FieldValue::Unsigned(v) => {
                check_unsigned_range(*v, width)
                    .map_err(|e| e.with_field(b.common.field_name.clone()))?;
                writer.write_unsigned_bits(*v, width, b.byte_order);
            }
            other => {
                return Err(Error::codec(format!(
                    "integer binding received a non-numeric value: {other:?}"
                )))
            }
        }
        Ok(())
    }
}

/// Enforces spec.md P7: `0 ≤ v < 2^n` (unsigned) / `−2^(n−1) ≤ v < 2^(n−1)`
/// (signed).
fn check_signed_range(v: i64, n: u32) -> Result<()> {
    if n >= 64 {
        return Ok(());
    }
    let bound = 1i64 << (n - 1);
    if v < -bound || v >= bound {
        return Err(Error::encode(format!(
            "value {v} does not fit in a signed {n}-bit field"
        )));
    }
    Ok(())
}

fn check_unsigned_range(v: u64, n: u32) -> Result<()> {
    if n >= 64 {
        return Ok(());
    }
    let bound = 1u64 << n;
    if v >= bound {
        return Err(Error::encode(format!(
            "value {v} does not fit in an unsigned {n}-bit field"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::BindingCommon;
    use crate::types::{Endian, Primitive};

    #[test]
    fn signed_range_rejects_overflow() {
        assert!(check_signed_range(15, 4).is_err());
        assert!(check_signed_range(-8, 4).is_ok());
        assert!(check_signed_range(7, 4).is_ok());
    }

    #[test]
    fn unsigned_range_rejects_overflow() {
        assert!(check_unsigned_range(16, 4).is_err());
        assert!(check_unsigned_range(15, 4).is_ok());
    }

    #[test]
    fn as_integer_binding_rejects_other_kinds() {
        let binding = Binding::Skip(crate::template::SkipBinding {
            bit_size: Some("8".into()),
            terminator: None,
            consume_terminator: false,
        });
        assert!(as_integer_binding(&binding).is_err());
    }

    #[test]
    fn integer_binding_round_trips_via_engine() {
        // Smoke-checks that this module's types line up with the rest of
        // the binding model; full decode/encode behavior is covered by
        // engine.rs's integration tests.
        let _binding = IntegerBinding {
            common: BindingCommon::new("x"),
            bit_size: "8".into(),
            byte_order: Endian::Big,
            target: Primitive::UByte,
        };
    }
}
