//! Bitmap bindings (spec.md §4.5 "Bitmap").

use crate::bits::{BitReader, BitWriter};
use crate::engine::Engine;
use crate::template::Binding;
use crate::types::Endian;
use crate::value::{FieldValue, Record};
use crate::{Error, Result};

use super::Codec;

pub struct BitmapCodec;

impl Codec for BitmapCodec {
    fn decode(
        &self,
        reader: &mut BitReader,
        binding: &Binding,
        engine: &Engine,
        root: &Record,
        prefix: Option<i64>,
    ) -> Result<FieldValue> {
        let b = match binding {
            Binding::Bitmap(b) => b,
            _ => return Err(Error::codec("bitmap codec invoked on a non-bitmap binding")),
        };
        let n = engine.eval(&b.bit_size, root, prefix)?.as_u32()?;
        let mut bits = reader.read_bits(n)?;
        if b.bit_order == Endian::Little {
            bits = bits.reversed();
        }
        engine.apply_converter(binding, root, prefix, FieldValue::Bitmap(bits))
    }

    fn encode(
        &self,
        writer: &mut BitWriter,
        binding: &Binding,
        engine: &Engine,
        root: &Record,
        value: &FieldValue,
    ) -> Result<()> {
        let b = match binding {
            Binding::Bitmap(b) => b,
            _ => return Err(Error::codec("bitmap codec invoked on a non-bitmap binding")),
        };
        let value = engine.apply_converter_inverse(binding, root, None, value)?;
        let bits = value.as_bitmap()?;
        let ordered = if b.bit_order == Endian::Little {
            bits.reversed()
        } else {
            bits.clone()
        };
        writer.write_bits(&ordered);
        Ok(())
    }
}
