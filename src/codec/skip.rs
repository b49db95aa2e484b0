//! Skip bindings (spec.md §4.5 "Skip"). Produces no field value; callers in
//! `engine.rs` do not assign its result to any record slot.

use crate::bits::{BitReader, BitWriter};
use crate::engine::Engine;
use crate::template::Binding;
use crate::value::{FieldValue, Record};
use crate::{Error, Result};

use super::Codec;

pub struct SkipCodec;

impl Codec for SkipCodec {
    fn decode(
        &self,
        reader: &mut BitReader,
        binding: &Binding,
        engine: &Engine,
        root: &Record,
        prefix: Option<i64>,
    ) -> Result<FieldValue> {
        let b = match binding {
            Binding::Skip(b) => b,
            _ => return Err(Error::codec("skip codec invoked on a non-skip binding")),
        };
        if let Some(bit_size) = &b.bit_size {
            let n = engine.eval(bit_size, root, prefix)?.as_u32()?;
            reader.skip_bits(n)?;
        } else if let Some(terminator) = b.terminator {
            reader.skip_until_terminator(terminator, b.consume_terminator)?;
        }
        Ok(FieldValue::None)
    }

    fn encode(
        &self,
        writer: &mut BitWriter,
        binding: &Binding,
        engine: &Engine,
        root: &Record,
        _value: &FieldValue,
    ) -> Result<()> {
        let b = match binding {
            Binding::Skip(b) => b,
            _ => return Err(Error::codec("skip codec invoked on a non-skip binding")),
        };
        if let Some(bit_size) = &b.bit_size {
            let n = engine.eval(bit_size, root, None)?.as_u32()?;
            writer.skip_bits(n);
        } else if b.consume_terminator {
            if let Some(terminator) = b.terminator {
                writer.write_bytes(&[terminator]);
            }
        }
        Ok(())
    }
}
