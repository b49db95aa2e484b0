//! Fixed-length and terminator-delimited string bindings (spec.md §4.5
//! "String (fixed)", "String (terminated)").

use crate::bits::{BitReader, BitWriter};
use crate::engine::Engine;
use crate::template::Binding;
use crate::value::{FieldValue, Record};
use crate::{Error, Result};

use super::Codec;

pub struct StringFixedCodec;

impl Codec for StringFixedCodec {
    fn decode(
        &self,
        reader: &mut BitReader,
        binding: &Binding,
        engine: &Engine,
        root: &Record,
        prefix: Option<i64>,
    ) -> Result<FieldValue> {
        let b = match binding {
            Binding::StringFixed(b) => b,
            _ => return Err(Error::codec("string-fixed codec invoked on a wrong binding")),
        };
        let size = engine.eval(&b.byte_size, root, prefix)?.as_u32()? as usize;
        let text = reader.read_text(size, b.charset)?;
        engine.apply_converter(binding, root, prefix, FieldValue::Str(text))
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
            Binding::StringFixed(b) => b,
            _ => return Err(Error::codec("string-fixed codec invoked on a wrong binding")),
        };
        let value = engine.apply_converter_inverse(binding, root, None, value)?;
        let text = value.as_str()?;
        let size = engine.eval(&b.byte_size, root, None)?.as_u32()? as usize;
        let bytes = b.charset.encode(text);
        // Open question (see DESIGN.md): truncation, not error, when the
        // encoded text is longer than byteSize.
        writer.write_bytes(&bytes[..bytes.len().min(size)]);
        Ok(())
    }
}

pub struct StringTerminatedCodec;

impl Codec for StringTerminatedCodec {
    fn decode(
        &self,
        reader: &mut BitReader,
        binding: &Binding,
        engine: &Engine,
        root: &Record,
        prefix: Option<i64>,
    ) -> Result<FieldValue> {
        let b = match binding {
            Binding::StringTerminated(b) => b,
            _ => {
                return Err(Error::codec(
                    "string-terminated codec invoked on a wrong binding",
                ))
            }
        };
        let text = reader.read_text_until_terminator(b.terminator, b.charset)?;
        if b.consume_terminator {
            reader.consume_byte(b.terminator)?;
        }
        engine.apply_converter(binding, root, prefix, FieldValue::Str(text))
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
            Binding::StringTerminated(b) => b,
            _ => {
                return Err(Error::codec(
                    "string-terminated codec invoked on a wrong binding",
                ))
            }
        };
        let value = engine.apply_converter_inverse(binding, root, None, value)?;
        let text = value.as_str()?;
        writer.write_text(text, b.charset);
        if b.consume_terminator {
            writer.write_bytes(&[b.terminator]);
        }
        Ok(())
    }
}
