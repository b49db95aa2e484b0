//! `Evaluate` bindings (spec.md §4.5 "Evaluate"). These never run through
//! the main per-field walk in `engine.rs` — they're applied afterward, in
//! declared `evaluatedFields` order — but a `Codec` impl is still provided
//! so the kind participates in the same registry as every other binding.

use crate::bits::{BitReader, BitWriter};
use crate::engine::Engine;
use crate::template::Binding;
use crate::value::{FieldValue, Record};
use crate::{Error, Result};

use super::Codec;

pub struct EvaluateCodec;

impl Codec for EvaluateCodec {
    fn decode(
        &self,
        _reader: &mut BitReader,
        binding: &Binding,
        engine: &Engine,
        root: &Record,
        prefix: Option<i64>,
    ) -> Result<FieldValue> {
        let b = match binding {
            Binding::Evaluate(b) => b,
            _ => return Err(Error::codec("evaluate codec invoked on a non-evaluate binding")),
        };
        let value = engine.eval(&b.expression, root, prefix)?;
        Ok(FieldValue::from(&value))
    }

    fn encode(
        &self,
        _writer: &mut BitWriter,
        binding: &Binding,
        _engine: &Engine,
        _root: &Record,
        _value: &FieldValue,
    ) -> Result<()> {
        match binding {
            Binding::Evaluate(_) => Ok(()),
            _ => Err(Error::codec("evaluate codec invoked on a non-evaluate binding")),
        }
    }
}
