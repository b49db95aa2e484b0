//! Object and array-of-objects bindings (spec.md §4.5 "Object",
//! "Array-of-objects"), including variant selection (spec.md §3
//! "Variant-selector").

use crate::bits::{BitReader, BitWriter};
use crate::engine::Engine;
use crate::std::{boxed::Box, string::String, vec::Vec};
use crate::template::{ArrayObjectsBinding, Binding, ObjectBinding, VariantSelector};
use crate::value::{FieldValue, Record};
use crate::{Error, Result};

use super::Codec;

/// Handles both `Object` and `Array-of-objects`, which share everything
/// but the repeat count and the container shape of the result.
pub struct ObjectCodec {
    is_array: bool,
}

impl ObjectCodec {
    pub fn new() -> Self {
        Self { is_array: false }
    }

    pub fn array() -> Self {
        Self { is_array: true }
    }
}

impl Default for ObjectCodec {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves the variant-selector contract (spec.md §3): reads `prefixBits`
/// once (invariant I6), evaluates each alternative's predicate with
/// `prefix` bound, and returns the chosen template name plus the prefix
/// value (so the caller can re-emit it on encode).
fn select_variant(
    reader: &mut BitReader,
    selector: &VariantSelector,
    engine: &Engine,
    root: &Record,
) -> Result<(String, Option<i64>)> {
    let prefix = if selector.prefix_bits > 0 {
        Some(reader.read_unsigned_bits(selector.prefix_bits, crate::types::Endian::Big)? as i64)
    } else {
        None
    };
    for (condition, _, template_name) in &selector.alternatives {
        if engine.eval(condition, root, prefix)?.as_bool()? {
            return Ok((template_name.clone(), prefix));
        }
    }
    match &selector.default_template {
        Some(name) => Ok((name.clone(), prefix)),
        None => Err(Error::decode(
            "no variant alternative matched and no default variant was set",
        )),
    }
}

fn object_decode_one(
    reader: &mut BitReader,
    type_name: &str,
    selector: &Option<VariantSelector>,
    engine: &Engine,
    root: &Record,
) -> Result<FieldValue> {
    let (template_name, _prefix) = match selector {
        Some(selector) => select_variant(reader, selector, engine, root)?,
        None => (String::from(type_name), None),
    };
    let record = engine.decode_template(&template_name, reader)?;
    Ok(FieldValue::Object(Box::new(record)))
}

fn object_encode_one(
    writer: &mut BitWriter,
    type_name: &str,
    selector: &Option<VariantSelector>,
    engine: &Engine,
    value: &FieldValue,
) -> Result<()> {
    let record = value.as_object()?;
    let template_name = if selector.is_some() {
        record.template_name.clone()
    } else {
        String::from(type_name)
    };
    if let Some(selector) = selector {
        if selector.prefix_bits > 0 {
            let prefix_value = selector
                .alternatives
                .iter()
                .find(|(_, _, name)| *name == template_name)
                .map(|(_, prefix_value, _)| *prefix_value)
                .ok_or_else(|| {
                    Error::encode(format!(
                        "no variant alternative declares prefix for template {template_name}"
                    ))
                })?;
            writer.write_unsigned_bits(
                prefix_value as u64,
                selector.prefix_bits,
                crate::types::Endian::Big,
            );
        }
    }
    engine.encode_template(&template_name, writer, record)
}

impl Codec for ObjectCodec {
    fn decode(
        &self,
        reader: &mut BitReader,
        binding: &Binding,
        engine: &Engine,
        root: &Record,
        prefix: Option<i64>,
    ) -> Result<FieldValue> {
        if self.is_array {
            let b = array_binding(binding)?;
            let n = engine.eval(&b.count, root, prefix)?.as_u32()?;
            let mut elements = Vec::with_capacity(n as usize);
            for _ in 0..n {
                elements.push(object_decode_one(
                    reader,
                    &b.element_type,
                    &b.selector,
                    engine,
                    root,
                )?);
            }
            engine.apply_converter(binding, root, prefix, FieldValue::Array(elements))
        } else {
            let b = object_binding(binding)?;
            let value = object_decode_one(reader, &b.type_name, &b.selector, engine, root)?;
            engine.apply_converter(binding, root, prefix, value)
        }
    }

    fn encode(
        &self,
        writer: &mut BitWriter,
        binding: &Binding,
        engine: &Engine,
        root: &Record,
        value: &FieldValue,
    ) -> Result<()> {
        let value = engine.apply_converter_inverse(binding, root, None, value)?;
        if self.is_array {
            let b = array_binding(binding)?;
            let elements = value.as_array()?;
            let expected = engine.eval(&b.count, root, None)?.as_u32()? as usize;
            if elements.len() != expected {
                return Err(Error::codec(format!(
                    "array length {} does not match declared count {expected}",
                    elements.len()
                )));
            }
            for element in elements {
                object_encode_one(writer, &b.element_type, &b.selector, engine, element)?;
            }
            Ok(())
        } else {
            let b = object_binding(binding)?;
            object_encode_one(writer, &b.type_name, &b.selector, engine, &value)
        }
    }
}

fn object_binding(binding: &Binding) -> Result<&ObjectBinding> {
    match binding {
        Binding::Object(b) => Ok(b),
        _ => Err(Error::codec("object codec invoked on a non-object binding")),
    }
}

fn array_binding(binding: &Binding) -> Result<&ArrayObjectsBinding> {
    match binding {
        Binding::ArrayObjects(b) => Ok(b),
        _ => Err(Error::codec(
            "array-objects codec invoked on a non-array-objects binding",
        )),
    }
}
