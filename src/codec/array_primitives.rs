//! Array-of-primitives bindings (spec.md §4.5 "Array-of-primitives").

use crate::bits::{BitReader, BitWriter};
use crate::engine::Engine;
use crate::std::vec::Vec;
use crate::template::{ArrayPrimitivesBinding, Binding};
use crate::types::Primitive;
use crate::value::{FieldValue, Record};
use crate::{Error, Result};

use super::Codec;

pub struct ArrayPrimitivesCodec;

fn as_binding(binding: &Binding) -> Result<&ArrayPrimitivesBinding> {
    match binding {
        Binding::ArrayPrimitives(b) => Ok(b),
        _ => Err(Error::codec(
            "array-primitives codec invoked on a wrong binding",
        )),
    }
}

fn read_one(reader: &mut BitReader, element: Primitive, order: crate::types::Endian) -> Result<FieldValue> {
    let width = element
        .bit_width()
        .ok_or_else(|| Error::annotation("array element type has no wire width"))?;
    Ok(if element.is_float() {
        if width == 32 {
            FieldValue::Float(reader.read_float32(order)?)
        } else {
            FieldValue::Double(reader.read_float64(order)?)
        }
    } else if element.is_signed() {
        FieldValue::Signed(reader.read_signed(width, order)?)
    } else {
        FieldValue::Unsigned(reader.read_unsigned_bits(width, order)?)
    })
}

fn write_one(writer: &mut BitWriter, element: Primitive, order: crate::types::Endian, value: &FieldValue) -> Result<()> {
    let width = element
        .bit_width()
        .ok_or_else(|| Error::annotation("array element type has no wire width"))?;
    match value {
        FieldValue::Float(v) if width == 32 => writer.write_float32(*v, order),
        FieldValue::Double(v) if width == 64 => writer.write_float64(*v, order),
        FieldValue::Signed(v) => writer.write_signed(*v, width, order),
        FieldValue::Unsigned(v) => writer.write_unsigned_bits(*v, width, order),
        other => {
            return Err(Error::codec(format!(
                "array element value does not match declared primitive type: {other:?}"
            )))
        }
    }
    Ok(())
}

impl Codec for ArrayPrimitivesCodec {
    fn decode(
        &self,
        reader: &mut BitReader,
        binding: &Binding,
        engine: &Engine,
        root: &Record,
        prefix: Option<i64>,
    ) -> Result<FieldValue> {
        let b = as_binding(binding)?;
        let n = engine.eval(&b.count, root, prefix)?.as_u32()?;
        let mut elements = Vec::with_capacity(n as usize);
        for _ in 0..n {
            elements.push(read_one(reader, b.element, b.byte_order)?);
        }
        engine.apply_converter(binding, root, prefix, FieldValue::Array(elements))
    }

    fn encode(
        &self,
        writer: &mut BitWriter,
        binding: &Binding,
        engine: &Engine,
        root: &Record,
        value: &FieldValue,
    ) -> Result<()> {
        let b = as_binding(binding)?;
        let value = engine.apply_converter_inverse(binding, root, None, value)?;
        let elements = value.as_array()?;
        let expected = engine.eval(&b.count, root, None)?.as_u32()? as usize;
        if elements.len() != expected {
            return Err(Error::codec(format!(
                "array length {} does not match declared count {expected}",
                elements.len()
            )));
        }
        for element in elements {
            write_one(writer, b.element, b.byte_order, element)?;
        }
        Ok(())
    }
}
