#![cfg_attr(not(feature = "std"), no_std)]

//! # Boxon
//!
//! A declarative, bit-level message codec: decode raw bytes into templated
//! instances and re-encode them byte-identically, without hand-writing a
//! parser per message type.
//!
//! A [`template::Template`] declares a message's shape — a header, an
//! ordered list of field [`template::Binding`]s, and an optional checksum —
//! built once via [`template::TemplateBuilder`] and driven thereafter by an
//! [`engine::Engine`]. Decoding walks a [`bits::BitReader`] over the
//! template's bindings, dispatching each to the matching entry in a
//! [`codec::CodecRegistry`]; encoding is the mirror image over a
//! [`bits::BitWriter`]. A [`dispatcher::Dispatcher`] picks the right
//! template for an incoming buffer by matching its header bytes.
//!
//! ## Using with `std`
//!
//! This library is `no-std` compatible by default (with `alloc`). To use
//! `std`-only features (e.g. `Template::describe_json`), add the `std`
//! feature:
//!
//! ```toml
//! boxon = { version = "0.1", features = ["std"] }
//! ```

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(not(feature = "std"))]
pub(crate) use alloc as std;
#[cfg(feature = "std")]
pub(crate) use std;

#[macro_use]
mod macros;

pub mod bits;
pub mod checksum;
pub mod codec;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod eval;
pub mod logging;
pub mod reflect;
pub mod template;
pub mod types;
pub mod value;

pub use engine::{Engine, EngineBuilder};
pub use error::{Error, ErrorKind, Result};
pub use value::{FieldValue, Record};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::{BitReader, BitWriter, Charset};
    use crate::checksum::ChecksumAlgorithm;
    use crate::template::{
        BindingCommon, Binding, ChecksumBinding, Header, IntegerBinding, TemplateBuilder,
    };
    use crate::types::{Endian, Primitive};

    /// spec.md §8 scenario 1: fixed header + checksum, end to end through
    /// the public `Engine` API.
    #[test]
    fn header_and_checksum_round_trip() {
        let header = Header::from_strings(&["+B"], None, Charset::UsAscii).unwrap();
        let checksum = ChecksumBinding {
            field_name: "crc".into(),
            target: Primitive::UShort,
            byte_order: Endian::Big,
            skip_start: 0,
            skip_end: 2,
            algorithm: "CRC-16/CCITT-FALSE".into(),
            init: 0xFFFF,
        };
        let evaluator = crate::eval::DefaultEvaluator::new();
        let template = TemplateBuilder::new("Minimal")
            .header(header)
            .field(Binding::Integer(IntegerBinding {
                common: BindingCommon::new("code"),
                bit_size: "8".into(),
                byte_order: Endian::Big,
                target: Primitive::UByte,
            }))
            .unwrap()
            .field(Binding::Checksum(checksum))
            .unwrap()
            .build(&evaluator)
            .unwrap();

        let engine = Engine::builder().with_template(template).build().unwrap();

        let mut writer = BitWriter::new();
        let mut record = Record::new("Minimal");
        record.set("code", FieldValue::Unsigned(0x42));
        engine
            .encode_template("Minimal", &mut writer, &record)
            .unwrap();
        let bytes = writer.into_bytes();

        let mut reader = BitReader::new(&bytes);
        let decoded = engine.decode_template("Minimal", &mut reader).unwrap();
        assert_eq!(decoded.get("code"), Some(&FieldValue::Unsigned(0x42)));
        assert!(matches!(decoded.get("crc"), Some(FieldValue::Unsigned(_))));

        let algorithm = crate::checksum::crc16::Crc16CcittFalse;
        assert_eq!(algorithm.name(), "CRC-16/CCITT-FALSE");
    }

    /// spec.md §8 scenario 3: a terminator-delimited string that consumes
    /// its terminator, followed by a plain byte field.
    #[test]
    fn scenario_3_terminated_string_consume() {
        use crate::template::StringTerminatedBinding;

        let evaluator = crate::eval::DefaultEvaluator::new();
        let template = TemplateBuilder::new("Greeting")
            .header(Header::from_strings(&[""], None, Charset::Utf8).unwrap())
            .field(Binding::StringTerminated(StringTerminatedBinding {
                common: BindingCommon::new("text"),
                terminator: b',',
                consume_terminator: true,
                charset: Charset::Utf8,
            }))
            .unwrap()
            .field(Binding::Integer(IntegerBinding {
                common: BindingCommon::new("tail"),
                bit_size: "8".into(),
                byte_order: Endian::Big,
                target: Primitive::UByte,
            }))
            .unwrap()
            .build(&evaluator)
            .unwrap();

        let engine = Engine::builder().with_template(template).build().unwrap();
        let bytes = [0x68, 0x65, 0x6C, 0x6C, 0x6F, 0x2C, 0x2A];

        let mut reader = BitReader::new(&bytes);
        let decoded = engine.decode_template("Greeting", &mut reader).unwrap();
        assert_eq!(decoded.get("text"), Some(&FieldValue::Str("hello".into())));
        assert_eq!(decoded.get("tail"), Some(&FieldValue::Unsigned(0x2A)));

        let mut writer = BitWriter::new();
        engine
            .encode_template("Greeting", &mut writer, &decoded)
            .unwrap();
        assert_eq!(writer.into_bytes(), bytes);
    }

    /// spec.md §8 scenario 4 / invariant I5: a field guarded by a false
    /// condition consumes zero bits and stays at its zero value.
    #[test]
    fn scenario_4_conditional_field() {
        let evaluator = crate::eval::DefaultEvaluator::new();
        let mut tail_common = BindingCommon::new("tail");
        tail_common.condition = Some("(mask & 0x04) != 0".into());
        let template = TemplateBuilder::new("Conditional")
            .header(Header::from_strings(&[""], None, Charset::Utf8).unwrap())
            .field(Binding::Integer(IntegerBinding {
                common: BindingCommon::new("mask"),
                bit_size: "8".into(),
                byte_order: Endian::Big,
                target: Primitive::UByte,
            }))
            .unwrap()
            .field(Binding::Integer(IntegerBinding {
                common: tail_common,
                bit_size: "16".into(),
                byte_order: Endian::Big,
                target: Primitive::UShort,
            }))
            .unwrap()
            .build(&evaluator)
            .unwrap();

        let engine = Engine::builder().with_template(template).build().unwrap();

        let present = [0x04, 0x12, 0x34];
        let mut reader = BitReader::new(&present);
        let decoded = engine.decode_template("Conditional", &mut reader).unwrap();
        assert_eq!(decoded.get("mask"), Some(&FieldValue::Unsigned(4)));
        assert_eq!(decoded.get("tail"), Some(&FieldValue::Unsigned(0x1234)));

        let absent = [0x00];
        let mut reader = BitReader::new(&absent);
        let decoded = engine.decode_template("Conditional", &mut reader).unwrap();
        assert_eq!(decoded.get("mask"), Some(&FieldValue::Unsigned(0)));
        assert_eq!(decoded.get("tail"), Some(&FieldValue::None));
        assert_eq!(reader.position(), 1);
    }

    /// spec.md §8 scenario 5: a prefix-selected polymorphic array element,
    /// exercising property P5 (prefix read exactly once before any
    /// alternative's predicate runs).
    #[test]
    fn scenario_5_polymorphic_array_element() {
        use crate::template::{ArrayObjectsBinding, VariantSelector};

        let evaluator = crate::eval::DefaultEvaluator::new();
        let headerless = || Header::from_strings(&[""], None, Charset::Utf8).unwrap();

        let variant_a = TemplateBuilder::new("A")
            .header(headerless())
            .field(Binding::Integer(IntegerBinding {
                common: BindingCommon::new("x"),
                bit_size: "8".into(),
                byte_order: Endian::Big,
                target: Primitive::UByte,
            }))
            .unwrap()
            .build(&evaluator)
            .unwrap();
        let variant_b = TemplateBuilder::new("B")
            .header(headerless())
            .field(Binding::Integer(IntegerBinding {
                common: BindingCommon::new("y"),
                bit_size: "16".into(),
                byte_order: Endian::Big,
                target: Primitive::UShort,
            }))
            .unwrap()
            .build(&evaluator)
            .unwrap();

        let selector = VariantSelector {
            prefix_bits: 8,
            alternatives: crate::std::vec![
                ("prefix==1".to_string(), 1, "A".to_string()),
                ("prefix==2".to_string(), 2, "B".to_string()),
            ],
            default_template: None,
        };
        let msg = TemplateBuilder::new("Msg")
            .header(Header::from_strings(&["M"], None, Charset::UsAscii).unwrap())
            .field(Binding::Integer(IntegerBinding {
                common: BindingCommon::new("n"),
                bit_size: "8".into(),
                byte_order: Endian::Big,
                target: Primitive::UByte,
            }))
            .unwrap()
            .field(Binding::ArrayObjects(ArrayObjectsBinding {
                common: BindingCommon::new("items"),
                element_type: String::new(),
                count: "n".into(),
                selector: Some(selector),
            }))
            .unwrap()
            .build(&evaluator)
            .unwrap();

        let engine = Engine::builder()
            .with_template(msg)
            .with_template(variant_a)
            .with_template(variant_b)
            .build()
            .unwrap();

        let bytes = [b'M', 0x02, 0x01, 0x0A, 0x02, 0x00, 0xFF];
        let mut reader = BitReader::new(&bytes);
        let decoded = engine.decode_template("Msg", &mut reader).unwrap();
        assert_eq!(decoded.get("n"), Some(&FieldValue::Unsigned(2)));
        let items = decoded.get("items").unwrap().as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_object().unwrap().get("x"), Some(&FieldValue::Unsigned(10)));
        assert_eq!(items[1].as_object().unwrap().get("y"), Some(&FieldValue::Unsigned(255)));

        let mut writer = BitWriter::new();
        engine.encode_template("Msg", &mut writer, &decoded).unwrap();
        assert_eq!(writer.into_bytes(), bytes);
    }

    /// spec.md §8 scenario 6: an `Evaluate` field computed after the main
    /// walk from an already-decoded string field, consuming no bytes.
    #[test]
    fn scenario_6_evaluated_field() {
        use crate::template::{EvaluateBinding, StringFixedBinding};

        let evaluator = crate::eval::DefaultEvaluator::new();
        let template = TemplateBuilder::new("Evaluated")
            .header(Header::from_strings(&[""], None, Charset::Utf8).unwrap())
            .field(Binding::StringFixed(StringFixedBinding {
                common: BindingCommon::new("messageHeader"),
                byte_size: "4".into(),
                charset: Charset::Utf8,
            }))
            .unwrap()
            .field(Binding::Evaluate(EvaluateBinding {
                field_name: "buffered".into(),
                expression: "messageHeader.startsWith('+B')".into(),
            }))
            .unwrap()
            .build(&evaluator)
            .unwrap();

        let engine = Engine::builder().with_template(template).build().unwrap();
        let bytes = [b'+', b'B', b'1', b'2'];

        let mut reader = BitReader::new(&bytes);
        let decoded = engine.decode_template("Evaluated", &mut reader).unwrap();
        assert_eq!(
            decoded.get("messageHeader"),
            Some(&FieldValue::Str("+B12".into()))
        );
        assert_eq!(decoded.get("buffered"), Some(&FieldValue::Bool(true)));

        let mut writer = BitWriter::new();
        engine
            .encode_template("Evaluated", &mut writer, &decoded)
            .unwrap();
        assert_eq!(writer.into_bytes(), bytes);
    }
}
