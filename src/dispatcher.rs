//! The multi-message dispatcher (spec.md §4.7, component C8): scans a byte
//! stream for the longest-matching header among all registered templates,
//! parses concatenated messages with per-message error isolation, and
//! re-composes a [`Record`] back into bytes through its template.

use crate::bits::{BitReader, BitWriter};
use crate::engine::Engine;
use crate::std::vec::Vec;
use crate::template::Template;
use crate::value::Record;
use crate::{Error, Result};

/// One failed message: the error raised and the bytes the attempt started
/// from (spec.md §4.7 step c: "append `(error, originatingBytes)`").
pub struct ParseError {
    pub error: Error,
    pub offset: usize,
}

/// The result of scanning a whole buffer (spec.md §4.7 `parseAll`).
pub struct ParseOutcome {
    pub messages: Vec<Record>,
    pub errors: Vec<ParseError>,
}

pub struct Dispatcher<'a> {
    engine: &'a Engine,
}

impl<'a> Dispatcher<'a> {
    pub fn new(engine: &'a Engine) -> Self {
        Self { engine }
    }

    /// Finds the registered template whose `start` sequence is the longest
    /// match at `bytes[pos..]` (spec.md §4.7 step b, invariant I1 "longest
    /// match by byte length"). Returns `None` if no template matches.
    ///
    /// Headerless templates (zero-length `start`, the convention for a
    /// nested `Object`/`Array-of-objects` recursion target — see
    /// `engine.rs`'s `EngineBuilder::build`) are never dispatch candidates:
    /// an empty sequence matches every position, so treating it as a real
    /// header would make every offset in every buffer "match".
    fn best_match_at(&self, bytes: &[u8], pos: usize) -> Option<&'a Template> {
        self.engine
            .templates()
            .iter()
            .filter(|t| t.header.longest_header_length() > 0)
            .filter(|t| t.header.longest_match_at(bytes, pos).is_some())
            .max_by_key(|t| t.header.longest_match_at(bytes, pos).map(<[u8]>::len).unwrap_or(0))
    }

    /// Scans `bytes` for concatenated messages, advancing past each
    /// successfully decoded one and skipping forward one byte past any
    /// span that fails to decode, so one bad message never corrupts the
    /// rest of the stream (spec.md §4.7, property P9).
    pub fn parse_all(&self, bytes: &[u8]) -> ParseOutcome {
        let mut messages = Vec::new();
        let mut errors = Vec::new();
        let mut p = 0usize;

        while p < bytes.len() {
            let template = match self.best_match_at(bytes, p) {
                Some(template) => template,
                None => {
                    p += 1;
                    continue;
                }
            };

            let mut reader = BitReader::new(bytes);
            reader.set_position(p);
            match self.engine.decode_template(template.name(), &mut reader) {
                Ok(record) => {
                    messages.push(record);
                    p = reader.position().max(p + 1);
                }
                Err(error) => {
                    log::warn!(
                        target: crate::logging::BOXON_LOG_TARGET,
                        "failed to decode template {} at offset {p}: {error}",
                        template.name()
                    );
                    errors.push(ParseError { error, offset: p });
                    p += 1;
                }
            }
        }

        ParseOutcome { messages, errors }
    }

    /// Encodes `record` through its own template (spec.md §4.7 `compose`).
    pub fn compose(&self, record: &Record) -> Result<Vec<u8>> {
        let mut writer = BitWriter::new();
        self.engine
            .encode_template(&record.template_name, &mut writer, record)?;
        Ok(writer.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::Charset;
    use crate::eval::DefaultEvaluator;
    use crate::template::{BindingCommon, Binding, Header, IntegerBinding, TemplateBuilder};
    use crate::types::{Endian, Primitive};
    use crate::FieldValue;

    fn byte_template(name: &str, start: &str, bit_size: &str) -> Template {
        let evaluator = DefaultEvaluator::new();
        let header = Header::from_strings(&[start], None, Charset::UsAscii).unwrap();
        TemplateBuilder::new(name)
            .header(header)
            .field(Binding::Integer(IntegerBinding {
                common: BindingCommon::new("code"),
                bit_size: bit_size.into(),
                byte_order: Endian::Big,
                target: Primitive::UByte,
            }))
            .unwrap()
            .build(&evaluator)
            .unwrap()
    }

    fn one_byte_template(name: &str, start: &str) -> Template {
        byte_template(name, start, "8")
    }

    fn headerless_template(name: &str) -> Template {
        let evaluator = DefaultEvaluator::new();
        let header = Header::from_strings(&[""], None, Charset::Utf8).unwrap();
        TemplateBuilder::new(name)
            .header(header)
            .field(Binding::Integer(IntegerBinding {
                common: BindingCommon::new("code"),
                bit_size: "8".into(),
                byte_order: Endian::Big,
                target: Primitive::UByte,
            }))
            .unwrap()
            .build(&evaluator)
            .unwrap()
    }

    /// A headerless template (the convention for an `Object`/
    /// `Array-of-objects` recursion target, spec.md §4.6) is never picked
    /// as a top-level dispatch match: an empty `start` matches every
    /// position, so it must not shadow real templates or get selected on
    /// its own.
    #[test]
    fn headerless_templates_are_never_dispatch_candidates() {
        let engine = Engine::builder()
            .with_template(headerless_template("Nested"))
            .with_template(one_byte_template("Real", "!"))
            .build()
            .unwrap();
        let dispatcher = Dispatcher::new(&engine);

        let bytes = [b'!', 0x09];
        let outcome = dispatcher.parse_all(&bytes);
        assert_eq!(outcome.messages.len(), 1);
        assert_eq!(outcome.messages[0].template_name, "Real");

        // With no real template matching at all, a headerless template
        // must not be picked up either: the whole buffer is skipped byte
        // by byte and reported with forward progress, not silently parsed
        // as "Nested".
        let unmatched = [0xAA, 0xBB];
        let outcome = dispatcher.parse_all(&unmatched);
        assert!(outcome.messages.is_empty());
        assert!(outcome.errors.is_empty());
    }

    /// spec.md P4: a longer, more specific header wins over a shorter
    /// prefix shared by another template.
    #[test]
    fn longest_header_wins() {
        let engine = Engine::builder()
            .with_template(one_byte_template("Short", "+"))
            .with_template(one_byte_template("Long", "+B"))
            .build()
            .unwrap();
        let dispatcher = Dispatcher::new(&engine);

        let bytes = [b'+', b'B', 0x42];
        let outcome = dispatcher.parse_all(&bytes);
        assert_eq!(outcome.errors.len(), 0);
        assert_eq!(outcome.messages.len(), 1);
        assert_eq!(outcome.messages[0].template_name, "Long");
    }

    /// spec.md P9: one failing message (its header matches but its body
    /// runs past the end of the available bytes) does not block decoding a
    /// later, unrelated message with a different header.
    #[test]
    fn one_bad_message_does_not_corrupt_the_rest() {
        let engine = Engine::builder()
            .with_template(byte_template("Trunc", "+B", "64"))
            .with_template(one_byte_template("Msg", "!C"))
            .build()
            .unwrap();
        let dispatcher = Dispatcher::new(&engine);

        // "Trunc" needs 8 bytes after its header but only 5 bytes remain
        // in the whole buffer; "Msg" afterwards is complete.
        let bytes = [b'+', b'B', 0x01, 0x02, b'!', b'C', 0x07];
        let outcome = dispatcher.parse_all(&bytes);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].offset, 0);
        assert_eq!(outcome.messages.len(), 1);
        assert_eq!(
            outcome.messages[0].get("code"),
            Some(&FieldValue::Unsigned(0x07))
        );
    }

    fn checksummed_template(name: &str, start: &str) -> Template {
        use crate::template::ChecksumBinding;

        let evaluator = DefaultEvaluator::new();
        let header = Header::from_strings(&[start], None, Charset::UsAscii).unwrap();
        TemplateBuilder::new(name)
            .header(header)
            .field(Binding::Integer(IntegerBinding {
                common: BindingCommon::new("code"),
                bit_size: "8".into(),
                byte_order: Endian::Big,
                target: Primitive::UByte,
            }))
            .unwrap()
            .field(Binding::Checksum(ChecksumBinding {
                field_name: "crc".into(),
                target: Primitive::UShort,
                byte_order: Endian::Big,
                skip_start: 0,
                skip_end: 2,
                algorithm: "CRC-16/CCITT-FALSE".into(),
                init: 0xFFFF,
            }))
            .unwrap()
            .build(&evaluator)
            .unwrap()
    }

    /// A checksummed message that is not the first in a concatenated
    /// stream must still verify correctly: `skipStart`/`skipEnd` are
    /// relative to the individual message, not to the whole buffer the
    /// shared `BitReader` is scanning (spec.md invariant I2 combined with
    /// property P9).
    #[test]
    fn checksum_verifies_for_every_message_in_a_concatenated_stream() {
        let engine = Engine::builder()
            .with_template(checksummed_template("Msg", "+B"))
            .build()
            .unwrap();
        let dispatcher = Dispatcher::new(&engine);

        let mut first = Record::new("Msg");
        first.set("code", FieldValue::Unsigned(1));
        let mut second = Record::new("Msg");
        second.set("code", FieldValue::Unsigned(2));

        let mut bytes = dispatcher.compose(&first).unwrap();
        bytes.extend(dispatcher.compose(&second).unwrap());

        let outcome = dispatcher.parse_all(&bytes);
        assert!(outcome.errors.is_empty(), "unexpected errors: {:?}", outcome.errors.iter().map(|e| e.error.to_string()).collect::<Vec<_>>());
        assert_eq!(outcome.messages.len(), 2);
        assert_eq!(outcome.messages[0].get("code"), Some(&FieldValue::Unsigned(1)));
        assert_eq!(outcome.messages[1].get("code"), Some(&FieldValue::Unsigned(2)));
    }

    #[test]
    fn compose_round_trips_through_parse_all() {
        let engine = Engine::builder()
            .with_template(one_byte_template("Msg", "+B"))
            .build()
            .unwrap();
        let dispatcher = Dispatcher::new(&engine);

        let mut record = Record::new("Msg");
        record.set("code", FieldValue::Unsigned(9));
        let bytes = dispatcher.compose(&record).unwrap();

        let outcome = dispatcher.parse_all(&bytes);
        assert_eq!(outcome.messages.len(), 1);
        assert_eq!(outcome.messages[0].get("code"), Some(&FieldValue::Unsigned(9)));
    }
}
