//! The template engine: orchestrates a single message's decode/encode over
//! its ordered bindings (spec.md §4.6, component C7).
//!
//! Built via [`Engine::builder`], mirroring the teacher crate's preference
//! for an explicit builder over global state (spec.md §9 "Static/global
//! state... constructed by a builder").

use crate::bits::{BitReader, BitWriter};
use crate::checksum::{ChecksumAlgorithm, ChecksumRegistry};
use crate::codec::{self, CodecRegistry};
use crate::eval::{DefaultEvaluator, EvalContext, EvalValue, Evaluator};
use crate::std::{boxed::Box, string::String, vec::Vec};
use crate::template::Template;
use crate::value::{FieldValue, Record};
use crate::{Error, Result};

pub struct Engine {
    templates: Vec<Template>,
    codecs: CodecRegistry,
    evaluator: Box<dyn Evaluator>,
    checksums: ChecksumRegistry,
}

impl Engine {
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn template(&self, name: &str) -> Result<&Template> {
        self.templates
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| Error::template(format!("no such template: {name}")))
    }

    pub fn checksum_algorithm(&self, name: &str) -> Result<&dyn ChecksumAlgorithm> {
        self.checksums.get(name)
    }

    /// Evaluates `expression` against the in-progress `root` record, with
    /// `prefix` bound when called during variant selection (spec.md §6).
    pub fn eval(&self, expression: &str, root: &Record, prefix: Option<i64>) -> Result<EvalValue> {
        let mut ctx = EvalContext::new().with_root(root);
        if let Some(p) = prefix {
            ctx = ctx.with_prefix(p);
        }
        self.evaluator.eval(expression, &ctx)
    }

    /// Applies a binding's converter-chooser/converter (decode direction),
    /// then its validator, per invariant I3 ("validation applies after
    /// decode conversion").
    pub fn apply_converter(
        &self,
        binding: &crate::template::Binding,
        root: &Record,
        prefix: Option<i64>,
        raw: FieldValue,
    ) -> Result<FieldValue> {
        let common = common_of(binding);
        let converted = match common.and_then(|c| self.choose_converter(c, root, prefix).transpose())
        {
            Some(Ok(converter)) => (converter.decode)(&raw)?,
            Some(Err(e)) => return Err(e),
            None => raw,
        };
        if let Some(common) = common {
            if let Some(validator) = &common.validator {
                if !(validator.check)(&converted) {
                    return Err(Error::codec(format!(
                        "validator rejected value for field {}",
                        common.field_name
                    ))
                    .with_field(common.field_name.clone()));
                }
            }
        }
        Ok(converted)
    }

    /// Applies a binding's validator then converter-inverse (encode
    /// direction), per invariant I3.
    pub fn apply_converter_inverse(
        &self,
        binding: &crate::template::Binding,
        root: &Record,
        prefix: Option<i64>,
        value: &FieldValue,
    ) -> Result<FieldValue> {
        let common = common_of(binding);
        if let Some(common) = common {
            if let Some(validator) = &common.validator {
                if !(validator.check)(value) {
                    return Err(Error::codec(format!(
                        "validator rejected value for field {}",
                        common.field_name
                    ))
                    .with_field(common.field_name.clone()));
                }
            }
        }
        match common.and_then(|c| self.choose_converter(c, root, prefix).transpose()) {
            Some(Ok(converter)) => (converter.encode)(value),
            Some(Err(e)) => Err(e),
            None => Ok(value.clone()),
        }
    }

    fn choose_converter<'a>(
        &self,
        common: &'a crate::template::BindingCommon,
        root: &Record,
        prefix: Option<i64>,
    ) -> Result<Option<&'a crate::template::Converter>> {
        for (condition, converter) in &common.converter_chooser {
            if self.eval(condition, root, prefix)?.as_bool()? {
                return Ok(Some(converter));
            }
        }
        Ok(common.converter.as_ref())
    }

    /// Decodes one template by name against `reader`, positioned at the
    /// start of a message matching that template's header (spec.md §4.6).
    /// This is both the dispatcher's top-level entry point and the
    /// recursion point for `Object`/`Array-of-objects` bindings.
    pub fn decode_template(&self, name: &str, reader: &mut BitReader) -> Result<Record> {
        log::trace!(target: crate::logging::BOXON_LOG_TARGET, "decoding template {name} at byte {}", reader.position());
        let msg_start = reader.position();
        let template = self.template(name)?;
        let start = template
            .header
            .longest_match_at(reader.buffer(), reader.position())
            .ok_or_else(|| Error::decode(format!("header mismatch for template {name}")))?
            .to_vec();
        reader.read_bytes(start.len())?;

        let mut record = Record::new(name);
        for binding in &template.fields {
            let should_read = match binding.condition() {
                Some(condition) => self.eval(condition, &record, None)?.as_bool()?,
                None => true,
            };
            if !should_read {
                if let Some(field_name) = binding.field_name() {
                    record.set(field_name, FieldValue::None);
                }
                continue;
            }
            let codec = self.codecs.get(codec::kind_name(binding))?;
            let value = codec
                .decode(reader, binding, self, &record, None)
                .map_err(|e| match binding.field_name() {
                    Some(name) if e.field().is_none() => e.with_field(name),
                    _ => e,
                })?;
            if let Some(field_name) = binding.field_name() {
                record.set(field_name, value);
            }
        }

        if let Some(end) = template.header.end() {
            reader.consume_bytes(end)?;
        }

        for evaluated in &template.evaluated_fields {
            let value = self.eval(&evaluated.expression, &record, None)?;
            record.set(&evaluated.field_name, FieldValue::from(&value));
        }

        if let Some(checksum) = &template.checksum {
            let value =
                crate::codec::checksum::verify_and_consume(reader, checksum, self, msg_start)?;
            record.set(&checksum.field_name, value);
        }

        log::debug!(target: crate::logging::BOXON_LOG_TARGET, "decoded {name}: {} fields", record.len());
        Ok(record.freeze())
    }

    /// Encodes `record` according to its template, the mirror of
    /// [`Self::decode_template`] (spec.md §4.6).
    pub fn encode_template(&self, name: &str, writer: &mut BitWriter, record: &Record) -> Result<()> {
        let template = self.template(name)?;
        let start = template
            .header
            .starts()
            .first()
            .ok_or_else(|| Error::template("header has no start sequence"))?;
        writer.write_bytes(start);

        for binding in &template.fields {
            let should_write = match binding.condition() {
                Some(condition) => self.eval(condition, record, None)?.as_bool()?,
                None => true,
            };
            if !should_write {
                continue;
            }
            let codec = self.codecs.get(codec::kind_name(binding))?;
            let value = binding
                .field_name()
                .and_then(|n| record.get(n))
                .cloned()
                .unwrap_or(FieldValue::None);
            codec
                .encode(writer, binding, self, record, &value)
                .map_err(|e| match binding.field_name() {
                    Some(name) if e.field().is_none() => e.with_field(name),
                    _ => e,
                })?;
        }

        if let Some(end) = template.header.end() {
            writer.write_bytes(end);
        }

        if let Some(checksum) = &template.checksum {
            let reserved_at = crate::codec::checksum::reserve(writer, checksum)?;
            crate::codec::checksum::compute_and_patch(writer, checksum, reserved_at, self)?;
        }

        Ok(())
    }
}

fn common_of(binding: &crate::template::Binding) -> Option<&crate::template::BindingCommon> {
    use crate::template::Binding;
    match binding {
        Binding::Integer(b) => Some(&b.common),
        Binding::Bitmap(b) => Some(&b.common),
        Binding::StringFixed(b) => Some(&b.common),
        Binding::StringTerminated(b) => Some(&b.common),
        Binding::Object(b) => Some(&b.common),
        Binding::ArrayObjects(b) => Some(&b.common),
        Binding::ArrayPrimitives(b) => Some(&b.common),
        Binding::Skip(_) | Binding::Checksum(_) | Binding::Evaluate(_) => None,
    }
}

pub struct EngineBuilder {
    templates: Vec<Template>,
    codecs: CodecRegistry,
    evaluator: Box<dyn Evaluator>,
    checksums: ChecksumRegistry,
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            templates: Vec::new(),
            codecs: CodecRegistry::with_defaults(),
            evaluator: Box::new(DefaultEvaluator::new()),
            checksums: ChecksumRegistry::with_defaults(),
        }
    }

    pub fn with_template(mut self, template: Template) -> Self {
        self.templates.push(template);
        self
    }

    pub fn with_evaluator(mut self, evaluator: impl Evaluator + 'static) -> Self {
        self.evaluator = Box::new(evaluator);
        self
    }

    pub fn with_codec(mut self, kind: &str, codec: impl codec::Codec + 'static) -> Self {
        self.codecs.register(kind, codec);
        self
    }

    pub fn with_checksum_algorithm(mut self, algorithm: impl ChecksumAlgorithm + 'static) -> Self {
        self.checksums.register(algorithm);
        self
    }

    /// Validates invariant I1 (non-empty, non-duplicate headers) and
    /// produces the immutable engine.
    ///
    /// A zero-length `start` sequence (`Header::from_strings(&[""], ..)`)
    /// is the convention this port uses for a headerless template: one
    /// that only ever appears as an `Object`/`Array-of-objects` recursion
    /// target (spec.md §4.6 step 1 calls the header check on a recursive
    /// decode "a consistency check", which is vacuous when there is no
    /// header to check). Such templates are exempt from I1's uniqueness
    /// rule — many nested record types legitimately share "no header" —
    /// and are excluded from dispatch candidacy in `dispatcher.rs`.
    ///
    /// Headers are compared by their *resolved* start bytes, not by
    /// charset: `Header::from_strings` already turns a start string into
    /// bytes at construction time via its own charset, so two templates
    /// whose start strings resolve to the same bytes under *different*
    /// charsets (e.g. `"+"` under `UsAscii` and under `Utf8`, both
    /// `0x2B`) are just as ambiguous at dispatch as two templates that
    /// declare the identical string under the same charset — the
    /// dispatcher only ever sees bytes (`dispatcher.rs`'s
    /// `best_match_at`), never the charset that produced them.
    pub fn build(self) -> Result<Engine> {
        for (i, a) in self.templates.iter().enumerate() {
            for b in &self.templates[i + 1..] {
                for sa in a.header.starts() {
                    for sb in b.header.starts() {
                        if !sa.is_empty() && sa == sb {
                            return Err(Error::template(format!(
                                "templates {} and {} share an identical header start",
                                a.name(),
                                b.name()
                            )));
                        }
                    }
                }
            }
        }
        Ok(Engine {
            templates: self.templates,
            codecs: self.codecs,
            evaluator: self.evaluator,
            checksums: self.checksums,
        })
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::Charset;
    use crate::template::{BindingCommon, Binding, Header, IntegerBinding, TemplateBuilder};
    use crate::types::{Endian, Primitive};

    fn one_byte_template(name: &str, header: Header) -> Template {
        let evaluator = DefaultEvaluator::new();
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

    /// spec.md invariant I1: two templates whose `start` strings resolve
    /// to the same bytes under *different* charsets (here `"+"` under
    /// `UsAscii` and under `Utf8`, both encoding to `0x2B`) are just as
    /// ambiguous as a literal duplicate and must be rejected at
    /// `build()`, not left to tie nondeterministically at dispatch time.
    #[test]
    fn same_resolved_header_bytes_under_different_charsets_is_rejected() {
        let ascii_header = Header::from_strings(&["+"], None, Charset::UsAscii).unwrap();
        let utf8_header = Header::from_strings(&["+"], None, Charset::Utf8).unwrap();

        let err = Engine::builder()
            .with_template(one_byte_template("Ascii", ascii_header))
            .with_template(one_byte_template("Utf8", utf8_header))
            .build()
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Template);
    }
}
