//! Builds a [`super::Template`] from an ordered list of bindings, validating
//! expression syntax up front (spec.md §4.3 "Template model").

use crate::eval::Evaluator;
use crate::std::{string::String, vec::Vec};
use crate::{Error, Result};

use super::{Binding, ChecksumBinding, EvaluateBinding, Header, Template};

pub struct TemplateBuilder {
    name: String,
    header: Option<Header>,
    fields: Vec<Binding>,
    checksum: Option<ChecksumBinding>,
}

impl TemplateBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            header: None,
            fields: Vec::new(),
            checksum: None,
        }
    }

    pub fn header(mut self, header: Header) -> Self {
        self.header = Some(header);
        self
    }

    /// Appends a binding in declared order. A `Checksum` binding is routed
    /// to the dedicated slot rather than the field list (spec.md §4.3 step
    /// 3: "a checksum binding routes the field to the checksum slot, at
    /// most one per template").
    pub fn field(mut self, binding: Binding) -> Result<Self> {
        if let Binding::Checksum(checksum) = binding {
            if self.checksum.is_some() {
                return Err(Error::template(
                    "a template may declare at most one checksum field",
                ));
            }
            self.checksum = Some(checksum);
            return Ok(self);
        }
        self.fields.push(binding);
        Ok(self)
    }

    /// Validates every expression string in the accumulated bindings
    /// against `evaluator` (spec.md §4.3 step 4) and produces the built,
    /// immutable `Template`. `evaluated_fields` is split out of `fields`
    /// here by construction: callers append `Evaluate` bindings through
    /// [`Self::field`] like any other, and `build` partitions them off
    /// into the dedicated post-parse list spec.md §3 describes.
    pub fn build(mut self, evaluator: &dyn Evaluator) -> Result<Template> {
        let header = self
            .header
            .ok_or_else(|| Error::template("a template requires a header"))?;

        let mut fields = Vec::new();
        let mut evaluated_fields = Vec::new();
        for binding in self.fields.drain(..) {
            match binding {
                Binding::Evaluate(eval_binding) => {
                    evaluator.validate(&eval_binding.expression)?;
                    evaluated_fields.push(eval_binding);
                }
                other => {
                    validate_binding(&other, evaluator)?;
                    fields.push(other);
                }
            }
        }

        // Invariant I2 (skipStart + skipEnd <= message length) depends on
        // the encoded message's length, which isn't known until encode/
        // decode time, so it's enforced there rather than here.

        Ok(Template {
            name: self.name,
            header,
            fields,
            evaluated_fields,
            checksum: self.checksum,
        })
    }
}

fn validate_binding(binding: &Binding, evaluator: &dyn Evaluator) -> Result<()> {
    if let Some(condition) = binding.condition() {
        evaluator.validate(condition)?;
    }
    match binding {
        Binding::Integer(b) => evaluator.validate(&b.bit_size),
        Binding::Bitmap(b) => evaluator.validate(&b.bit_size),
        Binding::StringFixed(b) => evaluator.validate(&b.byte_size),
        Binding::ArrayObjects(b) => {
            evaluator.validate(&b.count)?;
            if let Some(selector) = &b.selector {
                for (condition, _, _) in &selector.alternatives {
                    evaluator.validate(condition)?;
                }
            }
            Ok(())
        }
        Binding::ArrayPrimitives(b) => evaluator.validate(&b.count),
        Binding::Object(b) => {
            if let Some(selector) = &b.selector {
                for (condition, _, _) in &selector.alternatives {
                    evaluator.validate(condition)?;
                }
            }
            Ok(())
        }
        Binding::Skip(b) => {
            if let Some(bit_size) = &b.bit_size {
                evaluator.validate(bit_size)?;
            }
            Ok(())
        }
        Binding::StringTerminated(_) | Binding::Checksum(_) | Binding::Evaluate(_) => Ok(()),
    }
}
