//! The generic value model that stands in for "a user's annotated class" in
//! this Rust port.
//!
//! spec.md has no notion of a derive macro or annotation processor; its
//! component C9 ("Reflective field access") is specified as a contract
//! ("read/write named fields of a class-described instance"), not as a
//! concrete reflection API, and explicitly notes that recognized
//! declaration surfaces may be "annotations, attribute types, a builder
//! API, or a config format" (spec.md §6). None of the example crates in
//! this corpus carry a proc-macro/derive dependency that this port could
//! ground a compile-time `#[derive(Template)]` on, so Boxon represents a
//! decoded/encoded message instance as a `Record`: an ordered, named
//! sequence of `FieldValue`s built and consumed by the template engine
//! (`engine.rs`) through the `Reflect` trait in `reflect.rs`. This is the
//! "mutable class" shape from spec.md §9; `Record::freeze` gives the
//! "immutable value type" shape by forbidding further field sets once the
//! positional walk has completed.

use crate::std::{boxed::Box, string::String, vec::Vec};
use crate::types::{BigUint, Bitmap};
use crate::{inner_enum, Error, Result};

/// One field's decoded (or pre-encode) value.
///
/// This is the Rust shape of spec.md §3's field-kind table collapsed into a
/// single sum type, per the "Binding as tagged variant" design note (§9):
/// exactly as a `Binding` dispatches on kind, a `FieldValue` carries exactly
/// the payload that kind produces.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Signed(i64),
    Unsigned(u64),
    Bool(bool),
    Float(f32),
    Double(f64),
    BigInt(BigUint),
    Bitmap(Bitmap),
    Str(String),
    Bytes(Vec<u8>),
    Object(Box<Record>),
    Array(Vec<FieldValue>),
    /// The zero value of a field whose condition evaluated false (spec.md
    /// invariant I5: "remains at its type's zero value on decode").
    None,
}

inner_enum!(FieldValue, Signed, i64);
inner_enum!(FieldValue, Unsigned, u64);
inner_enum!(FieldValue, Bool, bool);
inner_enum!(FieldValue, Float, f32);
inner_enum!(FieldValue, Double, f64);
inner_enum!(FieldValue, BigInt, BigUint);
inner_enum!(FieldValue, Bitmap, Bitmap);
inner_enum!(FieldValue, Str, String);
inner_enum!(FieldValue, Bytes, Vec<u8>);
inner_enum!(FieldValue, Array, Vec<FieldValue>);

impl FieldValue {
    pub fn as_object(&self) -> Result<&Record> {
        match self {
            Self::Object(record) => Ok(record),
            other => Err(Error::codec(format!("expected an object, have: {other:?}"))),
        }
    }

    pub fn into_object(self) -> Result<Record> {
        match self {
            Self::Object(record) => Ok(*record),
            other => Err(Error::codec(format!("expected an object, have: {other:?}"))),
        }
    }

    /// Best-effort widening to `i64`, used by the expression evaluator and
    /// by numeric converters; covers every numeric variant.
    pub fn as_i64(&self) -> Result<i64> {
        match self {
            Self::Signed(v) => Ok(*v),
            Self::Unsigned(v) => Ok(*v as i64),
            Self::Bool(v) => Ok(*v as i64),
            Self::BigInt(v) => v
                .to_u64()
                .map(|v| v as i64)
                .ok_or_else(|| Error::codec("bigint does not fit in i64")),
            other => Err(Error::codec(format!("expected an integer, have: {other:?}"))),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl core::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Signed(v) => write!(f, "{v}"),
            Self::Unsigned(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::BigInt(v) => write!(f, "{v}"),
            Self::Bitmap(v) => write!(f, "{v:?}", v = v.as_slice()),
            Self::Str(v) => write!(f, "{v}"),
            Self::Bytes(v) => write!(f, "{v:02x?}"),
            Self::Object(v) => write!(f, "{}", v.template_name),
            Self::Array(v) => write!(f, "[{} elements]", v.len()),
            Self::None => write!(f, "<none>"),
        }
    }
}

/// A decoded (or to-be-encoded) message instance: an ordered, named list of
/// field values plus the name of the `Template` it was built from.
///
/// Field order matters: it mirrors the declared field order from spec.md §3
/// ("ordered list of field bindings"), which is also the order the engine
/// walks when re-encoding (spec.md §4.6).
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Record {
    pub template_name: String,
    fields: Vec<(String, FieldValue)>,
    frozen: bool,
}

impl Record {
    pub fn new(template_name: impl Into<String>) -> Self {
        Self {
            template_name: template_name.into(),
            fields: Vec::new(),
            frozen: false,
        }
    }

    /// Sets (or appends) a field by name, in declared order. Mutating a
    /// frozen record is a programmer error (engine bug), so it panics
    /// rather than returning a `Result` the caller has no recovery path
    /// for — mirroring the teacher's `MessageOps::buf_mut` which simply
    /// gives direct access and trusts the engine above it.
    pub fn set(&mut self, name: impl Into<String>, value: FieldValue) {
        assert!(!self.frozen, "attempted to mutate a frozen Record");
        let name = name.into();
        if let Some(slot) = self.fields.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.fields.push((name, value));
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, FieldValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Resolves a dotted path (`field.sub.sub2`) against this record,
    /// descending through nested `Object` values. Used by the expression
    /// evaluator's `#self` accessor (spec.md §6).
    pub fn get_path(&self, path: &str) -> Option<&FieldValue> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.get(first)?;
        for segment in segments {
            current = current.as_object().ok()?.get(segment)?;
        }
        Some(current)
    }

    /// Marks the record as built, matching the "immutable value type"
    /// construction shape from spec.md §9: once every binding in the
    /// template has been walked, the record is frozen and only read
    /// thereafter.
    pub fn freeze(mut self) -> Self {
        self.frozen = true;
        self
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_path_descends_nested_objects() {
        let mut inner = Record::new("Inner");
        inner.set("x", FieldValue::Unsigned(10));

        let mut outer = Record::new("Outer");
        outer.set("inner", FieldValue::Object(Box::new(inner)));

        assert_eq!(outer.get_path("inner.x"), Some(&FieldValue::Unsigned(10)));
        assert_eq!(outer.get_path("missing"), None);
        assert_eq!(outer.get_path("inner.missing"), None);
    }

    #[test]
    #[should_panic(expected = "frozen")]
    fn mutating_frozen_record_panics() {
        let mut record = Record::new("Frozen").freeze();
        record.set("x", FieldValue::Unsigned(1));
    }
}
