//! The template model (spec.md §3 "Data model", component C4).
//!
//! A [`Template`] is an immutable, built-once description of a message
//! class: a [`header::Header`], an ordered list of field [`Binding`]s, a
//! trailing list of `Evaluate` bindings, and an optional checksum binding
//! (spec.md §3 "Template"). `Binding` is modeled as a single tagged union
//! per spec.md §9 "Binding as tagged variant", one arm per kind in §3's
//! table, so that dispatch over kinds is an exhaustive `match` rather than
//! a class hierarchy of codec objects.

pub mod builder;
pub mod describe;
pub mod header;

pub use builder::TemplateBuilder;
pub use describe::TemplateDescription;
pub use header::Header;

use crate::bits::Charset;
use crate::std::{boxed::Box, string::String, vec::Vec};
use crate::types::{Endian, Primitive};
use crate::value::FieldValue;
use crate::Result;

/// A pure, invertible value transform (spec.md §3 "Converter"). Both
/// directions are plain functions rather than a trait object pair, since
/// nothing but the engine ever calls them and there is no need for users to
/// implement `Converter` themselves beyond supplying the two closures.
pub struct Converter {
    pub decode: Box<dyn Fn(&FieldValue) -> Result<FieldValue> + Send + Sync>,
    pub encode: Box<dyn Fn(&FieldValue) -> Result<FieldValue> + Send + Sync>,
}

/// A pure predicate on the converted ("user-visible") value (spec.md §3
/// "Validator").
pub struct Validator {
    pub check: Box<dyn Fn(&FieldValue) -> bool + Send + Sync>,
}

/// Attributes shared by every binding kind (spec.md §3 "Every field...
/// carries... a common subset").
#[derive(Default)]
pub struct BindingCommon {
    pub field_name: String,
    /// Predicate expression; `None` means "always present" (spec.md §3).
    pub condition: Option<String>,
    pub validator: Option<Validator>,
    pub converter: Option<Converter>,
    /// List of predicate→converter alternatives; the plain `converter`
    /// above is the default used if none match (spec.md §3
    /// "converter-chooser").
    pub converter_chooser: Vec<(String, Converter)>,
}

impl BindingCommon {
    pub fn new(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            ..Default::default()
        }
    }
}

/// The prefix-read-then-predicate-match mechanism that resolves a
/// polymorphic `Object`/array-element binding to a concrete template
/// (spec.md §3 "Variant-selector", §9 "Variant selection as data").
pub struct VariantSelector {
    /// Number of bits to read as the prefix; 0 means no prefix is read.
    pub prefix_bits: u32,
    /// `(condition, prefix value, template name)`; the condition is
    /// evaluated with `prefix` bound to the read value (spec.md §3).
    pub alternatives: Vec<(String, i64, String)>,
    pub default_template: Option<String>,
}

pub struct IntegerBinding {
    pub common: BindingCommon,
    /// Bit width, as an expression (a literal digit string for the
    /// fixed-width kinds in spec.md §3's table).
    pub bit_size: String,
    pub byte_order: Endian,
    pub target: Primitive,
}

pub struct BitmapBinding {
    pub common: BindingCommon,
    pub bit_size: String,
    pub bit_order: Endian,
}

pub struct StringFixedBinding {
    pub common: BindingCommon,
    pub byte_size: String,
    pub charset: Charset,
}

pub struct StringTerminatedBinding {
    pub common: BindingCommon,
    pub terminator: u8,
    pub consume_terminator: bool,
    pub charset: Charset,
}

pub struct ObjectBinding {
    pub common: BindingCommon,
    pub type_name: String,
    pub selector: Option<VariantSelector>,
}

pub struct ArrayObjectsBinding {
    pub common: BindingCommon,
    pub element_type: String,
    pub count: String,
    pub selector: Option<VariantSelector>,
}

pub struct ArrayPrimitivesBinding {
    pub common: BindingCommon,
    pub element: Primitive,
    pub count: String,
    pub byte_order: Endian,
}

pub struct SkipBinding {
    pub bit_size: Option<String>,
    pub terminator: Option<u8>,
    pub consume_terminator: bool,
}

pub struct ChecksumBinding {
    pub field_name: String,
    pub target: Primitive,
    pub byte_order: Endian,
    pub skip_start: usize,
    pub skip_end: usize,
    pub algorithm: String,
    pub init: u64,
}

pub struct EvaluateBinding {
    pub field_name: String,
    pub expression: String,
}

/// A single field binding, tagged by kind (spec.md §3's binding table,
/// §9's "Binding as tagged variant").
pub enum Binding {
    Integer(IntegerBinding),
    Bitmap(BitmapBinding),
    StringFixed(StringFixedBinding),
    StringTerminated(StringTerminatedBinding),
    Object(ObjectBinding),
    ArrayObjects(ArrayObjectsBinding),
    ArrayPrimitives(ArrayPrimitivesBinding),
    Skip(SkipBinding),
    Checksum(ChecksumBinding),
    Evaluate(EvaluateBinding),
}

impl Binding {
    /// The condition expression guarding this binding, if any. `Skip` and
    /// `Evaluate` carry no condition of their own: a `Skip` is an
    /// unconditional pre-field advance, and `Evaluate` always runs in the
    /// post-parse pass (spec.md §4.5 "Evaluate... decode: after the main
    /// walk").
    pub fn condition(&self) -> Option<&str> {
        match self {
            Self::Integer(b) => b.common.condition.as_deref(),
            Self::Bitmap(b) => b.common.condition.as_deref(),
            Self::StringFixed(b) => b.common.condition.as_deref(),
            Self::StringTerminated(b) => b.common.condition.as_deref(),
            Self::Object(b) => b.common.condition.as_deref(),
            Self::ArrayObjects(b) => b.common.condition.as_deref(),
            Self::ArrayPrimitives(b) => b.common.condition.as_deref(),
            Self::Skip(_) | Self::Checksum(_) | Self::Evaluate(_) => None,
        }
    }

    /// The field name this binding populates, if it populates one at all
    /// (`Skip` reads/writes no field).
    pub fn field_name(&self) -> Option<&str> {
        match self {
            Self::Integer(b) => Some(&b.common.field_name),
            Self::Bitmap(b) => Some(&b.common.field_name),
            Self::StringFixed(b) => Some(&b.common.field_name),
            Self::StringTerminated(b) => Some(&b.common.field_name),
            Self::Object(b) => Some(&b.common.field_name),
            Self::ArrayObjects(b) => Some(&b.common.field_name),
            Self::ArrayPrimitives(b) => Some(&b.common.field_name),
            Self::Checksum(b) => Some(&b.field_name),
            Self::Evaluate(b) => Some(&b.field_name),
            Self::Skip(_) => None,
        }
    }
}

/// A built, immutable message-class descriptor (spec.md §3 "Template";
/// §5 "Templates are built once... and are immutable thereafter").
pub struct Template {
    pub name: String,
    pub header: Header,
    /// Ordered bindings, including inline `Skip` bindings (spec.md §4.3
    /// "any number of preceding skip directives may attach to the field");
    /// represented here simply as list position rather than a separate
    /// attachment record, since the engine walks bindings strictly in
    /// order regardless.
    pub fields: Vec<Binding>,
    pub evaluated_fields: Vec<EvaluateBinding>,
    pub checksum: Option<ChecksumBinding>,
}

impl Template {
    pub fn name(&self) -> &str {
        &self.name
    }
}
