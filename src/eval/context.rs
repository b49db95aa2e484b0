//! The name→value mapping handed to an [`super::Evaluator`] (spec.md §3
//! "Context").

use crate::std::{string::String, vec::Vec};
use crate::value::Record;

use super::EvalValue;

/// Bindings visible to an expression during one field's evaluation.
///
/// Two names are reserved per spec.md §6: `#self` (the current root
/// object, addressable through a dotted path) and `prefix` (the variant
/// prefix value, present only during variant selection). Both are threaded
/// through explicitly rather than stashed in `named`, since they change on
/// every call while user-supplied named values are typically set once at
/// engine-build time (spec.md §9 "Static/global state... sharing across
/// passes is by ordinary value sharing").
pub struct EvalContext<'a> {
    /// The object under construction, readable through `#self.path`.
    pub root: Option<&'a Record>,
    /// The variant prefix value, present only during variant selection
    /// (spec.md §3 "Variant-selector").
    pub prefix: Option<i64>,
    /// User-supplied named scalar values (spec.md §3 "Context... a mapping
    /// from name to value").
    pub named: Vec<(String, EvalValue)>,
}

impl<'a> EvalContext<'a> {
    pub fn new() -> Self {
        Self {
            root: None,
            prefix: None,
            named: Vec::new(),
        }
    }

    pub fn with_root(mut self, root: &'a Record) -> Self {
        self.root = Some(root);
        self
    }

    pub fn with_prefix(mut self, prefix: i64) -> Self {
        self.prefix = Some(prefix);
        self
    }

    pub fn bind(&mut self, name: impl Into<String>, value: EvalValue) {
        self.named.push((name.into(), value));
    }

    pub fn lookup(&self, name: &str) -> Option<&EvalValue> {
        self.named.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }
}

impl<'a> Default for EvalContext<'a> {
    fn default() -> Self {
        Self::new()
    }
}
