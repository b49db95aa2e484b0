//! Reflective field access (spec.md §9 "Reflective field access as
//! contract", component C9).
//!
//! spec.md deliberately leaves the declaration surface open ("annotations,
//! attribute types, a builder API, or a config format... whatever a given
//! host language's idioms support") and only commits to the read/write
//! contract itself: given an instance and a field name, get or set that
//! field's value. `Record` (`value.rs`) is Boxon's concrete instance type;
//! this trait is the narrow contract the engine actually depends on, so a
//! caller embedding Boxon differently could supply their own instance type
//! without the engine needing to know about `Record` at all. In practice
//! `engine.rs` is written directly against `Record` for simplicity — no
//! second implementor exists in this crate — but the trait documents the
//! seam spec.md names.

use crate::value::{FieldValue, Record};

/// Read/write access to an instance's named fields, by the contract in
/// spec.md §9: `get(instance, name) -> value`, `set(instance, name, value)`.
pub trait Reflect {
    fn get_field(&self, name: &str) -> Option<&FieldValue>;
    fn set_field(&mut self, name: &str, value: FieldValue);
}

impl Reflect for Record {
    fn get_field(&self, name: &str) -> Option<&FieldValue> {
        self.get(name)
    }

    fn set_field(&mut self, name: &str, value: FieldValue) {
        self.set(name, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_implements_reflect() {
        let mut record = Record::new("Example");
        record.set_field("x", FieldValue::Unsigned(7));
        assert_eq!(record.get_field("x"), Some(&FieldValue::Unsigned(7)));
        assert_eq!(record.get_field("missing"), None);
    }
}
