//! A derived, serializable description of a [`super::Template`] (spec.md §1
//! "a derived capability" the distillation explicitly carved the wire shape
//! of out of scope). This is Boxon's "describer": a `serde`-`Serialize`
//! tree of field names/kinds/sizes that a caller can render to JSON (or
//! anything else `serde` supports) without Boxon committing to a specific
//! JSON shape beyond what falls out of the struct naturally.

use crate::std::{string::String, vec::Vec};
use crate::template::{Binding, Template};
use crate::Result;
use serde::Serialize;

#[derive(Serialize)]
pub struct FieldDescription {
    pub name: String,
    pub kind: &'static str,
    pub condition: Option<String>,
}

#[derive(Serialize)]
pub struct TemplateDescription {
    pub name: String,
    pub fields: Vec<FieldDescription>,
    pub has_checksum: bool,
}

impl Template {
    /// Builds a serializable description of this template's field layout.
    pub fn describe(&self) -> TemplateDescription {
        let fields = self
            .fields
            .iter()
            .map(describe_binding)
            .collect();
        TemplateDescription {
            name: self.name.clone(),
            fields,
            has_checksum: self.checksum.is_some(),
        }
    }

    /// Convenience wrapper around [`Self::describe`] for callers that just
    /// want a JSON string (spec.md §1 "as a derived capability").
    #[cfg(feature = "std")]
    pub fn describe_json(&self) -> Result<String> {
        serde_json::to_string(&self.describe())
            .map_err(|e| crate::Error::codec(format!("failed to serialize template: {e}")))
    }
}

fn describe_binding(binding: &Binding) -> FieldDescription {
    FieldDescription {
        name: binding.field_name().unwrap_or("<skip>").into(),
        kind: crate::codec::kind_name(binding),
        condition: binding.condition().map(String::from),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bits::Charset;
    use crate::template::{Header, TemplateBuilder};

    #[test]
    fn describes_field_names_and_kinds() {
        let evaluator = crate::eval::DefaultEvaluator::new();
        let header = Header::from_strings(&["+B"], None, Charset::UsAscii).unwrap();
        let template = TemplateBuilder::new("Minimal")
            .header(header)
            .field(Binding::Skip(crate::template::SkipBinding {
                bit_size: Some("8".into()),
                terminator: None,
                consume_terminator: false,
            }))
            .unwrap()
            .build(&evaluator)
            .unwrap();

        let description = template.describe();
        assert_eq!(description.name, "Minimal");
        assert_eq!(description.fields.len(), 1);
        assert_eq!(description.fields[0].kind, "skip");
    }
}
