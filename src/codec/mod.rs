//! Binding codec dispatch (spec.md §4.4 "Codec registry", component C5/C6).

pub mod array_primitives;
pub mod bitmap;
pub mod checksum;
pub mod evaluate;
pub mod integer;
pub mod object;
pub mod registry;
pub mod skip;
pub mod string;

pub use registry::CodecRegistry;

use crate::bits::{BitReader, BitWriter};
use crate::engine::Engine;
use crate::template::Binding;
use crate::value::{FieldValue, Record};
use crate::Result;

/// The read/write procedure for one binding kind (spec.md §4.4):
/// `decode(reader, binding, rootObject) → value` / `encode(writer, binding,
/// rootObject, value)`. `engine` stands in for the "named-slot
/// dependency-injection" the spec allows a codec to request (the template
/// engine and evaluator), passed per-call rather than captured at
/// registration, matching §4.4's "MUST NOT capture them at construction".
pub trait Codec: Send + Sync {
    fn decode(
        &self,
        reader: &mut BitReader,
        binding: &Binding,
        engine: &Engine,
        root: &Record,
        prefix: Option<i64>,
    ) -> Result<FieldValue>;

    fn encode(
        &self,
        writer: &mut BitWriter,
        binding: &Binding,
        engine: &Engine,
        root: &Record,
        value: &FieldValue,
    ) -> Result<()>;
}

/// The registry key a binding dispatches under; also the identifier a user
/// supplies to [`registry::CodecRegistry::register`] for a codec of an
/// existing kind that should override the default (spec.md §4.4 "plus any
/// user-supplied codecs keyed by a user-chosen binding-kind identifier").
pub fn kind_name(binding: &Binding) -> &'static str {
    match binding {
        Binding::Integer(_) => "integer",
        Binding::Bitmap(_) => "bitmap",
        Binding::StringFixed(_) => "string-fixed",
        Binding::StringTerminated(_) => "string-terminated",
        Binding::Object(_) => "object",
        Binding::ArrayObjects(_) => "array-objects",
        Binding::ArrayPrimitives(_) => "array-primitives",
        Binding::Skip(_) => "skip",
        Binding::Checksum(_) => "checksum",
        Binding::Evaluate(_) => "evaluate",
    }
}
