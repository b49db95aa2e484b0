//! The default codec set plus user-registration (spec.md §4.4).

use crate::std::{boxed::Box, string::String, vec::Vec};
use crate::Result;

use super::{
    array_primitives::ArrayPrimitivesCodec, bitmap::BitmapCodec, checksum::ChecksumCodec,
    evaluate::EvaluateCodec, integer::IntegerCodec, object::ObjectCodec, skip::SkipCodec,
    string::{StringFixedCodec, StringTerminatedCodec},
    Codec,
};

/// Built once at engine construction and immutable thereafter (spec.md §3
/// "Lifecycle... the codec registry is built once... and is immutable").
pub struct CodecRegistry {
    codecs: Vec<(String, Box<dyn Codec>)>,
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self { codecs: Vec::new() }
    }

    /// The default set covering every binding kind in spec.md §3.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("integer", IntegerCodec);
        registry.register("bitmap", BitmapCodec);
        registry.register("string-fixed", StringFixedCodec);
        registry.register("string-terminated", StringTerminatedCodec);
        registry.register("object", ObjectCodec);
        registry.register("array-objects", ObjectCodec::array());
        registry.register("array-primitives", ArrayPrimitivesCodec);
        registry.register("skip", SkipCodec);
        registry.register("checksum", ChecksumCodec);
        registry.register("evaluate", EvaluateCodec);
        registry
    }

    /// Registers (or overrides) a codec under `kind`. A user codec that
    /// wants engine collaborators receives them per-call through
    /// [`super::Codec`]'s `engine` parameter rather than at this point, per
    /// spec.md §4.4's "MUST NOT capture them at construction".
    pub fn register(&mut self, kind: &str, codec: impl Codec + 'static) {
        if let Some(slot) = self.codecs.iter_mut().find(|(k, _)| k == kind) {
            slot.1 = Box::new(codec);
        } else {
            self.codecs.push((String::from(kind), Box::new(codec)));
        }
    }

    pub fn get(&self, kind: &str) -> Result<&dyn Codec> {
        self.codecs
            .iter()
            .find(|(k, _)| k == kind)
            .map(|(_, codec)| codec.as_ref())
            .ok_or_else(|| crate::Error::template(format!("no codec registered for kind: {kind}")))
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
