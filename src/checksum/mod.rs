//! Pluggable checksum algorithms (spec.md §6 "Checksum algorithms...
//! pluggable by name").

pub mod crc16;
pub mod xor;

use crate::std::{string::String, vec::Vec};
use crate::Result;

/// A named checksum algorithm over a byte span and an initial value.
///
/// Grounded in the teacher crate's own `checksum()` free function (XOR over
/// a byte range with a starting value) generalized from "one fixed
/// algorithm" to "a named, pluggable trait" per spec.md §6.
pub trait ChecksumAlgorithm: Send + Sync {
    fn name(&self) -> &str;
    fn compute(&self, bytes: &[u8], init: u64) -> u64;
}

/// The set of algorithms an [`crate::engine::Engine`] knows by name,
/// looked up by a `Checksum` binding's `algorithm` attribute.
pub struct ChecksumRegistry {
    algorithms: Vec<(String, crate::std::boxed::Box<dyn ChecksumAlgorithm>)>,
}

impl ChecksumRegistry {
    pub fn new() -> Self {
        Self {
            algorithms: Vec::new(),
        }
    }

    /// The default registry: CRC-16/CCITT-FALSE (spec.md §6 "At least
    /// CRC-16/CCITT-FALSE") plus the teacher's XOR checksum.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(crc16::Crc16CcittFalse);
        registry.register(xor::Xor);
        registry
    }

    pub fn register(&mut self, algorithm: impl ChecksumAlgorithm + 'static) {
        let name = String::from(algorithm.name());
        self.algorithms.push((name, crate::std::boxed::Box::new(algorithm)));
    }

    pub fn get(&self, name: &str) -> Result<&dyn ChecksumAlgorithm> {
        self.algorithms
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, algo)| algo.as_ref())
            .ok_or_else(|| crate::Error::annotation(format!("unknown checksum algorithm: {name}")))
    }
}

impl Default for ChecksumRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}
