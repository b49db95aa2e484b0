//! Bit-granular I/O substrate (spec.md §4.1, component C1).
//!
//! A [`reader::BitReader`] and [`writer::BitWriter`] pair over a contiguous
//! byte buffer, with a one-deep savepoint for speculative reads (used by
//! terminated-string decoding) and helpers for signed/unsigned integers of
//! arbitrary bit width, IEEE-754 floats, arbitrary-precision magnitudes,
//! and charset-aware text.
//!
//! Mirrors the shape of the teacher crate's buffer-indexed message structs,
//! generalized from "byte-offset constants into a fixed-size array" to "a
//! running bit cursor over a borrowed slice", since Boxon's fields are
//! declared in bits, not bytes.

pub mod reader;
pub mod writer;

pub use reader::BitReader;
pub use writer::BitWriter;

/// Captured reader/writer cursor state for `createSavepoint`/`restoreSavepoint`
/// (spec.md §4.1). Exactly one outstanding savepoint is supported per
/// reader/writer, matching the spec's stated contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Savepoint {
    pub(crate) byte_pos: usize,
    pub(crate) cache: u8,
    pub(crate) bits_in_cache: u8,
}

/// Charsets recognized for header/string decoding (spec.md §6).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Charset {
    Utf8,
    Iso8859_1,
    UsAscii,
    Utf16Be,
    Utf16Le,
}

impl Charset {
    pub fn by_name(name: &str) -> crate::Result<Self> {
        Ok(match name {
            "UTF-8" | "utf-8" | "UTF8" => Self::Utf8,
            "ISO-8859-1" | "ISO8859-1" | "LATIN1" | "latin1" => Self::Iso8859_1,
            "US-ASCII" | "ASCII" | "ascii" => Self::UsAscii,
            "UTF-16BE" | "utf-16be" => Self::Utf16Be,
            "UTF-16LE" | "utf-16le" => Self::Utf16Le,
            other => {
                return Err(crate::Error::annotation(format!(
                    "unsupported charset: {other}"
                )))
            }
        })
    }

    pub(crate) fn decode(self, bytes: &[u8]) -> crate::Result<crate::std::string::String> {
        use crate::std::string::String;
        match self {
            Self::Utf8 => core::str::from_utf8(bytes)
                .map(String::from)
                .map_err(|e| crate::Error::codec(format!("invalid UTF-8: {e}"))),
            Self::Iso8859_1 | Self::UsAscii => Ok(bytes.iter().map(|&b| b as char).collect()),
            Self::Utf16Be => decode_utf16(bytes, true),
            Self::Utf16Le => decode_utf16(bytes, false),
        }
    }

    pub(crate) fn encode(self, text: &str) -> crate::std::vec::Vec<u8> {
        use crate::std::vec::Vec;
        match self {
            Self::Utf8 => text.as_bytes().to_vec(),
            Self::Iso8859_1 | Self::UsAscii => text.chars().map(|c| c as u8).collect(),
            Self::Utf16Be => {
                let mut out = Vec::with_capacity(text.len() * 2);
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_be_bytes());
                }
                out
            }
            Self::Utf16Le => {
                let mut out = Vec::with_capacity(text.len() * 2);
                for unit in text.encode_utf16() {
                    out.extend_from_slice(&unit.to_le_bytes());
                }
                out
            }
        }
    }
}

fn decode_utf16(bytes: &[u8], big_endian: bool) -> crate::Result<crate::std::string::String> {
    use crate::std::vec::Vec;
    if bytes.len() % 2 != 0 {
        return Err(crate::Error::codec("odd number of bytes for UTF-16"));
    }
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|chunk| {
            if big_endian {
                u16::from_be_bytes([chunk[0], chunk[1]])
            } else {
                u16::from_le_bytes([chunk[0], chunk[1]])
            }
        })
        .collect();
    char::decode_utf16(units)
        .collect::<core::result::Result<_, _>>()
        .map_err(|e| crate::Error::codec(format!("invalid UTF-16: {e:?}")))
}
