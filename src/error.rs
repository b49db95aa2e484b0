//! Library error types.
//!
//! Follows the teacher crate's pattern of a single `Error` struct wrapping a
//! `Copy` error-code enum plus a heap message, rather than one Rust `enum`
//! variant per failure site; the taxonomy here is the one spec.md §7 names.

#[cfg(not(feature = "std"))]
use alloc::boxed::Box;
#[cfg(not(feature = "std"))]
use alloc::string::String;

use crate::std;
use std::{fmt, result};

pub type Result<T> = result::Result<T, Error>;

/// Error taxonomy from spec.md §7.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Template-build-time malformation: unknown type, bad charset, bad
    /// expression syntax, forbidden combination.
    Annotation,
    /// A required slot (header, target type) is missing or inconsistent at
    /// build time.
    Template,
    /// Runtime mismatch inside a single binding: unsupported target type,
    /// array length mismatch, converter failure.
    Codec,
    /// Runtime decoding failure of a whole template: end-of-buffer, header
    /// mismatch, checksum mismatch.
    Decode,
    /// Runtime encoding failure: value outside representable range for
    /// `bitSize`, array length mismatch on encode.
    Encode,
    /// The reader ran off the end of the buffer; typically wrapped into a
    /// `Decode` error before reaching a caller (spec.md §7).
    BufferUnderflow,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Annotation => "annotation",
            Self::Template => "template",
            Self::Codec => "codec",
            Self::Decode => "decode",
            Self::Encode => "encode",
            Self::BufferUnderflow => "buffer underflow",
        };
        write!(f, "{s}")
    }
}

/// Library error type: a short kind label, a human-readable message
/// (including the field name when available), and an optional cause chain
/// (spec.md §7 "User-visible form").
#[derive(Clone, Debug, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    message: String,
    field: Option<String>,
    cause: Option<Box<Error>>,
}

impl Error {
    fn new<S: Into<String>>(kind: ErrorKind, message: S) -> Self {
        Self {
            kind,
            message: message.into(),
            field: None,
            cause: None,
        }
    }

    pub fn annotation<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::Annotation, message)
    }

    pub fn template<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::Template, message)
    }

    pub fn codec<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::Codec, message)
    }

    pub fn decode<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::Decode, message)
    }

    pub fn encode<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::Encode, message)
    }

    pub fn buffer_underflow<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::BufferUnderflow, message)
    }

    /// Attaches the name of the field being processed when the error was
    /// raised, so the dispatcher and engine can report it without the
    /// caller needing to thread it through every `Result`.
    pub fn with_field<S: Into<String>>(mut self, field: S) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Attaches a cause, forming the "optional cause chain" from spec.md §7.
    pub fn with_cause(mut self, cause: Error) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    pub fn cause(&self) -> Option<&Error> {
        self.cause.as_deref()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "[{}] field `{}`: {}", self.kind, field, self.message)?,
            None => write!(f, "[{}] {}", self.kind, self.message)?,
        }
        if let Some(cause) = &self.cause {
            write!(f, " (caused by: {cause})")?;
        }
        Ok(())
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.cause.as_deref().map(|e| e as _)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_field_and_cause() {
        let cause = Error::buffer_underflow("ran off end of buffer");
        let err = Error::decode("checksum mismatch")
            .with_field("crc")
            .with_cause(cause);

        let text = format!("{err}");
        assert!(text.contains("decode"));
        assert!(text.contains("crc"));
        assert!(text.contains("caused by"));
    }
}
