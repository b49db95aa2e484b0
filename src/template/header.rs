//! The header portion of a [`super::Template`] (spec.md §3 "Template",
//! §4.3 "Derived properties").

use crate::bits::Charset;
use crate::std::vec::Vec;
use crate::{Error, Result};

/// One or more candidate start sequences, an optional end marker, and the
/// charset used to turn header strings into bytes (spec.md §6 "Template
/// declaration surface").
#[derive(Clone, Debug)]
pub struct Header {
    starts: Vec<Vec<u8>>,
    end: Option<Vec<u8>>,
    charset: Charset,
}

impl Header {
    /// Builds a header from already-resolved byte sequences. `starts` MUST
    /// be non-empty (spec.md invariant I1).
    pub fn new(starts: Vec<Vec<u8>>, end: Option<Vec<u8>>, charset: Charset) -> Result<Self> {
        if starts.is_empty() {
            return Err(Error::template(
                "a template's header must declare at least one start sequence",
            ));
        }
        Ok(Self {
            starts,
            end,
            charset,
        })
    }

    /// Convenience constructor taking header strings encoded under `charset`.
    pub fn from_strings(starts: &[&str], end: Option<&str>, charset: Charset) -> Result<Self> {
        let starts = starts.iter().map(|s| charset.encode(s)).collect();
        let end = end.map(|s| charset.encode(s));
        Self::new(starts, end, charset)
    }

    pub fn starts(&self) -> &[Vec<u8>] {
        &self.starts
    }

    pub fn end(&self) -> Option<&[u8]> {
        self.end.as_deref()
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }

    pub fn shortest_header_length(&self) -> usize {
        self.starts.iter().map(Vec::len).min().unwrap_or(0)
    }

    pub fn longest_header_length(&self) -> usize {
        self.starts.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// The longest of this header's `start` sequences that matches `bytes`
    /// at `pos`, or `None` (spec.md invariant I1 "header selection uses
    /// longest-match by byte length").
    pub fn longest_match_at<'a>(&'a self, bytes: &[u8], pos: usize) -> Option<&'a [u8]> {
        self.starts
            .iter()
            .filter(|start| bytes[pos..].starts_with(start.as_slice()))
            .map(Vec::as_slice)
            .max_by_key(|start| start.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_start_list() {
        assert!(Header::new(Vec::new(), None, Charset::Utf8).is_err());
    }

    #[test]
    fn longest_match_prefers_longer_start() {
        let header =
            Header::new(vec![crate::std::vec![0x2B, 0x41]], None, Charset::Utf8).unwrap();
        let bytes = [0x2B, 0x41, 0x43];
        assert_eq!(header.longest_match_at(&bytes, 0), Some(&bytes[..2]));
        assert_eq!(header.longest_match_at(&[0x00], 0), None);
    }
}
