#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use boxon::template::Header;

#[derive(Debug, Arbitrary)]
struct Input {
    starts: Vec<Vec<u8>>,
    buffer: Vec<u8>,
    pos: u8,
}

// spec.md invariant I1: the longest-match result (if any) must itself be
// one of the declared `start` sequences and must actually be a prefix of
// the buffer at `pos`; a shorter declared start never wins over a longer
// one that also matches.
fuzz_target!(|input: Input| {
    let starts: Vec<Vec<u8>> = input.starts.into_iter().filter(|s| !s.is_empty()).collect();
    if starts.is_empty() {
        return;
    }
    let header = match Header::new(starts.clone(), None, boxon::bits::Charset::Utf8) {
        Ok(h) => h,
        Err(_) => return,
    };
    let pos = (input.pos as usize) % (input.buffer.len() + 1).max(1);
    if pos > input.buffer.len() {
        return;
    }
    let matched = header.longest_match_at(&input.buffer, pos);
    if let Some(found) = matched {
        assert!(starts.iter().any(|s| s.as_slice() == found));
        assert!(input.buffer[pos..].starts_with(found));
        for candidate in &starts {
            if input.buffer[pos..].starts_with(candidate.as_slice()) {
                assert!(candidate.len() <= found.len());
            }
        }
    } else {
        for candidate in &starts {
            assert!(!input.buffer[pos..].starts_with(candidate.as_slice()));
        }
    }
});
