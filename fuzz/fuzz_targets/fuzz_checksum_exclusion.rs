#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use boxon::checksum::crc16::Crc16CcittFalse;
use boxon::checksum::ChecksumAlgorithm;

#[derive(Debug, Arbitrary)]
struct Input {
    prefix: Vec<u8>,
    covered: Vec<u8>,
    suffix: Vec<u8>,
    replacement_suffix: Vec<u8>,
    init: u64,
}

// spec.md P6: changing bytes outside [skipStart, totalBytes - skipEnd)
// must not affect the checksum value computed over the covered span.
fuzz_target!(|input: Input| {
    let algo = Crc16CcittFalse;
    let a: Vec<u8> = input
        .prefix
        .iter()
        .chain(input.covered.iter())
        .chain(input.suffix.iter())
        .copied()
        .collect();
    let b: Vec<u8> = input
        .prefix
        .iter()
        .chain(input.covered.iter())
        .chain(input.replacement_suffix.iter())
        .copied()
        .collect();

    let skip_start = input.prefix.len();
    let skip_end_a = input.suffix.len();
    let skip_end_b = input.replacement_suffix.len();

    let span_a = &a[skip_start..a.len() - skip_end_a];
    let span_b = &b[skip_start..b.len() - skip_end_b];
    assert_eq!(span_a, input.covered.as_slice());
    assert_eq!(span_b, input.covered.as_slice());

    let checksum_a = algo.compute(span_a, input.init);
    let checksum_b = algo.compute(span_b, input.init);
    assert_eq!(checksum_a, checksum_b);
});
