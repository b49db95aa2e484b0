#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use boxon::bits::{BitReader, BitWriter};
use boxon::types::Endian;

#[derive(Debug, Arbitrary)]
struct UnsignedOp {
    width: u8,
    value: u64,
    order: Endian,
}

#[derive(Debug, Arbitrary)]
struct Input {
    ops: Vec<UnsignedOp>,
}

// spec.md P7/§4.1: writing then reading back an n-bit unsigned value under
// a chosen byte order reproduces the value masked to that width, for every
// width in the supported 1..=64 range.
fuzz_target!(|input: Input| {
    let mut writer = BitWriter::new();
    let mut widths = Vec::new();
    for op in &input.ops {
        let width = 1 + (op.width as u32 % 64);
        let masked = if width == 64 {
            op.value
        } else {
            op.value & ((1u64 << width) - 1)
        };
        writer.write_unsigned_bits(masked, width, op.order);
        widths.push((width, masked, op.order));
    }
    let bytes = writer.into_bytes();
    let mut reader = BitReader::new(&bytes);
    for (width, expected, order) in widths {
        let got = reader.read_unsigned_bits(width, order).unwrap();
        assert_eq!(got, expected, "width {width} order {order:?}");
    }
});
