//! Tests for vertex delta compression

use super::*;

fn payload_reader(bytes: &[u8]) -> ByteReader<'_> {
    ByteReader::new(bytes)
}

// ========================================================================
// Fixed-point boundary values
// ========================================================================

#[test]
fn test_byte_fixed_boundaries() {
    assert_eq!(decode_byte_fixed(0x00), 0.0);
    // sign set, whole 0b11, fraction 31/32
    assert_eq!(decode_byte_fixed(0xFF), -(3.0 + 31.0 / 32.0));
    assert_eq!(decode_byte_fixed(0x7F), 3.0 + 31.0 / 32.0);
    assert_eq!(decode_byte_fixed(0x10), 0.5);
    // 0x90 carries the sign bit
    assert_eq!(decode_byte_fixed(0x90), -0.5);
    assert_eq!(decode_byte_fixed(0x20), 1.0);
    assert_eq!(decode_byte_fixed(0x01), 1.0 / 32.0);
}

#[test]
fn test_ushort_fixed_boundaries() {
    assert_eq!(decode_ushort_fixed(0x0000), 0.0);
    assert_eq!(decode_ushort_fixed(0x0080), 0.5);
    assert_eq!(decode_ushort_fixed(0x8080), -0.5);
    assert_eq!(decode_ushort_fixed(0x0001), 1.0 / 256.0);
    assert_eq!(decode_ushort_fixed(0x0200), 2.0);
    // Bit 8 counts as whole 1 and as fraction 256/256
    assert_eq!(decode_ushort_fixed(0x0100), 2.0);
    assert_eq!(decode_ushort_fixed(0x7FFF), 127.0 + 511.0 / 256.0);
    assert_eq!(decode_ushort_fixed(0xFFFF), -(127.0 + 511.0 / 256.0));
}

#[test]
fn test_byte_fixed_encoding() {
    assert_eq!(encode_byte_fixed(0.5), Some(0x10));
    assert_eq!(encode_byte_fixed(-0.5), Some(0x90));
    assert_eq!(encode_byte_fixed(0.0), Some(0x00));
    assert_eq!(encode_byte_fixed(-0.0), Some(0x00));
    assert_eq!(encode_byte_fixed(3.0 + 31.0 / 32.0), Some(0x7F));
    assert_eq!(encode_byte_fixed(4.0), None);
    assert_eq!(encode_byte_fixed(f32::NAN), None);

    for byte in 0..=255u8 {
        let value = decode_byte_fixed(byte);
        let encoded = encode_byte_fixed(value).unwrap();
        assert_eq!(decode_byte_fixed(encoded), value, "byte {:#04x}", byte);
    }
}

#[test]
fn test_ushort_fixed_encoding() {
    assert_eq!(encode_ushort_fixed(0.5), Some(0x0080));
    assert_eq!(encode_ushort_fixed(-2.25), Some(0x8240));
    // Odd integer parts cannot be represented
    assert_eq!(encode_ushort_fixed(1.5), None);
    assert_eq!(encode_ushort_fixed(128.5), Some(0x7F80));
    assert_eq!(encode_ushort_fixed(130.0), None);

    for value in [0.0f32, 0.25, 0.75, 2.5, 4.125, 10.0, 126.99609375, -6.5] {
        let encoded = encode_ushort_fixed(value).unwrap();
        assert_eq!(decode_ushort_fixed(encoded), value, "value {}", value);
    }
}

// ========================================================================
// Selector packing
// ========================================================================

#[test]
fn test_unpack_selectors_low_bits_first() {
    // 0b11_10_01_00 -> vertex 0 = 0, 1 = 1, 2 = 2, 3 = 3
    let sels = unpack_selectors(&[0b1110_0100, 0b0000_0010], 5);
    assert_eq!(
        sels,
        vec![
            VertexSelector::Unchanged,
            VertexSelector::Byte,
            VertexSelector::UShort,
            VertexSelector::Float,
            VertexSelector::UShort,
        ]
    );
}

#[test]
fn test_selector_bytes() {
    assert_eq!(selector_bytes(0), 0);
    assert_eq!(selector_bytes(1), 1);
    assert_eq!(selector_bytes(4), 1);
    assert_eq!(selector_bytes(5), 2);
    assert_eq!(selector_bytes(100), 25);
}

#[test]
fn test_pack_unpack_selectors() {
    let all = [
        VertexSelector::Unchanged,
        VertexSelector::Byte,
        VertexSelector::UShort,
        VertexSelector::Float,
    ];
    for count in [0usize, 1, 4, 5, 100] {
        let sels: Vec<_> = (0..count).map(|i| all[(i * 7 + 3) % 4]).collect();
        let packed = pack_selectors(&sels);
        assert_eq!(packed.len(), selector_bytes(count));
        assert_eq!(unpack_selectors(&packed, count), sels);
    }
}

// ========================================================================
// Per-vertex decode
// ========================================================================

#[test]
fn test_selector_zero_copies_previous_exactly() {
    let previous = Vec3::new(0.1, -7.3, 1e-7);
    let mut reader = payload_reader(&[]);
    let out = decode_vertex(VertexSelector::Unchanged, previous, &mut reader).unwrap();
    assert_eq!(out.to_array(), previous.to_array());
    assert_eq!(reader.position(), 0);
}

#[test]
fn test_selector_byte_adds_delta() {
    // file order X, Z, Y
    let payload = [0x10, 0x20, 0x81];
    let mut reader = payload_reader(&payload);
    let out = decode_vertex(VertexSelector::Byte, Vec3::new(1.0, 1.0, 1.0), &mut reader).unwrap();
    assert_eq!(out, Vec3::new(1.5, 1.0 - 1.0 / 32.0, 2.0));
    assert_eq!(reader.position(), 3);
}

#[test]
fn test_selector_ushort_adds_delta() {
    let mut payload = Vec::new();
    for v in [0x0080u16, 0x0000, 0x8200] {
        payload.extend_from_slice(&v.to_le_bytes());
    }
    let mut reader = payload_reader(&payload);
    let out = decode_vertex(VertexSelector::UShort, Vec3::ZERO, &mut reader).unwrap();
    assert_eq!(out, Vec3::new(0.5, -2.0, 0.0));
    assert_eq!(reader.position(), 6);
}

#[test]
fn test_selector_float_adds_delta() {
    let mut payload = Vec::new();
    for v in [10.0f32, 30.0, 20.0] {
        payload.extend_from_slice(&v.to_le_bytes());
    }
    let mut reader = payload_reader(&payload);
    let out = decode_vertex(VertexSelector::Float, Vec3::splat(1.0), &mut reader).unwrap();
    assert_eq!(out, Vec3::new(11.0, 21.0, 31.0));
    assert_eq!(reader.position(), 12);
}

#[test]
fn test_truncated_payload_is_error() {
    let mut reader = payload_reader(&[0x10, 0x10]);
    assert!(decode_vertex(VertexSelector::Byte, Vec3::ZERO, &mut reader).is_err());
}

// ========================================================================
// Encoder selection
// ========================================================================

#[test]
fn test_encode_delta_picks_smallest_exact_payload() {
    let mut out = Vec::new();
    assert_eq!(encode_delta(Vec3::ZERO, 0.0, &mut out), VertexSelector::Unchanged);
    assert!(out.is_empty());

    assert_eq!(
        encode_delta(Vec3::new(0.5, 0.0, 0.0), 0.0, &mut out),
        VertexSelector::Byte
    );
    assert_eq!(out, vec![0x10, 0x00, 0x00]);

    out.clear();
    // 1/256 needs ushort precision
    assert_eq!(
        encode_delta(Vec3::new(1.0 / 256.0, 0.0, 0.0), 0.0, &mut out),
        VertexSelector::UShort
    );
    assert_eq!(out.len(), 6);

    out.clear();
    assert_eq!(
        encode_delta(Vec3::new(0.1, 0.0, 0.0), 0.0, &mut out),
        VertexSelector::Float
    );
    assert_eq!(out.len(), 12);

    out.clear();
    // With a loose tolerance 0.1 fits in a byte
    assert_eq!(
        encode_delta(Vec3::new(0.1, 0.0, 0.0), 1.0 / 64.0, &mut out),
        VertexSelector::Byte
    );
}

#[test]
fn test_encode_then_decode_matches_delta() {
    let previous = Vec3::new(2.0, -1.0, 0.25);
    let deltas = [
        Vec3::ZERO,
        Vec3::new(0.5, -0.25, 3.0),
        Vec3::new(4.5, 0.0, -0.00390625),
        Vec3::new(1000.0, -0.1, 0.3),
    ];
    for delta in deltas {
        let mut payload = Vec::new();
        let sel = encode_delta(delta, 0.0, &mut payload);
        assert_eq!(payload.len(), sel.payload_size());
        let mut reader = payload_reader(&payload);
        let out = decode_vertex(sel, previous, &mut reader).unwrap();
        assert_eq!(out, previous + delta, "delta {:?} via {:?}", delta, sel);
    }
}
