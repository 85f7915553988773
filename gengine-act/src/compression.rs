//! Delta compression for vertex positions
//!
//! Compressed vertex blocks store, per vertex, a 2-bit selector and a payload
//! that is added to the same vertex's position in the previous keyframe:
//!
//! | selector | payload              | meaning                              |
//! |----------|----------------------|--------------------------------------|
//! | 0        | none                 | unchanged, copy previous position    |
//! | 1        | 3 × u8               | byte fixed-point delta               |
//! | 2        | 3 × u16 LE           | ushort fixed-point delta             |
//! | 3        | 3 × f32 LE           | full precision delta                 |
//!
//! Selectors are packed four per byte, vertex 0 in the low two bits.
//! Payload components are stored X, Z, Y like every other vector in the format.

use glam::Vec3;

use crate::error::ActError;
use crate::reader::ByteReader;

/// Per-vertex payload format in a compressed block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VertexSelector {
    Unchanged = 0,
    Byte = 1,
    UShort = 2,
    Float = 3,
}

impl VertexSelector {
    /// Decode the low two bits
    #[inline]
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x3 {
            0 => Self::Unchanged,
            1 => Self::Byte,
            2 => Self::UShort,
            _ => Self::Float,
        }
    }

    /// Payload bytes consumed for one vertex
    #[inline]
    pub fn payload_size(self) -> usize {
        match self {
            Self::Unchanged => 0,
            Self::Byte => 3,
            Self::UShort => 6,
            Self::Float => 12,
        }
    }
}

/// Number of selector bytes for `vertex_count` vertices
#[inline]
pub fn selector_bytes(vertex_count: usize) -> usize {
    vertex_count.div_ceil(4)
}

/// Unpack `vertex_count` selectors from the packed info array
pub fn unpack_selectors(packed: &[u8], vertex_count: usize) -> Vec<VertexSelector> {
    debug_assert!(packed.len() >= selector_bytes(vertex_count));
    (0..vertex_count)
        .map(|i| VertexSelector::from_bits(packed[i / 4] >> ((i % 4) * 2)))
        .collect()
}

/// Pack selectors four per byte
pub fn pack_selectors(selectors: &[VertexSelector]) -> Vec<u8> {
    let mut packed = vec![0u8; selector_bytes(selectors.len())];
    for (i, &sel) in selectors.iter().enumerate() {
        packed[i / 4] |= (sel as u8) << ((i % 4) * 2);
    }
    packed
}

// ============================================================================
// Fixed-point scalars
// ============================================================================

/// Decode a byte fixed-point value
///
/// Bit layout: `[sign:1][whole:2][fraction:5]`, value = ±(whole + fraction / 32).
#[inline]
pub fn decode_byte_fixed(value: u8) -> f32 {
    let sign = if value & 0x80 != 0 { -1.0 } else { 1.0 };
    let whole = ((value & 0x7F) >> 5) as f32;
    let fraction = (value & 0x1F) as f32 / 32.0;
    sign * (whole + fraction)
}

/// Decode a ushort fixed-point value
///
/// Sign is bit 15, whole part is bits 8-14 and the fraction is the low 9 bits
/// over 256. Bit 8 belongs to both fields, so an odd whole part also adds 1.0
/// through the fraction.
#[inline]
pub fn decode_ushort_fixed(value: u16) -> f32 {
    let sign = if value & 0x8000 != 0 { -1.0 } else { 1.0 };
    let whole = ((value & 0x7FFF) >> 8) as f32;
    let fraction = (value & 0x01FF) as f32 / 256.0;
    sign * (whole + fraction)
}

/// Nearest byte fixed-point encoding of `value`, or `None` if out of range
pub fn encode_byte_fixed(value: f32) -> Option<u8> {
    if !value.is_finite() {
        return None;
    }
    let steps = (value.abs() * 32.0).round();
    if steps > 127.0 {
        return None;
    }
    // whole << 5 | fraction is just the step count for 0..=127
    let sign = if value.is_sign_negative() && steps > 0.0 { 0x80 } else { 0 };
    Some(sign | steps as u8)
}

/// Nearest ushort fixed-point encoding of `value`, or `None` if not representable
///
/// Because bit 8 is shared, decoded integer parts are always even; values whose
/// rounded integer part is odd have no encoding.
pub fn encode_ushort_fixed(value: f32) -> Option<u16> {
    if !value.is_finite() {
        return None;
    }
    let steps = (value.abs() * 256.0).round();
    if steps > u32::MAX as f32 {
        return None;
    }
    let steps = steps as u32;
    let integer = steps / 256;
    let fraction = steps % 256;
    let whole = match integer {
        n if n % 2 == 1 => return None,
        n if n <= 126 => n,
        128 => 127,
        _ => return None,
    };
    let sign = if value.is_sign_negative() && steps > 0 { 0x8000 } else { 0 };
    Some(sign | ((whole as u16) << 8) | fraction as u16)
}

// ============================================================================
// Per-vertex decode / encode
// ============================================================================

/// Read one vertex's delta payload
pub fn decode_delta(selector: VertexSelector, reader: &mut ByteReader<'_>) -> Result<Vec3, ActError> {
    match selector {
        VertexSelector::Unchanged => Ok(Vec3::ZERO),
        VertexSelector::Byte => {
            let x = decode_byte_fixed(reader.read_u8()?);
            let z = decode_byte_fixed(reader.read_u8()?);
            let y = decode_byte_fixed(reader.read_u8()?);
            Ok(Vec3::new(x, y, z))
        }
        VertexSelector::UShort => {
            let x = decode_ushort_fixed(reader.read_u16()?);
            let z = decode_ushort_fixed(reader.read_u16()?);
            let y = decode_ushort_fixed(reader.read_u16()?);
            Ok(Vec3::new(x, y, z))
        }
        VertexSelector::Float => reader.read_vec3(),
    }
}

/// Resolve this keyframe's absolute position from the previous one
///
/// Selector 0 returns `previous` bit-for-bit.
pub fn decode_vertex(
    selector: VertexSelector,
    previous: Vec3,
    reader: &mut ByteReader<'_>,
) -> Result<Vec3, ActError> {
    match selector {
        VertexSelector::Unchanged => Ok(previous),
        _ => Ok(previous + decode_delta(selector, reader)?),
    }
}

/// Pick the smallest payload that reproduces `delta` within `tolerance`
/// (per component) and append it to `out`.
pub fn encode_delta(delta: Vec3, tolerance: f32, out: &mut Vec<u8>) -> VertexSelector {
    if delta == Vec3::ZERO {
        return VertexSelector::Unchanged;
    }

    // File order X, Z, Y
    let ordered = [delta.x, delta.z, delta.y];
    let within = |decoded: [f32; 3]| {
        decoded
            .iter()
            .zip(ordered.iter())
            .all(|(d, v)| (d - v).abs() <= tolerance)
    };

    let bytes: Option<Vec<u8>> = ordered.iter().map(|&v| encode_byte_fixed(v)).collect();
    if let Some(bytes) = bytes {
        if within([
            decode_byte_fixed(bytes[0]),
            decode_byte_fixed(bytes[1]),
            decode_byte_fixed(bytes[2]),
        ]) {
            out.extend_from_slice(&bytes);
            return VertexSelector::Byte;
        }
    }

    let shorts: Option<Vec<u16>> = ordered.iter().map(|&v| encode_ushort_fixed(v)).collect();
    if let Some(shorts) = shorts {
        if within([
            decode_ushort_fixed(shorts[0]),
            decode_ushort_fixed(shorts[1]),
            decode_ushort_fixed(shorts[2]),
        ]) {
            for s in shorts {
                out.extend_from_slice(&s.to_le_bytes());
            }
            return VertexSelector::UShort;
        }
    }

    for v in ordered {
        out.extend_from_slice(&v.to_le_bytes());
    }
    VertexSelector::Float
}

#[cfg(test)]
mod tests;
