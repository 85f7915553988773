//! Little-endian cursor over an in-memory buffer
//!
//! Every read advances by exactly the width of the type. Reading past the end
//! is an [`ActError::UnexpectedEof`], never a zero-filled value.

use glam::Vec3;

use crate::error::ActError;

/// Sequential reader over a borrowed byte buffer
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Current byte offset from the start of the buffer
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total buffer length
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Bytes left after the cursor
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Move the cursor to an absolute offset (the end of the buffer is allowed)
    pub fn seek(&mut self, offset: usize) -> Result<(), ActError> {
        if offset > self.data.len() {
            return Err(ActError::SeekOutOfBounds {
                offset,
                len: self.data.len(),
            });
        }
        self.pos = offset;
        Ok(())
    }

    /// Advance the cursor by `count` bytes
    pub fn skip(&mut self, count: usize) -> Result<(), ActError> {
        self.read_bytes(count).map(|_| ())
    }

    /// Read a raw block of `count` bytes
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], ActError> {
        if count > self.remaining() {
            return Err(ActError::UnexpectedEof {
                offset: self.pos,
                wanted: count,
                available: self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ActError> {
        let mut buf = [0u8; N];
        buf.copy_from_slice(self.read_bytes(N)?);
        Ok(buf)
    }

    /// Read exactly `len` bytes as a string. Embedded NULs are kept.
    pub fn read_string(&mut self, len: usize) -> Result<String, ActError> {
        let bytes = self.read_bytes(len)?;
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn read_u8(&mut self) -> Result<u8, ActError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, ActError> {
        Ok(i8::from_le_bytes(self.read_array()?))
    }

    pub fn read_u16(&mut self) -> Result<u16, ActError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_i16(&mut self) -> Result<i16, ActError> {
        Ok(i16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, ActError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_i32(&mut self) -> Result<i32, ActError> {
        Ok(i32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32, ActError> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// Read a vector stored in file order X, Z, Y
    pub fn read_vec3(&mut self) -> Result<Vec3, ActError> {
        let x = self.read_f32()?;
        let z = self.read_f32()?;
        let y = self.read_f32()?;
        Ok(Vec3::new(x, y, z))
    }
}

/// Cut a fixed-length name at its first NUL and drop trailing padding
pub(crate) fn trim_name(raw: &str) -> String {
    let end = raw.find('\0').unwrap_or(raw.len());
    raw[..end].trim_end().to_string()
}
