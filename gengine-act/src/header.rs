//! ACT header and keyframe offset table

use crate::error::ActError;
use crate::reader::{ByteReader, trim_name};
use crate::{ACT_HEADER_SIZE, ACT_MAGIC, MODEL_NAME_LEN};

/// ACT file header plus the per-keyframe offset table
///
/// Both asset variants share this layout. `version` and `content_size` are
/// carried through but never validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActHeader {
    pub version: u32,
    pub keyframe_count: u32,
    pub mesh_count: u32,
    pub content_size: u32,
    /// Model the animation targets, with NUL padding removed
    pub model_name: String,
    /// Absolute start offset of each keyframe (decode checkpoints)
    pub offsets: Vec<u32>,
}

impl ActHeader {
    /// Fixed size before the offset table
    pub const SIZE: usize = ACT_HEADER_SIZE;

    pub fn new(model_name: &str, keyframe_count: u32, mesh_count: u32) -> Self {
        Self {
            version: 0,
            keyframe_count,
            mesh_count,
            content_size: 0,
            model_name: model_name.to_string(),
            offsets: Vec::with_capacity(keyframe_count as usize),
        }
    }

    /// Parse the header and offset table from the start of `data`
    pub fn parse(data: &[u8]) -> Result<Self, ActError> {
        let mut reader = ByteReader::new(data);
        Self::read(&mut reader)
    }

    /// Read the header and offset table at the reader's cursor
    pub fn read(reader: &mut ByteReader<'_>) -> Result<Self, ActError> {
        let magic = reader.read_bytes(4)?;
        if magic != ACT_MAGIC {
            let mut found = [0u8; 4];
            found.copy_from_slice(magic);
            return Err(ActError::InvalidMagic { found });
        }

        let version = reader.read_u32()?;
        let keyframe_count = reader.read_u32()?;
        let mesh_count = reader.read_u32()?;
        let content_size = reader.read_u32()?;
        let model_name = trim_name(&reader.read_string(MODEL_NAME_LEN)?);

        // Bound the table by what the buffer can hold before allocating
        let table_len = keyframe_count as usize;
        if table_len.saturating_mul(4) > reader.remaining() {
            return Err(ActError::UnexpectedEof {
                offset: reader.position(),
                wanted: table_len.saturating_mul(4),
                available: reader.remaining(),
            });
        }

        let mut offsets = Vec::with_capacity(table_len);
        for _ in 0..table_len {
            offsets.push(reader.read_u32()?);
        }

        Ok(Self {
            version,
            keyframe_count,
            mesh_count,
            content_size,
            model_name,
            offsets,
        })
    }

    /// Size of header plus offset table, i.e. the offset of keyframe 0
    pub fn table_end(&self) -> usize {
        Self::SIZE + self.keyframe_count as usize * 4
    }

    /// Write header and offset table
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.table_end());
        bytes.extend_from_slice(ACT_MAGIC);
        bytes.extend_from_slice(&self.version.to_le_bytes());
        bytes.extend_from_slice(&self.keyframe_count.to_le_bytes());
        bytes.extend_from_slice(&self.mesh_count.to_le_bytes());
        bytes.extend_from_slice(&self.content_size.to_le_bytes());

        let mut name = [0u8; MODEL_NAME_LEN];
        let src = self.model_name.as_bytes();
        let len = src.len().min(MODEL_NAME_LEN);
        name[..len].copy_from_slice(&src[..len]);
        bytes.extend_from_slice(&name);

        for offset in &self.offsets {
            bytes.extend_from_slice(&offset.to_le_bytes());
        }
        bytes
    }
}
