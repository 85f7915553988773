//! Error types for ACT decoding

use thiserror::Error;

/// Coarse classification of an [`ActError`]
///
/// Loaders use this to decide how to degrade (usually "asset unavailable").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActErrorKind {
    /// Magic identifier did not match
    HeaderMismatch,
    /// Checkpoint, ordering, byte-count, block-size or vertex-count violation
    StructuralCorruption,
    /// Block type identifier outside 0..=3
    UnknownBlockType,
    /// A read ran past the end of the buffer
    Truncated,
}

/// Errors that can occur while decoding an ACT buffer
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ActError {
    #[error("Invalid magic bytes {found:?} (expected 'HTCA')")]
    InvalidMagic { found: [u8; 4] },

    #[error("Unexpected end of data at offset {offset} (wanted {wanted} bytes, {available} left)")]
    UnexpectedEof {
        offset: usize,
        wanted: usize,
        available: usize,
    },

    #[error("Seek to offset {offset} is outside the buffer (length {len})")]
    SeekOutOfBounds { offset: usize, len: usize },

    #[error("Keyframe {keyframe} starts at offset {actual}, offset table says {expected}")]
    OffsetMismatch {
        keyframe: usize,
        expected: u32,
        actual: usize,
    },

    #[error("Keyframe {keyframe}: expected mesh index {expected}, found {found}")]
    MeshIndexMismatch {
        keyframe: usize,
        expected: usize,
        found: u16,
    },

    #[error("Keyframe {keyframe}, mesh {mesh}: byte count ended at {remaining} instead of 0")]
    ByteCountResidual {
        keyframe: usize,
        mesh: usize,
        remaining: i64,
    },

    #[error("Keyframe {keyframe}, mesh {mesh}: block type {block_type} declares {declared} bytes but {consumed} were read")]
    BlockLengthMismatch {
        keyframe: usize,
        mesh: usize,
        block_type: u8,
        declared: u32,
        consumed: usize,
    },

    #[error("Keyframe {keyframe}, mesh {mesh}: block type {block_type} must be {expected} bytes, found {found}")]
    InvalidBlockSize {
        keyframe: usize,
        mesh: usize,
        block_type: u8,
        expected: u32,
        found: u32,
    },

    #[error("Keyframe {keyframe}, mesh {mesh}: unknown block type {block_type}")]
    UnknownBlockType {
        keyframe: usize,
        mesh: usize,
        block_type: u8,
    },

    #[error("Keyframe {keyframe}, mesh {mesh}, group {group}: compressed block has no previous positions")]
    CompressedWithoutBase {
        keyframe: usize,
        mesh: usize,
        group: u16,
    },

    #[error("Keyframe {keyframe}, mesh {mesh}, group {group}: compressed block has {found} vertices, previous keyframe has {expected}")]
    VertexCountMismatch {
        keyframe: usize,
        mesh: usize,
        group: u16,
        expected: usize,
        found: usize,
    },

    #[error("Keyframe {keyframe}, mesh {mesh}: group {group} skips ahead of the {groups} groups seen so far")]
    GroupOutOfOrder {
        keyframe: usize,
        mesh: usize,
        group: u16,
        groups: usize,
    },

    #[error("{field} {value} does not fit its field")]
    CountOverflow { field: &'static str, value: usize },
}

impl ActError {
    /// Classify this error
    pub fn kind(&self) -> ActErrorKind {
        match self {
            Self::InvalidMagic { .. } => ActErrorKind::HeaderMismatch,
            Self::UnexpectedEof { .. } | Self::SeekOutOfBounds { .. } => ActErrorKind::Truncated,
            Self::UnknownBlockType { .. } => ActErrorKind::UnknownBlockType,
            Self::OffsetMismatch { .. }
            | Self::MeshIndexMismatch { .. }
            | Self::ByteCountResidual { .. }
            | Self::BlockLengthMismatch { .. }
            | Self::InvalidBlockSize { .. }
            | Self::CompressedWithoutBase { .. }
            | Self::VertexCountMismatch { .. }
            | Self::GroupOutOfOrder { .. }
            | Self::CountOverflow { .. } => ActErrorKind::StructuralCorruption,
        }
    }
}
