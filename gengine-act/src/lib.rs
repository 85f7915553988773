//! gengine-act: ACT keyframe animation codec for the G-Engine reimplementation
//!
//! ACT assets drive per-vertex ("vertex animation") and rigid per-mesh motion for
//! actors and props. This crate decodes the binary layout from an in-memory buffer
//! and reconstructs continuous motion from the sparse, delta-compressed keyframes.
//! Asset lookup (file system, barn archives) and rendering live elsewhere; the
//! codec only ever sees a `&[u8]`.
//!
//! # Modules
//!
//! - [`reader`] - little-endian cursor over the input buffer
//! - [`header`] - file header and per-keyframe offset table
//! - [`compression`] - 2-bit selector delta compression for vertex positions
//! - [`decoder`] - keyframe → mesh → block decode shared by both asset types
//! - [`animation`] - [`ActAnimation`], the fully resolved keyframe table
//! - [`vertex_animation`] - [`VertexAnimation`], per-mesh pose chains for playback
//! - [`sampler`] - time → pose bracketing, lerp / slerp
//! - [`writer`] - [`ActWriter`], encoder for the same layout
//!
//! # Format Overview
//!
//! ```text
//! 0x00: magic "HTCA"
//! 0x04: version u32 LE      - not validated
//! 0x08: keyframe_count u32
//! 0x0C: mesh_count u32
//! 0x10: content_size u32    - not validated
//! 0x14: model_name [u8; 32]
//! 0x34: offsets [u32; keyframe_count] - absolute start of each keyframe
//!
//! per keyframe, per mesh (in mesh order):
//!   mesh_index u16, byte_count u32, blocks...
//! per block:
//!   type u8, block_length u32, payload[block_length]
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use gengine_act::{VertexAnimation, DEFAULT_FRAMES_PER_SECOND};
//!
//! let bytes = std::fs::read("GAB_WALK.ACT").unwrap();
//! let anim = VertexAnimation::parse("GAB_WALK.ACT", &bytes).unwrap();
//!
//! if let Some(groups) = anim.sample_vertices(0, 1.25, DEFAULT_FRAMES_PER_SECOND) {
//!     println!("mesh 0 has {} groups", groups.len());
//! }
//! ```

pub mod animation;
pub mod compression;
pub mod decoder;
mod error;
pub mod header;
pub mod reader;
pub mod sampler;
pub mod vertex_animation;
pub mod writer;

pub use animation::{ActAnimation, ActFrame, MeshSnapshot};
pub use compression::{
    decode_byte_fixed, decode_delta, decode_ushort_fixed, encode_byte_fixed,
    encode_ushort_fixed, unpack_selectors, VertexSelector,
};
pub use decoder::{decode_keyframes, Bounds, DecodedAct, MeshKeyframe, RigidTransform};
pub use error::{ActError, ActErrorKind};
pub use header::ActHeader;
pub use reader::ByteReader;
pub use sampler::{locate, Bracket, Timed};
pub use vertex_animation::{MeshTracks, TransformPose, VertexAnimation, VertexPose};
pub use writer::{ActWriter, BlockData};

// =============================================================================
// Constants
// =============================================================================

/// ACT magic string ("ACTH" stored byte-reversed)
pub const ACT_MAGIC: &[u8; 4] = b"HTCA";

/// Fixed header size before the offset table
pub const ACT_HEADER_SIZE: usize = 52;

/// Length of the model name field
pub const MODEL_NAME_LEN: usize = 32;

/// Block type: absolute vertex positions
pub const BLOCK_RAW_VERTICES: u8 = 0;

/// Block type: delta-compressed vertex positions
pub const BLOCK_COMPRESSED_VERTICES: u8 = 1;

/// Block type: rigid transform (basis axes + offset)
pub const BLOCK_TRANSFORM: u8 = 2;

/// Block type: axis-aligned bounds
pub const BLOCK_BOUNDS: u8 = 3;

/// Payload size of a transform block (12 floats)
pub const TRANSFORM_BLOCK_SIZE: u32 = 48;

/// Payload size of a bounds block (6 floats)
pub const BOUNDS_BLOCK_SIZE: u32 = 24;

/// Playback rate the game drives vertex animations at. The format stores no rate.
pub const DEFAULT_FRAMES_PER_SECOND: f32 = 15.0;
