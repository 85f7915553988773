//! ACT writer
//!
//! Produces buffers in exactly the layout the decoder reads: header, a real
//! offset table, and per-keyframe mesh entries with correct byte counts and
//! block lengths. Compressed blocks are delta-encoded against the positions the
//! decoder will have resolved, so quantisation error never accumulates.

use glam::{Mat3, Vec3};

use crate::compression::{decode_vertex, encode_delta, pack_selectors};
use crate::decoder::{Bounds, RigidTransform};
use crate::error::ActError;
use crate::header::ActHeader;
use crate::reader::ByteReader;
use crate::{
    BLOCK_BOUNDS, BLOCK_COMPRESSED_VERTICES, BLOCK_RAW_VERTICES, BLOCK_TRANSFORM,
    BOUNDS_BLOCK_SIZE, TRANSFORM_BLOCK_SIZE,
};

/// One block to write for a mesh at a keyframe
#[derive(Debug, Clone, PartialEq)]
pub enum BlockData {
    /// Absolute positions for a mesh group
    Raw { group: u16, positions: Vec<Vec3> },
    /// Target positions for a mesh group, delta-encoded against the previous keyframe
    Compressed { group: u16, positions: Vec<Vec3> },
    Transform(RigidTransform),
    Bounds(Bounds),
}

/// Builder for ACT buffers
#[derive(Debug, Clone)]
pub struct ActWriter {
    model_name: String,
    version: u32,
    mesh_count: usize,
    tolerance: f32,
    keyframes: Vec<Vec<Vec<BlockData>>>,
}

impl ActWriter {
    pub fn new(model_name: &str, mesh_count: usize) -> Self {
        Self {
            model_name: model_name.to_string(),
            version: 0,
            mesh_count,
            tolerance: 0.0,
            keyframes: Vec::new(),
        }
    }

    /// Value written to the (unvalidated) version field
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Per-component error allowed when choosing fixed-point payloads.
    /// The default of 0.0 only uses them when they are exact.
    pub fn with_tolerance(mut self, tolerance: f32) -> Self {
        self.tolerance = tolerance.max(0.0);
        self
    }

    /// Append a keyframe. `meshes[j]` holds the blocks for mesh `j`; missing
    /// meshes are written as unchanged and extra entries are dropped.
    pub fn push_keyframe(&mut self, mut meshes: Vec<Vec<BlockData>>) -> &mut Self {
        meshes.resize_with(self.mesh_count, Vec::new);
        self.keyframes.push(meshes);
        self
    }

    pub fn keyframe_count(&self) -> usize {
        self.keyframes.len()
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>, ActError> {
        let mut header = ActHeader::new(
            &self.model_name,
            fit("keyframe count", self.keyframes.len())?,
            fit("mesh count", self.mesh_count)?,
        );
        header.version = self.version;

        // Resolved positions as the decoder will see them, per (mesh, group)
        let mut history: Vec<Vec<Vec<Vec3>>> = vec![Vec::new(); self.mesh_count];
        let mut body = Vec::new();
        let mut relative_offsets = Vec::with_capacity(self.keyframes.len());

        for (keyframe, meshes) in self.keyframes.iter().enumerate() {
            relative_offsets.push(body.len());
            for (mesh, blocks) in meshes.iter().enumerate() {
                let mut entry = Vec::new();
                for block in blocks {
                    self.write_block(block, keyframe, mesh, &mut history[mesh], &mut entry)?;
                }
                body.extend_from_slice(&fit::<u16>("mesh index", mesh)?.to_le_bytes());
                body.extend_from_slice(&fit::<u32>("byte count", entry.len())?.to_le_bytes());
                body.extend_from_slice(&entry);
            }
        }

        let table_end = header.table_end();
        header.offsets = relative_offsets
            .into_iter()
            .map(|offset| fit::<u32>("keyframe offset", table_end + offset))
            .collect::<Result<Vec<_>, _>>()?;
        header.content_size = fit("content size", table_end + body.len())?;

        let mut bytes = header.to_bytes();
        bytes.extend_from_slice(&body);
        Ok(bytes)
    }

    fn write_block(
        &self,
        block: &BlockData,
        keyframe: usize,
        mesh: usize,
        history: &mut Vec<Vec<Vec3>>,
        out: &mut Vec<u8>,
    ) -> Result<(), ActError> {
        let mut payload = Vec::new();
        let block_type = match block {
            BlockData::Raw { group, positions } => {
                let vertex_count: u16 = fit("vertex count", positions.len())?;
                if *group as usize > history.len() {
                    return Err(ActError::GroupOutOfOrder {
                        keyframe,
                        mesh,
                        group: *group,
                        groups: history.len(),
                    });
                }
                payload.extend_from_slice(&group.to_le_bytes());
                payload.extend_from_slice(&vertex_count.to_le_bytes());
                for &p in positions {
                    write_vec3(&mut payload, p);
                }
                store(history, *group, positions.clone());
                BLOCK_RAW_VERTICES
            }
            BlockData::Compressed { group, positions } => {
                let previous = match history.get(*group as usize) {
                    Some(previous) if keyframe > 0 => previous,
                    _ => {
                        return Err(ActError::CompressedWithoutBase {
                            keyframe,
                            mesh,
                            group: *group,
                        });
                    }
                };
                if previous.len() != positions.len() {
                    return Err(ActError::VertexCountMismatch {
                        keyframe,
                        mesh,
                        group: *group,
                        expected: previous.len(),
                        found: positions.len(),
                    });
                }

                let mut selectors = Vec::with_capacity(positions.len());
                let mut deltas = Vec::new();
                let mut resolved = Vec::with_capacity(positions.len());
                for (&target, &prev) in positions.iter().zip(previous.iter()) {
                    let start = deltas.len();
                    let selector = encode_delta(target - prev, self.tolerance, &mut deltas);
                    let mut reader = ByteReader::new(&deltas[start..]);
                    resolved.push(decode_vertex(selector, prev, &mut reader)?);
                    selectors.push(selector);
                }

                payload.extend_from_slice(&group.to_le_bytes());
                payload.extend_from_slice(&fit::<u16>("vertex count", positions.len())?.to_le_bytes());
                payload.extend_from_slice(&pack_selectors(&selectors));
                payload.extend_from_slice(&deltas);
                store(history, *group, resolved);
                BLOCK_COMPRESSED_VERTICES
            }
            BlockData::Transform(transform) => {
                let basis = Mat3::from_quat(transform.rotation);
                write_vec3(&mut payload, basis.x_axis);
                write_vec3(&mut payload, basis.z_axis);
                write_vec3(&mut payload, basis.y_axis);
                write_vec3(&mut payload, transform.offset);
                debug_assert_eq!(payload.len(), TRANSFORM_BLOCK_SIZE as usize);
                BLOCK_TRANSFORM
            }
            BlockData::Bounds(bounds) => {
                write_vec3(&mut payload, bounds.min);
                write_vec3(&mut payload, bounds.max);
                debug_assert_eq!(payload.len(), BOUNDS_BLOCK_SIZE as usize);
                BLOCK_BOUNDS
            }
        };

        out.push(block_type);
        out.extend_from_slice(&fit::<u32>("block length", payload.len())?.to_le_bytes());
        out.extend_from_slice(&payload);
        Ok(())
    }
}

/// Groups are dense; callers check `group <= history.len()` first
fn store(history: &mut Vec<Vec<Vec3>>, group: u16, positions: Vec<Vec3>) {
    let index = group as usize;
    if index == history.len() {
        history.push(positions);
    } else {
        history[index] = positions;
    }
}

/// Narrow a length or index to its on-disk field width
fn fit<T: TryFrom<usize>>(field: &'static str, value: usize) -> Result<T, ActError> {
    T::try_from(value).map_err(|_| ActError::CountOverflow { field, value })
}

/// Vectors are stored X, Z, Y
fn write_vec3(out: &mut Vec<u8>, v: Vec3) {
    out.extend_from_slice(&v.x.to_le_bytes());
    out.extend_from_slice(&v.z.to_le_bytes());
    out.extend_from_slice(&v.y.to_le_bytes());
}
