//! Keyframe → mesh → block decode shared by both ACT asset types
//!
//! Walks the nested layout once, validating every structural invariant as it
//! goes, and hands back per-keyframe, per-mesh results. Any violation aborts
//! the whole decode; the byte-count bookkeeping makes resynchronising unsafe.

use glam::{Mat3, Quat, Vec3};

use crate::compression::{decode_vertex, selector_bytes, unpack_selectors};
use crate::error::ActError;
use crate::header::ActHeader;
use crate::reader::ByteReader;
use crate::{
    BLOCK_BOUNDS, BLOCK_COMPRESSED_VERTICES, BLOCK_RAW_VERTICES, BLOCK_TRANSFORM,
    BOUNDS_BLOCK_SIZE, TRANSFORM_BLOCK_SIZE,
};

/// Rigid local transform of a mesh at one keyframe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigidTransform {
    pub rotation: Quat,
    pub offset: Vec3,
}

impl RigidTransform {
    pub const IDENTITY: Self = Self {
        rotation: Quat::IDENTITY,
        offset: Vec3::ZERO,
    };
}

/// Axis-aligned bounds recorded alongside a mesh snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

/// Everything one keyframe says about one mesh
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshKeyframe {
    /// All groups of the mesh, resolved, if any vertex block was present
    pub vertices: Option<Vec<Vec<Vec3>>>,
    pub transform: Option<RigidTransform>,
    pub bounds: Option<Bounds>,
}

impl MeshKeyframe {
    /// True for a zero byte-count entry ("unchanged this keyframe")
    pub fn is_empty(&self) -> bool {
        self.vertices.is_none() && self.transform.is_none() && self.bounds.is_none()
    }
}

/// Result of one full decode pass
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAct {
    pub header: ActHeader,
    /// `keyframes[i][j]` is mesh `j` at keyframe `i`
    pub keyframes: Vec<Vec<MeshKeyframe>>,
}

/// Last resolved positions per (mesh, group), the base for delta blocks
///
/// Groups are dense: a new group index may be at most one past the groups
/// already seen for that mesh.
#[derive(Debug, Default)]
struct MeshHistory {
    meshes: Vec<Vec<Vec<Vec3>>>,
}

impl MeshHistory {
    fn new(mesh_count: usize) -> Self {
        Self {
            meshes: vec![Vec::new(); mesh_count],
        }
    }

    fn group_count(&self, mesh: usize) -> usize {
        self.meshes[mesh].len()
    }

    fn group(&self, mesh: usize, group: u16) -> Option<&[Vec3]> {
        self.meshes[mesh].get(group as usize).map(Vec::as_slice)
    }

    /// Caller guarantees `group <= group_count(mesh)`
    fn set(&mut self, mesh: usize, group: u16, positions: Vec<Vec3>) {
        let groups = &mut self.meshes[mesh];
        let index = group as usize;
        if index == groups.len() {
            groups.push(positions);
        } else {
            groups[index] = positions;
        }
    }

    /// Resolved positions of every group seen so far
    fn snapshot(&self, mesh: usize) -> Vec<Vec<Vec3>> {
        self.meshes[mesh].clone()
    }
}

/// Decoder state for one pass over one buffer
struct KeyframeBlockDecoder {
    mesh_count: usize,
    history: MeshHistory,
}

impl KeyframeBlockDecoder {
    fn new(mesh_count: usize) -> Self {
        Self {
            mesh_count,
            history: MeshHistory::new(mesh_count),
        }
    }

    fn decode_keyframe(
        &mut self,
        reader: &mut ByteReader<'_>,
        keyframe: usize,
    ) -> Result<Vec<MeshKeyframe>, ActError> {
        let mut meshes = Vec::with_capacity(self.mesh_count);
        for mesh in 0..self.mesh_count {
            meshes.push(self.decode_mesh_entry(reader, keyframe, mesh)?);
        }
        Ok(meshes)
    }

    fn decode_mesh_entry(
        &mut self,
        reader: &mut ByteReader<'_>,
        keyframe: usize,
        mesh: usize,
    ) -> Result<MeshKeyframe, ActError> {
        let found = reader.read_u16()?;
        if found as usize != mesh {
            return Err(ActError::MeshIndexMismatch {
                keyframe,
                expected: mesh,
                found,
            });
        }

        let mut remaining = reader.read_u32()? as i64;
        let mut entry = MeshKeyframe::default();
        let mut vertices_changed = false;

        while remaining > 0 {
            let block_type = reader.read_u8()?;
            remaining -= 1;

            if block_type > BLOCK_BOUNDS {
                return Err(ActError::UnknownBlockType {
                    keyframe,
                    mesh,
                    block_type,
                });
            }

            let block_length = reader.read_u32()?;
            remaining -= 4 + block_length as i64;
            let block_start = reader.position();

            match block_type {
                BLOCK_RAW_VERTICES => {
                    let (group, positions) = read_raw_vertices(reader)?;
                    let groups = self.history.group_count(mesh);
                    if group as usize > groups {
                        return Err(ActError::GroupOutOfOrder {
                            keyframe,
                            mesh,
                            group,
                            groups,
                        });
                    }
                    tracing::trace!(
                        "keyframe {} mesh {} group {}: {} raw vertices",
                        keyframe,
                        mesh,
                        group,
                        positions.len()
                    );
                    self.history.set(mesh, group, positions);
                    vertices_changed = true;
                }
                BLOCK_COMPRESSED_VERTICES => {
                    let (group, positions) = self.read_compressed_vertices(reader, keyframe, mesh)?;
                    tracing::trace!(
                        "keyframe {} mesh {} group {}: {} compressed vertices",
                        keyframe,
                        mesh,
                        group,
                        positions.len()
                    );
                    self.history.set(mesh, group, positions);
                    vertices_changed = true;
                }
                BLOCK_TRANSFORM => {
                    check_block_size(keyframe, mesh, block_type, TRANSFORM_BLOCK_SIZE, block_length)?;
                    entry.transform = Some(read_transform(reader)?);
                }
                _ => {
                    check_block_size(keyframe, mesh, block_type, BOUNDS_BLOCK_SIZE, block_length)?;
                    let min = reader.read_vec3()?;
                    let max = reader.read_vec3()?;
                    entry.bounds = Some(Bounds { min, max });
                }
            }

            let consumed = reader.position() - block_start;
            if consumed != block_length as usize {
                return Err(ActError::BlockLengthMismatch {
                    keyframe,
                    mesh,
                    block_type,
                    declared: block_length,
                    consumed,
                });
            }
        }

        if remaining != 0 {
            return Err(ActError::ByteCountResidual {
                keyframe,
                mesh,
                remaining,
            });
        }

        if vertices_changed {
            entry.vertices = Some(self.history.snapshot(mesh));
        }
        Ok(entry)
    }

    fn read_compressed_vertices(
        &self,
        reader: &mut ByteReader<'_>,
        keyframe: usize,
        mesh: usize,
    ) -> Result<(u16, Vec<Vec3>), ActError> {
        let group = reader.read_u16()?;
        let vertex_count = reader.read_u16()? as usize;

        // Keyframe 0 has no previous keyframe, even when an earlier raw block
        // in the same entry already filled this group
        let previous = match self.history.group(mesh, group) {
            Some(previous) if keyframe > 0 => previous,
            _ => {
                return Err(ActError::CompressedWithoutBase {
                    keyframe,
                    mesh,
                    group,
                });
            }
        };
        if previous.len() != vertex_count {
            return Err(ActError::VertexCountMismatch {
                keyframe,
                mesh,
                group,
                expected: previous.len(),
                found: vertex_count,
            });
        }

        let packed = reader.read_bytes(selector_bytes(vertex_count))?;
        let selectors = unpack_selectors(packed, vertex_count);

        let mut positions = Vec::with_capacity(vertex_count);
        for (selector, &prev) in selectors.into_iter().zip(previous.iter()) {
            positions.push(decode_vertex(selector, prev, reader)?);
        }
        Ok((group, positions))
    }
}

fn read_raw_vertices(reader: &mut ByteReader<'_>) -> Result<(u16, Vec<Vec3>), ActError> {
    let group = reader.read_u16()?;
    let vertex_count = reader.read_u16()? as usize;

    let mut positions = Vec::with_capacity(vertex_count.min(reader.remaining() / 12));
    for _ in 0..vertex_count {
        positions.push(reader.read_vec3()?);
    }
    Ok((group, positions))
}

/// Basis axes are stored I, K, J, followed by the local offset
fn read_transform(reader: &mut ByteReader<'_>) -> Result<RigidTransform, ActError> {
    let i_axis = reader.read_vec3()?;
    let k_axis = reader.read_vec3()?;
    let j_axis = reader.read_vec3()?;
    let offset = reader.read_vec3()?;

    let basis = Mat3::from_cols(i_axis, j_axis, k_axis);
    Ok(RigidTransform {
        rotation: Quat::from_mat3(&basis).normalize(),
        offset,
    })
}

fn check_block_size(
    keyframe: usize,
    mesh: usize,
    block_type: u8,
    expected: u32,
    found: u32,
) -> Result<(), ActError> {
    if found != expected {
        return Err(ActError::InvalidBlockSize {
            keyframe,
            mesh,
            block_type,
            expected,
            found,
        });
    }
    Ok(())
}

/// Decode an ACT buffer into per-keyframe, per-mesh results
///
/// The offset table is enforced as a checkpoint before every keyframe.
pub fn decode_keyframes(data: &[u8]) -> Result<DecodedAct, ActError> {
    let mut reader = ByteReader::new(data);
    let header = ActHeader::read(&mut reader)?;

    let keyframe_count = header.keyframe_count as usize;
    let mesh_count = header.mesh_count as usize;

    // Each mesh entry is at least 6 bytes; reject impossible counts before allocating
    if keyframe_count > 0 {
        let minimum = keyframe_count.saturating_mul(mesh_count).saturating_mul(6);
        if minimum > reader.remaining() {
            return Err(ActError::UnexpectedEof {
                offset: reader.position(),
                wanted: minimum,
                available: reader.remaining(),
            });
        }
    }

    let mut decoder = KeyframeBlockDecoder::new(if keyframe_count > 0 { mesh_count } else { 0 });
    let mut keyframes = Vec::with_capacity(keyframe_count);

    for (keyframe, &expected) in header.offsets.iter().enumerate() {
        if reader.position() != expected as usize {
            return Err(ActError::OffsetMismatch {
                keyframe,
                expected,
                actual: reader.position(),
            });
        }
        tracing::trace!("keyframe {} at offset {}", keyframe, expected);
        keyframes.push(decoder.decode_keyframe(&mut reader, keyframe)?);
    }

    if reader.remaining() > 0 {
        tracing::debug!(
            "{} trailing bytes after last keyframe of '{}'",
            reader.remaining(),
            header.model_name
        );
    }

    Ok(DecodedAct { header, keyframes })
}
