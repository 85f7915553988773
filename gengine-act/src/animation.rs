//! Static ACT asset: the fully resolved keyframe table
//!
//! Every (keyframe, mesh) pair gets a snapshot. Entries the file marks as
//! unchanged copy the previous keyframe's snapshot forward, so any frame can be
//! inspected without replaying the ones before it.

use glam::Vec3;

use crate::decoder::{decode_keyframes, Bounds, RigidTransform};
use crate::error::ActError;
use crate::header::ActHeader;

/// One mesh at one keyframe
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshSnapshot {
    /// Resolved positions per mesh group
    pub groups: Vec<Vec<Vec3>>,
    pub bounds: Option<Bounds>,
    pub transform: Option<RigidTransform>,
    /// False when this keyframe carried no data for the mesh
    pub changed: bool,
}

impl MeshSnapshot {
    /// Total vertices across all groups
    pub fn vertex_count(&self) -> usize {
        self.groups.iter().map(Vec::len).sum()
    }

    /// Positions of one group, if the mesh has it
    pub fn group(&self, group: usize) -> Option<&[Vec3]> {
        self.groups.get(group).map(Vec::as_slice)
    }
}

/// All meshes at one keyframe
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActFrame {
    pub meshes: Vec<MeshSnapshot>,
}

/// Parsed static ACT asset
#[derive(Debug, Clone, PartialEq)]
pub struct ActAnimation {
    pub name: String,
    pub header: ActHeader,
    frames: Vec<ActFrame>,
}

impl ActAnimation {
    /// Parse an asset from its bytes. `name` is the logical asset name, used
    /// for diagnostics only.
    pub fn parse(name: &str, data: &[u8]) -> Result<Self, ActError> {
        let decoded = decode_keyframes(data).inspect_err(|e| {
            tracing::warn!("Failed to parse ACT '{}': {}", name, e);
        })?;

        let mesh_count = decoded.header.mesh_count as usize;
        let mut frames: Vec<ActFrame> = Vec::with_capacity(decoded.keyframes.len());

        for entries in decoded.keyframes {
            let mut meshes = Vec::with_capacity(mesh_count);
            for (mesh, entry) in entries.into_iter().enumerate() {
                let previous = frames.last().map(|f| &f.meshes[mesh]);
                let snapshot = if entry.is_empty() {
                    MeshSnapshot {
                        changed: false,
                        ..previous.cloned().unwrap_or_default()
                    }
                } else {
                    MeshSnapshot {
                        groups: match entry.vertices {
                            Some(groups) => groups,
                            None => previous.map(|p| p.groups.clone()).unwrap_or_default(),
                        },
                        bounds: entry.bounds.or(previous.and_then(|p| p.bounds)),
                        transform: entry.transform.or(previous.and_then(|p| p.transform)),
                        changed: true,
                    }
                };
                meshes.push(snapshot);
            }
            frames.push(ActFrame { meshes });
        }

        tracing::debug!(
            "Parsed ACT '{}' ({}): {} keyframes, {} meshes, {} bytes",
            name,
            decoded.header.model_name,
            frames.len(),
            mesh_count,
            data.len()
        );

        Ok(Self {
            name: name.to_string(),
            header: decoded.header,
            frames,
        })
    }

    pub fn model_name(&self) -> &str {
        &self.header.model_name
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn mesh_count(&self) -> usize {
        self.header.mesh_count as usize
    }

    pub fn frames(&self) -> &[ActFrame] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&ActFrame> {
        self.frames.get(index)
    }

    /// Snapshot of `mesh` at `keyframe`
    pub fn mesh(&self, keyframe: usize, mesh: usize) -> Option<&MeshSnapshot> {
        self.frames.get(keyframe)?.meshes.get(mesh)
    }
}
