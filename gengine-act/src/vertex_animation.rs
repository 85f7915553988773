//! Playback ACT asset: per-mesh pose tracks
//!
//! Each mesh gets two independent tracks, one holding the keyframes where its
//! vertices changed and one holding the keyframes that carried a rigid
//! transform. Sampling brackets the requested time on one track and blends the
//! two poses: positions linearly, rotations with shortest-arc slerp.

use glam::{Quat, Vec3};

use crate::decoder::{decode_keyframes, RigidTransform};
use crate::error::ActError;
use crate::header::ActHeader;
use crate::sampler::{locate, Timed};

/// Resolved vertex positions of one mesh at one keyframe
#[derive(Debug, Clone, PartialEq)]
pub struct VertexPose {
    pub frame: u32,
    /// Positions per mesh group
    pub groups: Vec<Vec<Vec3>>,
}

impl Timed for VertexPose {
    fn frame(&self) -> u32 {
        self.frame
    }
}

/// Rigid transform of one mesh at one keyframe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformPose {
    pub frame: u32,
    pub position: Vec3,
    pub rotation: Quat,
}

impl Timed for TransformPose {
    fn frame(&self) -> u32 {
        self.frame
    }
}

/// Both pose tracks of one mesh, sorted by frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshTracks {
    pub vertex_poses: Vec<VertexPose>,
    pub transform_poses: Vec<TransformPose>,
}

/// Parsed playback ACT asset
///
/// Immutable after parsing; share it freely between threads.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexAnimation {
    pub name: String,
    pub header: ActHeader,
    meshes: Vec<MeshTracks>,
}

impl VertexAnimation {
    /// Parse an asset from its bytes. `name` is the logical asset name, used
    /// for diagnostics only.
    pub fn parse(name: &str, data: &[u8]) -> Result<Self, ActError> {
        let decoded = decode_keyframes(data).inspect_err(|e| {
            tracing::warn!("Failed to parse vertex animation '{}': {}", name, e);
        })?;

        // Sized from decoded keyframes; a header with no keyframes yields no tracks
        let mesh_count = decoded.keyframes.first().map_or(0, Vec::len);
        let mut meshes = vec![MeshTracks::default(); mesh_count];
        for (frame, entries) in decoded.keyframes.into_iter().enumerate() {
            let frame = frame as u32;
            for (tracks, entry) in meshes.iter_mut().zip(entries) {
                if let Some(groups) = entry.vertices {
                    tracks.vertex_poses.push(VertexPose { frame, groups });
                }
                if let Some(transform) = entry.transform {
                    tracks.transform_poses.push(TransformPose {
                        frame,
                        position: transform.offset,
                        rotation: transform.rotation,
                    });
                }
            }
        }

        tracing::debug!(
            "Parsed vertex animation '{}' ({}): {} keyframes, {} meshes, {} vertex poses, {} transform poses",
            name,
            decoded.header.model_name,
            decoded.header.keyframe_count,
            meshes.len(),
            meshes.iter().map(|m| m.vertex_poses.len()).sum::<usize>(),
            meshes.iter().map(|m| m.transform_poses.len()).sum::<usize>()
        );

        Ok(Self {
            name: name.to_string(),
            header: decoded.header,
            meshes,
        })
    }

    pub fn keyframe_count(&self) -> u32 {
        self.header.keyframe_count
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Length of one loop in seconds at `fps` (0 for a non-positive rate)
    pub fn duration(&self, fps: f32) -> f32 {
        if fps > 0.0 {
            self.keyframe_count() as f32 / fps
        } else {
            0.0
        }
    }

    pub fn tracks(&self, mesh: usize) -> Option<&MeshTracks> {
        self.meshes.get(mesh)
    }

    /// Keyframes where `mesh`'s vertices changed (empty for an unknown mesh)
    pub fn vertex_poses(&self, mesh: usize) -> &[VertexPose] {
        self.meshes.get(mesh).map_or(&[][..], |m| m.vertex_poses.as_slice())
    }

    /// Keyframes where `mesh` carried a rigid transform (empty for an unknown mesh)
    pub fn transform_poses(&self, mesh: usize) -> &[TransformPose] {
        self.meshes.get(mesh).map_or(&[][..], |m| m.transform_poses.as_slice())
    }

    /// Positions of every group of `mesh` at `time` seconds, looping
    ///
    /// `None` means "leave this mesh alone": the mesh is unknown, has no
    /// vertex poses, or `fps` is not positive.
    pub fn sample_vertices(&self, mesh: usize, time: f32, fps: f32) -> Option<Vec<Vec<Vec3>>> {
        let poses = self.vertex_poses(mesh);
        let bracket = locate(poses, time, fps, self.keyframe_count())?;
        let (current, next) = (&poses[bracket.current], &poses[bracket.next]);

        let group_count = current.groups.len().max(next.groups.len());
        let groups = (0..group_count)
            .map(|g| {
                let a = current.groups.get(g).map_or(&[][..], Vec::as_slice);
                let b = next.groups.get(g).map_or(&[][..], Vec::as_slice);
                blend_positions(a, b, bracket.frac)
            })
            .collect();
        Some(groups)
    }

    /// Positions of one group of `mesh` at `time` seconds, looping
    pub fn sample_group(&self, mesh: usize, group: usize, time: f32, fps: f32) -> Option<Vec<Vec3>> {
        let poses = self.vertex_poses(mesh);
        let bracket = locate(poses, time, fps, self.keyframe_count())?;
        let a = poses[bracket.current].groups.get(group);
        let b = poses[bracket.next].groups.get(group);
        match (a, b) {
            (None, None) => None,
            (a, b) => Some(blend_positions(
                a.map_or(&[][..], Vec::as_slice),
                b.map_or(&[][..], Vec::as_slice),
                bracket.frac,
            )),
        }
    }

    /// Rigid transform of `mesh` at `time` seconds, looping
    pub fn sample_transform(&self, mesh: usize, time: f32, fps: f32) -> Option<RigidTransform> {
        let poses = self.transform_poses(mesh);
        let bracket = locate(poses, time, fps, self.keyframe_count())?;
        let (current, next) = (&poses[bracket.current], &poses[bracket.next]);

        if bracket.is_exact() {
            return Some(RigidTransform {
                rotation: current.rotation,
                offset: current.position,
            });
        }
        Some(RigidTransform {
            rotation: current.rotation.slerp(next.rotation, bracket.frac),
            offset: current.position.lerp(next.position, bracket.frac),
        })
    }
}

/// Per-vertex lerp. A group missing on one side (not yet seen) takes the other
/// side's positions unchanged; a raw block that changed the vertex count steps
/// instead of blending.
fn blend_positions(a: &[Vec3], b: &[Vec3], frac: f32) -> Vec<Vec3> {
    if frac == 0.0 || b.is_empty() {
        return a.to_vec();
    }
    if a.is_empty() || (frac >= 1.0 && a.len() != b.len()) {
        return b.to_vec();
    }
    if a.len() != b.len() {
        return a.to_vec();
    }
    a.iter().zip(b).map(|(&p, &q)| p.lerp(q, frac)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::{ActWriter, BlockData};

    fn raw(group: u16, positions: &[Vec3]) -> BlockData {
        BlockData::Raw {
            group,
            positions: positions.to_vec(),
        }
    }

    fn transform(rotation: Quat, offset: Vec3) -> BlockData {
        BlockData::Transform(RigidTransform { rotation, offset })
    }

    fn same_rotation(a: Quat, b: Quat) -> bool {
        a.abs_diff_eq(b, 1e-4) || a.abs_diff_eq(-b, 1e-4)
    }

    #[test]
    fn test_animation_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<VertexAnimation>();
        assert_send_sync::<crate::ActAnimation>();
    }

    #[test]
    fn test_tracks_are_sparse_and_independent() {
        let mut writer = ActWriter::new("M", 1);
        writer.push_keyframe(vec![vec![raw(0, &[Vec3::ZERO])]]);
        writer.push_keyframe(vec![vec![transform(Quat::IDENTITY, Vec3::X)]]);
        writer.push_keyframe(vec![vec![]]);
        writer.push_keyframe(vec![vec![raw(0, &[Vec3::ONE]), transform(Quat::IDENTITY, Vec3::Y)]]);
        let anim = VertexAnimation::parse("M.ACT", &writer.to_bytes().unwrap()).unwrap();

        let vertex_frames: Vec<u32> = anim.vertex_poses(0).iter().map(|p| p.frame).collect();
        let transform_frames: Vec<u32> = anim.transform_poses(0).iter().map(|p| p.frame).collect();
        assert_eq!(vertex_frames, vec![0, 3]);
        assert_eq!(transform_frames, vec![1, 3]);
        assert!(anim.vertex_poses(1).is_empty());
    }

    #[test]
    fn test_duration() {
        let mut writer = ActWriter::new("M", 1);
        for _ in 0..30 {
            writer.push_keyframe(vec![]);
        }
        let anim = VertexAnimation::parse("M.ACT", &writer.to_bytes().unwrap()).unwrap();
        assert_eq!(anim.duration(15.0), 2.0);
        assert_eq!(anim.duration(0.0), 0.0);
    }

    #[test]
    fn test_mesh_without_poses_is_not_sampled() {
        let mut writer = ActWriter::new("M", 2);
        writer.push_keyframe(vec![vec![raw(0, &[Vec3::ZERO])], vec![]]);
        let anim = VertexAnimation::parse("M.ACT", &writer.to_bytes().unwrap()).unwrap();

        assert!(anim.sample_vertices(1, 0.0, 15.0).is_none());
        assert!(anim.sample_vertices(5, 0.0, 15.0).is_none());
        assert!(anim.sample_transform(0, 0.0, 15.0).is_none());
        assert!(anim.sample_vertices(0, 0.0, 0.0).is_none());
        assert_eq!(anim.sample_vertices(0, 0.0, 15.0), Some(vec![vec![Vec3::ZERO]]));
    }

    #[test]
    fn test_sample_group_with_late_group() {
        let mut writer = ActWriter::new("M", 1);
        writer.push_keyframe(vec![vec![raw(0, &[Vec3::ZERO])]]);
        writer.push_keyframe(vec![vec![raw(1, &[Vec3::ONE])]]);
        let anim = VertexAnimation::parse("M.ACT", &writer.to_bytes().unwrap()).unwrap();

        // Halfway between frame 0 (group 1 unseen) and frame 1
        let groups = anim.sample_vertices(0, 0.5, 1.0).unwrap();
        assert_eq!(groups, vec![vec![Vec3::ZERO], vec![Vec3::ONE]]);
        assert_eq!(anim.sample_group(0, 1, 0.5, 1.0), Some(vec![Vec3::ONE]));
        assert_eq!(anim.sample_group(0, 2, 0.5, 1.0), None);
    }

    #[test]
    fn test_transform_slerp_not_nlerp() {
        let axis = Vec3::Y;
        let mut writer = ActWriter::new("M", 1);
        writer.push_keyframe(vec![vec![transform(Quat::from_axis_angle(axis, 90f32.to_radians()), Vec3::ZERO)]]);
        writer.push_keyframe(vec![vec![transform(
            Quat::from_axis_angle(axis, 180f32.to_radians()),
            Vec3::new(2.0, 0.0, 0.0),
        )]]);
        // A third, empty keyframe keeps the wrap segment out of the way
        writer.push_keyframe(vec![vec![]]);
        let anim = VertexAnimation::parse("M.ACT", &writer.to_bytes().unwrap()).unwrap();

        let mid = anim.sample_transform(0, 0.5, 1.0).unwrap();
        assert!(same_rotation(mid.rotation, Quat::from_axis_angle(axis, 135f32.to_radians())));
        assert!(mid.offset.abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), 1e-6));

        let quarter = anim.sample_transform(0, 0.25, 1.0).unwrap();
        let slerped = Quat::from_axis_angle(axis, 112.5f32.to_radians());
        let a = Quat::from_axis_angle(axis, 90f32.to_radians());
        let b = Quat::from_axis_angle(axis, 180f32.to_radians());
        let nlerped = (a * 0.75 + b * 0.25).normalize();
        assert!(same_rotation(quarter.rotation, slerped));
        assert!(!same_rotation(quarter.rotation, nlerped));
    }

    #[test]
    fn test_exact_transform_keyframe() {
        let rotation = Quat::from_rotation_x(0.3);
        let mut writer = ActWriter::new("M", 1);
        writer.push_keyframe(vec![vec![transform(Quat::IDENTITY, Vec3::ZERO)]]);
        writer.push_keyframe(vec![vec![transform(rotation, Vec3::Z)]]);
        let anim = VertexAnimation::parse("M.ACT", &writer.to_bytes().unwrap()).unwrap();

        let sampled = anim.sample_transform(0, 1.0 / 15.0, 15.0).unwrap();
        let pose = anim.transform_poses(0)[1];
        assert_eq!(sampled.rotation, pose.rotation);
        assert_eq!(sampled.offset, Vec3::Z);
    }

    #[test]
    fn test_no_keyframes_with_huge_mesh_count() {
        let bytes = ActHeader::new("P", 0, 200_000_000).to_bytes();
        let anim = VertexAnimation::parse("P.ACT", &bytes).unwrap();
        assert_eq!(anim.header.mesh_count, 200_000_000);
        assert_eq!(anim.mesh_count(), 0);
        assert!(anim.sample_vertices(0, 0.0, 15.0).is_none());
        assert!(anim.sample_transform(0, 0.0, 15.0).is_none());
    }
}
