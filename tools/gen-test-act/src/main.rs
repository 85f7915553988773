//! Generate synthetic ACT files for codec testing
//!
//! Writes a 2-mesh, 30-keyframe animation: mesh 0 is a strip of vertices
//! rippling in a sine wave (raw keyframe 0, delta-compressed afterwards, bounds
//! every keyframe), mesh 1 is a rigid lever swinging about Z.

use std::f32::consts::TAU;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use gengine_act::{ActWriter, BlockData, Bounds, RigidTransform};
use glam::{Quat, Vec3};

#[derive(Parser)]
#[command(name = "gen-test-act")]
#[command(about = "Generate a synthetic ACT wave animation")]
struct Args {
    /// Output file
    #[arg(short, long, default_value = "assets/TEST_WAVE.ACT")]
    output: PathBuf,

    /// Number of keyframes
    #[arg(long, default_value_t = 30)]
    frames: u32,

    /// Vertices in the rippling strip
    #[arg(long, default_value_t = 8)]
    vertices: u16,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(parent) = args.output.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let size = write_wave_animation(&args.output, args.frames, args.vertices)?;
    println!(
        "Generated {} (2 meshes, {} keyframes, {} bytes)",
        args.output.display(),
        args.frames,
        size
    );
    Ok(())
}

fn write_wave_animation(path: &Path, frame_count: u32, vertex_count: u16) -> Result<usize> {
    let data = generate_wave_animation_bytes(frame_count, vertex_count)?;
    std::fs::write(path, &data).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(data.len())
}

/// Strip positions at keyframe `frame`
///
/// Heights are snapped to 1/32 so every frame-to-frame delta fits the byte
/// fixed-point payload. Vertex 0 is pinned and always encodes as unchanged.
fn strip_positions(frame: u32, frame_count: u32, vertex_count: u16) -> Vec<Vec3> {
    let t = frame as f32 / frame_count.max(1) as f32 * TAU;
    (0..vertex_count)
        .map(|v| {
            let x = v as f32 * 0.5;
            let y = if v == 0 {
                0.0
            } else {
                ((t + x).sin() * 16.0).round() / 32.0
            };
            Vec3::new(x, y, 0.0)
        })
        .collect()
}

fn bounds_of(positions: &[Vec3]) -> Bounds {
    let (min, max) = positions.iter().fold(
        (Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)),
        |(min, max), &p| (min.min(p), max.max(p)),
    );
    Bounds { min, max }
}

fn generate_wave_animation_bytes(frame_count: u32, vertex_count: u16) -> Result<Vec<u8>> {
    let mut writer = ActWriter::new("TEST_WAVE", 2).with_version(1);

    for frame in 0..frame_count {
        let positions = strip_positions(frame, frame_count, vertex_count);
        let bounds = bounds_of(&positions);
        let strip = if frame == 0 {
            BlockData::Raw { group: 0, positions }
        } else {
            BlockData::Compressed { group: 0, positions }
        };

        let angle = (frame as f32 / frame_count as f32 * TAU).sin() * 0.6;
        let lever = RigidTransform {
            rotation: Quat::from_rotation_z(angle),
            offset: Vec3::new(0.0, 1.5, 0.0),
        };
        let mut lever_blocks = vec![BlockData::Transform(lever)];
        if frame == 0 {
            lever_blocks.push(BlockData::Raw {
                group: 0,
                positions: vec![Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0)],
            });
        }

        writer.push_keyframe(vec![vec![strip, BlockData::Bounds(bounds)], lever_blocks]);
    }

    writer.to_bytes().context("Failed to encode wave animation")
}
