//! Sample command - play back a mesh at a point in time

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use gengine_act::{VertexAnimation, DEFAULT_FRAMES_PER_SECOND};

use crate::{asset_name, format_vec3, read_act};

/// Arguments for the sample command
#[derive(Args)]
pub struct SampleArgs {
    /// ACT file to sample
    pub file: PathBuf,

    /// Mesh index
    #[arg(long, default_value_t = 0)]
    pub mesh: usize,

    /// Time in seconds (wraps around the animation length)
    #[arg(long)]
    pub time: f32,

    /// Playback rate in keyframes per second
    #[arg(long, default_value_t = DEFAULT_FRAMES_PER_SECOND)]
    pub fps: f32,
}

/// Execute the sample command
pub fn execute(args: SampleArgs) -> Result<()> {
    if args.fps <= 0.0 || !args.fps.is_finite() {
        bail!("--fps must be a positive number, got {}", args.fps);
    }

    let bytes = read_act(&args.file)?;
    let name = asset_name(&args.file);
    let anim = VertexAnimation::parse(&name, &bytes)
        .with_context(|| format!("Invalid ACT file {}", args.file.display()))?;

    if args.mesh >= anim.mesh_count() {
        bail!("Mesh {} out of range ({} meshes)", args.mesh, anim.mesh_count());
    }

    let duration = anim.duration(args.fps);
    println!(
        "=== {} mesh {} at {:.3}s (loop {:.3}s @ {} fps) ===",
        name, args.mesh, args.time, duration, args.fps
    );

    match anim.sample_transform(args.mesh, args.time, args.fps) {
        Some(transform) => {
            let (axis, angle) = transform.rotation.to_axis_angle();
            println!(
                "  transform: offset {} rotation {:.2} deg about {}",
                format_vec3(transform.offset),
                angle.to_degrees(),
                format_vec3(axis)
            );
        }
        None => println!("  transform: none"),
    }

    match anim.sample_vertices(args.mesh, args.time, args.fps) {
        Some(groups) => {
            for (group, positions) in groups.iter().enumerate() {
                println!("  group {} ({} vertices)", group, positions.len());
                for (v, p) in positions.iter().enumerate() {
                    println!("    {:>4}: {}", v, format_vec3(*p));
                }
            }
        }
        None => println!("  vertices: no vertex keyframes"),
    }
    Ok(())
}
