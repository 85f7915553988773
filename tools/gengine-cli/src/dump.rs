//! Dump command - resolved mesh snapshots at one keyframe

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use gengine_act::{ActAnimation, MeshSnapshot};

use crate::{asset_name, format_vec3, read_act};

/// Arguments for the dump command
#[derive(Args)]
pub struct DumpArgs {
    /// ACT file to dump
    pub file: PathBuf,

    /// Keyframe index
    #[arg(long, default_value_t = 0)]
    pub frame: usize,

    /// Only this mesh (default: all meshes)
    #[arg(long)]
    pub mesh: Option<usize>,
}

/// Execute the dump command
pub fn execute(args: DumpArgs) -> Result<()> {
    let bytes = read_act(&args.file)?;
    let name = asset_name(&args.file);
    let anim = ActAnimation::parse(&name, &bytes)
        .with_context(|| format!("Invalid ACT file {}", args.file.display()))?;

    let Some(frame) = anim.frame(args.frame) else {
        bail!(
            "Keyframe {} out of range ({} has {} keyframes)",
            args.frame,
            name,
            anim.frame_count()
        );
    };

    println!("=== {} keyframe {} ===", name, args.frame);
    match args.mesh {
        Some(mesh) => {
            let Some(snapshot) = frame.meshes.get(mesh) else {
                bail!("Mesh {} out of range ({} meshes)", mesh, anim.mesh_count());
            };
            print!("{}", format_snapshot(mesh, snapshot));
        }
        None => {
            for (mesh, snapshot) in frame.meshes.iter().enumerate() {
                print!("{}", format_snapshot(mesh, snapshot));
            }
        }
    }
    Ok(())
}

fn format_snapshot(mesh: usize, snapshot: &MeshSnapshot) -> String {
    let mut out = format!(
        "Mesh {}{}: {} groups, {} vertices\n",
        mesh,
        if snapshot.changed { "" } else { " (unchanged)" },
        snapshot.groups.len(),
        snapshot.vertex_count()
    );
    if let Some(transform) = snapshot.transform {
        let (axis, angle) = transform.rotation.to_axis_angle();
        out += &format!(
            "  transform: offset {} rotation {:.2} deg about {}\n",
            format_vec3(transform.offset),
            angle.to_degrees(),
            format_vec3(axis)
        );
    }
    if let Some(bounds) = snapshot.bounds {
        out += &format!(
            "  bounds: {} .. {}\n",
            format_vec3(bounds.min),
            format_vec3(bounds.max)
        );
    }
    for (group, positions) in snapshot.groups.iter().enumerate() {
        out += &format!("  group {} ({} vertices)\n", group, positions.len());
        for (v, p) in positions.iter().enumerate() {
            out += &format!("    {:>4}: {}\n", v, format_vec3(*p));
        }
    }
    out
}
