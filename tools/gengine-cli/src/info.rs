//! Info command - header, offset table and per-keyframe summary

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use gengine_act::{decode_keyframes, MeshKeyframe};
use serde::Serialize;

use crate::{asset_name, read_act};

/// Arguments for the info command
#[derive(Args)]
pub struct InfoArgs {
    /// ACT file to inspect
    pub file: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
pub struct InfoReport {
    pub name: String,
    pub model_name: String,
    pub version: u32,
    pub keyframe_count: u32,
    pub mesh_count: u32,
    pub content_size: u32,
    pub file_size: usize,
    pub offsets: Vec<u32>,
    pub keyframes: Vec<KeyframeSummary>,
}

#[derive(Debug, Serialize)]
pub struct KeyframeSummary {
    pub index: usize,
    pub offset: u32,
    /// Meshes whose vertices changed
    pub vertex_meshes: Vec<usize>,
    /// Meshes that carried a rigid transform
    pub transform_meshes: Vec<usize>,
    /// Meshes that carried bounds
    pub bounds_meshes: Vec<usize>,
}

/// Build the report for one buffer
pub fn build_report(name: &str, bytes: &[u8]) -> Result<InfoReport> {
    let decoded = decode_keyframes(bytes).context("Failed to decode keyframes")?;
    let header = &decoded.header;

    let keyframes = decoded
        .keyframes
        .iter()
        .enumerate()
        .map(|(index, meshes)| {
            let with = |pred: fn(&MeshKeyframe) -> bool| {
                meshes
                    .iter()
                    .enumerate()
                    .filter(|(_, m)| pred(m))
                    .map(|(j, _)| j)
                    .collect::<Vec<_>>()
            };
            KeyframeSummary {
                index,
                offset: header.offsets[index],
                vertex_meshes: with(|m| m.vertices.is_some()),
                transform_meshes: with(|m| m.transform.is_some()),
                bounds_meshes: with(|m| m.bounds.is_some()),
            }
        })
        .collect();

    Ok(InfoReport {
        name: name.to_string(),
        model_name: header.model_name.clone(),
        version: header.version,
        keyframe_count: header.keyframe_count,
        mesh_count: header.mesh_count,
        content_size: header.content_size,
        file_size: bytes.len(),
        offsets: header.offsets.clone(),
        keyframes,
    })
}

/// Execute the info command
pub fn execute(args: InfoArgs) -> Result<()> {
    let bytes = read_act(&args.file)?;
    let report = build_report(&asset_name(&args.file), &bytes)
        .with_context(|| format!("Invalid ACT file {}", args.file.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("=== {} ===", report.name);
    println!("  Model:        {}", report.model_name);
    println!("  Version:      {}", report.version);
    println!("  Keyframes:    {}", report.keyframe_count);
    println!("  Meshes:       {}", report.mesh_count);
    println!(
        "  Content size: {} (file {} bytes)",
        report.content_size, report.file_size
    );
    println!();
    println!("  {:>5}  {:>8}  {:<16} {:<16} bounds", "frame", "offset", "vertices", "transform");
    for kf in &report.keyframes {
        println!(
            "  {:>5}  {:>8}  {:<16} {:<16} {}",
            kf.index,
            kf.offset,
            format_meshes(&kf.vertex_meshes),
            format_meshes(&kf.transform_meshes),
            format_meshes(&kf.bounds_meshes)
        );
    }
    Ok(())
}

fn format_meshes(meshes: &[usize]) -> String {
    if meshes.is_empty() {
        return "-".to_string();
    }
    meshes
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
