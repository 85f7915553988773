//! gengine - command-line tools for G-Engine ACT animations
//!
//! # Commands
//!
//! - `gengine info` - Header, offset table and per-keyframe summary
//! - `gengine dump` - Resolved mesh snapshot at one keyframe
//! - `gengine sample` - Sampled vertices and transform at a time
//! - `gengine validate` - Decode files and report failures
//!
//! # Usage
//!
//! ```bash
//! gengine info GAB_WALK.ACT --json
//! gengine dump GAB_WALK.ACT --frame 3 --mesh 0
//! gengine sample GAB_WALK.ACT --mesh 0 --time 1.25 --fps 15
//! gengine validate data/*.ACT
//! ```
//!
//! Set `RUST_LOG` (or pass `-v`) to see decoder logging.

mod dump;
mod info;
mod sample;
mod validate;

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

/// gengine - ACT animation tools
#[derive(Parser)]
#[command(name = "gengine")]
#[command(about = "Inspect, sample and validate G-Engine ACT animations")]
#[command(version)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print header, offset table and per-keyframe summary
    Info(info::InfoArgs),

    /// Print the resolved snapshot of one keyframe
    Dump(dump::DumpArgs),

    /// Sample a mesh's vertices and transform at a time
    Sample(sample::SampleArgs),

    /// Decode one or more files and report any failures
    Validate(validate::ValidateArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Info(args) => info::execute(args),
        Commands::Dump(args) => dump::execute(args),
        Commands::Sample(args) => sample::execute(args),
        Commands::Validate(args) => validate::execute(args),
    }
}

/// Read a whole ACT file
fn read_act(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Logical asset name: the file name without directories
fn asset_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn format_vec3(v: glam::Vec3) -> String {
    format!("({:.4}, {:.4}, {:.4})", v.x, v.y, v.z)
}
