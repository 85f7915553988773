//! Validate command - decode files and report failures

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Args;
use gengine_act::{decode_keyframes, ActError};

use crate::read_act;

/// Arguments for the validate command
#[derive(Args)]
pub struct ValidateArgs {
    /// ACT files to validate
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Outcome for one file
#[derive(Debug)]
pub enum Outcome {
    Valid { keyframes: u32, meshes: u32 },
    Invalid(ActError),
}

pub fn validate_file(path: &Path) -> Result<Outcome> {
    let bytes = read_act(path)?;
    Ok(match decode_keyframes(&bytes) {
        Ok(decoded) => Outcome::Valid {
            keyframes: decoded.header.keyframe_count,
            meshes: decoded.header.mesh_count,
        },
        Err(e) => Outcome::Invalid(e),
    })
}

/// Execute the validate command
pub fn execute(args: ValidateArgs) -> Result<()> {
    let mut failed = 0;
    for path in &args.files {
        match validate_file(path)? {
            Outcome::Valid { keyframes, meshes } => {
                println!("OK    {} ({} keyframes, {} meshes)", path.display(), keyframes, meshes);
            }
            Outcome::Invalid(e) => {
                failed += 1;
                println!("FAIL  {} [{:?}] {}", path.display(), e.kind(), e);
            }
        }
    }

    println!();
    println!("{} of {} files valid", args.files.len() - failed, args.files.len());
    if failed > 0 {
        bail!("{} file(s) failed validation", failed);
    }
    Ok(())
}
