//! PSK file command implementations

use anyhow::{Context, Result};
use clap::Subcommand;
use std::fs;
use std::path::{Path, PathBuf};

use ue_psk::{Psk, ReferencePose, repair_degenerate_geometry};

use super::EncodingArg;

#[derive(Subcommand)]
pub enum PskCommands {
    /// Display information about a PSK file
    Info {
        /// Path to the PSK file
        file: PathBuf,

        /// Show materials and the full skeleton
        #[arg(short, long)]
        detailed: bool,

        /// Name encoding of the file
        #[arg(long, value_enum, default_value_t)]
        encoding: EncodingArg,
    },

    /// Check every index invariant of a PSK file
    Validate {
        /// Path to the PSK file
        file: PathBuf,
    },

    /// Repair degenerate and duplicate triangles
    Repair {
        /// Path to the PSK file
        file: PathBuf,

        /// Where to write the repaired file
        #[arg(short, long)]
        output: PathBuf,
    },
}

pub fn execute(command: PskCommands) -> Result<()> {
    match command {
        PskCommands::Info {
            file,
            detailed,
            encoding,
        } => info(&file, detailed, encoding),
        PskCommands::Validate { file } => validate(&file),
        PskCommands::Repair { file, output } => repair(&file, &output),
    }
}

fn read_psk(path: &Path) -> Result<Psk> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Psk::from_bytes(&bytes).with_context(|| format!("failed to decode {}", path.display()))
}

fn info(path: &Path, detailed: bool, encoding: EncodingArg) -> Result<()> {
    let psk = read_psk(path)?;
    let encoding = encoding.into();

    println!("PSK: {}", path.display());
    println!("  Points:    {}", psk.points.len());
    println!("  Wedges:    {}", psk.wedges.len());
    println!("  Faces:     {}", psk.faces.len());
    println!("  Materials: {}", psk.materials.len());
    println!("  Bones:     {}", psk.bones.len());
    println!("  Weights:   {}", psk.weights.len());

    if detailed {
        println!("\nMaterials:");
        for (index, material) in psk.materials.iter().enumerate() {
            println!(
                "  [{index}] {} (texture slot {})",
                material.name.decode(encoding),
                material.texture_index
            );
        }

        println!("\nSkeleton:");
        let pose = ReferencePose::from_bones(&psk.bones, encoding)?;
        for (index, bone) in pose.bones.iter().enumerate() {
            let parent = match bone.parent {
                Some(parent_index) => pose.bones[parent_index].name.clone(),
                None => "(root)".to_string(),
            };
            println!("  [{index}] {} <- {parent}", bone.name);
        }
    }

    Ok(())
}

fn validate(path: &Path) -> Result<()> {
    let psk = read_psk(path)?;
    psk.validate()
        .with_context(|| format!("{} failed validation", path.display()))?;
    println!("{}: OK", path.display());
    Ok(())
}

fn repair(path: &Path, output: &Path) -> Result<()> {
    let mut psk = read_psk(path)?;
    let point_count = psk.points.len();

    let report = repair_degenerate_geometry(&mut psk)
        .with_context(|| format!("failed to repair {}", path.display()))?;

    if report.is_clean() {
        println!("{}: no degenerate geometry found", path.display());
    } else {
        println!(
            "{}: duplicated {} point(s) for collapsed edges, {} for duplicate faces ({} -> {} points)",
            path.display(),
            report.degenerate_points_duplicated,
            report.duplicate_faces_resolved,
            point_count,
            psk.points.len()
        );
    }

    let bytes = psk.to_bytes()?;
    fs::write(output, bytes).with_context(|| format!("failed to write {}", output.display()))?;
    println!("wrote {}", output.display());
    Ok(())
}
