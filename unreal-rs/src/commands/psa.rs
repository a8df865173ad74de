//! PSA file command implementations

use anyhow::{Context, Result};
use clap::Subcommand;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use ue_psa::{Psa, PsaConfig, RetargetOutput, TargetSkeleton, retarget_sequence};
use ue_psk::{Psk, ReferencePose};

use super::{EncodingArg, MappingArg};

#[derive(Subcommand)]
pub enum PsaCommands {
    /// Display information about a PSA file
    Info {
        /// Path to the PSA file
        file: PathBuf,

        /// List every sequence with its shape
        #[arg(short, long)]
        detailed: bool,

        /// Name encoding of the file
        #[arg(long, value_enum, default_value_t)]
        encoding: EncodingArg,
    },

    /// Retarget a sequence onto a PSK reference skeleton and export the
    /// channels as JSON
    Retarget {
        /// Path to the PSA file
        file: PathBuf,

        /// PSK file providing the target skeleton's bind pose
        #[arg(long)]
        skeleton: PathBuf,

        /// Name of the sequence to retarget
        #[arg(long)]
        sequence: String,

        /// Output sample rate; defaults to the sequence's own rate
        #[arg(long)]
        fps: Option<f32>,

        /// Sidecar track-suppression config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Bone name matching mode
        #[arg(long, value_enum, default_value_t)]
        mapping: MappingArg,

        /// Name encoding of both files
        #[arg(long, value_enum, default_value_t)]
        encoding: EncodingArg,

        /// Where to write the channel JSON
        #[arg(short, long)]
        output: PathBuf,
    },
}

pub fn execute(command: PsaCommands) -> Result<()> {
    match command {
        PsaCommands::Info {
            file,
            detailed,
            encoding,
        } => info(&file, detailed, encoding),
        PsaCommands::Retarget {
            file,
            skeleton,
            sequence,
            fps,
            config,
            mapping,
            encoding,
            output,
        } => retarget(&file, &skeleton, &sequence, fps, config, mapping, encoding, &output),
    }
}

fn read_psa(path: &Path) -> Result<Psa> {
    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    Psa::from_bytes(&bytes).with_context(|| format!("failed to decode {}", path.display()))
}

fn info(path: &Path, detailed: bool, encoding: EncodingArg) -> Result<()> {
    let psa = read_psa(path)?;
    let encoding = encoding.into();

    println!("PSA: {}", path.display());
    println!("  Bones:     {}", psa.bones.len());
    println!("  Sequences: {}", psa.sequences.len());
    println!("  Keys:      {}", psa.keys.len());

    if detailed {
        println!("\nSequences:");
        for sequence in &psa.sequences {
            println!(
                "  {} ({} frames @ {} fps, {} bones)",
                sequence.name.decode(encoding),
                sequence.frame_count,
                sequence.fps,
                sequence.bone_count
            );
        }
    }

    Ok(())
}

/// JSON shape of one exported channel
#[derive(Serialize)]
struct ChannelDump<'a> {
    bone: &'a str,
    source_index: usize,
    target_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    rotations: Option<Vec<[f32; 4]>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    translations: Option<Vec<[f32; 3]>>,
}

#[derive(Serialize)]
struct RetargetDump<'a> {
    sequence: &'a str,
    frame_count: usize,
    fps: f32,
    channels: Vec<ChannelDump<'a>>,
}

fn dump(output: &RetargetOutput) -> RetargetDump<'_> {
    RetargetDump {
        sequence: &output.sequence_name,
        frame_count: output.frame_count,
        fps: output.fps,
        channels: output
            .channels
            .iter()
            .map(|channel| ChannelDump {
                bone: &channel.name,
                source_index: channel.source_index,
                target_index: channel.target_index,
                rotations: channel.rotations.as_ref().map(|rotations| {
                    rotations.iter().map(|q| [q.w, q.x, q.y, q.z]).collect()
                }),
                translations: channel.translations.as_ref().map(|translations| {
                    translations.iter().map(|v| [v.x, v.y, v.z]).collect()
                }),
            })
            .collect(),
    }
}

#[allow(clippy::too_many_arguments)]
fn retarget(
    path: &Path,
    skeleton_path: &Path,
    sequence: &str,
    fps: Option<f32>,
    config_path: Option<PathBuf>,
    mapping: MappingArg,
    encoding: EncodingArg,
    output_path: &Path,
) -> Result<()> {
    let encoding = encoding.into();

    let psa = read_psa(path)?;
    let skeleton_bytes = fs::read(skeleton_path)
        .with_context(|| format!("failed to read {}", skeleton_path.display()))?;
    let psk = Psk::from_bytes(&skeleton_bytes)
        .with_context(|| format!("failed to decode {}", skeleton_path.display()))?;
    let pose = ReferencePose::from_bones(&psk.bones, encoding)?;
    let target = TargetSkeleton::from_reference_pose(&pose);

    let config = match config_path {
        Some(config_path) => {
            let text = fs::read_to_string(&config_path)
                .with_context(|| format!("failed to read {}", config_path.display()))?;
            let (config, issues) = PsaConfig::parse(&text);
            for issue in issues {
                log::warn!("{}: {issue}", config_path.display());
            }
            config
        }
        None => PsaConfig::new(),
    };

    let result = retarget_sequence(&psa, sequence, &target, mapping.into(), fps, &config, encoding)
        .with_context(|| format!("failed to retarget '{sequence}'"))?;

    for warning in &result.warnings {
        log::warn!("{warning}");
    }

    let json = serde_json::to_string_pretty(&dump(&result))?;
    fs::write(output_path, json)
        .with_context(|| format!("failed to write {}", output_path.display()))?;

    println!(
        "retargeted '{}': {} channel(s), {} frame(s) @ {} fps -> {}",
        result.sequence_name,
        result.channels.len(),
        result.frame_count,
        result.fps,
        output_path.display()
    );

    Ok(())
}
