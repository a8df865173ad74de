//! Retargeting: re-expressing raw animation keys as deltas against an
//! arbitrary target skeleton's bind pose.
//!
//! Raw keys are recorded in the animation file's own skeleton space. To drive
//! a target skeleton whose bind pose differs, every key is reconciled per
//! bone through three precomputed quantities derived from the *target* bind
//! pose; the output is a delta channel that reproduces the authored motion
//! when applied on top of the target's own rest transforms.
//!
//! Quaternion products follow glam's convention: `a * b` applies `b` first,
//! then `a`. "Right-multiply A by B" below means `A = A * B`.

use std::collections::BTreeSet;
use std::fmt;

use glam::{Quat, Vec3};

use ue_data::{NameEncoding, Quaternion, Vector3};
use ue_psk::ReferencePose;

use crate::config::{PsaConfig, TrackFlags};
use crate::data::Psa;
use crate::error::{PsaError, Result};
use crate::mapping::{BoneMapping, BoneMappingMode, map_bones};
use crate::resample::{BoneKey, resample_keys};

/// One bone of the target skeleton: identity, hierarchy, and global bind
/// transform
#[derive(Debug, Clone, PartialEq)]
pub struct TargetBone {
    pub name: String,
    pub parent: Option<usize>,
    /// Bind translation in global (armature) space
    pub location: Vec3,
    /// Bind rotation in global (armature) space
    pub rotation: Quat,
}

/// The bind pose retargeting measures its deltas against
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TargetSkeleton {
    pub bones: Vec<TargetBone>,
}

impl TargetSkeleton {
    pub fn new(bones: Vec<TargetBone>) -> Self {
        Self { bones }
    }

    /// Adopt a bind pose reconstructed from a PSK reference skeleton
    pub fn from_reference_pose(pose: &ReferencePose) -> Self {
        Self {
            bones: pose
                .bones
                .iter()
                .map(|bone| TargetBone {
                    name: bone.name.clone(),
                    parent: bone.parent,
                    location: bone.global_location,
                    rotation: bone.global_rotation,
                })
                .collect(),
        }
    }

    /// Bone names in skeleton order
    pub fn bone_names(&self) -> Vec<String> {
        self.bones.iter().map(|b| b.name.clone()).collect()
    }
}

/// A recoverable problem found while resolving a retarget.
///
/// Warnings accumulate alongside a best-effort output; none of them abort
/// the operation.
#[derive(Debug, Clone, PartialEq)]
pub enum RetargetWarning {
    /// The target skeleton has no bone for these animated bones
    MissingBones { names: Vec<String> },
    /// These mapped bones have a target parent that no source bone drives;
    /// their keys are reconciled with the root rule
    UnmappedParents { names: Vec<String> },
    /// A source bone matched a target already claimed by an earlier source
    DuplicateMapping {
        source_name: String,
        target_name: String,
        prior_source_name: String,
    },
}

impl fmt::Display for RetargetWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingBones { names } => write!(
                f,
                "the target skeleton is missing {} bone(s) present in the animation: {}",
                names.len(),
                names.join(", ")
            ),
            Self::UnmappedParents { names } => write!(
                f,
                "{} bone(s) have parents that are not present in the animation: {}",
                names.len(),
                names.join(", ")
            ),
            Self::DuplicateMapping {
                source_name,
                target_name,
                prior_source_name,
            } => write!(
                f,
                "bone '{source_name}' also matches target '{target_name}', already driven by '{prior_source_name}'"
            ),
        }
    }
}

/// Per-bone precomputed reconciliation quantities, all derived from the
/// target skeleton's bind pose
#[derive(Debug, Clone, Copy)]
struct BonePose {
    target_index: usize,
    /// Whether the target parent bone is itself driven by a source bone.
    /// Without one, raw keys are reconciled with the root rule.
    has_mapped_parent: bool,
    /// Bind translation relative to the parent, in the parent's local frame
    /// (root: global bind translation)
    original_location: Vec3,
    /// Parent-relative bind rotation, conjugated so re-applying it
    /// reproduces the bind pose (root: conjugate of the global rotation).
    /// This is exactly the space raw file keys are recorded in.
    original_rotation: Quat,
    /// Conjugate of `original_rotation`: maps from the bind-local frame back
    /// to raw key space
    post_rotation: Quat,
}

fn build_bone_poses(target: &TargetSkeleton, mapping: &BoneMapping) -> Vec<Option<BonePose>> {
    mapping
        .source_to_target
        .iter()
        .map(|&target_index| {
            let target_index = target_index?;
            let bone = &target.bones[target_index];

            let (original_location, original_rotation) = match bone.parent {
                Some(parent_index) => {
                    let parent = &target.bones[parent_index];
                    let location =
                        parent.rotation.conjugate() * (bone.location - parent.location);
                    let local_rotation = parent.rotation.conjugate() * bone.rotation;
                    (location, local_rotation.conjugate())
                }
                None => (bone.location, bone.rotation.conjugate()),
            };

            let has_mapped_parent = bone
                .parent
                .is_some_and(|parent_index| mapping.target_to_source[parent_index].is_some());

            Some(BonePose {
                target_index,
                has_mapped_parent,
                original_location,
                original_rotation,
                post_rotation: original_rotation.conjugate(),
            })
        })
        .collect()
}

/// Reconcile one raw key into a delta against the target bind pose.
///
/// The root rule in step 2 is load-bearing: root keys are recorded in an
/// inverted convention relative to child keys, so a bone without a mapped
/// parent multiplies in the conjugated raw rotation.
fn transform_key(pose: &BonePose, key_rotation: Quat, key_location: Vec3) -> BoneKey {
    // 1. Start from the post rotation, right-multiplied by the original.
    let mut rotation = pose.post_rotation * pose.original_rotation;

    // 2. Fold in the raw key, conjugated for parentless bones.
    let q = if pose.has_mapped_parent {
        pose.post_rotation * key_rotation
    } else {
        pose.post_rotation * key_rotation.conjugate()
    };

    // 3. The output delta rotation.
    rotation = rotation * q.conjugate();

    // 4. Translation delta, rotated back out of bind-local space.
    let location = pose.post_rotation.conjugate() * (key_location - pose.original_location);

    (rotation, location)
}

/// One output channel: a mapped bone's delta keys, ready to drive a target
/// animation track directly. A suppressed track decodes to `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneChannel {
    /// Index of the bone in the animation file's skeleton
    pub source_index: usize,
    /// Index of the bone it drives in the target skeleton
    pub target_index: usize,
    /// Target bone name
    pub name: String,
    pub rotations: Option<Vec<Quaternion>>,
    pub translations: Option<Vec<Vector3>>,
}

/// The result of retargeting one sequence
#[derive(Debug, Clone, PartialEq)]
pub struct RetargetOutput {
    pub sequence_name: String,
    /// Output frame count after resampling
    pub frame_count: usize,
    /// Output sample rate
    pub fps: f32,
    pub channels: Vec<BoneChannel>,
    pub warnings: Vec<RetargetWarning>,
}

/// Retarget one named sequence onto a target skeleton.
///
/// Bones are joined by name under `mode`; every mapped bone's raw keys are
/// reconciled against the target bind pose, the whole matrix is resampled to
/// `target_fps` (default: the sequence's own rate), and per-track sidecar
/// suppression is honored. Mapping problems surface as warnings on the
/// output; the only hard failures are an unknown sequence name, an
/// inconsistent document, or a non-positive target rate.
pub fn retarget_sequence(
    psa: &Psa,
    sequence_name: &str,
    target: &TargetSkeleton,
    mode: BoneMappingMode,
    target_fps: Option<f32>,
    config: &PsaConfig,
    encoding: NameEncoding,
) -> Result<RetargetOutput> {
    let (sequence_index, sequence) = psa
        .sequence(sequence_name, encoding)
        .ok_or_else(|| PsaError::UnknownSequence(sequence_name.to_string()))?;
    psa.validate()?;
    let keys = psa.sequence_keys(sequence_index)?;

    let fps = target_fps.unwrap_or(sequence.fps);
    if !fps.is_finite() || fps <= 0.0 {
        return Err(PsaError::Validation(format!(
            "target sample rate must be positive, got {fps}"
        )));
    }

    let source_names = psa.bone_names(encoding);
    let target_names = target.bone_names();
    let mapping = map_bones(&source_names, &target_names, mode);
    let poses = build_bone_poses(target, &mapping);

    let warnings = collect_warnings(&source_names, &target_names, &mapping, &poses, target);

    // Reconcile every mapped bone's keys; unmapped bones pass through raw so
    // the matrix keeps its shape for resampling.
    let bone_count = psa.bones.len();
    let frame_count = sequence.frame_count.max(0) as usize;
    let mut matrix: Vec<Vec<BoneKey>> = Vec::with_capacity(frame_count);
    for frame_index in 0..frame_count {
        let row = (0..bone_count)
            .map(|bone_index| {
                let key = &keys[frame_index * bone_count + bone_index];
                let raw_rotation = key.rotation.to_glam();
                let raw_location = key.location.to_glam();
                match &poses[bone_index] {
                    Some(pose) => transform_key(pose, raw_rotation, raw_location),
                    None => (raw_rotation, raw_location),
                }
            })
            .collect();
        matrix.push(row);
    }

    let frame_step = if sequence.fps > 0.0 {
        sequence.fps / fps
    } else {
        log::warn!(
            "sequence '{sequence_name}' declares a sample rate of {}; skipping resample",
            sequence.fps
        );
        1.0
    };
    let resampled = resample_keys(&matrix, frame_step);

    let channels = poses
        .iter()
        .enumerate()
        .filter_map(|(bone_index, pose)| {
            let pose = pose.as_ref()?;
            let flags = config.flags(sequence_name, bone_index);
            let rotations = (!flags.contains(TrackFlags::NO_ROTATION)).then(|| {
                resampled
                    .iter()
                    .map(|row| Quaternion::from_glam(row[bone_index].0))
                    .collect()
            });
            let translations = (!flags.contains(TrackFlags::NO_TRANSLATION)).then(|| {
                resampled
                    .iter()
                    .map(|row| Vector3::from_glam(row[bone_index].1))
                    .collect()
            });
            Some(BoneChannel {
                source_index: bone_index,
                target_index: pose.target_index,
                name: target_names[pose.target_index].clone(),
                rotations,
                translations,
            })
        })
        .collect();

    Ok(RetargetOutput {
        sequence_name: sequence_name.to_string(),
        frame_count: resampled.len(),
        fps,
        channels,
        warnings,
    })
}

fn collect_warnings(
    source_names: &[String],
    target_names: &[String],
    mapping: &BoneMapping,
    poses: &[Option<BonePose>],
    target: &TargetSkeleton,
) -> Vec<RetargetWarning> {
    let mut warnings = Vec::new();

    // Resolved names with no mapped counterpart, deduplicated and sorted.
    let mapped_target_names: BTreeSet<&str> = poses
        .iter()
        .flatten()
        .map(|pose| target_names[pose.target_index].as_str())
        .collect();
    let missing: Vec<String> = mapping
        .resolved_names
        .iter()
        .filter(|name| !mapped_target_names.contains(name.as_str()))
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if !missing.is_empty() {
        warnings.push(RetargetWarning::MissingBones { names: missing });
    }

    let orphaned: Vec<String> = poses
        .iter()
        .flatten()
        .filter(|pose| {
            target.bones[pose.target_index].parent.is_some() && !pose.has_mapped_parent
        })
        .map(|pose| target_names[pose.target_index].clone())
        .collect();
    if !orphaned.is_empty() {
        warnings.push(RetargetWarning::UnmappedParents { names: orphaned });
    }

    for duplicate in &mapping.duplicate_mappings {
        warnings.push(RetargetWarning::DuplicateMapping {
            source_name: source_names[duplicate.source_index].clone(),
            target_name: target_names[duplicate.target_index].clone(),
            prior_source_name: source_names[duplicate.prior_source_index].clone(),
        });
    }

    warnings
}
