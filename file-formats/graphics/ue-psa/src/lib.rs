//! Parser, writer, and skeleton retargeting for legacy Unreal PSA animation
//! files.
//!
//! A PSA file pairs a name-keyed skeleton descriptor with named sequences of
//! dense per-frame, per-bone keys. Decoding produces an immutable [`Psa`]
//! document; [`retarget_sequence`] re-expresses one sequence's keys as delta
//! channels against an arbitrary [`TargetSkeleton`]'s bind pose, resampled
//! to an arbitrary rate, with per-track sidecar suppression. Everything here
//! is synchronous and shares nothing between calls; callers may fan out over
//! sequences freely.

pub mod config;
pub mod data;
pub mod error;
pub mod mapping;
pub mod reader;
pub mod resample;
pub mod retarget;
pub mod writer;

pub use config::{ConfigIssue, PsaConfig, TrackFlags};
pub use data::{Bone, Key, Psa, Sequence};
pub use error::{PsaError, Result};
pub use mapping::{BoneMapping, BoneMappingMode, map_bones};
pub use resample::{resample_keys, sample_frame_times};
pub use retarget::{
    BoneChannel, RetargetOutput, RetargetWarning, TargetBone, TargetSkeleton, retarget_sequence,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
