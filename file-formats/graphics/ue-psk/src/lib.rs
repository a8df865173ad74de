//! Parser, writer, and geometry repair for legacy Unreal PSK skeletal meshes.
//!
//! A PSK file is a chunked stream of sections (points, wedges, faces,
//! materials, reference skeleton, raw weights) decoded into an immutable
//! [`Psk`] document. The document is deliberately scene-graph free: building
//! armatures or mesh objects out of it is the job of an external scene
//! builder consuming [`Psk`] and [`ReferencePose`].

pub mod data;
pub mod error;
pub mod reader;
pub mod repair;
pub mod skeleton;
pub mod writer;

pub use data::{Bone, Face, Material, Psk, Wedge, Weight};
pub use error::{PskError, Result};
pub use repair::{RepairReport, repair_degenerate_geometry};
pub use skeleton::{ReferenceBone, ReferencePose};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
