//! Shared binary plumbing for the legacy Unreal PSK/PSA interchange formats.
//!
//! Both formats are flat streams of chunked sections: a fixed 32-byte header
//! (20-byte ASCII tag, type flags, element size, element count) followed by
//! tightly packed little-endian records. This crate provides the section
//! codec, the primitive read/write extension traits, and the wire-level
//! vector/quaternion/name types that `ue-psk` and `ue-psa` build on.

pub mod error;
pub mod io_ext;
pub mod section;
pub mod types;

pub use error::{FormatError, Result};
pub use section::{SECTION_HEADER_SIZE, SECTION_TYPE_FLAGS, SectionHeader};
pub use types::{NAME_LEN, NameEncoding, Quaternion, RawName, Vector3};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
