//! Wire-level value types shared by the PSK and PSA record layouts.

use std::fmt;
use std::io::{Read, Write};

use crate::error::{FormatError, Result};
use crate::io_ext::{ReadExt, WriteExt};

/// A vector in 3D space, stored as three little-endian floats
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Parse a Vector3 from a reader
    pub fn parse<R: Read>(reader: &mut R) -> Result<Self> {
        let x = reader.read_f32_le()?;
        let y = reader.read_f32_le()?;
        let z = reader.read_f32_le()?;
        Ok(Self { x, y, z })
    }

    /// Write a Vector3 to a writer
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_f32_le(self.x)?;
        writer.write_f32_le(self.y)?;
        writer.write_f32_le(self.z)?;
        Ok(())
    }

    /// Convert to a glam vector for math operations
    pub fn to_glam(&self) -> glam::Vec3 {
        glam::Vec3::new(self.x, self.y, self.z)
    }

    /// Create from a glam vector
    pub fn from_glam(v: glam::Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
        }
    }
}

/// A rotation quaternion.
///
/// The wire order is XYZW for every record in both formats. W-first
/// construction happens only at the glam conversion boundary, which is where
/// the retargeting math documents its sign conventions.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quaternion {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
        w: 1.0,
    };

    /// Parse a quaternion from a reader
    pub fn parse<R: Read>(reader: &mut R) -> Result<Self> {
        let x = reader.read_f32_le()?;
        let y = reader.read_f32_le()?;
        let z = reader.read_f32_le()?;
        let w = reader.read_f32_le()?;
        Ok(Self { x, y, z, w })
    }

    /// Write a quaternion to a writer
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_f32_le(self.x)?;
        writer.write_f32_le(self.y)?;
        writer.write_f32_le(self.z)?;
        writer.write_f32_le(self.w)?;
        Ok(())
    }

    /// Convert to a glam quaternion for math operations
    pub fn to_glam(&self) -> glam::Quat {
        glam::Quat::from_xyzw(self.x, self.y, self.z, self.w)
    }

    /// Create from a glam quaternion
    pub fn from_glam(q: glam::Quat) -> Self {
        Self {
            x: q.x,
            y: q.y,
            z: q.z,
            w: q.w,
        }
    }
}

/// Length of the fixed name field in bone, material and sequence records
pub const NAME_LEN: usize = 64;

/// Text encoding for the byte-string names carried in the legacy formats.
///
/// The formats predate any encoding declaration; files in the wild carry
/// Windows-1252 names. The encoding is a decode-time option rather than a
/// hardcoded assumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameEncoding {
    /// The legacy codepage used by the original tooling
    #[default]
    Windows1252,
    /// UTF-8, decoded lossily
    Utf8,
}

/// Windows-1252 mappings for the 0x80..=0x9F block (the rest is Latin-1)
const CP1252_HIGH: [char; 32] = [
    '\u{20AC}', '\u{0081}', '\u{201A}', '\u{0192}', '\u{201E}', '\u{2026}', '\u{2020}', '\u{2021}',
    '\u{02C6}', '\u{2030}', '\u{0160}', '\u{2039}', '\u{0152}', '\u{008D}', '\u{017D}', '\u{008F}',
    '\u{0090}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{2022}', '\u{2013}', '\u{2014}',
    '\u{02DC}', '\u{2122}', '\u{0161}', '\u{203A}', '\u{0153}', '\u{009D}', '\u{017E}', '\u{0178}',
];

fn cp1252_byte_for(c: char) -> Option<u8> {
    match c {
        '\0'..='\u{7F}' => Some(c as u8),
        '\u{A0}'..='\u{FF}' => Some(c as u32 as u8),
        _ => CP1252_HIGH
            .iter()
            .position(|&m| m == c)
            .map(|i| 0x80 + i as u8),
    }
}

/// A fixed 64-byte, NUL-padded name field
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct RawName {
    pub bytes: [u8; NAME_LEN],
}

impl RawName {
    /// Encode a name into the fixed field.
    ///
    /// Fails if the name does not fit in 63 bytes (one NUL terminator is
    /// always kept so decoders can find the end) or contains characters the
    /// target encoding cannot represent.
    pub fn new(name: &str, encoding: NameEncoding) -> Result<Self> {
        let encoded: Vec<u8> = match encoding {
            NameEncoding::Utf8 => name.as_bytes().to_vec(),
            NameEncoding::Windows1252 => name
                .chars()
                .map(|c| {
                    cp1252_byte_for(c).ok_or_else(|| {
                        FormatError::Name(format!(
                            "'{name}' contains characters that cannot be encoded in Windows-1252"
                        ))
                    })
                })
                .collect::<Result<_>>()?,
        };
        if encoded.len() >= NAME_LEN {
            return Err(FormatError::Name(format!(
                "'{name}' exceeds the {} byte name limit",
                NAME_LEN - 1
            )));
        }
        let mut bytes = [0u8; NAME_LEN];
        bytes[..encoded.len()].copy_from_slice(&encoded);
        Ok(Self { bytes })
    }

    /// Wrap raw bytes without validation
    pub fn from_bytes(bytes: [u8; NAME_LEN]) -> Self {
        Self { bytes }
    }

    /// Parse a name field from a reader
    pub fn parse<R: Read>(reader: &mut R) -> Result<Self> {
        let mut bytes = [0u8; NAME_LEN];
        reader.read_exact(&mut bytes)?;
        Ok(Self { bytes })
    }

    /// Write the name field to a writer
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.bytes)?;
        Ok(())
    }

    /// The name bytes up to the first NUL
    pub fn as_bytes(&self) -> &[u8] {
        let end = self.bytes.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
        &self.bytes[..end]
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Decode the name to a portable string.
    ///
    /// Windows-1252 decoding is total: every byte has a mapping, so this
    /// never fails. UTF-8 decoding is lossy.
    pub fn decode(&self, encoding: NameEncoding) -> String {
        match encoding {
            NameEncoding::Utf8 => String::from_utf8_lossy(self.as_bytes()).to_string(),
            NameEncoding::Windows1252 => self
                .as_bytes()
                .iter()
                .map(|&b| match b {
                    0x80..=0x9F => CP1252_HIGH[(b - 0x80) as usize],
                    _ => b as char,
                })
                .collect(),
        }
    }
}

impl fmt::Debug for RawName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawName({:?})", String::from_utf8_lossy(self.as_bytes()))
    }
}

impl Default for RawName {
    fn default() -> Self {
        Self {
            bytes: [0u8; NAME_LEN],
        }
    }
}
