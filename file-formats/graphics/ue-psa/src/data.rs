//! The PSA document model: a decoded skeletal animation as a plain value
//! object.
//!
//! The bone list parallels a PSK reference skeleton byte for byte and is the
//! name-keyed descriptor retargeting joins against. Keys for all sequences
//! live in one flat block, frame-major within each sequence, sequences
//! back-to-back in descriptor order.

use std::io::{Read, Write};

use ue_data::io_ext::{ReadExt, WriteExt};
use ue_data::{NameEncoding, Quaternion, RawName, Vector3};

// The PSA bone record is the same 120-byte layout as the PSK reference
// skeleton; reuse it rather than redeclare it.
pub use ue_psk::data::{BONE_SIZE, Bone};

use crate::error::{PsaError, Result};

/// Wire size of a sequence descriptor
pub const SEQUENCE_SIZE: usize = 168;
/// Wire size of an animation key
pub const KEY_SIZE: usize = 32;

/// A named animation sequence descriptor.
///
/// Only `name`, `fps` and `frame_count` drive retargeting; the remaining
/// fields are carried through verbatim for round-tripping.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sequence {
    pub name: RawName,
    pub group: RawName,
    pub bone_count: i32,
    pub root_include: i32,
    pub compression_style: i32,
    pub key_quotum: i32,
    pub key_reduction: f32,
    pub track_time: f32,
    pub fps: f32,
    pub start_bone: i32,
    pub first_frame: i32,
    pub frame_count: i32,
}

impl Sequence {
    pub fn parse<R: Read>(reader: &mut R) -> ue_data::Result<Self> {
        let name = RawName::parse(reader)?;
        let group = RawName::parse(reader)?;
        let bone_count = reader.read_i32_le()?;
        let root_include = reader.read_i32_le()?;
        let compression_style = reader.read_i32_le()?;
        let key_quotum = reader.read_i32_le()?;
        let key_reduction = reader.read_f32_le()?;
        let track_time = reader.read_f32_le()?;
        let fps = reader.read_f32_le()?;
        let start_bone = reader.read_i32_le()?;
        let first_frame = reader.read_i32_le()?;
        let frame_count = reader.read_i32_le()?;
        Ok(Self {
            name,
            group,
            bone_count,
            root_include,
            compression_style,
            key_quotum,
            key_reduction,
            track_time,
            fps,
            start_bone,
            first_frame,
            frame_count,
        })
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> ue_data::Result<()> {
        self.name.write(writer)?;
        self.group.write(writer)?;
        writer.write_i32_le(self.bone_count)?;
        writer.write_i32_le(self.root_include)?;
        writer.write_i32_le(self.compression_style)?;
        writer.write_i32_le(self.key_quotum)?;
        writer.write_f32_le(self.key_reduction)?;
        writer.write_f32_le(self.track_time)?;
        writer.write_f32_le(self.fps)?;
        writer.write_i32_le(self.start_bone)?;
        writer.write_i32_le(self.first_frame)?;
        writer.write_i32_le(self.frame_count)?;
        Ok(())
    }

    /// Number of keys this sequence occupies in the flat key block
    pub fn key_count(&self) -> usize {
        self.frame_count.max(0) as usize * self.bone_count.max(0) as usize
    }
}

/// One raw animation key: parent-relative translation and rotation in the
/// file skeleton's own space, plus a timing field no known consumer reads
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Key {
    pub location: Vector3,
    pub rotation: Quaternion,
    pub time: f32,
}

impl Key {
    pub fn parse<R: Read>(reader: &mut R) -> ue_data::Result<Self> {
        let location = Vector3::parse(reader)?;
        let rotation = Quaternion::parse(reader)?;
        let time = reader.read_f32_le()?;
        Ok(Self {
            location,
            rotation,
            time,
        })
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> ue_data::Result<()> {
        self.location.write(writer)?;
        self.rotation.write(writer)?;
        writer.write_f32_le(self.time)?;
        Ok(())
    }
}

/// A decoded PSA animation document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Psa {
    pub bones: Vec<Bone>,
    pub sequences: Vec<Sequence>,
    pub keys: Vec<Key>,
}

impl Psa {
    /// Find a sequence by decoded name, returning its index and descriptor
    pub fn sequence(&self, name: &str, encoding: NameEncoding) -> Option<(usize, &Sequence)> {
        self.sequences
            .iter()
            .enumerate()
            .find(|(_, s)| s.name.decode(encoding) == name)
    }

    /// Decoded bone names in skeleton order
    pub fn bone_names(&self, encoding: NameEncoding) -> Vec<String> {
        self.bones.iter().map(|b| b.name.decode(encoding)).collect()
    }

    /// Slice the flat key block down to one sequence's dense
    /// `frame_count x bone_count` matrix (frame-major).
    pub fn sequence_keys(&self, sequence_index: usize) -> Result<&[Key]> {
        let sequence = self.sequences.get(sequence_index).ok_or_else(|| {
            PsaError::Validation(format!(
                "sequence index {sequence_index} out of range ({} sequences)",
                self.sequences.len()
            ))
        })?;
        let offset: usize = self.sequences[..sequence_index]
            .iter()
            .map(Sequence::key_count)
            .sum();
        let count = sequence.key_count();
        self.keys.get(offset..offset + count).ok_or_else(|| {
            PsaError::Validation(format!(
                "sequence {sequence_index} spans keys {offset}..{} but only {} are present",
                offset + count,
                self.keys.len()
            ))
        })
    }

    /// Cross-check the declared sequence shapes against the key block.
    ///
    /// The flat block is only addressable when every sequence's `bone_count`
    /// matches the skeleton and the declared totals cover the block exactly.
    pub fn validate(&self) -> Result<()> {
        for (i, sequence) in self.sequences.iter().enumerate() {
            if sequence.bone_count as usize != self.bones.len() {
                return Err(PsaError::Validation(format!(
                    "sequence {i} declares {} bones but the skeleton has {}",
                    sequence.bone_count,
                    self.bones.len()
                )));
            }
            if sequence.frame_count < 0 {
                return Err(PsaError::Validation(format!(
                    "sequence {i} declares a negative frame count"
                )));
            }
        }
        let total: usize = self.sequences.iter().map(Sequence::key_count).sum();
        if total != self.keys.len() {
            return Err(PsaError::Validation(format!(
                "sequences declare {total} keys but the key block holds {}",
                self.keys.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_sequence_record_size() {
        let sequence = Sequence::default();
        let mut cursor = Cursor::new(Vec::new());
        sequence.write(&mut cursor).unwrap();
        assert_eq!(cursor.into_inner().len(), SEQUENCE_SIZE);
    }

    #[test]
    fn test_key_record_size() {
        let key = Key::default();
        let mut cursor = Cursor::new(Vec::new());
        key.write(&mut cursor).unwrap();
        assert_eq!(cursor.into_inner().len(), KEY_SIZE);
    }

    #[test]
    fn test_sequence_keys_slicing() {
        let make_sequence = |frames: i32| Sequence {
            bone_count: 2,
            frame_count: frames,
            ..Default::default()
        };
        let psa = Psa {
            bones: vec![Bone::default(); 2],
            sequences: vec![make_sequence(2), make_sequence(3)],
            keys: (0..10)
                .map(|i| Key {
                    time: i as f32,
                    ..Default::default()
                })
                .collect(),
        };
        psa.validate().unwrap();

        let first = psa.sequence_keys(0).unwrap();
        assert_eq!(first.len(), 4);
        assert_eq!(first[0].time, 0.0);

        let second = psa.sequence_keys(1).unwrap();
        assert_eq!(second.len(), 6);
        assert_eq!(second[0].time, 4.0);
    }

    #[test]
    fn test_validate_rejects_short_key_block() {
        let psa = Psa {
            bones: vec![Bone::default()],
            sequences: vec![Sequence {
                bone_count: 1,
                frame_count: 5,
                ..Default::default()
            }],
            keys: vec![Key::default(); 3],
        };
        assert!(matches!(
            psa.validate().unwrap_err(),
            PsaError::Validation(_)
        ));
    }
}
