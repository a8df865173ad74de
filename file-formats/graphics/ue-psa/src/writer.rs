//! PSA encoding: `ANIMHEAD` followed by the bone, sequence, and key sections.

use std::io::Write;

use ue_data::section::{write_marker, write_section};

use crate::data::{BONE_SIZE, KEY_SIZE, Psa, SEQUENCE_SIZE};
use crate::error::Result;

impl Psa {
    /// Encode the document to a writer.
    ///
    /// Sections are emitted in the order every known importer expects. The
    /// document is validated first so a file with an inconsistent key block
    /// can never be produced.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.validate()?;

        write_marker(writer, b"ANIMHEAD")?;
        write_section(writer, b"BONENAMES", BONE_SIZE, &self.bones, |w, b| {
            b.write(w)
        })?;
        write_section(writer, b"ANIMINFO", SEQUENCE_SIZE, &self.sequences, |w, s| {
            s.write(w)
        })?;
        write_section(writer, b"ANIMKEYS", KEY_SIZE, &self.keys, |w, k| k.write(w))?;

        Ok(())
    }

    /// Encode the document to a byte vector
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.write(&mut bytes)?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Bone, Key, Sequence};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_roundtrip() {
        let psa = Psa {
            bones: vec![Bone::default(), Bone::default()],
            sequences: vec![Sequence {
                bone_count: 2,
                frame_count: 3,
                fps: 30.0,
                ..Default::default()
            }],
            keys: (0..6)
                .map(|i| Key {
                    time: i as f32 / 30.0,
                    ..Default::default()
                })
                .collect(),
        };

        let decoded = Psa::from_bytes(&psa.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, psa);
    }

    #[test]
    fn test_write_rejects_inconsistent_document() {
        let psa = Psa {
            bones: vec![Bone::default()],
            sequences: vec![Sequence {
                bone_count: 1,
                frame_count: 2,
                ..Default::default()
            }],
            keys: vec![Key::default()], // one key short
        };
        assert!(psa.to_bytes().is_err());
    }
}
