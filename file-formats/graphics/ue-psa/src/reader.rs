//! Sequential section decoding for PSA files.

use std::io::{Cursor, Read, Seek};

use ue_data::section::{SectionHeader, read_records, skip_payload};

use crate::data::{BONE_SIZE, Bone, KEY_SIZE, Key, Psa, SEQUENCE_SIZE, Sequence};
use crate::error::Result;

impl Psa {
    /// Decode a PSA document from a reader.
    ///
    /// `ANIMHEAD` carries no payload; `SCALEKEYS` and any other unrecognized
    /// tag is skipped generically. Decoding aborts on the first format error
    /// with no partial document.
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let mut psa = Self::default();

        while let Some(header) = SectionHeader::read_next(reader)? {
            match header.tag() {
                b"BONENAMES" => {
                    psa.bones = read_records(reader, &header, BONE_SIZE, Bone::parse)?;
                }
                b"ANIMINFO" => {
                    psa.sequences =
                        read_records(reader, &header, SEQUENCE_SIZE, Sequence::parse)?;
                }
                b"ANIMKEYS" => {
                    psa.keys = read_records(reader, &header, KEY_SIZE, Key::parse)?;
                }
                _ => skip_payload(reader, &header)?,
            }
        }

        log::debug!(
            "decoded PSA: {} bones, {} sequences, {} keys",
            psa.bones.len(),
            psa.sequences.len(),
            psa.keys.len()
        );

        Ok(psa)
    }

    /// Decode a PSA document from a byte slice
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::read(&mut Cursor::new(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ue_data::section::{write_marker, write_section};

    #[test]
    fn test_scalekeys_section_is_skipped() {
        let mut bytes = Vec::new();
        write_marker(&mut bytes, b"ANIMHEAD").unwrap();
        write_section(&mut bytes, b"BONENAMES", BONE_SIZE, &[Bone::default()], |w, b| {
            b.write(w)
        })
        .unwrap();
        // A scale-key block this decoder does not model.
        SectionHeader::new(b"SCALEKEYS", 8, 4)
            .write(&mut bytes)
            .unwrap();
        bytes.extend_from_slice(&[0u8; 32]);

        let psa = Psa::from_bytes(&bytes).unwrap();
        assert_eq!(psa.bones.len(), 1);
        assert!(psa.keys.is_empty());
    }

    #[test]
    fn test_truncated_key_block_aborts() {
        let mut bytes = Vec::new();
        write_marker(&mut bytes, b"ANIMHEAD").unwrap();
        SectionHeader::new(b"ANIMKEYS", KEY_SIZE, 2)
            .write(&mut bytes)
            .unwrap();
        bytes.extend_from_slice(&[0u8; KEY_SIZE]); // only one of two keys

        assert!(Psa::from_bytes(&bytes).is_err());
    }
}
