//! Sequential section decoding for PSK files.

use std::io::{Cursor, Read, Seek};

use ue_data::section::{SectionHeader, read_records, skip_payload};
use ue_data::types::Vector3;

use crate::data::{
    BONE_SIZE, Bone, FACE_SIZE, Face, MATERIAL_SIZE, MAX_NARROW_WEDGES, Material, POINT_SIZE, Psk,
    WEDGE_SIZE, WEIGHT_SIZE, Wedge, Weight,
};
use crate::error::Result;

impl Psk {
    /// Decode a PSK document from a reader.
    ///
    /// Reading is strictly sequential: sections are consumed in whatever
    /// order they appear, recognized tags are decoded after their declared
    /// element size is checked against the record layout, and unknown tags
    /// are skipped by advancing `data_size * data_count` bytes. Any
    /// [`ue_data::FormatError`] aborts the decode with no partial document.
    pub fn read<R: Read + Seek>(reader: &mut R) -> Result<Self> {
        let mut psk = Self::default();

        while let Some(header) = SectionHeader::read_next(reader)? {
            match header.tag() {
                b"PNTS0000" => {
                    psk.points = read_records(reader, &header, POINT_SIZE, Vector3::parse)?;
                }
                b"VTXW0000" => {
                    // The wide variant is distinguishable only by count.
                    let parse: fn(&mut R) -> ue_data::Result<Wedge> =
                        if header.data_count as usize > MAX_NARROW_WEDGES {
                            Wedge::parse_wide
                        } else {
                            Wedge::parse_narrow
                        };
                    psk.wedges = read_records(reader, &header, WEDGE_SIZE, parse)?;
                }
                b"FACE0000" => {
                    psk.faces = read_records(reader, &header, FACE_SIZE, Face::parse)?;
                }
                b"MATT0000" => {
                    psk.materials = read_records(reader, &header, MATERIAL_SIZE, Material::parse)?;
                }
                b"REFSKELT" => {
                    psk.bones = read_records(reader, &header, BONE_SIZE, Bone::parse)?;
                }
                b"RAWWEIGHTS" => {
                    psk.weights = read_records(reader, &header, WEIGHT_SIZE, Weight::parse)?;
                }
                // ACTRHEAD and anything unrecognized: zero-or-opaque payload
                _ => skip_payload(reader, &header)?,
            }
        }

        log::debug!(
            "decoded PSK: {} points, {} wedges, {} faces, {} materials, {} bones, {} weights",
            psk.points.len(),
            psk.wedges.len(),
            psk.faces.len(),
            psk.materials.len(),
            psk.bones.len(),
            psk.weights.len()
        );

        Ok(psk)
    }

    /// Decode a PSK document from a byte slice
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::read(&mut Cursor::new(bytes))
    }
}
