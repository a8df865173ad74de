//! PSK encoding: `ACTRHEAD` followed by the six data sections in the
//! canonical order every known importer expects.

use std::io::Write;

use ue_data::section::{write_marker, write_section};

use crate::data::{
    BONE_SIZE, FACE_SIZE, MATERIAL_SIZE, MAX_BONES, MAX_MATERIALS, MAX_NARROW_WEDGES, POINT_SIZE,
    Psk, WEDGE_SIZE, WEIGHT_SIZE, Wedge,
};
use crate::error::{PskError, Result};

impl Psk {
    /// Encode the document to a writer.
    ///
    /// The wedge section narrows point indices to 16 bits when the wedge
    /// count permits, matching what legacy importers expect; larger meshes
    /// use the wide layout. Bone and material counts are capped by the wire
    /// format and at least one bone must be present.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        if self.bones.is_empty() {
            return Err(PskError::Limit("at least one bone is required".into()));
        }
        if self.bones.len() > MAX_BONES {
            return Err(PskError::Limit(format!(
                "bone count {} exceeds limit of {MAX_BONES}",
                self.bones.len()
            )));
        }
        if self.materials.len() > MAX_MATERIALS {
            return Err(PskError::Limit(format!(
                "material count {} exceeds limit of {MAX_MATERIALS}",
                self.materials.len()
            )));
        }

        write_marker(writer, b"ACTRHEAD")?;
        write_section(writer, b"PNTS0000", POINT_SIZE, &self.points, |w, p| {
            p.write(w)
        })?;

        let write_wedge: fn(&mut W, &Wedge) -> ue_data::Result<()> =
            if self.wedges.len() > MAX_NARROW_WEDGES {
                |w, wedge| wedge.write_wide(w)
            } else {
                |w, wedge| wedge.write_narrow(w)
            };
        write_section(writer, b"VTXW0000", WEDGE_SIZE, &self.wedges, write_wedge)?;

        write_section(writer, b"FACE0000", FACE_SIZE, &self.faces, |w, f| {
            f.write(w)
        })?;
        write_section(writer, b"MATT0000", MATERIAL_SIZE, &self.materials, |w, m| {
            m.write(w)
        })?;
        write_section(writer, b"REFSKELT", BONE_SIZE, &self.bones, |w, b| {
            b.write(w)
        })?;
        write_section(writer, b"RAWWEIGHTS", WEIGHT_SIZE, &self.weights, |w, x| {
            x.write(w)
        })?;

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
    use crate::data::Bone;

    fn one_bone_psk() -> Psk {
        Psk {
            bones: vec![Bone::default()],
            ..Default::default()
        }
    }

    #[test]
    fn test_write_requires_a_bone() {
        let psk = Psk::default();
        assert!(matches!(
            psk.to_bytes().unwrap_err(),
            PskError::Limit(_)
        ));
    }

    #[test]
    fn test_write_rejects_too_many_bones() {
        let psk = Psk {
            bones: vec![Bone::default(); MAX_BONES + 1],
            ..Default::default()
        };
        assert!(matches!(psk.to_bytes().unwrap_err(), PskError::Limit(_)));
    }

    #[test]
    fn test_sections_written_in_canonical_order() {
        let bytes = one_bone_psk().to_bytes().unwrap();
        let tags: Vec<&[u8]> = vec![
            b"ACTRHEAD", b"PNTS0000", b"VTXW0000", b"FACE0000", b"MATT0000", b"REFSKELT",
            b"RAWWEIGHTS",
        ];
        let mut offset = 0;
        for tag in tags {
            assert_eq!(&bytes[offset..offset + tag.len()], tag);
            let count = i32::from_le_bytes(bytes[offset + 28..offset + 32].try_into().unwrap());
            let size = i32::from_le_bytes(bytes[offset + 24..offset + 28].try_into().unwrap());
            offset += 32 + (size * count) as usize;
        }
        assert_eq!(offset, bytes.len());
    }
}
