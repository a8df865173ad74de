//! The PSK document model: a decoded skeletal mesh as a plain value object.
//!
//! Array order is significant everywhere; points, wedges, faces, bones and
//! weights reference each other by index. Documents are built once (by the
//! reader or a scene exporter) and never mutated while another operation
//! reads them; the one sanctioned in-place mutation is
//! [`repair_degenerate_geometry`](crate::repair::repair_degenerate_geometry).

use std::io::{Read, Write};

use ue_data::io_ext::{ReadExt, WriteExt};
use ue_data::{Quaternion, RawName, Vector3};

use crate::error::{PskError, Result};

/// Wire size of a point record
pub const POINT_SIZE: usize = 12;
/// Wire size of a wedge record (both index widths)
pub const WEDGE_SIZE: usize = 16;
/// Wire size of a face record
pub const FACE_SIZE: usize = 12;
/// Wire size of a material record
pub const MATERIAL_SIZE: usize = 88;
/// Wire size of a bone record
pub const BONE_SIZE: usize = 120;
/// Wire size of a weight record
pub const WEIGHT_SIZE: usize = 12;

/// Wedge counts above this use the wide (32-bit point index) wedge layout
pub const MAX_NARROW_WEDGES: usize = 65536;
/// Hard bone limit of the wire format
pub const MAX_BONES: usize = 256;
/// Hard material limit of the wire format
pub const MAX_MATERIALS: usize = 256;

/// A per-triangle-corner record pairing a point with UV and material data.
///
/// Held in the wide form in memory; the narrow 16-bit form is selected on
/// encode purely by wedge count. The width is a storage-size optimization,
/// not a semantic difference.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Wedge {
    pub point_index: u32,
    pub u: f32,
    pub v: f32,
    pub material_index: u32,
}

impl Wedge {
    /// Parse the narrow layout: 16-bit point index plus padding
    pub fn parse_narrow<R: Read>(reader: &mut R) -> ue_data::Result<Self> {
        let point_index = reader.read_u16_le()? as u32;
        let _padding = reader.read_u16_le()?;
        let u = reader.read_f32_le()?;
        let v = reader.read_f32_le()?;
        let material_index = reader.read_u8()? as u32;
        let _reserved = reader.read_u8()?;
        let _padding = reader.read_u16_le()?;
        Ok(Self {
            point_index,
            u,
            v,
            material_index,
        })
    }

    /// Parse the wide layout: 32-bit point and material indices
    pub fn parse_wide<R: Read>(reader: &mut R) -> ue_data::Result<Self> {
        let point_index = reader.read_u32_le()?;
        let u = reader.read_f32_le()?;
        let v = reader.read_f32_le()?;
        let material_index = reader.read_u32_le()?;
        Ok(Self {
            point_index,
            u,
            v,
            material_index,
        })
    }

    /// Write the narrow layout
    pub fn write_narrow<W: Write>(&self, writer: &mut W) -> ue_data::Result<()> {
        writer.write_u16_le(self.point_index as u16)?;
        writer.write_u16_le(0)?;
        writer.write_f32_le(self.u)?;
        writer.write_f32_le(self.v)?;
        writer.write_u8(self.material_index as u8)?;
        writer.write_u8(0)?;
        writer.write_u16_le(0)?;
        Ok(())
    }

    /// Write the wide layout
    pub fn write_wide<W: Write>(&self, writer: &mut W) -> ue_data::Result<()> {
        writer.write_u32_le(self.point_index)?;
        writer.write_f32_le(self.u)?;
        writer.write_f32_le(self.v)?;
        writer.write_u32_le(self.material_index)?;
        Ok(())
    }
}

/// A triangle: three wedge indices, material, and a smoothing-group bitmask
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Face {
    pub wedge_indices: [u16; 3],
    pub material_index: u8,
    pub aux_material_index: u8,
    pub smoothing_groups: u32,
}

impl Face {
    pub fn parse<R: Read>(reader: &mut R) -> ue_data::Result<Self> {
        let wedge_indices = [
            reader.read_u16_le()?,
            reader.read_u16_le()?,
            reader.read_u16_le()?,
        ];
        let material_index = reader.read_u8()?;
        let aux_material_index = reader.read_u8()?;
        let smoothing_groups = reader.read_u32_le()?;
        Ok(Self {
            wedge_indices,
            material_index,
            aux_material_index,
            smoothing_groups,
        })
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> ue_data::Result<()> {
        for index in self.wedge_indices {
            writer.write_u16_le(index)?;
        }
        writer.write_u8(self.material_index)?;
        writer.write_u8(self.aux_material_index)?;
        writer.write_u32_le(self.smoothing_groups)?;
        Ok(())
    }
}

/// A material slot; `texture_index` is the texture slot it binds
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Material {
    pub name: RawName,
    pub texture_index: i32,
    pub poly_flags: u32,
    pub aux_material: i32,
    pub aux_flags: i32,
    pub lod_bias: i32,
    pub lod_style: i32,
}

impl Material {
    pub fn parse<R: Read>(reader: &mut R) -> ue_data::Result<Self> {
        let name = RawName::parse(reader)?;
        let texture_index = reader.read_i32_le()?;
        let poly_flags = reader.read_u32_le()?;
        let aux_material = reader.read_i32_le()?;
        let aux_flags = reader.read_i32_le()?;
        let lod_bias = reader.read_i32_le()?;
        let lod_style = reader.read_i32_le()?;
        Ok(Self {
            name,
            texture_index,
            poly_flags,
            aux_material,
            aux_flags,
            lod_bias,
            lod_style,
        })
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> ue_data::Result<()> {
        self.name.write(writer)?;
        writer.write_i32_le(self.texture_index)?;
        writer.write_u32_le(self.poly_flags)?;
        writer.write_i32_le(self.aux_material)?;
        writer.write_i32_le(self.aux_flags)?;
        writer.write_i32_le(self.lod_bias)?;
        writer.write_i32_le(self.lod_style)?;
        Ok(())
    }
}

/// A reference-skeleton bone.
///
/// Bind transforms are relative to the parent bone. The root (index 0, with
/// a self-referential parent index) is in global space. Non-root stored
/// rotations carry the legacy conjugated convention; see
/// [`ReferencePose`](crate::skeleton::ReferencePose) for the reconstruction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bone {
    pub name: RawName,
    pub flags: u32,
    pub children_count: i32,
    pub parent_index: i32,
    pub rotation: Quaternion,
    pub location: Vector3,
    pub length: f32,
    pub size: Vector3,
}

impl Bone {
    pub fn parse<R: Read>(reader: &mut R) -> ue_data::Result<Self> {
        let name = RawName::parse(reader)?;
        let flags = reader.read_u32_le()?;
        let children_count = reader.read_i32_le()?;
        let parent_index = reader.read_i32_le()?;
        let rotation = Quaternion::parse(reader)?;
        let location = Vector3::parse(reader)?;
        let length = reader.read_f32_le()?;
        let size = Vector3::parse(reader)?;
        Ok(Self {
            name,
            flags,
            children_count,
            parent_index,
            rotation,
            location,
            length,
            size,
        })
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> ue_data::Result<()> {
        self.name.write(writer)?;
        writer.write_u32_le(self.flags)?;
        writer.write_i32_le(self.children_count)?;
        writer.write_i32_le(self.parent_index)?;
        self.rotation.write(writer)?;
        self.location.write(writer)?;
        writer.write_f32_le(self.length)?;
        self.size.write(writer)?;
        Ok(())
    }

    /// Whether the bone at `index` is the skeleton root
    pub fn is_root(&self, index: usize) -> bool {
        self.parent_index < 0 || self.parent_index as usize == index
    }
}

/// A single bone-to-point skinning influence.
///
/// Multiple weights may reference the same point, and weights for one point
/// need not sum to 1; normalization is the consumer's responsibility.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Weight {
    pub weight: f32,
    pub point_index: i32,
    pub bone_index: i32,
}

impl Weight {
    pub fn parse<R: Read>(reader: &mut R) -> ue_data::Result<Self> {
        let weight = reader.read_f32_le()?;
        let point_index = reader.read_i32_le()?;
        let bone_index = reader.read_i32_le()?;
        Ok(Self {
            weight,
            point_index,
            bone_index,
        })
    }

    pub fn write<W: Write>(&self, writer: &mut W) -> ue_data::Result<()> {
        writer.write_f32_le(self.weight)?;
        writer.write_i32_le(self.point_index)?;
        writer.write_i32_le(self.bone_index)?;
        Ok(())
    }
}

/// A decoded PSK skeletal mesh document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Psk {
    pub points: Vec<Vector3>,
    pub wedges: Vec<Wedge>,
    pub faces: Vec<Face>,
    pub materials: Vec<Material>,
    pub bones: Vec<Bone>,
    pub weights: Vec<Weight>,
}

impl Psk {
    /// Check every cross-array index invariant.
    ///
    /// Returns the first violation found. A document fresh from
    /// [`Psk::read`](crate::Psk::read) is not implicitly validated; callers
    /// that index into the arrays should validate first.
    pub fn validate(&self) -> Result<()> {
        for (i, wedge) in self.wedges.iter().enumerate() {
            if wedge.point_index as usize >= self.points.len() {
                return Err(PskError::Validation(format!(
                    "wedge {i} references point {} of {}",
                    wedge.point_index,
                    self.points.len()
                )));
            }
        }
        for (i, face) in self.faces.iter().enumerate() {
            for index in face.wedge_indices {
                if index as usize >= self.wedges.len() {
                    return Err(PskError::Validation(format!(
                        "face {i} references wedge {index} of {}",
                        self.wedges.len()
                    )));
                }
            }
        }
        for (i, bone) in self.bones.iter().enumerate() {
            if !bone.is_root(i) && bone.parent_index as usize >= self.bones.len() {
                return Err(PskError::Validation(format!(
                    "bone {i} references parent {} of {}",
                    bone.parent_index,
                    self.bones.len()
                )));
            }
        }
        for (i, weight) in self.weights.iter().enumerate() {
            if weight.point_index < 0 || weight.point_index as usize >= self.points.len() {
                return Err(PskError::Validation(format!(
                    "weight {i} references point {} of {}",
                    weight.point_index,
                    self.points.len()
                )));
            }
            if weight.bone_index < 0 || weight.bone_index as usize >= self.bones.len() {
                return Err(PskError::Validation(format!(
                    "weight {i} references bone {} of {}",
                    weight.bone_index,
                    self.bones.len()
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use ue_data::NameEncoding;

    #[test]
    fn test_wedge_narrow_roundtrip() {
        let wedge = Wedge {
            point_index: 1234,
            u: 0.25,
            v: 0.75,
            material_index: 3,
        };
        let mut cursor = Cursor::new(Vec::new());
        wedge.write_narrow(&mut cursor).unwrap();
        let data = cursor.into_inner();
        assert_eq!(data.len(), WEDGE_SIZE);

        let mut cursor = Cursor::new(data);
        assert_eq!(Wedge::parse_narrow(&mut cursor).unwrap(), wedge);
    }

    #[test]
    fn test_wedge_wide_roundtrip() {
        let wedge = Wedge {
            point_index: 100_000,
            u: 0.5,
            v: 0.5,
            material_index: 7,
        };
        let mut cursor = Cursor::new(Vec::new());
        wedge.write_wide(&mut cursor).unwrap();
        let data = cursor.into_inner();
        assert_eq!(data.len(), WEDGE_SIZE);

        let mut cursor = Cursor::new(data);
        assert_eq!(Wedge::parse_wide(&mut cursor).unwrap(), wedge);
    }

    #[test]
    fn test_bone_record_size() {
        let bone = Bone {
            name: RawName::new("root", NameEncoding::Windows1252).unwrap(),
            rotation: Quaternion::IDENTITY,
            ..Default::default()
        };
        let mut cursor = Cursor::new(Vec::new());
        bone.write(&mut cursor).unwrap();
        assert_eq!(cursor.into_inner().len(), BONE_SIZE);
    }

    #[test]
    fn test_material_record_size() {
        let material = Material {
            name: RawName::new("skin", NameEncoding::Windows1252).unwrap(),
            texture_index: 0,
            ..Default::default()
        };
        let mut cursor = Cursor::new(Vec::new());
        material.write(&mut cursor).unwrap();
        assert_eq!(cursor.into_inner().len(), MATERIAL_SIZE);
    }

    #[test]
    fn test_root_bone_detection() {
        let bone = Bone {
            parent_index: 0,
            ..Default::default()
        };
        assert!(bone.is_root(0));
        assert!(!bone.is_root(1));
    }

    #[test]
    fn test_validate_catches_bad_wedge() {
        let psk = Psk {
            points: vec![Vector3::ZERO],
            wedges: vec![Wedge {
                point_index: 5,
                ..Default::default()
            }],
            ..Default::default()
        };
        assert!(matches!(
            psk.validate().unwrap_err(),
            PskError::Validation(_)
        ));
    }
}
