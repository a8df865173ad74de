//! Reconstruction of the global bind pose from the reference skeleton.
//!
//! Bone records store parent-relative transforms with a legacy sign quirk:
//! every non-root rotation is written conjugated, while the root rotation is
//! not. Composing the chain therefore conjugates non-root rotations back
//! before applying them. Quaternion products follow glam's convention,
//! `a * b` applies `b` first and then `a`.

use glam::{Quat, Vec3};

use ue_data::NameEncoding;

use crate::data::Bone;
use crate::error::{PskError, Result};

/// One bone of a reconstructed bind pose, in global (armature) space
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceBone {
    pub name: String,
    pub parent: Option<usize>,
    pub global_location: Vec3,
    pub global_rotation: Quat,
}

/// A skeleton's bind pose with all transforms composed into global space.
///
/// This is the shape of data the PSA retargeter and scene builders consume:
/// bone identity by name, hierarchy by parent index, and rest transforms
/// free of the wire format's conjugation convention.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReferencePose {
    pub bones: Vec<ReferenceBone>,
}

impl ReferencePose {
    /// Compose a bind pose from reference-skeleton bone records.
    ///
    /// Bones must be stored parent-first (every known exporter does this);
    /// a forward or out-of-range parent reference is a validation error.
    pub fn from_bones(bones: &[Bone], encoding: NameEncoding) -> Result<Self> {
        let mut out: Vec<ReferenceBone> = Vec::with_capacity(bones.len());

        for (index, bone) in bones.iter().enumerate() {
            let parent = if bone.is_root(index) {
                None
            } else {
                let parent_index = bone.parent_index as usize;
                if parent_index >= index {
                    return Err(PskError::Validation(format!(
                        "bone {index} references parent {parent_index}, but bones must be stored parent-first"
                    )));
                }
                Some(parent_index)
            };

            let stored_rotation = bone.rotation.to_glam();
            let stored_location = bone.location.to_glam();

            let (global_rotation, global_location) = match parent {
                // The root is already in global space, rotation unconjugated.
                None => (stored_rotation, stored_location),
                Some(parent_index) => {
                    let parent_bone = &out[parent_index];
                    let local_rotation = stored_rotation.conjugate();
                    (
                        (parent_bone.global_rotation * local_rotation).normalize(),
                        parent_bone.global_location
                            + parent_bone.global_rotation * stored_location,
                    )
                }
            };

            out.push(ReferenceBone {
                name: bone.name.decode(encoding),
                parent,
                global_location,
                global_rotation,
            });
        }

        Ok(Self { bones: out })
    }

    /// Bone names in skeleton order
    pub fn bone_names(&self) -> Vec<String> {
        self.bones.iter().map(|b| b.name.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;
    use ue_data::{Quaternion, RawName, Vector3};

    fn named(name: &str) -> RawName {
        RawName::new(name, NameEncoding::Windows1252).unwrap()
    }

    #[test]
    fn test_single_root_bone() {
        let bones = [Bone {
            name: named("root"),
            parent_index: 0,
            rotation: Quaternion::IDENTITY,
            location: Vector3::new(1.0, 2.0, 3.0),
            ..Default::default()
        }];
        let pose = ReferencePose::from_bones(&bones, NameEncoding::Windows1252).unwrap();
        assert_eq!(pose.bones.len(), 1);
        assert_eq!(pose.bones[0].parent, None);
        assert_eq!(pose.bones[0].global_location, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(pose.bones[0].global_rotation, Quat::IDENTITY);
    }

    #[test]
    fn test_child_transform_composes_through_parent() {
        // Root rotated 90 degrees about Z; child one unit along the parent's
        // local X, which lands on global Y.
        let root_rotation = Quat::from_rotation_z(FRAC_PI_2);
        let child_local = Quat::from_rotation_x(FRAC_PI_2);
        let bones = [
            Bone {
                name: named("root"),
                parent_index: 0,
                rotation: Quaternion::from_glam(root_rotation),
                location: Vector3::ZERO,
                ..Default::default()
            },
            Bone {
                name: named("child"),
                parent_index: 0,
                rotation: Quaternion::from_glam(child_local.conjugate()),
                location: Vector3::new(1.0, 0.0, 0.0),
                ..Default::default()
            },
        ];
        // Bone 1's parent_index of 0 is a real parent (only index 0 is root).
        let pose = ReferencePose::from_bones(&bones, NameEncoding::Windows1252).unwrap();
        let child = &pose.bones[1];
        assert_eq!(child.parent, Some(0));
        assert!(child.global_location.abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-6));
        let expected = root_rotation * child_local;
        assert!(child.global_rotation.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn test_forward_parent_reference_rejected() {
        let bones = [
            Bone {
                name: named("root"),
                parent_index: 0,
                ..Default::default()
            },
            Bone {
                name: named("child"),
                parent_index: 5,
                ..Default::default()
            },
        ];
        assert!(matches!(
            ReferencePose::from_bones(&bones, NameEncoding::Windows1252).unwrap_err(),
            PskError::Validation(_)
        ));
    }
}
