//! Repair of degenerate and duplicate triangles.
//!
//! PSK exports from asset rippers routinely contain triangles whose wedges
//! reference the same point twice (a collapsed edge, e.g. `[A, A, B]`) and
//! faces that are set-equal after winding normalization (`[A, B, C]` and
//! `[B, C, A]`). General-purpose mesh representations reject both, so the
//! document has to be repaired before a scene builder consumes it: every
//! offending point is duplicated at a fresh index, with its skinning weights
//! cloned so the copy deforms identically.

use std::collections::HashSet;

use crate::data::Psk;
use crate::error::Result;

/// Counts of what a repair pass changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairReport {
    /// Points duplicated to break collapsed edges within a triangle
    pub degenerate_points_duplicated: usize,
    /// Points duplicated to make a face's winding-independent signature unique
    pub duplicate_faces_resolved: usize,
}

impl RepairReport {
    /// Whether the pass changed the document at all
    pub fn is_clean(&self) -> bool {
        self.degenerate_points_duplicated == 0 && self.duplicate_faces_resolved == 0
    }
}

/// Pack three point indices into a winding-independent face signature.
///
/// The indices must already be rotated so the smallest is first. Each index
/// is masked to 21 bits, which caps the scheme at 2^21 (~2M) distinct points;
/// meshes beyond that would alias.
fn face_signature(indices: [u32; 3]) -> u64 {
    (indices[0] as u64 & 0x1F_FFFF)
        | ((indices[1] as u64 & 0x1F_FFFF) << 21)
        | ((indices[2] as u64 & 0x1F_FFFF) << 42)
}

/// Duplicate a point at a fresh index, cloning every weight entry that
/// references it so the copy inherits identical skinning.
fn copy_point(psk: &mut Psk, point_index: u32) -> u32 {
    let new_index = psk.points.len() as u32;
    let point = psk.points[point_index as usize];
    psk.points.push(point);

    let cloned: Vec<_> = psk
        .weights
        .iter()
        .filter(|w| w.point_index == point_index as i32)
        .map(|w| crate::data::Weight {
            point_index: new_index as i32,
            ..*w
        })
        .collect();
    psk.weights.extend(cloned);

    new_index
}

/// Resolve degenerate triangles and duplicate faces in place.
///
/// Within a triangle the first occurrence of a repeated point survives and
/// later occurrences are replaced by copies. A face whose signature collides
/// with an earlier face gets its pivot wedge's point duplicated, after which
/// the signature is recomputed and recorded. The pass is idempotent: running
/// it on an already-repaired document duplicates nothing.
///
/// Fails only if the document's index invariants do not hold.
pub fn repair_degenerate_geometry(psk: &mut Psk) -> Result<RepairReport> {
    psk.validate()?;

    let mut report = RepairReport::default();
    let mut face_signatures: HashSet<u64> = HashSet::with_capacity(psk.faces.len());

    for face_index in 0..psk.faces.len() {
        let wedge_indices = psk.faces[face_index].wedge_indices;
        let mut point_indices = [
            psk.wedges[wedge_indices[0] as usize].point_index,
            psk.wedges[wedge_indices[1] as usize].point_index,
            psk.wedges[wedge_indices[2] as usize].point_index,
        ];

        // Collapsed edges: keep the first occurrence, duplicate the rest.
        let replace = [
            false,
            point_indices[1] == point_indices[0],
            point_indices[2] == point_indices[0] || point_indices[2] == point_indices[1],
        ];
        for corner in 0..3 {
            if replace[corner] {
                let new_index = copy_point(psk, point_indices[corner]);
                psk.wedges[wedge_indices[corner] as usize].point_index = new_index;
                point_indices[corner] = new_index;
                report.degenerate_points_duplicated += 1;
            }
        }

        // Rotate so the smallest point index leads, making the signature
        // independent of winding start.
        let pivot = point_indices
            .iter()
            .enumerate()
            .min_by_key(|&(_, &index)| index)
            .map(|(corner, _)| corner)
            .unwrap_or(0);
        let mut rotated = [
            point_indices[pivot],
            point_indices[(pivot + 1) % 3],
            point_indices[(pivot + 2) % 3],
        ];

        let mut signature = face_signature(rotated);
        if face_signatures.contains(&signature) {
            let pivot_wedge = wedge_indices[pivot] as usize;
            let new_index = copy_point(psk, psk.wedges[pivot_wedge].point_index);
            psk.wedges[pivot_wedge].point_index = new_index;
            rotated[0] = new_index;
            signature = face_signature(rotated);
            report.duplicate_faces_resolved += 1;
        }
        face_signatures.insert(signature);
    }

    if !report.is_clean() {
        log::debug!(
            "geometry repair duplicated {} points for collapsed edges, {} for duplicate faces",
            report.degenerate_points_duplicated,
            report.duplicate_faces_resolved
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Face, Weight, Wedge};
    use ue_data::Vector3;

    fn psk_with_faces(point_count: usize, triangles: &[[u32; 3]]) -> Psk {
        let mut psk = Psk {
            points: (0..point_count)
                .map(|i| Vector3::new(i as f32, 0.0, 0.0))
                .collect(),
            bones: vec![crate::data::Bone::default()],
            ..Default::default()
        };
        for triangle in triangles {
            let base = psk.wedges.len() as u16;
            for &point_index in triangle {
                psk.wedges.push(Wedge {
                    point_index,
                    ..Default::default()
                });
            }
            psk.faces.push(Face {
                wedge_indices: [base, base + 1, base + 2],
                ..Default::default()
            });
        }
        psk
    }

    fn face_point_indices(psk: &Psk, face_index: usize) -> [u32; 3] {
        let face = &psk.faces[face_index];
        [
            psk.wedges[face.wedge_indices[0] as usize].point_index,
            psk.wedges[face.wedge_indices[1] as usize].point_index,
            psk.wedges[face.wedge_indices[2] as usize].point_index,
        ]
    }

    #[test]
    fn test_collapsed_edge_gets_distinct_points() {
        let mut psk = psk_with_faces(2, &[[0, 0, 1]]);
        psk.weights.push(Weight {
            weight: 0.75,
            point_index: 0,
            bone_index: 0,
        });

        let report = repair_degenerate_geometry(&mut psk).unwrap();
        assert_eq!(report.degenerate_points_duplicated, 1);

        let indices = face_point_indices(&psk, 0);
        assert_eq!(indices, [0, 2, 1]);
        assert_eq!(psk.points.len(), 3);
        // The copy of point 0 sits at the same position...
        assert_eq!(psk.points[2], psk.points[0]);
        // ...and inherited point 0's weight entries.
        let inherited: Vec<_> = psk
            .weights
            .iter()
            .filter(|w| w.point_index == 2)
            .collect();
        assert_eq!(inherited.len(), 1);
        assert_eq!(inherited[0].weight, 0.75);
        assert_eq!(inherited[0].bone_index, 0);
    }

    #[test]
    fn test_fully_collapsed_triangle() {
        let mut psk = psk_with_faces(1, &[[0, 0, 0]]);
        let report = repair_degenerate_geometry(&mut psk).unwrap();
        assert_eq!(report.degenerate_points_duplicated, 2);

        let indices = face_point_indices(&psk, 0);
        assert_eq!(indices[0], 0);
        assert_ne!(indices[1], indices[0]);
        assert_ne!(indices[2], indices[0]);
        assert_ne!(indices[2], indices[1]);
    }

    #[test]
    fn test_duplicate_face_resolved_by_pivot_duplication() {
        // Same triangle twice, second with rotated winding.
        let mut psk = psk_with_faces(3, &[[0, 1, 2], [1, 2, 0]]);
        let report = repair_degenerate_geometry(&mut psk).unwrap();
        assert_eq!(report.duplicate_faces_resolved, 1);

        let first = face_point_indices(&psk, 0);
        let second = face_point_indices(&psk, 1);
        assert_eq!(first, [0, 1, 2]);
        // The second face's pivot (its reference to point 0) was replaced by
        // a fresh copy of point 0.
        assert_eq!(second, [1, 2, 3]);
        assert_eq!(psk.points[3], psk.points[0]);
    }

    #[test]
    fn test_reversed_winding_is_not_a_duplicate() {
        // [0,1,2] vs [0,2,1] share a vertex set but differ after rotation
        // normalization (signature is rotation-invariant, not
        // reflection-invariant), matching the reference behavior.
        let mut psk = psk_with_faces(3, &[[0, 1, 2], [0, 2, 1]]);
        let report = repair_degenerate_geometry(&mut psk).unwrap();
        assert_eq!(report.duplicate_faces_resolved, 0);
    }

    #[test]
    fn test_repair_is_idempotent() {
        let mut psk = psk_with_faces(3, &[[0, 0, 1], [0, 1, 2], [1, 2, 0]]);
        repair_degenerate_geometry(&mut psk).unwrap();
        let repaired = psk.clone();

        let report = repair_degenerate_geometry(&mut psk).unwrap();
        assert!(report.is_clean());
        assert_eq!(psk, repaired);
    }

    #[test]
    fn test_repair_totality() {
        let mut psk = psk_with_faces(3, &[[0, 0, 0], [0, 1, 2], [0, 1, 2], [2, 0, 1]]);
        repair_degenerate_geometry(&mut psk).unwrap();

        let mut signatures = HashSet::new();
        for face_index in 0..psk.faces.len() {
            let indices = face_point_indices(&psk, face_index);
            assert_ne!(indices[0], indices[1]);
            assert_ne!(indices[1], indices[2]);
            assert_ne!(indices[0], indices[2]);

            let pivot = (0..3)
                .min_by_key(|&corner| indices[corner])
                .unwrap_or(0);
            let rotated = [
                indices[pivot],
                indices[(pivot + 1) % 3],
                indices[(pivot + 2) % 3],
            ];
            assert!(signatures.insert(face_signature(rotated)));
        }
    }
}
