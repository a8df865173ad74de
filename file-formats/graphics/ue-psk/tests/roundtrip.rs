//! Round-trip and repair integration tests over complete documents.

use pretty_assertions::assert_eq;

use ue_data::{NameEncoding, Quaternion, RawName, Vector3};
use ue_psk::data::{Bone, Face, Material, Wedge, Weight};
use ue_psk::{Psk, repair_degenerate_geometry};

fn sample_psk() -> Psk {
    let name = |n: &str| RawName::new(n, NameEncoding::Windows1252).unwrap();

    Psk {
        points: vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(1.0, 1.0, 1.0),
        ],
        wedges: vec![
            Wedge {
                point_index: 0,
                u: 0.0,
                v: 0.0,
                material_index: 0,
            },
            Wedge {
                point_index: 1,
                u: 1.0,
                v: 0.0,
                material_index: 0,
            },
            Wedge {
                point_index: 2,
                u: 0.0,
                v: 1.0,
                material_index: 0,
            },
            Wedge {
                point_index: 3,
                u: 1.0,
                v: 1.0,
                material_index: 1,
            },
        ],
        faces: vec![
            Face {
                wedge_indices: [0, 1, 2],
                material_index: 0,
                aux_material_index: 0,
                smoothing_groups: 1,
            },
            Face {
                wedge_indices: [1, 3, 2],
                material_index: 1,
                aux_material_index: 0,
                smoothing_groups: 3,
            },
        ],
        materials: vec![
            Material {
                name: name("body"),
                texture_index: 0,
                ..Default::default()
            },
            Material {
                name: name("trim"),
                texture_index: 1,
                ..Default::default()
            },
        ],
        bones: vec![
            Bone {
                name: name("root"),
                parent_index: 0,
                rotation: Quaternion::IDENTITY,
                location: Vector3::ZERO,
                ..Default::default()
            },
            Bone {
                name: name("spine"),
                parent_index: 0,
                children_count: 0,
                rotation: Quaternion {
                    x: 0.0,
                    y: 0.0,
                    z: 0.383,
                    w: 0.924,
                },
                location: Vector3::new(0.0, 0.0, 0.5),
                ..Default::default()
            },
        ],
        weights: vec![
            Weight {
                weight: 1.0,
                point_index: 0,
                bone_index: 0,
            },
            Weight {
                weight: 0.5,
                point_index: 1,
                bone_index: 0,
            },
            Weight {
                weight: 0.5,
                point_index: 1,
                bone_index: 1,
            },
        ],
    }
}

#[test]
fn roundtrip_preserves_every_field() {
    let psk = sample_psk();
    let bytes = psk.to_bytes().unwrap();
    let decoded = Psk::from_bytes(&bytes).unwrap();
    assert_eq!(decoded, psk);
}

#[test]
fn roundtrip_after_repair() {
    let mut psk = sample_psk();
    // A collapsed triangle referencing point 0 twice.
    psk.wedges.push(Wedge {
        point_index: 0,
        ..Default::default()
    });
    psk.wedges.push(Wedge {
        point_index: 0,
        ..Default::default()
    });
    psk.wedges.push(Wedge {
        point_index: 2,
        ..Default::default()
    });
    psk.faces.push(Face {
        wedge_indices: [4, 5, 6],
        ..Default::default()
    });

    let report = repair_degenerate_geometry(&mut psk).unwrap();
    assert_eq!(report.degenerate_points_duplicated, 1);
    psk.validate().unwrap();

    let decoded = Psk::from_bytes(&psk.to_bytes().unwrap()).unwrap();
    assert_eq!(decoded, psk);
}

#[test]
fn decoded_documents_validate() {
    let psk = sample_psk();
    let decoded = Psk::from_bytes(&psk.to_bytes().unwrap()).unwrap();
    decoded.validate().unwrap();
}
