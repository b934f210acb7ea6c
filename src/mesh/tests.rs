use std::collections::HashMap;

use super::*;
use crate::extract::{extract_segment, pad_with_zeros};
use crate::volume::{GridInfo, SegmentId, SegmentationVolumeModel};

fn solid_cube(n: usize, lo: usize, hi: usize) -> Vec<f32> {
    let mut field = vec![0.0; n * n * n];
    for z in lo..hi {
        for y in lo..hi {
            for x in lo..hi {
                field[x + n * (y + n * z)] = 1.0;
            }
        }
    }
    field
}

/// Every directed edge appears once and its reverse appears once
fn is_closed_and_consistent(mesh: &IsoMesh) -> bool {
    let mut directed: HashMap<(u32, u32), usize> = HashMap::new();
    for &[a, b, c] in &mesh.indices {
        for edge in [(a, b), (b, c), (c, a)] {
            *directed.entry(edge).or_default() += 1;
        }
    }
    directed
        .iter()
        .all(|(&(a, b), &count)| count == 1 && directed.get(&(b, a)) == Some(&1))
}

fn assert_outward(mesh: &IsoMesh, centre: Vec3) {
    for &triangle in &mesh.indices {
        let [a, b, c] = triangle.map(|i| mesh.vertices[i as usize]);
        let centroid = (a + b + c) / 3.0;
        let normal = mesh.face_normal(triangle);
        assert!(
            normal.dot(centroid - centre) > 0.0,
            "triangle {triangle:?} faces inward"
        );
    }
}

#[test]
fn test_constant_fields_are_empty() {
    for value in [0.0, 1.0] {
        let mesh = marching_cubes(&vec![value; 27], [3, 3, 3], ISO_LEVEL).unwrap();
        assert!(mesh.is_empty());
        assert!(mesh.vertices.is_empty());
    }
}

#[test]
fn test_single_voxel_octahedron() {
    let mut field = vec![0.0; 27];
    field[13] = 1.0;
    let raw = marching_cubes(&field, [3, 3, 3], ISO_LEVEL).unwrap();

    assert_eq!(raw.triangle_count(), 8);
    assert_eq!(raw.vertices.len(), 6);
    assert!(is_closed_and_consistent(&raw));

    // Binary fields cross the level halfway between samples
    for v in &raw.vertices {
        assert_eq!(v.distance(Vec3::ONE), 0.5);
    }
}

#[test]
fn test_table_winding_faces_inward_for_occupancy() {
    let mut field = vec![0.0; 27];
    field[13] = 1.0;
    let mut mesh = marching_cubes(&field, [3, 3, 3], ISO_LEVEL).unwrap();
    mesh.flip_winding();
    assert_outward(&mesh, Vec3::ONE);
}

#[test]
fn test_solid_cube_normals_point_outward() {
    let field = solid_cube(7, 2, 5);
    let (values, dims) = (field, [7, 7, 7]);

    let mut mesh = marching_cubes(&values, dims, ISO_LEVEL).unwrap();
    mesh.flip_winding();
    mesh.compute_normals();

    let centre = Vec3::splat(3.0);
    assert_eq!(mesh.triangle_count(), 104);
    assert!(is_closed_and_consistent(&mesh));
    assert_outward(&mesh, centre);

    assert_eq!(mesh.normals.len(), mesh.vertices.len());
    for (v, n) in mesh.vertices.iter().zip(&mesh.normals) {
        assert!((n.length() - 1.0).abs() < 1e-5);
        assert!(n.dot(*v - centre) > 0.0);
    }
}

#[test]
fn test_mesher_on_smoothed_cube() {
    let grid = GridInfo::with_sample_count([5, 5, 5]);
    let mut labels = vec![0; 125];
    for z in 1..4 {
        for y in 1..4 {
            for x in 1..4 {
                labels[grid.index(x, y, z)] = 2;
            }
        }
    }
    let model = SegmentationVolumeModel::new(grid, labels).unwrap();
    let occupancy = extract_segment(&model, SegmentId::new(2).unwrap(), 1);

    let mesh = IsosurfaceMesher::new().mesh(&occupancy).unwrap();
    assert!(!mesh.is_empty());
    assert!(is_closed_and_consistent(&mesh));
    // Padded grid centre: samples 2..=4 hold the cube
    assert_outward(&mesh, Vec3::splat(3.0));
}

#[test]
fn test_single_voxel_scenario() {
    let grid = GridInfo::with_sample_count([4, 4, 4]);
    let mut labels = vec![0; 64];
    labels[grid.index(1, 2, 1)] = 7;
    let model = SegmentationVolumeModel::new(grid, labels).unwrap();
    let seven = SegmentId::new(7).unwrap();

    let mesh = IsosurfaceMesher::new()
        .mesh(&extract_segment(&model, seven, 0))
        .unwrap();
    assert_eq!(mesh.triangle_count(), 8);
    assert!(is_closed_and_consistent(&mesh));
    assert_outward(&mesh, Vec3::new(2.0, 3.0, 2.0));

    // One smoothing pass leaves the voxel at 0.25, below the level
    let smoothed = IsosurfaceMesher::new()
        .mesh(&extract_segment(&model, seven, 1))
        .unwrap();
    assert!(smoothed.is_empty());
}

#[test]
fn test_boundary_segment_closes_after_padding() {
    // A segment filling the whole grid touches every face
    let (field, dims) = pad_with_zeros(&[1.0; 8], [2, 2, 2], 1);
    let mesh = marching_cubes(&field, dims, ISO_LEVEL).unwrap();
    assert!(!mesh.is_empty());
    assert!(is_closed_and_consistent(&mesh));

    let unpadded = marching_cubes(&[1.0; 8], [2, 2, 2], ISO_LEVEL).unwrap();
    assert!(unpadded.is_empty());
}

#[test]
fn test_dimension_errors() {
    assert!(matches!(
        marching_cubes(&[0.0; 10], [3, 3, 3], ISO_LEVEL),
        Err(MeshError::DimensionMismatch {
            expected: 27,
            actual: 10
        })
    ));
    assert!(matches!(
        marching_cubes(&[0.0; 3], [3, 1, 1], ISO_LEVEL),
        Err(MeshError::TooSmall([3, 1, 1]))
    ));
}

#[test]
fn test_custom_level() {
    let mut field = vec![0.0; 27];
    field[13] = 0.3;
    assert!(IsosurfaceMesher::new().level() == ISO_LEVEL);
    assert!(marching_cubes(&field, [3, 3, 3], ISO_LEVEL).unwrap().is_empty());
    assert_eq!(
        marching_cubes(&field, [3, 3, 3], IsosurfaceMesher::with_level(0.1).level())
            .unwrap()
            .triangle_count(),
        8
    );
}
