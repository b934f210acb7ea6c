//! End-to-end tests: column block files through meshing to output archives

use std::fs::File;
use std::io::{Read, Write};

use glam::{DVec3, Vec3};
use segmesh::annotation::{AnnotationResolver, AnnotationTable};
use segmesh::assembler::MeshAssembler;
use segmesh::codec;
use segmesh::convert::{ArchiveConverter, ConvertError};
use segmesh::extract::extract_segment;
use segmesh::mesh::IsosurfaceMesher;
use segmesh::transform::compute_transform;
use segmesh::volume::{GridInfo, SegmentId, SegmentationVolumeModel};
use tempfile::tempdir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

fn single_voxel_model() -> SegmentationVolumeModel {
    let grid = GridInfo::with_sample_count([4, 4, 4]);
    let mut labels = vec![0; 64];
    labels[grid.index(1, 2, 1)] = 7;
    SegmentationVolumeModel::new(grid, labels).unwrap()
}

#[test]
fn test_single_voxel_scenario() {
    let bytes = codec::encode(&[single_voxel_model().to_block()]).unwrap();
    let model = SegmentationVolumeModel::from_bytes(&bytes).unwrap();

    let segments: Vec<i32> = model.distinct_labels().iter().map(|s| s.get()).collect();
    assert_eq!(segments, vec![7]);

    let occupancy = extract_segment(&model, SegmentId::new(7).unwrap(), 0);
    assert_eq!(occupancy.dims(), [6, 6, 6]);
    let ones: Vec<usize> = occupancy
        .values()
        .iter()
        .enumerate()
        .filter(|(_, &v)| v == 1.0)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(ones, vec![2 + 6 * (3 + 6 * 2)]);
    assert_eq!(occupancy.values().iter().filter(|&&v| v == 0.0).count(), 215);

    let mesh = IsosurfaceMesher::new().mesh(&occupancy).unwrap();
    assert!(!mesh.is_empty());
    let centre = Vec3::new(2.0, 3.0, 2.0);
    for &triangle in &mesh.indices {
        let [a, b, c] = triangle.map(|i| mesh.vertices[i as usize]);
        let normal = mesh.face_normal(triangle);
        assert!(normal.dot((a + b + c) / 3.0 - centre) > 0.0);
    }
}

#[test]
fn test_unannotated_segment_resolution() {
    let table = AnnotationTable::new();
    let resolved = AnnotationResolver::new(&table).resolve("0", SegmentId::new(42).unwrap());
    assert_eq!(resolved.color.to_hex(), "#FFFFFF");
    assert_eq!(resolved.opacity, 1.0);
    assert_eq!(resolved.tooltip, "0 | Segment 42");
}

#[test]
fn test_rotated_storage_meshes_like_canonical() {
    let mut grid = GridInfo::with_sample_count([5, 4, 3]);
    grid.dimensions = [10.0, 8.0, 6.0];
    let mut labels = vec![0; 60];
    for (x, y, z) in [(1, 1, 1), (2, 1, 1), (3, 2, 1)] {
        labels[grid.index(x, y, z)] = 2;
    }

    let canonical = SegmentationVolumeModel::new(grid.clone(), labels.clone()).unwrap();
    grid.axis_order = [2, 0, 1];
    let rotated = SegmentationVolumeModel::new(grid, labels).unwrap();
    let decoded = SegmentationVolumeModel::from_bytes(&codec::encode(&[rotated.to_block()]).unwrap()).unwrap();

    assert_eq!(decoded.labels(), canonical.labels());
    assert_eq!(decoded.dims(), [5, 4, 3]);

    let table = AnnotationTable::new();
    let a = MeshAssembler::new().assemble(&canonical, "0", &table);
    let b = MeshAssembler::new().assemble(&decoded, "0", &table);
    assert_eq!(a.primitives[0].vertices, b.primitives[0].vertices);
    assert_eq!(a.primitives[0].indices, b.primitives[0].indices);
}

#[test]
fn test_transform_fixed_point() {
    let origin = DVec3::new(3.0, -4.0, 5.5);
    let m = compute_transform(origin, DVec3::new(1.5, 2.5, 3.5), 0.5);
    let fixed = origin + DVec3::splat(0.5);
    assert!(m.transform_point3(fixed).abs_diff_eq(fixed, 1e-12));
}

fn write_archive(path: &std::path::Path, segmentation: &[u8]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    let options = SimpleFileOptions::default();
    let entries: [(&str, &[u8]); 4] = [
        (
            "index.json",
            br#"{"volumes": {},
                 "latticeSegmentations": {"lattice.bcif": {"segmentationId": "0", "timeframeIndex": 0}},
                 "annotations": "annotations.json", "metadata": "metadata.json"}"#,
        ),
        (
            "annotations.json",
            br#"{"descriptions": {"x": {"target_kind": "lattice",
                 "target_id": {"segmentation_id": "0", "segment_id": 7}, "name": "Blob"}}}"#,
        ),
        ("metadata.json", b"{}"),
        ("lattice.bcif", segmentation),
    ];
    for (name, bytes) in entries {
        zip.start_file(name, options).unwrap();
        zip.write_all(bytes).unwrap();
    }
    zip.finish().unwrap();
}

#[test]
fn test_convert_archive_on_disk() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("entry.cvsx");
    let output = dir.path().join("out").join("entry-meshes.zip");

    let mut grid = GridInfo::with_sample_count([6, 6, 6]);
    grid.origin = [100.0, 0.0, 0.0];
    let mut labels = vec![0; 216];
    for z in 2..4 {
        for y in 2..4 {
            for x in 2..4 {
                labels[grid.index(x, y, z)] = 7;
            }
        }
    }
    let model = SegmentationVolumeModel::new(grid, labels).unwrap();
    write_archive(&input, &codec::encode(&[model.to_block()]).unwrap());

    let outcome = ArchiveConverter::new().convert(&input, &output).unwrap();
    assert_eq!(outcome.stats.segments_meshed, 1);
    assert_eq!(outcome.stats.output_bytes, std::fs::metadata(&output).unwrap().len());

    let mut zip = ZipArchive::new(File::open(&output).unwrap()).unwrap();
    let mut json = String::new();
    zip.by_name("scene.json").unwrap().read_to_string(&mut json).unwrap();
    let scene: serde_json::Value = serde_json::from_str(&json).unwrap();

    let mesh = &scene["meshes"][0];
    assert_eq!(mesh["tooltip"], "0 | Segment 7\n\nBlob");
    assert_eq!(mesh["color"], "#FFFFFF");
    // Unit voxels make the instance transform the identity
    assert_eq!(mesh["transform"][0], 1.0);
    assert_eq!(mesh["transform"][12], 0.0);
    let vertices = mesh["vertices"].as_array().unwrap();
    assert_eq!(vertices.len() % 3, 0);
    assert_eq!(
        mesh["indices"].as_array().unwrap().len(),
        mesh["triangle_groups"].as_array().unwrap().len() * 3
    );
}

#[test]
fn test_missing_input_is_an_error() {
    let dir = tempdir().unwrap();
    let err = ArchiveConverter::new()
        .convert(dir.path().join("absent.cvsx"), dir.path().join("out.zip"))
        .unwrap_err();
    assert!(matches!(err, ConvertError::Archive(_)));
}
