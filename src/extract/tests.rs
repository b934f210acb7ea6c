use super::*;
use crate::codec;
use crate::volume::{GridInfo, SegmentationVolumeModel};

fn single_voxel_model() -> SegmentationVolumeModel {
    let grid = GridInfo::with_sample_count([4, 4, 4]);
    let mut labels = vec![0; 64];
    labels[grid.index(1, 2, 1)] = 7;
    SegmentationVolumeModel::new(grid, labels).unwrap()
}

fn seven() -> SegmentId {
    SegmentId::new(7).unwrap()
}

#[test]
fn test_single_voxel_unsmoothed() {
    let occupancy = extract_segment(&single_voxel_model(), seven(), 0);

    assert_eq!(occupancy.dims(), [6, 6, 6]);
    assert_eq!(occupancy.value_at(2, 3, 2), Some(1.0));
    assert_eq!(occupancy.values().iter().filter(|&&v| v == 1.0).count(), 1);
    assert_eq!(occupancy.values().iter().sum::<f32>(), 1.0);

    for z in 0..6 {
        for y in 0..6 {
            for x in 0..6 {
                let on_border = [x, y, z].iter().any(|&c| c == 0 || c == 5);
                if on_border {
                    assert_eq!(occupancy.value_at(x, y, z), Some(0.0));
                }
            }
        }
    }
}

#[test]
fn test_zero_iterations_is_padded_mask() {
    let grid = GridInfo::with_sample_count([3, 2, 2]);
    let labels = vec![1, 2, 1, 0, 1, 1, 2, 2, 0, 1, 0, 1];
    let model = SegmentationVolumeModel::new(grid, labels.clone()).unwrap();

    let occupancy = extract_segment(&model, SegmentId::new(1).unwrap(), 0);
    assert_eq!(occupancy.dims(), [5, 4, 4]);

    for z in 0..2 {
        for y in 0..2 {
            for x in 0..3 {
                let expected = if labels[x + 3 * (y + 2 * z)] == 1 { 1.0 } else { 0.0 };
                assert_eq!(occupancy.value_at(x + 1, y + 1, z + 1), Some(expected));
            }
        }
    }
    let total: f32 = occupancy.values().iter().sum();
    assert_eq!(total, labels.iter().filter(|&&l| l == 1).count() as f32);
}

#[test]
fn test_smoothing_kernel_weights() {
    let occupancy = extract_segment(&single_voxel_model(), seven(), 1);

    assert_eq!(occupancy.value_at(2, 3, 2), Some(0.25));
    assert_eq!(occupancy.value_at(1, 3, 2), Some(0.125));
    assert_eq!(occupancy.value_at(2, 4, 2), Some(0.125));
    assert_eq!(occupancy.value_at(2, 3, 3), Some(0.125));
    // Diagonal neighbours are untouched after one pass
    assert_eq!(occupancy.value_at(1, 2, 2), Some(0.0));
}

#[test]
fn test_smoothing_conserves_mass_with_edge_replication() {
    let (mut values, dims) = pad_with_zeros(&[1.0; 8], [2, 2, 2], 1);
    smooth(&mut values, dims, 5);

    let total: f32 = values.iter().sum();
    assert!((total - 8.0).abs() < 1e-4, "total {total}");
    assert!(values.iter().all(|&v| (0.0..=1.0).contains(&v)));
}

#[test]
fn test_smoothing_replicates_edges_not_zeros() {
    // A constant field is a fixed point only with edge-replicated borders
    let mut values = vec![1.0f32; 27];
    smooth(&mut values, [3, 3, 3], 3);
    assert!(values.iter().all(|&v| v == 1.0));
}

#[test]
fn test_dims_grow_for_every_label() {
    let grid = GridInfo::with_sample_count([5, 3, 4]);
    let labels: Vec<i32> = (0..60).map(|i| i % 4).collect();
    let model = SegmentationVolumeModel::new(grid, labels).unwrap();

    for segment in model.distinct_labels() {
        let occupancy = extract_segment(&model, segment, 1);
        assert_eq!(occupancy.dims(), [7, 5, 6]);
        assert_eq!(occupancy.values().len(), 7 * 5 * 6);
    }
}

#[test]
fn test_origin_moves_out_by_one_voxel() {
    let mut grid = GridInfo::with_sample_count([4, 4, 4]);
    grid.origin = [10.0, 20.0, 30.0];
    grid.dimensions = [8.0, 4.0, 2.0];
    let mut labels = vec![0; 64];
    labels[0] = 3;
    let model = SegmentationVolumeModel::new(grid, labels).unwrap();

    let occupancy = extract_segment(&model, SegmentId::new(3).unwrap(), 0);
    let padded = occupancy.grid();

    assert_eq!(padded.origin, [8.0, 19.0, 29.5]);
    assert_eq!(padded.dimensions, [12.0, 6.0, 3.0]);
    assert_eq!(padded.voxel_size(), [2.0, 1.0, 0.5]);
    assert_eq!(padded.sample_count, [6, 6, 6]);
}

#[test]
fn test_stats_describe_occupancy() {
    let occupancy = extract_segment(&single_voxel_model(), seven(), 0);
    let stats = occupancy.stats();

    assert_eq!(stats.min, 0.0);
    assert_eq!(stats.max, 1.0);
    assert!((stats.mean - 1.0 / 216.0).abs() < 1e-12);
}

#[test]
fn test_source_model_is_untouched() {
    let model = single_voxel_model();
    let before = model.labels().to_vec();
    let _ = extract_segment(&model, seven(), 2);
    assert_eq!(model.labels(), &before[..]);
    assert_eq!(model.dims(), [4, 4, 4]);
}

#[test]
fn test_occupancy_block_round_trip() {
    let occupancy = extract_segment(&single_voxel_model(), seven(), 1);
    let bytes = codec::encode(&[occupancy.to_block()]).unwrap();
    let blocks = codec::decode(&bytes).unwrap();

    let values = blocks[0]
        .category("volume_data_3d")
        .and_then(|c| c.column("values"))
        .unwrap();
    assert_eq!(values.data, codec::ColumnData::Float32(occupancy.values().to_vec()));

    let grid = GridInfo::from_category(blocks[0].category("volume_data_3d_info").unwrap()).unwrap();
    assert_eq!(grid.sample_count, [6, 6, 6]);
}
