use super::schema::*;
use super::*;
use crate::codec::{self, Category, Column, ColumnData, DataBlock};

fn time_channel() -> Category {
    Category::new(TIME_CHANNEL_INFO)
        .with_column(Column::new("time_id", ColumnData::Int32(vec![3])))
        .with_column(Column::new("channel_id", ColumnData::Strings(vec!["1".to_string()])))
}

fn segment_table(ids: &[i32]) -> Category {
    Category::new(SEGMENT_TABLE)
        .with_column(Column::new("set_id", ColumnData::Int32(vec![0; ids.len()])))
        .with_column(Column::new("segment_id", ColumnData::Int32(ids.to_vec())))
}

fn segmentation_block(grid: &GridInfo, stored: Vec<i32>, ids: &[i32]) -> DataBlock {
    DataBlock::new(SEGMENTATION_BLOCK)
        .with_category(grid.to_category())
        .with_category(time_channel())
        .with_category(segment_table(ids))
        .with_category(
            Category::new(SEGMENT_VALUES).with_column(Column::new("values", ColumnData::Int32(stored))),
        )
}

#[test]
fn test_identity_axis_order_is_x_fastest() {
    let grid = GridInfo::with_sample_count([3, 2, 2]);
    let block = segmentation_block(&grid, (0..12).collect(), &[]);
    let model = SegmentationVolumeModel::from_block(&block).unwrap();

    assert_eq!(model.dims(), [3, 2, 2]);
    for z in 0..2 {
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(model.label_at(x, y, z), Some((x + 3 * (y + 2 * z)) as i32));
            }
        }
    }
    assert_eq!(model.label_at(3, 0, 0), None);
}

#[test]
fn test_reversed_axis_order_transposes_to_canonical() {
    // Storage axis 0 runs along z, axis 2 along x
    let mut grid = GridInfo::with_sample_count([4, 3, 2]);
    grid.axis_order = [2, 1, 0];
    let block = segmentation_block(&grid, (0..24).collect(), &[]);

    let info = block.category(VOLUME_INFO).unwrap();
    assert_eq!(info.i32_scalar("sample_count[0]"), Some(2));
    assert_eq!(info.i32_scalar("sample_count[2]"), Some(4));

    let model = SegmentationVolumeModel::from_block(&block).unwrap();
    assert_eq!(model.dims(), [4, 3, 2]);
    for z in 0..2 {
        for y in 0..3 {
            for x in 0..4 {
                let stored_index = z + 2 * (y + 3 * x);
                assert_eq!(model.label_at(x, y, z), Some(stored_index as i32), "at ({x}, {y}, {z})");
            }
        }
    }

    // Writing restores the stored layout
    let written = model.to_block();
    let values = written.category(SEGMENT_VALUES).unwrap().column("values").unwrap();
    assert_eq!(values.data, ColumnData::Int32((0..24).collect()));
}

#[test]
fn test_rotated_axis_order_round_trip() {
    let mut grid = GridInfo::with_sample_count([2, 3, 4]);
    grid.axis_order = [1, 2, 0];
    grid.origin = [1.0, 2.0, 3.0];
    grid.dimensions = [4.0, 9.0, 16.0];

    let labels: Vec<i32> = (0..24).map(|i| i % 5).collect();
    let model = SegmentationVolumeModel::new(grid.clone(), labels.clone()).unwrap();

    let bytes = codec::encode(&[model.to_block()]).unwrap();
    let decoded = SegmentationVolumeModel::from_bytes(&bytes).unwrap();

    assert_eq!(decoded.labels(), &labels[..]);
    assert_eq!(decoded.grid().origin, [1.0, 2.0, 3.0]);
    assert_eq!(decoded.grid().dimensions, [4.0, 9.0, 16.0]);
    assert_eq!(decoded.grid().axis_order, [1, 2, 0]);
    assert_eq!(decoded.grid().voxel_size(), [2.0, 3.0, 4.0]);
}

#[test]
fn test_reorder_helpers_are_inverse() {
    let counts = [3, 4, 5];
    let values: Vec<u32> = (0..60).collect();
    for order in [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]] {
        let stored = reorder_to_storage(&values, counts, order);
        let back = reorder_to_canonical(&stored, to_storage(counts, order), order);
        assert_eq!(back, values, "order {order:?}");
    }
}

#[test]
fn test_missing_category() {
    let grid = GridInfo::with_sample_count([2, 2, 2]);
    let block = DataBlock::new(SEGMENTATION_BLOCK)
        .with_category(grid.to_category())
        .with_category(time_channel())
        .with_category(
            Category::new(SEGMENT_VALUES).with_column(Column::new("values", ColumnData::Int32(vec![0; 8]))),
        );

    match SegmentationVolumeModel::from_block(&block) {
        Err(VolumeError::MissingCategory { block, category }) => {
            assert_eq!(block, SEGMENTATION_BLOCK);
            assert_eq!(category, SEGMENT_TABLE);
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_missing_block() {
    let bytes = codec::encode(&[DataBlock::new("OTHER")]).unwrap();
    assert!(matches!(
        SegmentationVolumeModel::from_bytes(&bytes),
        Err(VolumeError::MissingBlock(_))
    ));
}

#[test]
fn test_column_type_mismatch() {
    let grid = GridInfo::with_sample_count([1, 1, 1]);
    let block = DataBlock::new(SEGMENTATION_BLOCK)
        .with_category(grid.to_category())
        .with_category(time_channel())
        .with_category(segment_table(&[]))
        .with_category(
            Category::new(SEGMENT_VALUES).with_column(Column::new("values", ColumnData::Float32(vec![1.0]))),
        );
    assert!(matches!(
        SegmentationVolumeModel::from_block(&block),
        Err(VolumeError::ColumnType { .. })
    ));
}

#[test]
fn test_shape_mismatch() {
    let grid = GridInfo::with_sample_count([2, 2, 2]);
    let block = segmentation_block(&grid, vec![0; 7], &[]);
    assert!(matches!(
        SegmentationVolumeModel::from_block(&block),
        Err(VolumeError::ShapeMismatch {
            expected: 8,
            actual: 7
        })
    ));
}

#[test]
fn test_invalid_axis_order() {
    assert!(matches!(
        validate_axis_order([0, 0, 1]),
        Err(VolumeError::InvalidAxisOrder([0, 0, 1]))
    ));
    assert!(validate_axis_order([0, 1, 3]).is_err());
    assert!(validate_axis_order([-1, 1, 2]).is_err());
    assert_eq!(validate_axis_order([2, 0, 1]).unwrap(), [2, 0, 1]);
}

#[test]
fn test_distinct_labels_prefers_segment_table() {
    let grid = GridInfo::with_sample_count([2, 2, 1]);
    let block = segmentation_block(&grid, vec![0, 4, 4, 9], &[0, 4, 9, 12]);
    let model = SegmentationVolumeModel::from_block(&block).unwrap();

    let ids: Vec<i32> = model.distinct_labels().into_iter().map(SegmentId::get).collect();
    assert_eq!(ids, vec![4, 9, 12]);
}

#[test]
fn test_distinct_labels_scans_without_table() {
    let grid = GridInfo::with_sample_count([2, 2, 1]);
    let model = SegmentationVolumeModel::new(grid, vec![0, 5, 0, 2]).unwrap();

    let ids: Vec<i32> = model.distinct_labels().into_iter().map(i32::from).collect();
    assert_eq!(ids, vec![2, 5]);
    assert_eq!(model.segment_voxel_count(SegmentId::new(5).unwrap()), 1);
    assert_eq!(model.segment_voxel_count(SegmentId::new(3).unwrap()), 0);
}

#[test]
fn test_single_voxel_scenario_labels() {
    let grid = GridInfo::with_sample_count([4, 4, 4]);
    let mut labels = vec![0; 64];
    labels[grid.index(1, 2, 1)] = 7;
    let model = SegmentationVolumeModel::new(grid, labels).unwrap();

    let ids: Vec<i32> = model.distinct_labels().into_iter().map(SegmentId::get).collect();
    assert_eq!(ids, vec![7]);
}

#[test]
fn test_time_and_channel_are_read() {
    let grid = GridInfo::with_sample_count([1, 1, 1]);
    let model = SegmentationVolumeModel::from_block(&segmentation_block(&grid, vec![1], &[1])).unwrap();
    assert_eq!(model.timeframe(), 3);
    assert_eq!(model.channel_id(), "1");
}

#[test]
fn test_clones_share_labels() {
    let model = SegmentationVolumeModel::new(GridInfo::with_sample_count([2, 1, 1]), vec![1, 2]).unwrap();
    let copy = model.clone();
    assert!(std::ptr::eq(model.labels().as_ptr(), copy.labels().as_ptr()));
}

#[test]
fn test_segment_id_rejects_background() {
    assert!(SegmentId::new(0).is_none());
    assert_eq!(SegmentId::new(-3).map(SegmentId::get), Some(-3));
    assert_eq!(SegmentId::new(42).unwrap().to_string(), "42");
}

#[test]
fn test_sampling_stats_population_sigma() {
    let stats = SamplingStats::from_values([1.0, 2.0, 3.0, 4.0]);
    assert_eq!(stats.min, 1.0);
    assert_eq!(stats.max, 4.0);
    assert!((stats.mean - 2.5).abs() < 1e-12);
    assert!((stats.sigma - 1.25f64.sqrt()).abs() < 1e-12);

    assert_eq!(SamplingStats::from_values(std::iter::empty()), SamplingStats::default());
}

#[test]
fn test_padded_grid_keeps_voxel_size() {
    let mut grid = GridInfo::with_sample_count([4, 4, 2]);
    grid.dimensions = [2.0, 2.0, 2.0];
    grid.cell_size = [2.0, 2.0, 2.0];
    grid.origin = [10.0, 0.0, -1.0];

    let padded = grid.padded(1);
    assert_eq!(padded.sample_count, [6, 6, 4]);
    assert_eq!(padded.voxel_size(), grid.voxel_size());
    assert_eq!(padded.origin, [9.5, -0.5, -2.0]);
    assert_eq!(padded.dimensions, [3.0, 3.0, 4.0]);
    assert_eq!(padded.cell_size, [3.0, 3.0, 4.0]);
}

#[test]
fn test_schema_matches_written_info() {
    let grid = GridInfo::with_sample_count([2, 2, 2]);
    assert!(VOLUME_INFO_SCHEMA.validate(&grid.to_category()).is_ok());
    assert_eq!(grid.to_category().columns.len(), VOLUME_INFO_SCHEMA.fields.len());
}
