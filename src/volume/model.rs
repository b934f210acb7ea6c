use std::collections::BTreeSet;
use std::sync::Arc;

use log::debug;

use crate::codec::{self, Category, Column, ColumnData, DataBlock, EncodingStrategy};

use super::error::VolumeError;
use super::grid::{reorder_to_canonical, reorder_to_storage, to_storage, GridInfo, SamplingStats};
use super::schema::{
    SEGMENTATION_BLOCK, SEGMENTATION_CATEGORIES, SEGMENT_TABLE, SEGMENT_VALUES, TIME_CHANNEL_INFO,
};
use super::SegmentId;

/// One row of the segment table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentTableRow {
    /// Segment set the id belongs to
    pub set_id: i32,
    /// Segment label value
    pub segment_id: i32,
}

/// Decoded lattice segmentation: per-voxel labels on a regular grid
///
/// Labels are held in canonical x-fastest order. The model is an immutable
/// snapshot; clones share the label buffer.
#[derive(Debug, Clone)]
pub struct SegmentationVolumeModel {
    grid: Arc<GridInfo>,
    labels: Arc<[i32]>,
    segment_table: Arc<[SegmentTableRow]>,
    timeframe: i32,
    channel_id: String,
}

impl SegmentationVolumeModel {
    /// Build a model from canonical-order labels
    ///
    /// Sampled statistics on the grid are recomputed from `labels`.
    pub fn new(mut grid: GridInfo, labels: Vec<i32>) -> Result<Self, VolumeError> {
        grid.validate()?;
        if labels.len() != grid.voxel_count() {
            return Err(VolumeError::ShapeMismatch {
                expected: grid.voxel_count(),
                actual: labels.len(),
            });
        }
        grid.sampled_stats = SamplingStats::from_values(labels.iter().map(|&l| l as f64));

        Ok(Self {
            grid: Arc::new(grid),
            labels: labels.into(),
            segment_table: Vec::new().into(),
            timeframe: 0,
            channel_id: "0".to_string(),
        })
    }

    /// Attach a segment table
    pub fn with_segment_table(mut self, rows: Vec<SegmentTableRow>) -> Self {
        self.segment_table = rows.into();
        self
    }

    /// Set the timeframe and channel
    pub fn with_time_channel(mut self, timeframe: i32, channel_id: impl Into<String>) -> Self {
        self.timeframe = timeframe;
        self.channel_id = channel_id.into();
        self
    }

    /// Decode a column block file and build the model from its
    /// `SEGMENTATION_DATA` block
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, VolumeError> {
        let blocks = codec::decode(bytes)?;
        let block = codec::find_block(&blocks, SEGMENTATION_BLOCK)
            .ok_or_else(|| VolumeError::MissingBlock(SEGMENTATION_BLOCK.to_string()))?;
        Self::from_block(block)
    }

    /// Build the model from a decoded segmentation block
    pub fn from_block(block: &DataBlock) -> Result<Self, VolumeError> {
        let mut categories = Vec::with_capacity(SEGMENTATION_CATEGORIES.len());
        for schema in &SEGMENTATION_CATEGORIES {
            let category = block
                .category(schema.name)
                .ok_or_else(|| VolumeError::MissingCategory {
                    block: block.header.clone(),
                    category: schema.name.to_string(),
                })?;
            schema.validate(category)?;
            categories.push(category);
        }
        let [info, time_channel, table, values] = [categories[0], categories[1], categories[2], categories[3]];

        let grid = GridInfo::from_category(info)?;
        let timeframe = time_channel
            .i32_scalar("time_id")
            .ok_or_else(|| missing(TIME_CHANNEL_INFO, "time_id"))?;
        let channel_id = time_channel
            .str_scalar("channel_id")
            .ok_or_else(|| missing(TIME_CHANNEL_INFO, "channel_id"))?
            .to_string();

        let set_ids = int_column(table, SEGMENT_TABLE, "set_id")?;
        let segment_ids = int_column(table, SEGMENT_TABLE, "segment_id")?;
        let segment_table: Vec<SegmentTableRow> = set_ids
            .iter()
            .zip(segment_ids)
            .map(|(&set_id, &segment_id)| SegmentTableRow { set_id, segment_id })
            .collect();

        let stored = int_column(values, SEGMENT_VALUES, "values")?;
        if stored.len() != grid.voxel_count() {
            return Err(VolumeError::ShapeMismatch {
                expected: grid.voxel_count(),
                actual: stored.len(),
            });
        }
        let stored_counts = to_storage(grid.sample_count, grid.axis_order);
        let labels = reorder_to_canonical(stored, stored_counts, grid.axis_order);

        debug!(
            "Segmentation '{}': {:?} samples, axis order {:?}, {} table rows",
            grid.name,
            grid.sample_count,
            grid.axis_order,
            segment_table.len()
        );

        // Sampled statistics come from the file, not from the label scan
        let file_stats = grid.sampled_stats;
        let mut model = Self::new(grid, labels)?
            .with_segment_table(segment_table)
            .with_time_channel(timeframe, channel_id);
        Arc::make_mut(&mut model.grid).sampled_stats = file_stats;
        Ok(model)
    }

    /// Encode back into a `SEGMENTATION_DATA` block in the grid's storage order
    pub fn to_block(&self) -> DataBlock {
        let stored = reorder_to_storage(&self.labels, self.grid.sample_count, self.grid.axis_order);

        let time_channel = Category::new(TIME_CHANNEL_INFO)
            .with_column(Column::new("time_id", ColumnData::Int32(vec![self.timeframe])))
            .with_column(Column::new(
                "channel_id",
                ColumnData::Strings(vec![self.channel_id.clone()]),
            ));

        let table = Category::new(SEGMENT_TABLE)
            .with_column(Column::new(
                "set_id",
                ColumnData::Int32(self.segment_table.iter().map(|r| r.set_id).collect()),
            ))
            .with_column(Column::new(
                "segment_id",
                ColumnData::Int32(self.segment_table.iter().map(|r| r.segment_id).collect()),
            ));

        let values = Category::new(SEGMENT_VALUES).with_column(
            Column::new("values", ColumnData::Int32(stored)).with_strategy(EncodingStrategy::Auto),
        );

        DataBlock::new(SEGMENTATION_BLOCK)
            .with_category(self.grid.to_category())
            .with_category(time_channel)
            .with_category(table)
            .with_category(values)
    }

    /// Grid metadata
    pub fn grid(&self) -> &GridInfo {
        &self.grid
    }

    /// Sample counts in canonical order
    pub fn dims(&self) -> [usize; 3] {
        self.grid.sample_count
    }

    /// Labels in canonical x-fastest order
    pub fn labels(&self) -> &[i32] {
        &self.labels
    }

    /// Statistics of the label distribution
    pub fn stats(&self) -> &SamplingStats {
        &self.grid.sampled_stats
    }

    /// Segment table rows
    pub fn segment_table(&self) -> &[SegmentTableRow] {
        &self.segment_table
    }

    /// Timeframe index
    pub fn timeframe(&self) -> i32 {
        self.timeframe
    }

    /// Channel identifier
    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// Label at `(x, y, z)`, `None` outside the grid
    pub fn label_at(&self, x: usize, y: usize, z: usize) -> Option<i32> {
        let [nx, ny, nz] = self.grid.sample_count;
        if x >= nx || y >= ny || z >= nz {
            return None;
        }
        Some(self.labels[self.grid.index(x, y, z)])
    }

    /// Non-background segment ids
    ///
    /// Taken from the segment table when it has entries, otherwise from the
    /// labels themselves.
    pub fn distinct_labels(&self) -> BTreeSet<SegmentId> {
        if self.segment_table.is_empty() {
            self.labels.iter().filter_map(|&l| SegmentId::new(l)).collect()
        } else {
            self.segment_table
                .iter()
                .filter_map(|row| SegmentId::new(row.segment_id))
                .collect()
        }
    }

    /// Number of voxels carrying `segment`
    pub fn segment_voxel_count(&self, segment: SegmentId) -> usize {
        let id = segment.get();
        self.labels.iter().filter(|&&l| l == id).count()
    }
}

fn missing(category: &str, column: &str) -> VolumeError {
    VolumeError::MissingColumn {
        category: category.to_string(),
        column: column.to_string(),
    }
}

fn int_column<'a>(category: &'a Category, name: &str, column: &str) -> Result<&'a [i32], VolumeError> {
    category
        .column(column)
        .and_then(|c| c.data.as_i32())
        .ok_or_else(|| missing(name, column))
}
