use crate::codec::{Category, Column, ColumnData, DataBlock, EncodingStrategy};
use crate::volume::schema::{VOLUME_BLOCK, VOLUME_VALUES};
use crate::volume::{GridInfo, SamplingStats};

/// Scalar membership field of one segment, values in `[0, 1]`
///
/// Values are x-fastest. The grid carries statistics of these values, not
/// of the labels they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyVolume {
    grid: GridInfo,
    values: Vec<f32>,
}

impl OccupancyVolume {
    pub(crate) fn new(mut grid: GridInfo, values: Vec<f32>) -> Self {
        debug_assert_eq!(grid.voxel_count(), values.len());
        grid.sampled_stats = SamplingStats::from_values(values.iter().map(|&v| v as f64));
        Self { grid, values }
    }

    /// Grid metadata
    pub fn grid(&self) -> &GridInfo {
        &self.grid
    }

    /// Sample counts along x, y, z
    pub fn dims(&self) -> [usize; 3] {
        self.grid.sample_count
    }

    /// Flat x-fastest values
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Statistics of the occupancy values
    pub fn stats(&self) -> &SamplingStats {
        &self.grid.sampled_stats
    }

    /// Value at `(x, y, z)`, `None` outside the grid
    pub fn value_at(&self, x: usize, y: usize, z: usize) -> Option<f32> {
        let [nx, ny, nz] = self.dims();
        if x >= nx || y >= ny || z >= nz {
            return None;
        }
        Some(self.values[self.grid.index(x, y, z)])
    }

    /// Encode as a `VOLUME_DATA` block
    pub fn to_block(&self) -> DataBlock {
        DataBlock::new(VOLUME_BLOCK)
            .with_category(self.grid.to_category())
            .with_category(Category::new(VOLUME_VALUES).with_column(
                Column::new("values", ColumnData::Float32(self.values.clone()))
                    .with_strategy(EncodingStrategy::FixedWidth),
            ))
    }
}
