//! Category layouts for segmentation and volume blocks
//!
//! Each category is a fixed ordered list of `(column, kind)` pairs. Readers
//! validate decoded categories against these before touching any values.

use crate::codec::{Category, ColumnKind};

use super::error::VolumeError;

/// Block header of a lattice segmentation file
pub const SEGMENTATION_BLOCK: &str = "SEGMENTATION_DATA";
/// Block header of a volume file
pub const VOLUME_BLOCK: &str = "VOLUME_DATA";

/// Grid geometry and sampling statistics
pub const VOLUME_INFO: &str = "volume_data_3d_info";
/// Timeframe and channel of the data
pub const TIME_CHANNEL_INFO: &str = "volume_data_time_and_channel_info";
/// Segment set and id table
pub const SEGMENT_TABLE: &str = "segmentation_data_table";
/// Flat per-voxel segment labels
pub const SEGMENT_VALUES: &str = "segmentation_data_3d";
/// Flat per-voxel volume values
pub const VOLUME_VALUES: &str = "volume_data_3d";

/// Ordered column layout of one category
#[derive(Debug, Clone, Copy)]
pub struct CategorySchema {
    /// Category name
    pub name: &'static str,
    /// Columns in declaration order
    pub fields: &'static [(&'static str, ColumnKind)],
}

use ColumnKind::{Float32, Float64, Int32, Str};

/// `volume_data_3d_info`
pub const VOLUME_INFO_SCHEMA: CategorySchema = CategorySchema {
    name: VOLUME_INFO,
    fields: &[
        ("name", Str),
        ("axis_order[0]", Int32),
        ("axis_order[1]", Int32),
        ("axis_order[2]", Int32),
        ("origin[0]", Float32),
        ("origin[1]", Float32),
        ("origin[2]", Float32),
        ("dimensions[0]", Float32),
        ("dimensions[1]", Float32),
        ("dimensions[2]", Float32),
        ("sample_rate", Int32),
        ("sample_count[0]", Int32),
        ("sample_count[1]", Int32),
        ("sample_count[2]", Int32),
        ("spacegroup_number", Int32),
        ("spacegroup_cell_size[0]", Float64),
        ("spacegroup_cell_size[1]", Float64),
        ("spacegroup_cell_size[2]", Float64),
        ("spacegroup_cell_angles[0]", Float64),
        ("spacegroup_cell_angles[1]", Float64),
        ("spacegroup_cell_angles[2]", Float64),
        ("mean_source", Float64),
        ("mean_sampled", Float64),
        ("sigma_source", Float64),
        ("sigma_sampled", Float64),
        ("min_source", Float64),
        ("min_sampled", Float64),
        ("max_source", Float64),
        ("max_sampled", Float64),
    ],
};

/// `volume_data_time_and_channel_info`
pub const TIME_CHANNEL_SCHEMA: CategorySchema = CategorySchema {
    name: TIME_CHANNEL_INFO,
    fields: &[("time_id", Int32), ("channel_id", Str)],
};

/// `segmentation_data_table`
pub const SEGMENT_TABLE_SCHEMA: CategorySchema = CategorySchema {
    name: SEGMENT_TABLE,
    fields: &[("set_id", Int32), ("segment_id", Int32)],
};

/// `segmentation_data_3d`
pub const SEGMENT_VALUES_SCHEMA: CategorySchema = CategorySchema {
    name: SEGMENT_VALUES,
    fields: &[("values", Int32)],
};

/// `volume_data_3d`
pub const VOLUME_VALUES_SCHEMA: CategorySchema = CategorySchema {
    name: VOLUME_VALUES,
    fields: &[("values", Float32)],
};

/// Categories a segmentation block must carry, in file order
pub const SEGMENTATION_CATEGORIES: [CategorySchema; 4] = [
    VOLUME_INFO_SCHEMA,
    TIME_CHANNEL_SCHEMA,
    SEGMENT_TABLE_SCHEMA,
    SEGMENT_VALUES_SCHEMA,
];

impl CategorySchema {
    /// Check that every declared column exists with the declared kind
    pub fn validate(&self, category: &Category) -> Result<(), VolumeError> {
        for &(field, expected) in self.fields {
            let column = category
                .column(field)
                .ok_or_else(|| VolumeError::MissingColumn {
                    category: self.name.to_string(),
                    column: field.to_string(),
                })?;

            let actual = column.data.kind();
            if actual != expected {
                return Err(VolumeError::ColumnType {
                    category: self.name.to_string(),
                    column: field.to_string(),
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }
}
