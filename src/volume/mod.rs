//! # Segmentation Volume Model
//!
//! Reconstructs a 3D label grid from a decoded `SEGMENTATION_DATA` block.
//!
//! ## Required categories
//!
//! | Category | Contents |
//! |----------|----------|
//! | `volume_data_3d_info` | grid geometry, axis order, sampling statistics |
//! | `volume_data_time_and_channel_info` | timeframe and channel |
//! | `segmentation_data_table` | segment set / id pairs |
//! | `segmentation_data_3d` | flat per-voxel labels |
//!
//! ## Orientation
//!
//! Labels are stored along the file's axis order and reordered on load so
//! that x varies fastest and z slowest. Every geometric operation downstream
//! relies on this layout.

mod error;
mod grid;
mod model;
pub mod schema;

#[cfg(test)]
mod tests;

use std::fmt;
use std::num::NonZeroI32;

pub use error::VolumeError;
pub use grid::{
    reorder_to_canonical, reorder_to_storage, to_canonical, to_storage, validate_axis_order,
    GridInfo, SamplingStats, CANONICAL_AXIS_ORDER,
};
pub use model::{SegmentTableRow, SegmentationVolumeModel};

/// A segment label; never the background label 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentId(NonZeroI32);

impl SegmentId {
    /// `None` for the background label
    pub fn new(label: i32) -> Option<Self> {
        NonZeroI32::new(label).map(Self)
    }

    /// The raw label value
    pub fn get(self) -> i32 {
        self.0.get()
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<SegmentId> for i32 {
    fn from(id: SegmentId) -> Self {
        id.get()
    }
}
