//! Voxel-space to world-space instance transforms
//!
//! Meshes keep their vertices in grid-index space. Placement is a single
//! affine matrix attached to each mesh and applied at render time:
//!
//! ```text
//! M = T(origin_voxel) · S(voxel_size) · T(-origin_voxel)
//! origin_voxel = origin + offset
//! ```
//!
//! `origin_voxel` is a fixed point of `M`, so scaling happens about it.

use glam::{DMat4, DVec3};

use crate::volume::GridInfo;

/// Default shift from a sample index to its voxel centre
pub const DEFAULT_ORIGIN_OFFSET: f64 = 0.5;

/// Scale about `origin + offset` by `voxel_size`
pub fn compute_transform(origin: DVec3, voxel_size: DVec3, offset: f64) -> DMat4 {
    let origin_voxel = origin + DVec3::splat(offset);
    DMat4::from_translation(origin_voxel)
        * DMat4::from_scale(voxel_size)
        * DMat4::from_translation(-origin_voxel)
}

/// Instance transform for a mesh extracted from `grid`
pub fn transform_for_grid(grid: &GridInfo, offset: f64) -> DMat4 {
    compute_transform(
        DVec3::from_array(grid.origin),
        DVec3::from_array(grid.voxel_size()),
        offset,
    )
}

/// Flatten column by column, the layout viewers expect
pub fn to_column_major(matrix: &DMat4) -> [f64; 16] {
    matrix.to_cols_array()
}
