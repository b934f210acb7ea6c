//! # Segment Extraction
//!
//! Turns one label of a [`SegmentationVolumeModel`] into a padded, optionally
//! smoothed occupancy field ready for isosurfacing.
//!
//! 1. Binary mask: 1.0 where the label matches, 0.0 elsewhere
//! 2. Zero padding of one voxel on every face, so surfaces touching the grid
//!    boundary still close
//! 3. `n` passes of the 6-neighbour kernel `(2 * centre + Σ neighbours) / 8`
//!    with edge-replicated borders
//! 4. Statistics and grid metadata recomputed for the padded field
//!
//! The source model is never modified.

mod occupancy;

#[cfg(test)]
mod tests;

pub use occupancy::OccupancyVolume;

use log::trace;

use crate::volume::{SegmentId, SegmentationVolumeModel, CANONICAL_AXIS_ORDER};

/// Padding added on every face of the mask
pub const MASK_PADDING: usize = 1;

/// Extract the occupancy field of `segment`
pub fn extract_segment(
    model: &SegmentationVolumeModel,
    segment: SegmentId,
    smooth_iterations: u32,
) -> OccupancyVolume {
    let id = segment.get();
    let mask: Vec<f32> = model
        .labels()
        .iter()
        .map(|&l| if l == id { 1.0 } else { 0.0 })
        .collect();

    let (mut values, dims) = pad_with_zeros(&mask, model.dims(), MASK_PADDING);
    smooth(&mut values, dims, smooth_iterations);

    let mut grid = model.grid().padded(MASK_PADDING);
    grid.axis_order = CANONICAL_AXIS_ORDER;

    trace!(
        "Extracted segment {} into {:?} occupancy grid ({} smoothing passes)",
        segment,
        dims,
        smooth_iterations
    );
    OccupancyVolume::new(grid, values)
}

/// Surround an x-fastest field with `pad` layers of zeros
pub fn pad_with_zeros(values: &[f32], dims: [usize; 3], pad: usize) -> (Vec<f32>, [usize; 3]) {
    let [nx, ny, nz] = dims;
    let padded = dims.map(|n| n + 2 * pad);
    let [px, py, _] = padded;

    let mut out = vec![0.0; padded.iter().product()];
    for z in 0..nz {
        for y in 0..ny {
            let src = nx * (y + ny * z);
            let dst = pad + px * ((y + pad) + py * (z + pad));
            out[dst..dst + nx].copy_from_slice(&values[src..src + nx]);
        }
    }
    (out, padded)
}

/// Apply `iterations` passes of the 6-neighbour smoothing kernel in place
///
/// Each pass sets `v = (2 * v + Σ face neighbours) / 8`, reading neighbours
/// outside the field from the nearest edge voxel.
pub fn smooth(values: &mut Vec<f32>, dims: [usize; 3], iterations: u32) {
    if iterations == 0 {
        return;
    }
    let [nx, ny, nz] = dims;
    let index = |x: usize, y: usize, z: usize| x + nx * (y + ny * z);
    let mut next = vec![0.0f32; values.len()];

    for _ in 0..iterations {
        for z in 0..nz {
            let (z0, z1) = (z.saturating_sub(1), (z + 1).min(nz - 1));
            for y in 0..ny {
                let (y0, y1) = (y.saturating_sub(1), (y + 1).min(ny - 1));
                for x in 0..nx {
                    let (x0, x1) = (x.saturating_sub(1), (x + 1).min(nx - 1));
                    let neighbours = values[index(x0, y, z)]
                        + values[index(x1, y, z)]
                        + values[index(x, y0, z)]
                        + values[index(x, y1, z)]
                        + values[index(x, y, z0)]
                        + values[index(x, y, z1)];
                    next[index(x, y, z)] = (2.0 * values[index(x, y, z)] + neighbours) / 8.0;
                }
            }
        }
        std::mem::swap(values, &mut next);
    }
}
