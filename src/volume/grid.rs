use crate::codec::{Category, Column, ColumnData};

use super::error::VolumeError;
use super::schema::VOLUME_INFO;

/// Summary statistics of a value distribution
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SamplingStats {
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
    /// Arithmetic mean
    pub mean: f64,
    /// Population standard deviation
    pub sigma: f64,
}

impl SamplingStats {
    /// Compute statistics over `values`; all zero when empty
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut count = 0usize;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut mean = 0.0;
        let mut m2 = 0.0;

        // Welford
        for v in values {
            count += 1;
            min = min.min(v);
            max = max.max(v);
            let delta = v - mean;
            mean += delta / count as f64;
            m2 += delta * (v - mean);
        }

        if count == 0 {
            return Self::default();
        }

        Self {
            min,
            max,
            mean,
            sigma: (m2 / count as f64).sqrt(),
        }
    }
}

/// Geometry and sampling metadata of a regular 3D grid
///
/// Per-axis fields are held in canonical (x, y, z) order. `axis_order`
/// records the on-disk layout: entry `k` is the spatial axis that storage
/// axis `k` (fastest first) runs along.
#[derive(Debug, Clone, PartialEq)]
pub struct GridInfo {
    /// Grid name
    pub name: String,
    /// Storage axis to spatial axis mapping
    pub axis_order: [usize; 3],
    /// World-space origin
    pub origin: [f64; 3],
    /// Physical extent of the sampled region
    pub dimensions: [f64; 3],
    /// Downsampling rate relative to the source data
    pub sample_rate: i32,
    /// Number of samples along each axis
    pub sample_count: [usize; 3],
    /// Crystallographic space group number
    pub spacegroup_number: i32,
    /// Space group cell edge lengths
    pub cell_size: [f64; 3],
    /// Space group cell angles in degrees
    pub cell_angles: [f64; 3],
    /// Statistics of the source data
    pub source_stats: SamplingStats,
    /// Statistics of the sampled values held in this grid
    pub sampled_stats: SamplingStats,
}

impl GridInfo {
    /// Grid with unit voxels starting at the world origin
    pub fn with_sample_count(sample_count: [usize; 3]) -> Self {
        let extent = sample_count.map(|n| n as f64);
        Self {
            name: String::new(),
            axis_order: CANONICAL_AXIS_ORDER,
            origin: [0.0; 3],
            dimensions: extent,
            sample_rate: 1,
            sample_count,
            spacegroup_number: 1,
            cell_size: extent,
            cell_angles: [90.0; 3],
            source_stats: SamplingStats::default(),
            sampled_stats: SamplingStats::default(),
        }
    }

    /// Physical size of one voxel, `dimensions / sample_count`
    pub fn voxel_size(&self) -> [f64; 3] {
        [0, 1, 2].map(|i| self.dimensions[i] / self.sample_count[i] as f64)
    }

    /// Total number of samples
    pub fn voxel_count(&self) -> usize {
        self.sample_count.iter().product()
    }

    /// Flat x-fastest index of `(x, y, z)`
    pub fn index(&self, x: usize, y: usize, z: usize) -> usize {
        let [nx, ny, _] = self.sample_count;
        x + nx * (y + ny * z)
    }

    /// Check sample counts, extents and axis order
    pub fn validate(&self) -> Result<(), VolumeError> {
        if self.sample_count.iter().any(|&n| n == 0) {
            return Err(VolumeError::InvalidGrid(format!(
                "sample count {:?} has an empty axis",
                self.sample_count
            )));
        }
        if self
            .sample_count
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n))
            .is_none()
        {
            return Err(VolumeError::InvalidGrid(format!(
                "sample count {:?} overflows the voxel count",
                self.sample_count
            )));
        }
        if self
            .dimensions
            .iter()
            .any(|d| !d.is_finite() || *d <= 0.0)
        {
            return Err(VolumeError::InvalidGrid(format!(
                "dimensions {:?} must be finite and positive",
                self.dimensions
            )));
        }
        if self.origin.iter().any(|o| !o.is_finite()) {
            return Err(VolumeError::InvalidGrid(format!(
                "origin {:?} is not finite",
                self.origin
            )));
        }
        validate_axis_order(self.axis_order.map(|a| a as i32))?;
        Ok(())
    }

    /// Grid grown by `pad` voxels on every face
    ///
    /// The origin moves outward by `pad` voxels so the original samples keep
    /// their world position. Voxel size is unchanged.
    pub fn padded(&self, pad: usize) -> Self {
        let voxel = self.voxel_size();
        let mut grid = self.clone();
        for i in 0..3 {
            let grow = 2.0 * pad as f64;
            let cell_voxel = self.cell_size[i] / self.sample_count[i] as f64;
            grid.sample_count[i] += 2 * pad;
            grid.origin[i] -= pad as f64 * voxel[i];
            grid.dimensions[i] += grow * voxel[i];
            grid.cell_size[i] += grow * cell_voxel;
        }
        grid
    }

    /// Read from a `volume_data_3d_info` category, converting per-axis fields
    /// from storage to canonical order
    pub fn from_category(category: &Category) -> Result<Self, VolumeError> {
        let raw_order = int_triple(category, "axis_order")?;
        let axis_order = validate_axis_order(raw_order)?;

        let raw_counts = int_triple(category, "sample_count")?;
        if raw_counts.iter().any(|&n| n <= 0) {
            return Err(VolumeError::InvalidGrid(format!(
                "sample count {:?} must be positive",
                raw_counts
            )));
        }
        let stored_counts = raw_counts.map(|n| n as usize);

        let grid = Self {
            name: category
                .str_scalar("name")
                .map(str::to_string)
                .ok_or_else(|| missing("name"))?,
            axis_order,
            origin: to_canonical(float_triple(category, "origin")?, axis_order),
            dimensions: to_canonical(float_triple(category, "dimensions")?, axis_order),
            sample_rate: int_scalar(category, "sample_rate")?,
            sample_count: to_canonical(stored_counts, axis_order),
            spacegroup_number: int_scalar(category, "spacegroup_number")?,
            cell_size: to_canonical(float_triple(category, "spacegroup_cell_size")?, axis_order),
            cell_angles: to_canonical(float_triple(category, "spacegroup_cell_angles")?, axis_order),
            source_stats: stats(category, "source")?,
            sampled_stats: stats(category, "sampled")?,
        };
        grid.validate()?;
        Ok(grid)
    }

    /// Write as a `volume_data_3d_info` category in storage order
    pub fn to_category(&self) -> Category {
        let order = self.axis_order;
        let mut category = Category::new(VOLUME_INFO)
            .with_column(Column::new("name", ColumnData::Strings(vec![self.name.clone()])));

        push_i32_triple(&mut category, "axis_order", order.map(|a| a as i32));
        push_f32_triple(&mut category, "origin", to_storage(self.origin, order));
        push_f32_triple(&mut category, "dimensions", to_storage(self.dimensions, order));
        category.push(Column::new("sample_rate", ColumnData::Int32(vec![self.sample_rate])));
        push_i32_triple(
            &mut category,
            "sample_count",
            to_storage(self.sample_count, order).map(|n| n as i32),
        );
        category.push(Column::new(
            "spacegroup_number",
            ColumnData::Int32(vec![self.spacegroup_number]),
        ));
        push_f64_triple(&mut category, "spacegroup_cell_size", to_storage(self.cell_size, order));
        push_f64_triple(&mut category, "spacegroup_cell_angles", to_storage(self.cell_angles, order));

        for (field, value) in [
            ("mean_source", self.source_stats.mean),
            ("mean_sampled", self.sampled_stats.mean),
            ("sigma_source", self.source_stats.sigma),
            ("sigma_sampled", self.sampled_stats.sigma),
            ("min_source", self.source_stats.min),
            ("min_sampled", self.sampled_stats.min),
            ("max_source", self.source_stats.max),
            ("max_sampled", self.sampled_stats.max),
        ] {
            category.push(Column::new(field, ColumnData::Float64(vec![value])));
        }
        category
    }
}

/// Identity storage layout, x fastest
pub const CANONICAL_AXIS_ORDER: [usize; 3] = [0, 1, 2];

/// Check that `order` is a permutation of 0, 1, 2
pub fn validate_axis_order(order: [i32; 3]) -> Result<[usize; 3], VolumeError> {
    let mut seen = [false; 3];
    for &axis in &order {
        match usize::try_from(axis) {
            Ok(a) if a < 3 && !seen[a] => seen[a] = true,
            _ => return Err(VolumeError::InvalidAxisOrder(order)),
        }
    }
    Ok(order.map(|a| a as usize))
}

/// Per-axis values from storage order to canonical order
pub fn to_canonical<T: Copy>(stored: [T; 3], order: [usize; 3]) -> [T; 3] {
    let mut out = stored;
    for k in 0..3 {
        out[order[k]] = stored[k];
    }
    out
}

/// Per-axis values from canonical order to storage order
pub fn to_storage<T: Copy>(canonical: [T; 3], order: [usize; 3]) -> [T; 3] {
    [0, 1, 2].map(|k| canonical[order[k]])
}

/// Reorder flat samples laid out along `order` into x-fastest order
///
/// `stored_counts` are the sample counts in storage order.
pub fn reorder_to_canonical<T: Copy>(values: &[T], stored_counts: [usize; 3], order: [usize; 3]) -> Vec<T> {
    if order == CANONICAL_AXIS_ORDER {
        return values.to_vec();
    }
    let counts = to_canonical(stored_counts, order);
    let mut out = values.to_vec();
    for_each_storage_position(stored_counts, order, |s, p| {
        out[p[0] + counts[0] * (p[1] + counts[1] * p[2])] = values[s];
    });
    out
}

/// Inverse of [`reorder_to_canonical`]
///
/// `counts` are the canonical sample counts.
pub fn reorder_to_storage<T: Copy>(values: &[T], counts: [usize; 3], order: [usize; 3]) -> Vec<T> {
    if order == CANONICAL_AXIS_ORDER {
        return values.to_vec();
    }
    let stored_counts = to_storage(counts, order);
    let mut out = values.to_vec();
    for_each_storage_position(stored_counts, order, |s, p| {
        out[s] = values[p[0] + counts[0] * (p[1] + counts[1] * p[2])];
    });
    out
}

/// Visit every storage index with its canonical `(x, y, z)` position
fn for_each_storage_position<F>(stored_counts: [usize; 3], order: [usize; 3], mut f: F)
where
    F: FnMut(usize, [usize; 3]),
{
    let mut s = 0;
    for i2 in 0..stored_counts[2] {
        for i1 in 0..stored_counts[1] {
            for i0 in 0..stored_counts[0] {
                let mut p = [0usize; 3];
                p[order[0]] = i0;
                p[order[1]] = i1;
                p[order[2]] = i2;
                f(s, p);
                s += 1;
            }
        }
    }
}

fn missing(column: &str) -> VolumeError {
    VolumeError::MissingColumn {
        category: VOLUME_INFO.to_string(),
        column: column.to_string(),
    }
}

fn int_scalar(category: &Category, name: &str) -> Result<i32, VolumeError> {
    category.i32_scalar(name).ok_or_else(|| missing(name))
}

fn float_scalar(category: &Category, name: &str) -> Result<f64, VolumeError> {
    category.f64_scalar(name).ok_or_else(|| missing(name))
}

fn int_triple(category: &Category, prefix: &str) -> Result<[i32; 3], VolumeError> {
    Ok([
        int_scalar(category, &format!("{}[0]", prefix))?,
        int_scalar(category, &format!("{}[1]", prefix))?,
        int_scalar(category, &format!("{}[2]", prefix))?,
    ])
}

fn float_triple(category: &Category, prefix: &str) -> Result<[f64; 3], VolumeError> {
    Ok([
        float_scalar(category, &format!("{}[0]", prefix))?,
        float_scalar(category, &format!("{}[1]", prefix))?,
        float_scalar(category, &format!("{}[2]", prefix))?,
    ])
}

fn stats(category: &Category, suffix: &str) -> Result<SamplingStats, VolumeError> {
    Ok(SamplingStats {
        min: float_scalar(category, &format!("min_{}", suffix))?,
        max: float_scalar(category, &format!("max_{}", suffix))?,
        mean: float_scalar(category, &format!("mean_{}", suffix))?,
        sigma: float_scalar(category, &format!("sigma_{}", suffix))?,
    })
}

fn push_i32_triple(category: &mut Category, prefix: &str, values: [i32; 3]) {
    for (i, v) in values.into_iter().enumerate() {
        category.push(Column::new(format!("{}[{}]", prefix, i), ColumnData::Int32(vec![v])));
    }
}

fn push_f32_triple(category: &mut Category, prefix: &str, values: [f64; 3]) {
    for (i, v) in values.into_iter().enumerate() {
        category.push(Column::new(
            format!("{}[{}]", prefix, i),
            ColumnData::Float32(vec![v as f32]),
        ));
    }
}

fn push_f64_triple(category: &mut Category, prefix: &str, values: [f64; 3]) {
    for (i, v) in values.into_iter().enumerate() {
        category.push(Column::new(format!("{}[{}]", prefix, i), ColumnData::Float64(vec![v])));
    }
}
