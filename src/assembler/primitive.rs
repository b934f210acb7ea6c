use std::fmt;

use glam::{DMat4, Vec3};

use crate::annotation::Rgb;

/// Which segment a primitive was built from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SegmentIdentity {
    /// Segmentation identifier
    pub segmentation_id: String,
    /// Segment label
    pub segment_id: i32,
    /// Timeframe of the segmentation file
    pub timeframe: i32,
}

impl fmt::Display for SegmentIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@t{}", self.segmentation_id, self.segment_id, self.timeframe)
    }
}

/// One segment's mesh with its placement and display attributes
///
/// Vertices stay in padded grid-index space; `transform` places them in
/// world space.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshPrimitive {
    /// Source segment
    pub identity: SegmentIdentity,
    /// Vertex positions in grid-index space
    pub vertices: Vec<Vec3>,
    /// Unit vertex normals, parallel to `vertices`
    pub normals: Vec<Vec3>,
    /// Triangles with outward winding
    pub indices: Vec<[u32; 3]>,
    /// Group of each triangle; all zero for a lattice segment
    pub triangle_groups: Vec<u32>,
    /// Instance transform into world space
    pub transform: DMat4,
    /// Display color
    pub color: Rgb,
    /// Opacity in `[0, 1]`
    pub opacity: f64,
    /// Hover text
    pub tooltip: String,
}

impl MeshPrimitive {
    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// True when the segment never crossed the iso level
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Vertex coordinates flattened as `x, y, z, x, y, z, ...`
    pub fn flat_vertices(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.to_array()).collect()
    }

    /// Triangle indices flattened
    pub fn flat_indices(&self) -> Vec<u32> {
        self.indices.iter().flatten().copied().collect()
    }
}
