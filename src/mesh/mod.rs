//! # Isosurface Meshing
//!
//! Marching cubes over an x-fastest scalar field. Vertices are emitted in
//! grid-index space: a vertex at `(1.5, 2.0, 2.0)` lies halfway between
//! samples `(1, 2, 2)` and `(2, 2, 2)`. Placement in world space is left to
//! the instance transform.
//!
//! The triangle table winds triangles towards the region above the iso
//! level. [`IsosurfaceMesher`] flips every triangle after extraction so that
//! normals of an occupancy surface point out of the segment.

mod error;
mod tables;

#[cfg(test)]
mod tests;

pub use error::MeshError;

use glam::Vec3;
use log::trace;

use crate::extract::OccupancyVolume;
use tables::{EDGES, MC_TRIS};

/// Iso level for occupancy fields
pub const ISO_LEVEL: f32 = 0.5;

/// Indexed triangle mesh in grid-index space
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IsoMesh {
    /// Vertex positions
    pub vertices: Vec<Vec3>,
    /// Unit vertex normals, one per vertex (empty until computed)
    pub normals: Vec<Vec3>,
    /// Triangles as vertex index triples
    pub indices: Vec<[u32; 3]>,
}

impl IsoMesh {
    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    /// True when the mesh has no triangles
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Reverse the vertex order of every triangle
    pub fn flip_winding(&mut self) {
        for triangle in &mut self.indices {
            triangle.swap(1, 2);
        }
    }

    /// Geometric normal of a triangle, `(b - a) × (c - a)`, not normalised
    pub fn face_normal(&self, triangle: [u32; 3]) -> Vec3 {
        let [a, b, c] = triangle.map(|i| self.vertices[i as usize]);
        (b - a).cross(c - a)
    }

    /// Recompute vertex normals from the current winding
    pub fn compute_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];
        for &triangle in &self.indices {
            let n = self.face_normal(triangle);
            for i in triangle {
                normals[i as usize] += n;
            }
        }
        for n in &mut normals {
            *n = n.normalize_or_zero();
        }
        self.normals = normals;
    }
}

/// Extract the `level` isosurface of `field` with the table's winding
///
/// `field` is x-fastest with `dims` samples per axis.
pub fn marching_cubes(field: &[f32], dims: [usize; 3], level: f32) -> Result<IsoMesh, MeshError> {
    let [nx, ny, nz] = dims;
    let expected = nx * ny * nz;
    if field.len() != expected {
        return Err(MeshError::DimensionMismatch {
            expected,
            actual: field.len(),
        });
    }
    if dims.iter().any(|&n| n < 2) {
        return Err(MeshError::TooSmall(dims));
    }

    let sample = |x: usize, y: usize, z: usize| field[x + nx * (y + ny * z)] - level;
    // Vertex index per axis for the edges starting at each point of two z layers
    let slot = |x: usize, y: usize, z: usize| nx * ny * (z % 2) + nx * y + x;
    let mut slab = vec![[0u32; 3]; nx * ny * 2];
    let mut mesh = IsoMesh::default();

    for z in 0..nz - 1 {
        for y in 0..ny - 1 {
            for x in 0..nx - 1 {
                let mut corners = [0.0f32; 8];
                let mut config = 0usize;
                for (i, value) in corners.iter_mut().enumerate() {
                    *value = sample(x + (i & 1), y + ((i >> 1) & 1), z + ((i >> 2) & 1));
                    if *value < 0.0 {
                        config |= 1 << i;
                    }
                }
                if config == 0 || config == 255 {
                    continue;
                }

                // Each edge is created by the first cell that touches it
                let cell = [x, y, z];
                for &(a, b, axis, offset) in &EDGES {
                    let owned = (0..3).all(|d| d == axis || offset[d] == 1 || cell[d] == 0);
                    let (va, vb) = (corners[a], corners[b]);
                    if !owned || (va < 0.0) == (vb < 0.0) {
                        continue;
                    }

                    let p = [x + offset[0], y + offset[1], z + offset[2]];
                    let mut vertex = Vec3::new(p[0] as f32, p[1] as f32, p[2] as f32);
                    vertex[axis] += va / (va - vb);

                    let index = u32::try_from(mesh.vertices.len()).map_err(|_| MeshError::VertexOverflow)?;
                    mesh.vertices.push(vertex);
                    slab[slot(p[0], p[1], p[2])][axis] = index;
                }

                let mut edge_vertex = [0u32; 12];
                for (e, &(_, _, axis, offset)) in EDGES.iter().enumerate() {
                    edge_vertex[e] = slab[slot(x + offset[0], y + offset[1], z + offset[2])][axis];
                }

                let packed = MC_TRIS[config];
                let edge_at = |k: usize| ((packed >> (4 + 4 * k)) & 0xF) as usize;
                for t in 0..(packed & 0xF) as usize {
                    mesh.indices.push([
                        edge_vertex[edge_at(3 * t)],
                        edge_vertex[edge_at(3 * t + 1)],
                        edge_vertex[edge_at(3 * t + 2)],
                    ]);
                }
            }
        }
    }

    Ok(mesh)
}

/// Meshes occupancy volumes at a fixed level with outward winding
#[derive(Debug, Clone, Copy)]
pub struct IsosurfaceMesher {
    level: f32,
}

impl Default for IsosurfaceMesher {
    fn default() -> Self {
        Self { level: ISO_LEVEL }
    }
}

impl IsosurfaceMesher {
    /// Mesher at [`ISO_LEVEL`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mesher at a custom level
    pub fn with_level(level: f32) -> Self {
        Self { level }
    }

    /// Iso level in use
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Mesh an occupancy volume
    ///
    /// An all-empty or all-full volume gives an empty mesh, not an error.
    pub fn mesh(&self, occupancy: &OccupancyVolume) -> Result<IsoMesh, MeshError> {
        let mut mesh = marching_cubes(occupancy.values(), occupancy.dims(), self.level)?;
        mesh.flip_winding();
        mesh.compute_normals();
        trace!(
            "Meshed {:?} occupancy grid: {} vertices, {} triangles",
            occupancy.dims(),
            mesh.vertices.len(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }
}
