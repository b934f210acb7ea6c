/// Errors raised by isosurface extraction
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    /// The field length does not match the declared dimensions
    #[error("Field has {actual} samples, dimensions require {expected}")]
    DimensionMismatch {
        /// Product of the dimensions
        expected: usize,
        /// Number of samples supplied
        actual: usize,
    },

    /// At least two samples per axis are needed to form a cell
    #[error("Field dimensions {0:?} are too small for marching cubes")]
    TooSmall([usize; 3]),

    /// The mesh has more vertices than 32-bit indices can address
    #[error("Mesh exceeds the 32-bit vertex index range")]
    VertexOverflow,
}
