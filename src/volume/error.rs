use crate::codec::{ColumnKind, FormatError};

/// Errors that can occur while building a segmentation volume
#[derive(Debug, thiserror::Error)]
pub enum VolumeError {
    /// The underlying column block file is malformed
    #[error("Malformed column data: {0}")]
    Format(#[from] FormatError),

    /// No data block with the expected header
    #[error("Missing data block: {0}")]
    MissingBlock(String),

    /// A required category is absent from the block
    #[error("Missing category '{category}' in block '{block}'")]
    MissingCategory {
        /// Block header
        block: String,
        /// Category name
        category: String,
    },

    /// A required column is absent or has no rows
    #[error("Missing column '{column}' in category '{category}'")]
    MissingColumn {
        /// Category name
        category: String,
        /// Column name
        column: String,
    },

    /// A column holds a different element kind than its schema declares
    #[error("Column '{column}' in category '{category}' has type {actual:?}, expected {expected:?}")]
    ColumnType {
        /// Category name
        category: String,
        /// Column name
        column: String,
        /// Declared kind
        expected: ColumnKind,
        /// Kind found in the file
        actual: ColumnKind,
    },

    /// Label count disagrees with the grid sample counts
    #[error("Label array has {actual} values, grid requires {expected}")]
    ShapeMismatch {
        /// Product of the sample counts
        expected: usize,
        /// Number of labels present
        actual: usize,
    },

    /// The axis order is not a permutation of 0, 1, 2
    #[error("Invalid axis order {0:?}")]
    InvalidAxisOrder([i32; 3]),

    /// Grid metadata is unusable (zero or negative extents, non-finite values)
    #[error("Invalid grid: {0}")]
    InvalidGrid(String),
}
