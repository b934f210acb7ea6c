//! # segmesh - Voxel Segmentations to Triangle Meshes
//!
//! `segmesh` converts archives of 3D voxel segmentations (per-voxel integer
//! labels on a regular grid, stored in a compact binary column format) into
//! one triangulated surface mesh per segment, registered in world space and
//! annotated with color, opacity and tooltip text for interactive viewers.
//!
//! ## Pipeline
//!
//! ```text
//! column block file ──► SegmentationVolumeModel ──► per segment:
//!                                                    extract + pad + smooth
//!                                                    marching cubes (level 0.5)
//!                                                    instance transform
//!                                                    annotation lookup
//!                                                 ──► MeshPrimitive
//! ```
//!
//! - **[`codec`]**: binary column codec with fixed-width, delta + run-length
//!   and byte-array encoding chains.
//! - **[`volume`]**: label grid reconstruction with axis-order handling.
//! - **[`extract`]**: per-segment occupancy fields with zero padding and
//!   6-neighbour smoothing.
//! - **[`mesh`]**: marching cubes with outward winding.
//! - **[`transform`]**: voxel-to-world instance matrices.
//! - **[`annotation`]**: color, opacity and tooltip resolution.
//! - **[`assembler`]**: parallel per-segment fan-out into a batch report.
//! - **[`archive`]** and **[`convert`]**: zip archive I/O and the end-to-end
//!   driver.
//!
//! ## Quick Start
//!
//! ```rust
//! use segmesh::annotation::AnnotationTable;
//! use segmesh::assembler::MeshAssembler;
//! use segmesh::volume::{GridInfo, SegmentationVolumeModel};
//!
//! // 4x4x4 grid with a 2x2x2 block labelled 7
//! let grid = GridInfo::with_sample_count([4, 4, 4]);
//! let mut labels = vec![0; 64];
//! for z in 1..3 {
//!     for y in 1..3 {
//!         for x in 1..3 {
//!             labels[grid.index(x, y, z)] = 7;
//!         }
//!     }
//! }
//! let model = SegmentationVolumeModel::new(grid, labels)?;
//!
//! let report = MeshAssembler::new().assemble(&model, "0", &AnnotationTable::new());
//! assert_eq!(report.primitives.len(), 1);
//! assert_eq!(report.primitives[0].tooltip, "0 | Segment 7");
//! assert!(!report.primitives[0].is_empty());
//! # Ok::<(), segmesh::volume::VolumeError>(())
//! ```

#![warn(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod annotation;
pub mod archive;
pub mod assembler;
pub mod codec;
pub mod convert;
pub mod extract;
pub mod mesh;
pub mod transform;
pub mod volume;

/// Commonly used types
pub mod prelude {
    pub use crate::annotation::{AnnotationResolver, AnnotationTable, ResolvedAnnotation, Rgb};
    pub use crate::assembler::{AssemblerConfig, BatchReport, MeshAssembler, MeshPrimitive};
    pub use crate::codec::{Category, Column, ColumnData, DataBlock, FormatError};
    pub use crate::convert::{ArchiveConverter, ConversionStats, ConvertConfig, ConvertError};
    pub use crate::extract::{extract_segment, OccupancyVolume};
    pub use crate::mesh::{IsoMesh, IsosurfaceMesher};
    pub use crate::transform::compute_transform;
    pub use crate::volume::{GridInfo, SegmentId, SegmentationVolumeModel, VolumeError};
}
