//! # Annotations
//!
//! Parses the archive's annotations document and resolves per-segment
//! display attributes: color, opacity and a hover tooltip assembled from
//! the segment's descriptions and external references.
//!
//! ## Example
//!
//! ```
//! use segmesh::annotation::{AnnotationResolver, AnnotationTable};
//! use segmesh::volume::SegmentId;
//!
//! let json = br#"{
//!     "segment_annotations": [
//!         {"segment_kind": "lattice", "segment_id": 3, "segmentation_id": "0",
//!          "color": [1.0, 0.0, 0.0, 0.5]}
//!     ]
//! }"#;
//! let table = AnnotationTable::from_json(json).unwrap();
//! let resolved = AnnotationResolver::new(&table).resolve("0", SegmentId::new(3).unwrap());
//! assert_eq!(resolved.color.to_hex(), "#FF0000");
//! assert_eq!(resolved.opacity, 0.5);
//! assert_eq!(resolved.tooltip, "0 | Segment 3");
//! ```

mod color;
mod document;
mod error;
mod resolver;
mod table;


pub use color::Rgb;
pub use document::{
    AnnotationsDocument, ChannelAnnotation, Description, DetailsText, EntryId, ExternalReference,
    SegmentAnnotation, SegmentKind, TargetId, TargetKind, TimeEntry, TimeSpec,
};
pub use error::{AnnotationError, ConsistencyError};
pub use resolver::{AnnotationResolver, ResolvedAnnotation};
pub use table::{AnnotationRecord, AnnotationTable, SegmentKey};
