use super::document::SegmentKind;

/// Errors raised while loading the annotations document
#[derive(Debug, thiserror::Error)]
pub enum AnnotationError {
    /// The document is not valid JSON or does not match the model
    #[error("Invalid annotations document: {0}")]
    Json(#[from] serde_json::Error),
}

/// A resolved annotation disagrees with the segment it was looked up for
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConsistencyError {
    /// The annotation targets another kind of segmentation
    #[error("Annotation for {segmentation_id}/{segment_id} has kind {actual:?}, expected lattice")]
    Kind {
        /// Segmentation looked up
        segmentation_id: String,
        /// Segment looked up
        segment_id: i32,
        /// Kind found on the annotation
        actual: SegmentKind,
    },

    /// The annotation names another segment
    #[error("Annotation for segment {expected} names segment {actual}")]
    Segment {
        /// Segment looked up
        expected: i32,
        /// Segment named by the annotation
        actual: i32,
    },

    /// The annotation names another segmentation
    #[error("Annotation for segmentation '{expected}' names segmentation '{actual}'")]
    Segmentation {
        /// Segmentation looked up
        expected: String,
        /// Segmentation named by the annotation
        actual: String,
    },

    /// The annotation does not cover the segment's timeframe
    #[error("Annotation for {segmentation_id}/{segment_id} does not cover timeframe {timeframe}")]
    Time {
        /// Segmentation looked up
        segmentation_id: String,
        /// Segment looked up
        segment_id: i32,
        /// Timeframe of the segmentation file
        timeframe: i32,
    },
}
