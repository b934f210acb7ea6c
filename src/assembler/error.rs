use crate::mesh::MeshError;

/// A single segment failed to produce geometry
///
/// Collected into the batch report; sibling segments are unaffected.
#[derive(Debug, thiserror::Error)]
#[error("Segment {segment_id} of segmentation '{segmentation_id}' (timeframe {timeframe}): {source}")]
pub struct SegmentError {
    /// Segmentation the segment belongs to
    pub segmentation_id: String,
    /// Failed segment
    pub segment_id: i32,
    /// Timeframe of the segmentation
    pub timeframe: i32,
    /// Underlying meshing failure
    #[source]
    pub source: MeshError,
}
