use crate::volume::SegmentId;

use super::color::Rgb;
use super::document::SegmentKind;
use super::error::ConsistencyError;
use super::table::AnnotationTable;

/// Display attributes of one segment
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAnnotation {
    /// Segment color
    pub color: Rgb,
    /// Opacity in `[0, 1]`
    pub opacity: f64,
    /// Multi-paragraph hover text
    pub tooltip: String,
}

/// Looks up display attributes for segments
#[derive(Debug, Clone, Copy)]
pub struct AnnotationResolver<'a> {
    table: &'a AnnotationTable,
}

impl<'a> AnnotationResolver<'a> {
    /// Resolver over `table`
    pub fn new(table: &'a AnnotationTable) -> Self {
        Self { table }
    }

    /// Color, opacity and tooltip of a segment
    ///
    /// Unannotated segments are opaque white. The tooltip starts with
    /// `"{segmentation_id} | Segment {segment_id}"`, followed by the name and
    /// external references of each description, separated by blank lines.
    pub fn resolve(&self, segmentation_id: &str, segment: SegmentId) -> ResolvedAnnotation {
        let record = self.table.get(segmentation_id, segment.get());

        let (color, opacity) = match record.and_then(|r| r.rgba()) {
            Some(rgba) => (Rgb::from_rgba(rgba), rgba[3]),
            None => (Rgb::WHITE, 1.0),
        };

        let mut paragraphs = vec![format!("{} | Segment {}", segmentation_id, segment)];
        for description in record.map(|r| r.descriptions.as_slice()).unwrap_or_default() {
            if let Some(name) = &description.name {
                paragraphs.push(name.clone());
            }
            for reference in description.external_references.iter().flatten() {
                paragraphs.push(format!(
                    "{} [{}:{}]",
                    reference.label.as_deref().unwrap_or_default(),
                    reference.resource.as_deref().unwrap_or_default(),
                    reference.accession.as_deref().unwrap_or_default(),
                ));
            }
        }

        ResolvedAnnotation {
            color,
            opacity,
            tooltip: paragraphs.join("\n\n"),
        }
    }

    /// Cross-check the color annotation of a segment, if present, against
    /// the segment it was looked up for
    pub fn check_consistency(
        &self,
        segmentation_id: &str,
        segment: SegmentId,
        timeframe: i32,
    ) -> Result<(), ConsistencyError> {
        let Some(annotation) = self
            .table
            .get(segmentation_id, segment.get())
            .and_then(|r| r.annotation.as_ref())
        else {
            return Ok(());
        };

        if annotation.segment_kind != SegmentKind::Lattice {
            return Err(ConsistencyError::Kind {
                segmentation_id: segmentation_id.to_string(),
                segment_id: segment.get(),
                actual: annotation.segment_kind,
            });
        }
        if annotation.segment_id != segment.get() {
            return Err(ConsistencyError::Segment {
                expected: segment.get(),
                actual: annotation.segment_id,
            });
        }
        if annotation.segmentation_id != segmentation_id {
            return Err(ConsistencyError::Segmentation {
                expected: segmentation_id.to_string(),
                actual: annotation.segmentation_id.clone(),
            });
        }
        if let Some(time) = &annotation.time {
            if !time.contains(timeframe) {
                return Err(ConsistencyError::Time {
                    segmentation_id: segmentation_id.to_string(),
                    segment_id: segment.get(),
                    timeframe,
                });
            }
        }
        Ok(())
    }
}
