use std::collections::HashMap;

use log::warn;

use super::color::Rgb;
use super::document::{AnnotationsDocument, ChannelAnnotation, Description, SegmentAnnotation, TargetKind};
use super::error::AnnotationError;

/// Lookup key: `(segmentation_id, segment_id)`
pub type SegmentKey = (String, i32);

/// Everything annotated about one segment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationRecord {
    /// Color annotation, at most one per segment
    pub annotation: Option<SegmentAnnotation>,
    /// Lattice descriptions in document order
    pub descriptions: Vec<Description>,
}

impl AnnotationRecord {
    /// RGBA color of the annotation, if any
    pub fn rgba(&self) -> Option<[f64; 4]> {
        self.annotation.as_ref().and_then(|a| a.color)
    }
}

/// Segment annotations and descriptions keyed by segment
#[derive(Debug, Clone, Default)]
pub struct AnnotationTable {
    records: HashMap<SegmentKey, AnnotationRecord>,
    channels: Vec<ChannelAnnotation>,
}

impl AnnotationTable {
    /// Empty table; every lookup resolves to defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an annotations document and index it
    pub fn from_json(bytes: &[u8]) -> Result<Self, AnnotationError> {
        Ok(Self::from_document(&AnnotationsDocument::from_slice(bytes)?))
    }

    /// Index a parsed annotations document
    ///
    /// Segment annotations of every kind are indexed so that a mismatched
    /// kind shows up in the consistency check. Only lattice descriptions
    /// with a target are kept.
    pub fn from_document(document: &AnnotationsDocument) -> Self {
        let mut table = Self::new();

        for annotation in &document.segment_annotations {
            let key = (annotation.segmentation_id.clone(), annotation.segment_id);
            let record = table.records.entry(key).or_default();
            if record.annotation.is_some() {
                warn!(
                    "Duplicate annotation for segment {} of segmentation '{}'; keeping the last",
                    annotation.segment_id, annotation.segmentation_id
                );
            }
            record.annotation = Some(annotation.clone());
        }

        for (_, description) in &document.descriptions {
            if description.target_kind != TargetKind::Lattice {
                continue;
            }
            let Some(target) = &description.target_id else {
                continue;
            };
            table
                .records
                .entry((target.segmentation_id.clone(), target.segment_id))
                .or_default()
                .descriptions
                .push(description.clone());
        }

        table.channels = document.volume_channels_annotations.clone().unwrap_or_default();
        table
    }

    /// Record for a segment
    pub fn get(&self, segmentation_id: &str, segment_id: i32) -> Option<&AnnotationRecord> {
        self.records.get(&(segmentation_id.to_string(), segment_id))
    }

    /// Insert or replace a record
    pub fn insert(&mut self, segmentation_id: impl Into<String>, segment_id: i32, record: AnnotationRecord) {
        self.records.insert((segmentation_id.into(), segment_id), record);
    }

    /// Number of annotated segments
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when no segment is annotated
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Display color and opacity of a volume channel; opaque white when
    /// unannotated
    pub fn channel_color(&self, channel_id: &str) -> (Rgb, f64) {
        self.channels
            .iter()
            .find(|c| c.channel_id == channel_id)
            .map(|c| (Rgb::from_rgba(c.color), c.color[3]))
            .unwrap_or((Rgb::WHITE, 1.0))
    }
}
