use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::error::ArchiveError;

/// Volume file listed in the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeEntry {
    /// Channel the volume belongs to
    pub channel_id: String,
    /// Timeframe the volume belongs to
    pub timeframe_index: i32,
}

/// Lattice segmentation file listed in the index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatticeEntry {
    /// Segmentation identifier
    pub segmentation_id: String,
    /// Timeframe the segmentation belongs to
    pub timeframe_index: i32,
}

/// The archive's `index.json`
///
/// Maps keep entries sorted by path, which fixes the processing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveIndex {
    /// Volume files by path
    #[serde(default)]
    pub volumes: BTreeMap<String, VolumeEntry>,
    /// Lattice segmentation files by path
    #[serde(default)]
    pub lattice_segmentations: Option<BTreeMap<String, LatticeEntry>>,
    /// Path of the annotations document
    pub annotations: String,
    /// Path of the metadata document
    pub metadata: String,
    /// Path of the query document
    #[serde(default)]
    pub query: Option<String>,
}

impl ArchiveIndex {
    /// Lattice segmentations in path order
    pub fn lattice_entries(&self) -> impl Iterator<Item = (&String, &LatticeEntry)> {
        self.lattice_segmentations.iter().flatten()
    }

    /// Every path the index references
    pub fn referenced_paths(&self) -> impl Iterator<Item = &str> {
        self.volumes
            .keys()
            .chain(self.lattice_segmentations.iter().flat_map(|m| m.keys()))
            .map(String::as_str)
            .chain([self.annotations.as_str(), self.metadata.as_str()])
            .chain(self.query.as_deref())
    }

    /// Reject the index if any referenced path is unsafe
    pub fn validate_paths(&self) -> Result<(), ArchiveError> {
        self.referenced_paths().try_for_each(validate_path)
    }
}

/// Accept only relative, normalised, forward-slash paths that stay inside
/// the archive root
pub fn validate_path(path: &str) -> Result<(), ArchiveError> {
    let unsafe_path = || ArchiveError::UnsafePath(path.to_string());

    if path.is_empty() || path.starts_with('/') || path.contains('\\') || path.contains(':') {
        return Err(unsafe_path());
    }
    if path
        .split('/')
        .any(|part| part.is_empty() || part == "." || part == "..")
    {
        return Err(unsafe_path());
    }
    Ok(())
}
