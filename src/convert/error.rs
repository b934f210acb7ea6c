use crate::archive::ArchiveError;
use crate::volume::VolumeError;

/// Errors that abort an archive conversion
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Reading the input or writing the output archive failed
    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// A segmentation file could not be decoded
    #[error("Segmentation '{path}': {source}")]
    Volume {
        /// Archive path of the segmentation file
        path: String,
        /// Decoding failure
        #[source]
        source: VolumeError,
    },

    /// Every segment came out empty or failed
    #[error("No segment produced geometry ({segments} segments, {failed} failed)")]
    NoGeometry {
        /// Segments attempted
        segments: usize,
        /// Segments that failed
        failed: usize,
    },
}
