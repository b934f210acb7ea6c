use crate::annotation::AnnotationError;

/// Errors raised while reading or writing archives
#[derive(Debug, thiserror::Error)]
pub enum ArchiveError {
    /// I/O error during file operations
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from the ZIP container library
    #[error("ZIP error: {0}")]
    ZipError(#[from] zip::result::ZipError),

    /// Error serializing/deserializing JSON
    #[error("JSON error in {document}: {source}")]
    Json {
        /// Archive path of the document
        document: String,
        /// Parser error
        #[source]
        source: serde_json::Error,
    },

    /// The annotations document is malformed
    #[error("Annotations error: {0}")]
    Annotations(#[from] AnnotationError),

    /// A referenced path could escape the archive root
    #[error("Unsafe archive path '{0}'")]
    UnsafePath(String),

    /// A referenced entry is not in the archive
    #[error("Archive entry not found: {0}")]
    MissingEntry(String),
}
