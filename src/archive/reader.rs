use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use log::debug;
use zip::ZipArchive;

use super::error::ArchiveError;
use super::index::{validate_path, ArchiveIndex};
use crate::annotation::{AnnotationError, AnnotationTable, AnnotationsDocument};

/// Name of the index document at the archive root
pub const INDEX_PATH: &str = "index.json";

/// Read side of a segmentation archive
///
/// Every path the index references is checked on open, before any entry is
/// read.
pub struct CvsxArchive<R: Read + Seek> {
    archive: ZipArchive<R>,
    index: ArchiveIndex,
}

impl CvsxArchive<BufReader<File>> {
    /// Open an archive on disk
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ArchiveError> {
        let file = File::open(path.as_ref())?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> CvsxArchive<R> {
    /// Read an archive from any seekable source
    pub fn from_reader(reader: R) -> Result<Self, ArchiveError> {
        let mut archive = ZipArchive::new(reader)?;
        let bytes = read_zip_entry(&mut archive, INDEX_PATH)?;
        let index: ArchiveIndex = serde_json::from_slice(&bytes).map_err(|source| ArchiveError::Json {
            document: INDEX_PATH.to_string(),
            source,
        })?;
        index.validate_paths()?;

        debug!(
            "Archive index: {} volumes, {} lattice segmentations",
            index.volumes.len(),
            index.lattice_entries().count()
        );
        Ok(Self { archive, index })
    }

    /// The parsed index document
    pub fn index(&self) -> &ArchiveIndex {
        &self.index
    }

    /// Names of all entries in the container
    pub fn entry_names(&self) -> Vec<String> {
        self.archive.file_names().map(str::to_string).collect()
    }

    /// Raw bytes of an entry
    pub fn read_entry(&mut self, path: &str) -> Result<Vec<u8>, ArchiveError> {
        validate_path(path)?;
        read_zip_entry(&mut self.archive, path)
    }

    /// Parse the annotations document
    pub fn annotations_document(&mut self) -> Result<AnnotationsDocument, ArchiveError> {
        let path = self.index.annotations.clone();
        let bytes = self.read_entry(&path)?;
        Ok(AnnotationsDocument::from_slice(&bytes).map_err(AnnotationError::from)?)
    }

    /// Parse and index the annotations document
    pub fn annotations(&mut self) -> Result<AnnotationTable, ArchiveError> {
        Ok(AnnotationTable::from_document(&self.annotations_document()?))
    }

    /// The metadata document as untyped JSON
    pub fn metadata(&mut self) -> Result<serde_json::Value, ArchiveError> {
        let path = self.index.metadata.clone();
        let bytes = self.read_entry(&path)?;
        serde_json::from_slice(&bytes).map_err(|source| ArchiveError::Json { document: path, source })
    }
}

fn read_zip_entry<R: Read + Seek>(archive: &mut ZipArchive<R>, path: &str) -> Result<Vec<u8>, ArchiveError> {
    let mut entry = match archive.by_name(path) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => return Err(ArchiveError::MissingEntry(path.to_string())),
        Err(e) => return Err(e.into()),
    };
    // Preallocate at most the stored length
    let mut bytes = Vec::with_capacity(entry.size().min(entry.compressed_size()) as usize);
    entry.read_to_end(&mut bytes)?;
    Ok(bytes)
}
