use std::fs::{self, File};
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::error::ArchiveError;
use super::index::validate_path;
use crate::annotation::Rgb;
use crate::assembler::MeshPrimitive;
use crate::transform::to_column_major;

/// Name of the scene document inside the output archive
pub const SCENE_PATH: &str = "scene.json";

/// Tool that produced the scene
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratorInfo {
    /// Tool name
    pub name: String,
    /// Tool version
    pub version: String,
    /// Creation time, omitted unless set explicitly
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl GeneratorInfo {
    /// This crate, without a timestamp
    pub fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            created_at: None,
        }
    }
}

/// A volume rendered alongside the meshes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneVolume {
    /// Path inside the output archive
    pub path: String,
    /// Channel identifier
    pub channel_id: String,
    /// Timeframe index
    pub timeframe: i32,
    /// Display color
    pub color: Rgb,
    /// Opacity in `[0, 1]`
    pub opacity: f64,
}

/// A mesh primitive as stored in the scene document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneMesh {
    /// Segmentation identifier
    pub segmentation_id: String,
    /// Segment label
    pub segment_id: i32,
    /// Timeframe index
    pub timeframe: i32,
    /// Flat `x, y, z` vertex coordinates in grid-index space
    pub vertices: Vec<f32>,
    /// Flat triangle indices
    pub indices: Vec<u32>,
    /// Group of each triangle
    pub triangle_groups: Vec<u32>,
    /// Column-major instance transform
    pub transform: [f64; 16],
    /// Display color
    pub color: Rgb,
    /// Opacity in `[0, 1]`
    pub opacity: f64,
    /// Hover text
    pub tooltip: String,
}

impl From<&MeshPrimitive> for SceneMesh {
    fn from(primitive: &MeshPrimitive) -> Self {
        Self {
            segmentation_id: primitive.identity.segmentation_id.clone(),
            segment_id: primitive.identity.segment_id,
            timeframe: primitive.identity.timeframe,
            vertices: primitive.flat_vertices(),
            indices: primitive.flat_indices(),
            triangle_groups: primitive.triangle_groups.clone(),
            transform: to_column_major(&primitive.transform),
            color: primitive.color,
            opacity: primitive.opacity,
            tooltip: primitive.tooltip.clone(),
        }
    }
}

/// The viewer scene written as `scene.json`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneDocument {
    /// Provenance
    pub generator: GeneratorInfo,
    /// Entry name from the annotations document
    pub name: Option<String>,
    /// Volumes
    pub volumes: Vec<SceneVolume>,
    /// Segment meshes
    pub meshes: Vec<SceneMesh>,
}

impl SceneDocument {
    /// Empty scene stamped with the current generator
    pub fn new(name: Option<String>) -> Self {
        Self {
            generator: GeneratorInfo::current(),
            name,
            volumes: Vec::new(),
            meshes: Vec::new(),
        }
    }

    /// Record a creation time in the generator info
    pub fn with_created_at(mut self, created_at: Option<DateTime<Utc>>) -> Self {
        self.generator.created_at = created_at;
        self
    }

    /// Append primitives in order
    pub fn extend_meshes<'a>(&mut self, primitives: impl IntoIterator<Item = &'a MeshPrimitive>) {
        self.meshes.extend(primitives.into_iter().map(SceneMesh::from));
    }
}

/// Write side of the output archive
pub struct SceneWriter<W: Write + Seek> {
    zip: ZipWriter<W>,
}

impl SceneWriter<BufWriter<File>> {
    /// Create an archive on disk, creating parent directories as needed
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, ArchiveError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write + Seek> SceneWriter<W> {
    /// Write into any seekable sink
    pub fn new(writer: W) -> Self {
        Self {
            zip: ZipWriter::new(writer),
        }
    }

    fn options() -> SimpleFileOptions {
        SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default())
            .unix_permissions(0o644)
    }

    /// Copy a source volume file to `volumes/<path>`; returns its archive path
    pub fn add_volume(&mut self, path: &str, bytes: &[u8]) -> Result<String, ArchiveError> {
        self.add_file("volumes", path, bytes)
    }

    /// Copy a lattice segmentation file to `segmentations/<path>`; returns its
    /// archive path
    pub fn add_segmentation(&mut self, path: &str, bytes: &[u8]) -> Result<String, ArchiveError> {
        self.add_file("segmentations", path, bytes)
    }

    fn add_file(&mut self, dir: &str, source: &str, bytes: &[u8]) -> Result<String, ArchiveError> {
        validate_path(source)?;
        let path = format!("{}/{}", dir, source);
        validate_path(&path)?;
        self.zip.start_file(path.as_str(), Self::options())?;
        self.zip.write_all(bytes)?;
        Ok(path)
    }

    /// Write `scene.json` and close the archive
    pub fn finish(mut self, scene: &SceneDocument) -> Result<W, ArchiveError> {
        let json = serde_json::to_vec_pretty(scene).map_err(|source| ArchiveError::Json {
            document: SCENE_PATH.to_string(),
            source,
        })?;
        self.zip.start_file(SCENE_PATH, Self::options())?;
        self.zip.write_all(&json)?;
        Ok(self.zip.finish()?)
    }
}
