//! # Archive Conversion
//!
//! End-to-end driver: reads a segmentation archive, meshes every lattice
//! segmentation it lists and writes an output archive holding the copied
//! source files plus a `scene.json` with one mesh primitive per segment.
//!
//! Segmentation files are processed in sorted path order and decoded once
//! each. A file that fails to decode aborts the conversion. Failures of
//! individual segments are collected in the returned [`BatchReport`]. The
//! conversion fails with [`ConvertError::NoGeometry`] when no segment
//! produced a non-empty mesh; nothing is written in that case.
//!
//! ## Example
//!
//! ```no_run
//! use segmesh::convert::{ArchiveConverter, ConvertConfig};
//!
//! let converter = ArchiveConverter::with_config(ConvertConfig::default());
//! let outcome = converter.convert("emd-1832.cvsx", "emd-1832-meshes.zip")?;
//! println!("{}", outcome.stats);
//! # Ok::<(), segmesh::convert::ConvertError>(())
//! ```

mod error;


pub use error::ConvertError;

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::annotation::AnnotationTable;
use crate::archive::{ArchiveError, CvsxArchive, SceneDocument, SceneVolume, SceneWriter};
use crate::assembler::{AssemblerConfig, BatchReport, MeshAssembler};
use crate::volume::SegmentationVolumeModel;

/// Conversion settings
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertConfig {
    /// Per-segment pipeline settings
    pub assembler: AssemblerConfig,
    /// Copy the source volumes into the output archive
    pub include_volumes: bool,
    /// Creation time written to the scene; the scene carries none when unset
    pub created_at: Option<DateTime<Utc>>,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            assembler: AssemblerConfig::default(),
            include_volumes: true,
            created_at: None,
        }
    }
}

/// Statistics from a conversion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversionStats {
    /// Lattice segmentation files processed
    pub segmentations_processed: usize,
    /// Segments that produced a primitive
    pub segments_meshed: usize,
    /// Segments that failed to mesh
    pub segments_failed: usize,
    /// Annotation mismatches
    pub consistency_warnings: usize,
    /// Triangles across all primitives
    pub triangles: usize,
    /// Volumes copied to the output
    pub volumes_copied: usize,
    /// Size of the output archive in bytes
    pub output_bytes: u64,
}

impl ConversionStats {
    fn from_report(report: &BatchReport) -> Self {
        Self {
            segments_meshed: report.succeeded(),
            segments_failed: report.failures.len(),
            consistency_warnings: report.consistency_issues.len(),
            triangles: report.triangle_count(),
            ..Self::default()
        }
    }
}

impl fmt::Display for ConversionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Segmentations processed: {}", self.segmentations_processed)?;
        writeln!(f, "Segments meshed:         {}", self.segments_meshed)?;
        writeln!(f, "Segments failed:         {}", self.segments_failed)?;
        writeln!(f, "Consistency warnings:    {}", self.consistency_warnings)?;
        writeln!(f, "Triangles:               {}", self.triangles)?;
        writeln!(f, "Volumes copied:          {}", self.volumes_copied)?;
        write!(f, "Output size:             {} bytes", self.output_bytes)
    }
}

/// Result of a successful conversion
#[derive(Debug)]
pub struct ConversionOutcome {
    /// Summary counts
    pub stats: ConversionStats,
    /// Per-segment results
    pub report: BatchReport,
}

/// Converts segmentation archives into mesh scene archives
#[derive(Debug, Clone, Default)]
pub struct ArchiveConverter {
    config: ConvertConfig,
}

impl ArchiveConverter {
    /// Create a new converter with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new converter with custom configuration
    pub fn with_config(config: ConvertConfig) -> Self {
        Self { config }
    }

    /// Settings in use
    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Convert an archive on disk into an output archive on disk
    pub fn convert<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
    ) -> Result<ConversionOutcome, ConvertError> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();
        info!("Converting {} to {}", input_path.display(), output_path.display());

        let file = File::open(input_path).map_err(ArchiveError::from)?;
        let archive = CvsxArchive::from_reader(BufReader::new(file))?;

        let prepared = self.prepare(archive)?;
        let writer = SceneWriter::create(output_path)?;
        let (outcome, mut sink) = self.write(prepared, writer)?;
        sink.flush().map_err(ArchiveError::from)?;
        Ok(outcome)
    }

    /// Convert between in-memory or other seekable streams
    pub fn convert_streams<R, W>(&self, input: R, output: W) -> Result<(ConversionOutcome, W), ConvertError>
    where
        R: Read + Seek,
        W: Write + Seek,
    {
        let prepared = self.prepare(CvsxArchive::from_reader(input)?)?;
        self.write(prepared, SceneWriter::new(output))
    }

    fn prepare<R: Read + Seek>(&self, mut archive: CvsxArchive<R>) -> Result<Prepared, ConvertError> {
        let document = archive.annotations_document()?;
        let table = AnnotationTable::from_document(&document);
        let assembler = MeshAssembler::with_config(self.config.assembler.clone());

        let lattice: Vec<(String, String, i32)> = archive
            .index()
            .lattice_entries()
            .map(|(path, entry)| (path.clone(), entry.segmentation_id.clone(), entry.timeframe_index))
            .collect();
        if lattice.is_empty() {
            warn!("Archive lists no lattice segmentations");
        }

        let mut report = BatchReport::new();
        let mut segmentations = Vec::with_capacity(lattice.len());
        for (path, segmentation_id, timeframe) in lattice {
            let bytes = archive.read_entry(&path)?;
            let model = SegmentationVolumeModel::from_bytes(&bytes)
                .map_err(|source| ConvertError::Volume { path: path.clone(), source })?;
            if model.timeframe() != timeframe {
                debug!(
                    "{}: index timeframe {} differs from file timeframe {}; using the index",
                    path,
                    timeframe,
                    model.timeframe()
                );
            }
            let channel = model.channel_id().to_string();
            let model = model.with_time_channel(timeframe, channel);

            debug!("{}: grid {:?}", path, model.dims());
            report.merge(assembler.assemble(&model, &segmentation_id, &table));
            segmentations.push((path, bytes));
        }

        let mut volumes = Vec::new();
        if self.config.include_volumes {
            let entries: Vec<(String, String, i32)> = archive
                .index()
                .volumes
                .iter()
                .map(|(path, entry)| (path.clone(), entry.channel_id.clone(), entry.timeframe_index))
                .collect();
            for (path, channel_id, timeframe) in entries {
                let bytes = archive.read_entry(&path)?;
                volumes.push(PreparedVolume {
                    path,
                    channel_id,
                    timeframe,
                    bytes,
                });
            }
        }

        if !report.has_geometry() {
            return Err(ConvertError::NoGeometry {
                segments: report.succeeded() + report.failures.len(),
                failed: report.failures.len(),
            });
        }

        Ok(Prepared {
            name: document.name,
            table,
            report,
            segmentations,
            volumes,
        })
    }

    fn write<W: Write + Seek>(
        &self,
        prepared: Prepared,
        mut writer: SceneWriter<W>,
    ) -> Result<(ConversionOutcome, W), ConvertError> {
        let Prepared {
            name,
            table,
            report,
            segmentations,
            volumes,
        } = prepared;

        let mut scene = SceneDocument::new(name).with_created_at(self.config.created_at);
        for volume in &volumes {
            let path = writer.add_volume(&volume.path, &volume.bytes)?;
            let (color, opacity) = table.channel_color(&volume.channel_id);
            scene.volumes.push(SceneVolume {
                path,
                channel_id: volume.channel_id.clone(),
                timeframe: volume.timeframe,
                color,
                opacity,
            });
        }
        for (path, bytes) in &segmentations {
            writer.add_segmentation(path, bytes)?;
        }
        scene.extend_meshes(&report.primitives);

        let mut sink = writer.finish(&scene)?;
        let output_bytes = sink
            .seek(SeekFrom::End(0))
            .map_err(ArchiveError::from)?;

        let stats = ConversionStats {
            segmentations_processed: segmentations.len(),
            volumes_copied: volumes.len(),
            output_bytes,
            ..ConversionStats::from_report(&report)
        };
        info!(
            "Converted {} segmentations: {} segments meshed, {} failed, {} triangles",
            stats.segmentations_processed, stats.segments_meshed, stats.segments_failed, stats.triangles
        );
        Ok((ConversionOutcome { stats, report }, sink))
    }
}

struct PreparedVolume {
    path: String,
    channel_id: String,
    timeframe: i32,
    bytes: Vec<u8>,
}

struct Prepared {
    name: Option<String>,
    table: AnnotationTable,
    report: BatchReport,
    segmentations: Vec<(String, Vec<u8>)>,
    volumes: Vec<PreparedVolume>,
}
