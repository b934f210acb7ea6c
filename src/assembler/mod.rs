//! # Mesh Assembly
//!
//! Runs the per-segment pipeline over every non-background label of a
//! segmentation and joins the results into [`MeshPrimitive`] records:
//!
//! ```text
//! distinct_labels ─┬─ extract ─ smooth ─ mesh ─ transform ─ annotate ─┐
//!                  ├─ ...                                              ├─ BatchReport
//!                  └─ ...                                              ┘
//! ```
//!
//! Segments are independent and run on the rayon pool when the `parallel`
//! feature is enabled. Results are collected in segment-id order regardless
//! of completion order. A failing segment is recorded in the report and does
//! not stop its siblings.

mod error;
mod primitive;
mod report;


pub use error::SegmentError;
pub use primitive::{MeshPrimitive, SegmentIdentity};
pub use report::BatchReport;

use log::{debug, info, warn};

use crate::annotation::{AnnotationResolver, AnnotationTable, ConsistencyError};
use crate::extract::extract_segment;
use crate::mesh::IsosurfaceMesher;
use crate::transform::{transform_for_grid, DEFAULT_ORIGIN_OFFSET};
use crate::volume::{SegmentId, SegmentationVolumeModel};

/// Per-segment pipeline settings
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblerConfig {
    /// Smoothing passes applied to each occupancy mask
    pub smooth_iterations: u32,
    /// Index-to-voxel-centre offset of the instance transform
    pub origin_offset: f64,
    /// Worker threads; `None` uses every core
    pub threads: Option<usize>,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            smooth_iterations: 1,
            origin_offset: DEFAULT_ORIGIN_OFFSET,
            threads: None,
        }
    }
}

struct SegmentOutcome {
    result: Result<MeshPrimitive, SegmentError>,
    consistency: Option<ConsistencyError>,
}

/// Builds one [`MeshPrimitive`] per segment of a segmentation
#[derive(Debug, Clone, Default)]
pub struct MeshAssembler {
    config: AssemblerConfig,
    mesher: IsosurfaceMesher,
}

impl MeshAssembler {
    /// Assembler with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Assembler with custom settings
    pub fn with_config(config: AssemblerConfig) -> Self {
        Self {
            config,
            mesher: IsosurfaceMesher::new(),
        }
    }

    /// Settings in use
    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Mesh every segment of `model`
    pub fn assemble(
        &self,
        model: &SegmentationVolumeModel,
        segmentation_id: &str,
        annotations: &AnnotationTable,
    ) -> BatchReport {
        let segments: Vec<SegmentId> = model.distinct_labels().into_iter().collect();
        info!(
            "Assembling {} segments of segmentation '{}' (timeframe {})",
            segments.len(),
            segmentation_id,
            model.timeframe()
        );

        let resolver = AnnotationResolver::new(annotations);
        let outcomes = self.map_segments(&segments, |segment| {
            self.assemble_segment(model, segmentation_id, &resolver, segment)
        });

        let mut report = BatchReport::new();
        for outcome in outcomes {
            if let Some(issue) = outcome.consistency {
                warn!("{}", issue);
                report.consistency_issues.push(issue);
            }
            match outcome.result {
                Ok(primitive) => report.primitives.push(primitive),
                Err(e) => {
                    warn!("{}", e);
                    report.failures.push(e);
                }
            }
        }

        info!(
            "Segmentation '{}': {} meshed, {} failed, {} triangles",
            segmentation_id,
            report.succeeded(),
            report.failures.len(),
            report.triangle_count()
        );
        report
    }

    /// Run the full pipeline for one segment
    pub fn assemble_one(
        &self,
        model: &SegmentationVolumeModel,
        segmentation_id: &str,
        annotations: &AnnotationTable,
        segment: SegmentId,
    ) -> Result<MeshPrimitive, SegmentError> {
        let resolver = AnnotationResolver::new(annotations);
        self.assemble_segment(model, segmentation_id, &resolver, segment).result
    }

    fn assemble_segment(
        &self,
        model: &SegmentationVolumeModel,
        segmentation_id: &str,
        resolver: &AnnotationResolver<'_>,
        segment: SegmentId,
    ) -> SegmentOutcome {
        let identity = SegmentIdentity {
            segmentation_id: segmentation_id.to_string(),
            segment_id: segment.get(),
            timeframe: model.timeframe(),
        };

        let consistency = resolver
            .check_consistency(segmentation_id, segment, model.timeframe())
            .err();

        let occupancy = extract_segment(model, segment, self.config.smooth_iterations);
        let mesh = match self.mesher.mesh(&occupancy) {
            Ok(mesh) => mesh,
            Err(source) => {
                return SegmentOutcome {
                    result: Err(SegmentError {
                        segmentation_id: identity.segmentation_id,
                        segment_id: identity.segment_id,
                        timeframe: identity.timeframe,
                        source,
                    }),
                    consistency,
                }
            }
        };

        let transform = transform_for_grid(occupancy.grid(), self.config.origin_offset);
        let resolved = resolver.resolve(segmentation_id, segment);
        debug!("Segment {}: {} triangles", identity, mesh.triangle_count());

        SegmentOutcome {
            result: Ok(MeshPrimitive {
                identity,
                triangle_groups: vec![0; mesh.indices.len()],
                vertices: mesh.vertices,
                normals: mesh.normals,
                indices: mesh.indices,
                transform,
                color: resolved.color,
                opacity: resolved.opacity,
                tooltip: resolved.tooltip,
            }),
            consistency,
        }
    }

    #[cfg(feature = "parallel")]
    fn map_segments<F>(&self, segments: &[SegmentId], f: F) -> Vec<SegmentOutcome>
    where
        F: Fn(SegmentId) -> SegmentOutcome + Sync + Send,
    {
        use rayon::prelude::*;

        let run = || segments.par_iter().map(|&s| f(s)).collect::<Vec<_>>();
        match self.config.threads {
            Some(threads) => match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
                Ok(pool) => pool.install(run),
                Err(e) => {
                    warn!("Could not build a {}-thread pool, using the global pool: {}", threads, e);
                    run()
                }
            },
            None => run(),
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn map_segments<F>(&self, segments: &[SegmentId], f: F) -> Vec<SegmentOutcome>
    where
        F: Fn(SegmentId) -> SegmentOutcome,
    {
        segments.iter().map(|&s| f(s)).collect()
    }
}
