use std::fmt;

#[cfg(feature = "colorized_output")]
use console::style;

use super::error::SegmentError;
use super::primitive::MeshPrimitive;
use crate::annotation::ConsistencyError;

/// Outcome of assembling one or more segmentations
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Produced primitives, ordered by segmentation then segment id
    pub primitives: Vec<MeshPrimitive>,
    /// Segments that failed to mesh
    pub failures: Vec<SegmentError>,
    /// Annotation mismatches; the affected meshes are still produced
    pub consistency_issues: Vec<ConsistencyError>,
}

impl BatchReport {
    /// Empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Append another report, keeping its order after ours
    pub fn merge(&mut self, other: BatchReport) {
        self.primitives.extend(other.primitives);
        self.failures.extend(other.failures);
        self.consistency_issues.extend(other.consistency_issues);
    }

    /// Number of segments that produced a primitive
    pub fn succeeded(&self) -> usize {
        self.primitives.len()
    }

    /// Number of primitives with at least one triangle
    pub fn non_empty(&self) -> usize {
        self.primitives.iter().filter(|p| !p.is_empty()).count()
    }

    /// Total triangles across all primitives
    pub fn triangle_count(&self) -> usize {
        self.primitives.iter().map(MeshPrimitive::triangle_count).sum()
    }

    /// True when some segment produced non-empty geometry
    pub fn has_geometry(&self) -> bool {
        self.primitives.iter().any(|p| !p.is_empty())
    }

    /// Check if any segment failed
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Format the report with colors (requires console feature)
    pub fn format_colored(&self) -> String {
        #[cfg(feature = "colorized_output")]
        {
            use console::Emoji;

            static OK: Emoji<'_, '_> = Emoji("✓", "[OK]");
            static WARN: Emoji<'_, '_> = Emoji("⚠", "[WARN]");
            static FAIL: Emoji<'_, '_> = Emoji("✗", "[FAIL]");

            let mut output = String::new();
            output.push_str(&format!("{}\n", style("Segment Mesh Report").bold().cyan()));
            output.push_str(&format!("{}\n", style("===================").cyan()));

            for primitive in &self.primitives {
                output.push_str(&format!(
                    "[{}] {} - {} triangles\n",
                    OK,
                    style(&primitive.identity).green(),
                    primitive.triangle_count()
                ));
            }
            for issue in &self.consistency_issues {
                output.push_str(&format!("[{}] {}: {}\n", WARN, style("WARNING").yellow().bold(), issue));
            }
            for failure in &self.failures {
                output.push_str(&format!("[{}] {}: {}\n", FAIL, style("FAILED").red().bold(), failure));
            }

            output.push('\n');
            output.push_str(&format!(
                "{}: {} meshed ({} triangles), {} warnings, {} failed\n",
                style("Summary").bold(),
                style(self.succeeded()).green(),
                self.triangle_count(),
                style(self.consistency_issues.len()).yellow(),
                style(self.failures.len()).red()
            ));
            output
        }

        #[cfg(not(feature = "colorized_output"))]
        {
            format!("{}", self)
        }
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Segment Mesh Report")?;
        writeln!(f, "===================")?;

        for primitive in &self.primitives {
            writeln!(f, "[✓] {} - {} triangles", primitive.identity, primitive.triangle_count())?;
        }
        for issue in &self.consistency_issues {
            writeln!(f, "[⚠] WARNING: {}", issue)?;
        }
        for failure in &self.failures {
            writeln!(f, "[✗] FAILED: {}", failure)?;
        }

        writeln!(f)?;
        writeln!(
            f,
            "Summary: {} meshed ({} triangles), {} warnings, {} failed",
            self.succeeded(),
            self.triangle_count(),
            self.consistency_issues.len(),
            self.failures.len()
        )
    }
}
