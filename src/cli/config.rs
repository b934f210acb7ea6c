//! TOML configuration file support.
//!
//! Settings can live in a config file instead of CLI flags. Flags given on
//! the command line override the file:
//!
//! ```toml
//! # segmesh.toml
//! [conversion]
//! smooth_iterations = 2
//! origin_offset = 0.5
//! threads = 8
//! include_volumes = true
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Root configuration structure for segmesh.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Conversion-specific settings.
    #[serde(default)]
    pub conversion: ConversionConfig,
}

/// Configuration for the convert command.
#[derive(Debug, Default, Deserialize)]
pub struct ConversionConfig {
    /// Smoothing passes per segment mask.
    pub smooth_iterations: Option<u32>,

    /// Index to voxel-centre offset of the instance transform.
    pub origin_offset: Option<f64>,

    /// Worker threads for per-segment meshing.
    pub threads: Option<usize>,

    /// Copy source volumes into the output archive.
    pub include_volumes: Option<bool>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}
