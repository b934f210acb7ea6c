use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use log::info;
use std::path::PathBuf;

use segmesh::assembler::AssemblerConfig;
use segmesh::convert::{ArchiveConverter, ConvertConfig};

use super::config::Config;

/// Flags of the convert subcommand
pub struct ConvertArgs {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub smooth_iterations: Option<u32>,
    pub origin_offset: Option<f64>,
    pub threads: Option<usize>,
    pub no_volumes: bool,
}

/// Mesh every lattice segmentation of an archive
pub fn run(args: ConvertArgs) -> Result<()> {
    if !args.input.exists() {
        anyhow::bail!("Input file does not exist: {}", args.input.display());
    }

    let file_config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let mut config = resolve_config(&args, &file_config);
    config.created_at = source_date_epoch(std::env::var("SOURCE_DATE_EPOCH").ok().as_deref())?;

    let output = args.output.clone().unwrap_or_else(|| {
        let stem = args.input.file_stem().unwrap_or_default().to_string_lossy();
        args.input.with_file_name(format!("{}-meshes.zip", stem))
    });

    info!("segmesh - segmentation archive to meshes");
    info!("Input:  {}", args.input.display());
    info!("Output: {}", output.display());
    info!("Smoothing passes: {}", config.assembler.smooth_iterations);
    info!("Origin offset: {}", config.assembler.origin_offset);
    match config.assembler.threads {
        Some(n) => info!("Threads: {}", n),
        None => info!("Threads: all cores"),
    }

    let outcome = ArchiveConverter::with_config(config)
        .convert(&args.input, &output)
        .with_context(|| format!("Failed to convert {}", args.input.display()))?;

    println!("{}", outcome.report.format_colored());
    println!("{}", outcome.stats);
    Ok(())
}

/// Command-line flags override the config file, which overrides defaults
fn resolve_config(args: &ConvertArgs, file: &Config) -> ConvertConfig {
    let defaults = AssemblerConfig::default();
    let conversion = &file.conversion;
    ConvertConfig {
        assembler: AssemblerConfig {
            smooth_iterations: args
                .smooth_iterations
                .or(conversion.smooth_iterations)
                .unwrap_or(defaults.smooth_iterations),
            origin_offset: args
                .origin_offset
                .or(conversion.origin_offset)
                .unwrap_or(defaults.origin_offset),
            threads: args.threads.or(conversion.threads),
        },
        include_volumes: !args.no_volumes && conversion.include_volumes.unwrap_or(true),
        created_at: None,
    }
}

/// Scene timestamp from a `SOURCE_DATE_EPOCH` value in seconds
fn source_date_epoch(value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    let Some(value) = value else {
        return Ok(None);
    };
    let seconds: i64 = value
        .trim()
        .parse()
        .with_context(|| format!("Invalid SOURCE_DATE_EPOCH: {}", value))?;
    DateTime::from_timestamp(seconds, 0)
        .map(Some)
        .with_context(|| format!("SOURCE_DATE_EPOCH out of range: {}", value))
}
