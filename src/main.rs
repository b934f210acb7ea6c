//! # segmesh
//!
//! Command-line converter from voxel segmentation archives to per-segment
//! triangle mesh scenes.
//!
//! ## Usage
//!
//! ```bash
//! # Mesh every lattice segmentation in an archive
//! segmesh convert emd-1832.cvsx emd-1832-meshes.zip
//!
//! # Summarise an archive
//! segmesh info emd-1832.cvsx
//!
//! # Dump the column blocks of a segmentation file
//! segmesh inspect lattice_0_0.bcif
//! ```

use anyhow::Result;
use clap::Parser;

mod cli;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(cli.verbosity());
    cli::dispatch(cli)
}
