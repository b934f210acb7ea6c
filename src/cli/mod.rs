use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod config;
mod convert;
mod info;
mod inspect;

/// segmesh - voxel segmentation to mesh converter
#[derive(Parser)]
#[command(name = "segmesh")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Verbosity level (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mesh every lattice segmentation of an archive
    Convert {
        /// Input archive
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Output archive (defaults to <INPUT stem>-meshes.zip)
        #[arg(value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// TOML configuration file
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Smoothing passes per segment mask
        #[arg(short = 's', long)]
        smooth_iterations: Option<u32>,

        /// Index to voxel-centre offset of the instance transform
        #[arg(long)]
        origin_offset: Option<f64>,

        /// Worker threads (defaults to all cores)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Leave source volumes out of the output archive
        #[arg(long)]
        no_volumes: bool,
    },

    /// Show the contents of an archive
    Info {
        /// Archive to describe
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Dump the blocks, categories and columns of a column block file
    Inspect {
        /// Column block file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

impl Cli {
    pub fn verbosity(&self) -> u8 {
        self.verbose
    }
}

pub fn init_logging(verbosity: u8) {
    let log_level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();
}

pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Convert {
            input,
            output,
            config,
            smooth_iterations,
            origin_offset,
            threads,
            no_volumes,
        } => convert::run(convert::ConvertArgs {
            input,
            output,
            config,
            smooth_iterations,
            origin_offset,
            threads,
            no_volumes,
        }),
        Commands::Info { file } => info::run(file),
        Commands::Inspect { file } => inspect::run(file),
    }
}
