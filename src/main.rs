//! tilerom - compiles PNG artwork into tile-ROM store images

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use tilerom::{compile, write_outputs, CompilerConfig, JobSpec};

#[derive(Parser)]
#[command(name = "tilerom")]
#[command(about = "Compile PNG artwork into tile-ROM store images")]
#[command(version)]
struct Cli {
    /// Job description (JSON)
    #[arg(short, long)]
    input: PathBuf,

    /// Directory that image paths and outputs are relative to
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Where to dump tiles with too many colours (default: a new temp directory)
    #[arg(long)]
    bad_tile_dir: Option<PathBuf>,

    /// Lowest slot the fine store may fill freely
    #[arg(long, default_value_t = 0)]
    first_fine_slot: u32,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let job = JobSpec::load(&cli.input)
        .with_context(|| format!("Failed to load job description {}", cli.input.display()))?;

    let config = CompilerConfig {
        root_dir: cli.root,
        bad_tile_dir: cli.bad_tile_dir,
        fine_first_free_slot: cli.first_fine_slot,
    };

    let output = compile(&job, &config)
        .with_context(|| format!("Failed to compile {}", cli.input.display()))?;

    for path in write_outputs(&job, &config, &output).context("Failed to write outputs")? {
        info!("Wrote {}", path.display());
    }

    Ok(())
}
