//! Zimu segmenter CLI
//!
//! Cuts time-ranged segments out of Bilibili videos and local recordings
//! with ffmpeg stream copy, anchoring remote cuts on keyframes.
//!
//! # Usage
//!
//! ```bash
//! segmenter segment --clip-id 42 --start 00:01:00.000 --end 00:02:00.000
//! segmenter filename --clip-id 42 --start 00:01:00.000 --end 00:02:00.000
//! segmenter probe --url video.mp4 --from 55 --to 60
//! segmenter sweep --dry-run
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::info;

use zimu_segmenter::adapters::tracing_log;
use zimu_segmenter::app::DefaultAppContainer;
use zimu_segmenter::cli::{commands, Cli, Commands};
use zimu_segmenter::config_initialization::initialize_configuration_hierarchy;

/// Main entry point for the segmenter
#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Filename prediction needs neither config nor logging
    if let Commands::Filename(args) = &cli.command {
        return commands::filename(args);
    }

    let settings = initialize_configuration_hierarchy(&cli)?;
    tracing_log::init(&settings.log.level, settings.log.json)?;
    info!("Starting zimu segmenter");

    let container = DefaultAppContainer::new(&settings)?;

    // Execute the requested command
    match cli.command {
        Commands::Segment(args) => {
            info!("Executing segment command");
            commands::segment(&container, args).await?;
        }
        Commands::Probe(args) => {
            info!("Executing probe command");
            commands::probe(&container, args).await?;
        }
        Commands::Sweep(args) => {
            info!("Executing sweep command");
            commands::sweep(&container, args)?;
        }
        Commands::Filename(args) => commands::filename(&args)?,
    }

    Ok(())
}
