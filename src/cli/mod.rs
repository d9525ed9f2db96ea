//! CLI module for the segmenter
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// Clip segment extractor
///
/// Cuts time ranges out of remote or local clip sources with ffmpeg stream copy.
#[derive(Parser, Debug)]
#[command(name = "segmenter")]
#[command(about = "Zimu segmenter - Keyframe-aware clip segment extraction")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (default: segmenter.toml or config/segmenter.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Logging level
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Directory for finished segments
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Cut a segment out of a clip
    Segment(args::SegmentArgs),
    /// Print the output filename of a segment without cutting it
    Filename(args::FilenameArgs),
    /// Find the latest keyframe inside a time window
    Probe(args::ProbeArgs),
    /// Remove intermediates left behind by interrupted jobs
    Sweep(args::SweepArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_segment_command() {
        let cli = Cli::try_parse_from([
            "segmenter",
            "--output-dir",
            "/tmp/out",
            "segment",
            "--clip-id",
            "42",
            "--start",
            "00:00:10,000",
            "--end",
            "00:00:20.000",
            "--audio-only",
        ])
        .unwrap();

        assert_eq!(cli.output_dir, Some(PathBuf::from("/tmp/out")));
        match cli.command {
            Commands::Segment(args) => {
                assert_eq!(args.clip_id, 42);
                assert_eq!(args.start, "00:00:10,000");
                assert!(args.audio_only);
                assert!(!args.danmaku);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_segment_requires_clip_id() {
        assert!(Cli::try_parse_from(["segmenter", "segment", "-s", "00:00:01.000", "-e", "00:00:02.000"]).is_err());
    }
}
