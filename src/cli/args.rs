//! Command-line argument definitions

use clap::Args;

/// Arguments for the segment command
#[derive(Args, Debug)]
pub struct SegmentArgs {
    /// Clip id in the CRUD backend
    #[arg(long)]
    pub clip_id: i64,

    /// Start time (HH:MM:SS.mmm, comma accepted as decimal mark)
    #[arg(short, long)]
    pub start: String,

    /// End time (HH:MM:SS.mmm, comma accepted as decimal mark)
    #[arg(short, long)]
    pub end: String,

    /// Display name of the segment
    #[arg(long)]
    pub name: Option<String>,

    /// Cut the audio track only
    #[arg(long)]
    pub audio_only: bool,

    /// Danmaku segment; applies the stricter interval limits
    #[arg(long)]
    pub danmaku: bool,

    /// Forward flag passed through from the caller
    #[arg(long)]
    pub forward: bool,

    /// Print `{"filename": ...}` instead of the bare filename
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the filename command
#[derive(Args, Debug)]
pub struct FilenameArgs {
    #[arg(long)]
    pub clip_id: i64,

    #[arg(short, long)]
    pub start: String,

    #[arg(short, long)]
    pub end: String,

    #[arg(long)]
    pub audio_only: bool,
}

/// Arguments for the probe command
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Stream URL or local file
    #[arg(long)]
    pub url: String,

    /// Window start in seconds
    #[arg(long)]
    pub from: f64,

    /// Window end in seconds
    #[arg(long)]
    pub to: f64,
}

/// Arguments for the sweep command
#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Only list what would be removed
    #[arg(long)]
    pub dry_run: bool,

    /// Skip intermediates modified within this many seconds
    #[arg(long, default_value = "3600")]
    pub min_age_secs: u64,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
