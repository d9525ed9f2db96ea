//! Typed argument lists for the media tools

use std::fmt;
use std::path::Path;

use crate::domain::model::{MediaSource, ProbeWindow, Track};

/// External executable a command runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaTool {
    Ffmpeg,
    Ffprobe,
}

impl fmt::Display for MediaTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaTool::Ffmpeg => write!(f, "ffmpeg"),
            MediaTool::Ffprobe => write!(f, "ffprobe"),
        }
    }
}

/// Headers the upstream CDN insists on
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamHeaders {
    pub user_agent: String,
    pub referer: String,
}

impl UpstreamHeaders {
    fn push_args(&self, args: &mut Vec<String>) {
        args.push("-user_agent".to_string());
        args.push(self.user_agent.clone());
        args.push("-headers".to_string());
        args.push(format!("Referer: {}", self.referer));
    }
}

/// The four cut variants; their flags differ and must stay that way
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractVariant {
    pub remote: bool,
    pub track: Track,
}

impl ExtractVariant {
    pub fn new(source: &MediaSource, track: Track) -> Self {
        Self {
            remote: source.is_remote(),
            track,
        }
    }

    /// Remote audio is the only variant without `-accurate_seek`
    pub fn accurate_seek(&self) -> bool {
        !(self.remote && self.track == Track::Audio)
    }

    /// Only remote video needs `-seekable 1`
    pub fn force_seekable(&self) -> bool {
        self.remote && self.track == Track::Video
    }

    /// Local video cuts can start with small negative timestamps
    pub fn avoid_negative_ts(&self) -> bool {
        !self.remote && self.track == Track::Video
    }

    pub fn sends_upstream_headers(&self) -> bool {
        self.remote
    }
}

/// A fully built media tool invocation
#[derive(Debug, Clone, PartialEq)]
pub struct MediaCommand {
    pub tool: MediaTool,
    pub args: Vec<String>,
}

impl MediaCommand {
    /// Frame dump of one time window, JSON on stdout
    pub fn probe_frames(url: &str, window: ProbeWindow, headers: &UpstreamHeaders) -> Self {
        let mut args = vec![
            "-i".to_string(),
            url.to_string(),
            "-read_intervals".to_string(),
            window.read_interval(),
            "-show_frames".to_string(),
            "-hide_banner".to_string(),
            "-print_format".to_string(),
            "json".to_string(),
        ];
        headers.push_args(&mut args);

        Self {
            tool: MediaTool::Ffprobe,
            args,
        }
    }

    /// Stream-copy cut of `[start, end]` keeping one track
    pub fn extract(
        source: &MediaSource,
        destination: &Path,
        start: f64,
        end: f64,
        track: Track,
        headers: &UpstreamHeaders,
    ) -> Self {
        let variant = ExtractVariant::new(source, track);
        let mut args = vec!["-y".to_string(), "-ss".to_string(), start.to_string()];

        if variant.accurate_seek() {
            args.push("-accurate_seek".to_string());
        }
        if variant.force_seekable() {
            args.push("-seekable".to_string());
            args.push("1".to_string());
        }
        if variant.sends_upstream_headers() {
            headers.push_args(&mut args);
        }

        args.push("-i".to_string());
        args.push(source.location().to_string());
        args.push("-t".to_string());
        args.push((end - start).to_string());
        if track == Track::Audio {
            args.push("-vn".to_string());
        }
        args.push("-c".to_string());
        args.push("copy".to_string());
        if variant.avoid_negative_ts() {
            args.push("-avoid_negative_ts".to_string());
            args.push("1".to_string());
        }
        args.push(destination.to_string_lossy().into_owned());

        Self {
            tool: MediaTool::Ffmpeg,
            args,
        }
    }

    /// Mux a video file and an audio file without re-encoding
    pub fn merge(video: &Path, audio: &Path, destination: &Path) -> Self {
        let args = vec![
            "-y".to_string(),
            "-i".to_string(),
            video.to_string_lossy().into_owned(),
            "-i".to_string(),
            audio.to_string_lossy().into_owned(),
            "-c:v".to_string(),
            "copy".to_string(),
            "-c:a".to_string(),
            "copy".to_string(),
            destination.to_string_lossy().into_owned(),
        ];

        Self {
            tool: MediaTool::Ffmpeg,
            args,
        }
    }

    /// Last argument; ffmpeg commands write there
    pub fn destination(&self) -> Option<&str> {
        match self.tool {
            MediaTool::Ffmpeg => self.args.last().map(String::as_str),
            MediaTool::Ffprobe => None,
        }
    }
}

impl fmt::Display for MediaCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.tool, self.args.join(" "))
    }
}
