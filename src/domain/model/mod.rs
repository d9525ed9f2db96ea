// Domain models - Core types and data structures

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SegmentError, SegmentResult};
use crate::utils::time::TimeParser;

/// Source type of a clip as stored by the CRUD layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ClipType {
    Unresolved,
    RemoteVideo,
    Resolving,
    LocalSource,
    Live,
    EndedLive,
}

impl TryFrom<u8> for ClipType {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(ClipType::Unresolved),
            1 => Ok(ClipType::RemoteVideo),
            2 => Ok(ClipType::Resolving),
            3 => Ok(ClipType::LocalSource),
            4 => Ok(ClipType::Live),
            5 => Ok(ClipType::EndedLive),
            other => Err(format!("unknown clip type {}", other)),
        }
    }
}

impl From<ClipType> for u8 {
    fn from(clip_type: ClipType) -> Self {
        match clip_type {
            ClipType::Unresolved => 0,
            ClipType::RemoteVideo => 1,
            ClipType::Resolving => 2,
            ClipType::LocalSource => 3,
            ClipType::Live => 4,
            ClipType::EndedLive => 5,
        }
    }
}

impl fmt::Display for ClipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self, u8::from(*self))
    }
}

/// Clip metadata, read-only to the segment pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    #[serde(rename = "type")]
    pub clip_type: ClipType,
    #[serde(default)]
    pub play_url: Option<String>,
    #[serde(default)]
    pub redirect_url: Option<String>,
}

/// One segment boundary: the normalized input text and its value in seconds
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentTime {
    pub text: String,
    pub seconds: f64,
}

impl SegmentTime {
    /// Normalize and parse an `HH:MM:SS.mmm` (or `HH:MM:SS,mmm`) string
    pub fn parse(time_str: &str) -> SegmentResult<Self> {
        let parser = TimeParser::new();
        let text = parser.normalize(time_str);
        let seconds = parser.parse_time(&text)?;
        Ok(Self { text, seconds })
    }

    /// Filesystem-safe form used in output names: colons and the first dot become dashes
    pub fn file_token(&self) -> String {
        self.text.replace(':', "-").replacen('.', "-", 1)
    }
}

impl fmt::Display for SegmentTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// Requested cut range
#[derive(Debug, Clone, PartialEq)]
pub struct TimeRange {
    pub start: SegmentTime,
    pub end: SegmentTime,
}

impl TimeRange {
    /// Create a new range; end must lie after start
    pub fn new(start: SegmentTime, end: SegmentTime) -> SegmentResult<Self> {
        if end.seconds <= start.seconds {
            return Err(SegmentError::InvalidTimeRange {
                start: start.text,
                end: end.text,
            });
        }
        Ok(Self { start, end })
    }

    /// Parse both boundaries and build a range
    pub fn parse(start: &str, end: &str) -> SegmentResult<Self> {
        Self::new(SegmentTime::parse(start)?, SegmentTime::parse(end)?)
    }

    pub fn length(&self) -> f64 {
        self.end.seconds - self.start.seconds
    }
}

/// Inbound segment request as issued by the CRUD layer
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SegmentRequest {
    pub clip_id: i64,
    pub start_time: String,
    pub end_time: String,
    pub segment_name: Option<String>,
    pub audio_only: bool,
    pub danmaku: bool,
    pub forward: bool,
}

impl SegmentRequest {
    /// Create a request with the required fields
    pub fn new(clip_id: i64, start_time: impl Into<String>, end_time: impl Into<String>) -> Self {
        Self {
            clip_id,
            start_time: start_time.into(),
            end_time: end_time.into(),
            ..Default::default()
        }
    }

    pub fn audio_only(mut self, audio_only: bool) -> Self {
        self.audio_only = audio_only;
        self
    }
}

/// Ephemeral state of one orchestration call
#[derive(Debug, Clone)]
pub struct SegmentJob {
    pub clip: Clip,
    pub range: TimeRange,
    pub audio_only: bool,
    pub output_filename: String,
}

/// Result of a segment job
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentOutcome {
    pub filename: String,
    #[serde(skip)]
    pub cache_hit: bool,
}

/// Separate video and audio track URLs of a remote video
#[derive(Debug, Clone, PartialEq)]
pub struct StreamUrls {
    pub video_url: String,
    pub audio_url: String,
}

/// Where a cut reads from
#[derive(Debug, Clone, PartialEq)]
pub enum MediaSource {
    /// Upstream CDN URL; needs the upstream headers
    Remote(String),
    /// Local file or local media server path
    Local(String),
}

impl MediaSource {
    pub fn location(&self) -> &str {
        match self {
            MediaSource::Remote(url) => url,
            MediaSource::Local(path) => path,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, MediaSource::Remote(_))
    }
}

/// Which elementary stream a cut keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Track {
    Video,
    Audio,
}

/// Time window handed to the keyframe probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeWindow {
    pub start: f64,
    pub end: f64,
}

impl ProbeWindow {
    /// `-read_intervals` argument value
    pub fn read_interval(&self) -> String {
        format!("{}%{}", self.start, self.end)
    }
}
