// Business rules - naming, windows and source mapping for segment jobs

use crate::domain::model::*;
use crate::error::{SegmentError, SegmentResult};

/// Width of the keyframe search window on each side of the range
pub const KEYFRAME_SEARCH_WINDOW_SECS: f64 = 5.0;

/// Length of a Bilibili video id at the end of a play URL
pub const REMOTE_ID_LEN: usize = 12;

/// Output name shared by every identical request
pub fn output_filename(clip_id: i64, range: &TimeRange, audio_only: bool) -> String {
    let extension = if audio_only { "aac" } else { "mp4" };
    format!(
        "clip-{}-{}--{}.{}",
        clip_id,
        range.start.file_token(),
        range.end.file_token(),
        extension
    )
}

/// Intermediate names are derived from the job's own output name
pub fn raw_video_filename(output_filename: &str) -> String {
    format!("{}.raw.mp4", output_filename)
}

pub fn raw_audio_filename(output_filename: &str) -> String {
    format!("{}.raw.aac", output_filename)
}

pub fn merged_filename(output_filename: &str) -> String {
    format!("{}.merge.mp4", output_filename)
}

/// True for names produced by the three intermediate helpers above
pub fn is_intermediate_filename(name: &str) -> bool {
    name.starts_with("clip-")
        && (name.ends_with(".raw.mp4") || name.ends_with(".raw.aac") || name.ends_with(".merge.mp4"))
}

/// Window ending at `start`, clamped at zero
pub fn start_keyframe_window(start: f64) -> ProbeWindow {
    let from = if start > KEYFRAME_SEARCH_WINDOW_SECS {
        start - KEYFRAME_SEARCH_WINDOW_SECS
    } else {
        0.0
    };
    ProbeWindow { start: from, end: start }
}

/// Window starting at `end`
pub fn end_keyframe_window(end: f64) -> ProbeWindow {
    ProbeWindow {
        start: end,
        end: end + KEYFRAME_SEARCH_WINDOW_SECS,
    }
}

/// Offsets of the precise trim inside the keyframe-anchored merged file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrimOffsets {
    pub start: f64,
    pub end: f64,
}

impl TrimOffsets {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Re-cut bounds relative to the coarse cut's keyframe anchor
pub fn trim_offsets(range: &TimeRange, keyframe_start: f64) -> TrimOffsets {
    let lead_in = range.start.seconds - keyframe_start;
    TrimOffsets {
        start: lead_in,
        end: range.length() + lead_in,
    }
}

fn play_location(clip: &Clip) -> Option<&str> {
    clip.play_url
        .as_deref()
        .filter(|url| !url.is_empty())
        .or_else(|| clip.redirect_url.as_deref().filter(|url| !url.is_empty()))
}

/// Trailing video id of a remote clip's play URL
pub fn remote_video_id(clip: &Clip) -> SegmentResult<String> {
    let invalid = || SegmentError::InvalidPlayUrl {
        clip_id: clip.id,
        play_url: clip.play_url.clone().unwrap_or_default(),
    };
    let play_url = clip.play_url.as_deref().ok_or_else(invalid)?;

    let chars: Vec<char> = play_url.chars().collect();
    if chars.len() < REMOTE_ID_LEN {
        return Err(invalid());
    }
    Ok(chars[chars.len() - REMOTE_ID_LEN..].iter().collect())
}

/// Local clips: first path segment swapped for the configured media root
pub fn local_source_path(clip: &Clip, media_root: &str) -> SegmentResult<String> {
    let location = play_location(clip).ok_or_else(|| SegmentError::InvalidPlayUrl {
        clip_id: clip.id,
        play_url: String::new(),
    })?;

    let mut segments: Vec<&str> = location.split('/').collect();
    segments[0] = media_root;
    Ok(segments.join("/"))
}

/// Interval length limits enforced by the caller before a job is submitted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalLimits {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl IntervalLimits {
    pub const NORMAL: IntervalLimits = IntervalLimits {
        min_secs: 1.0,
        max_secs: 20.0 * 60.0,
    };

    pub const DANMAKU: IntervalLimits = IntervalLimits {
        min_secs: 10.0,
        max_secs: 10.0 * 60.0,
    };

    pub fn for_request(danmaku: bool) -> Self {
        if danmaku {
            Self::DANMAKU
        } else {
            Self::NORMAL
        }
    }
}

/// Caller-side interval check; the segment pipeline itself trusts its input
pub fn validate_interval(range: &TimeRange, limits: IntervalLimits) -> SegmentResult<()> {
    let length_secs = range.length();
    if length_secs < limits.min_secs || length_secs > limits.max_secs {
        return Err(SegmentError::IntervalOutOfBounds {
            length_secs,
            min_secs: limits.min_secs,
            max_secs: limits.max_secs,
        });
    }
    Ok(())
}
