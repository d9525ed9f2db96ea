//! Keyframe lookup over a bounded window of a remote stream

use std::sync::Arc;

use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::domain::model::ProbeWindow;
use crate::engine::command::{MediaCommand, UpstreamHeaders};
use crate::error::{SegmentError, SegmentResult};
use crate::ports::ProcessPort;

/// `ffprobe -show_frames -print_format json` output
#[derive(Debug, Deserialize)]
struct FrameReport {
    #[serde(default)]
    frames: Vec<FrameEntry>,
}

#[derive(Debug, Deserialize)]
struct FrameEntry {
    #[serde(default)]
    key_frame: i64,
    best_effort_timestamp_time: Option<String>,
}

/// Timestamp of the last keyframe in a frame report, `0.0` when there is none
pub fn latest_keyframe(report_json: &str) -> SegmentResult<f64> {
    let report: FrameReport =
        serde_json::from_str(report_json).map_err(|e| SegmentError::ProbeParse {
            message: e.to_string(),
        })?;

    let mut position = 0.0;
    for frame in report.frames.iter().filter(|frame| frame.key_frame == 1) {
        match frame
            .best_effort_timestamp_time
            .as_deref()
            .and_then(|ts| ts.parse::<f64>().ok())
        {
            Some(ts) => position = ts,
            None => debug!("Skipping keyframe without timestamp"),
        }
    }
    Ok(position)
}

/// Finds the keyframe a stream-copy cut has to start (or end) on
pub struct KeyframeProbe {
    runner: Arc<dyn ProcessPort>,
    headers: UpstreamHeaders,
}

impl KeyframeProbe {
    pub fn new(runner: Arc<dyn ProcessPort>, headers: UpstreamHeaders) -> Self {
        Self { runner, headers }
    }

    /// Latest keyframe inside `window`; only that slice of the stream is read
    pub async fn nearest_keyframe(
        &self,
        url: &str,
        window: ProbeWindow,
        cancel: &CancellationToken,
    ) -> SegmentResult<f64> {
        let command = MediaCommand::probe_frames(url, window, &self.headers);
        let output = self.runner.run(&command, cancel).await?;
        let position = latest_keyframe(&output.stdout)?;

        info!(
            window_start = window.start,
            window_end = window.end,
            keyframe = position,
            "Keyframe probe finished"
        );
        Ok(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_keyframe_wins() {
        let json = r#"{"frames":[
            {"media_type":"video","key_frame":1,"best_effort_timestamp_time":"57.600000"},
            {"media_type":"video","key_frame":0,"best_effort_timestamp_time":"57.633000"},
            {"media_type":"video","key_frame":1,"best_effort_timestamp_time":"60.100000"},
            {"media_type":"video","key_frame":0,"best_effort_timestamp_time":"62.000000"}
        ]}"#;
        assert_eq!(latest_keyframe(json).unwrap(), 60.1);
    }

    #[test]
    fn test_no_keyframe_falls_back_to_zero() {
        let json = r#"{"frames":[
            {"key_frame":0,"best_effort_timestamp_time":"12.0"},
            {"key_frame":0,"best_effort_timestamp_time":"12.5"}
        ]}"#;
        assert_eq!(latest_keyframe(json).unwrap(), 0.0);
        assert_eq!(latest_keyframe(r#"{"frames":[]}"#).unwrap(), 0.0);
        assert_eq!(latest_keyframe("{}").unwrap(), 0.0);
    }

    #[test]
    fn test_keyframe_without_timestamp_is_skipped() {
        let json = r#"{"frames":[
            {"key_frame":1,"best_effort_timestamp_time":"4.0"},
            {"key_frame":1}
        ]}"#;
        assert_eq!(latest_keyframe(json).unwrap(), 4.0);
    }

    #[test]
    fn test_malformed_report_is_an_error() {
        assert!(matches!(
            latest_keyframe("not json"),
            Err(SegmentError::ProbeParse { .. })
        ));
    }
}
