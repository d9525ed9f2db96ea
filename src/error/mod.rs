//! Error handling module for the segmenter

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for segment operations
#[derive(Error, Debug)]
pub enum SegmentError {
    /// Time string does not match HH:MM:SS.mmm
    #[error("Invalid time format: {time}. Expected HH:MM:SS.mmm")]
    InvalidTime { time: String },

    /// Time range validation error
    #[error("Invalid time range: start ({start}) must be less than end ({end})")]
    InvalidTimeRange { start: String, end: String },

    /// Requested interval violates the caller-side length limits
    #[error("Segment interval of {length_secs}s is outside the allowed range {min_secs}s..={max_secs}s")]
    IntervalOutOfBounds {
        length_secs: f64,
        min_secs: f64,
        max_secs: f64,
    },

    /// Clip lookup returned nothing
    #[error("Clip not found: {clip_id}")]
    ClipNotFound { clip_id: i64 },

    /// Clip lookup collaborator failed
    #[error("Clip lookup failed: {message}")]
    Lookup { message: String },

    /// Clip type has no segment pipeline
    #[error("Clip {clip_id} has unsupported source type {clip_type}")]
    UnsupportedSource { clip_id: i64, clip_type: String },

    /// Play URL cannot be turned into a media source
    #[error("Invalid play url for clip {clip_id}: {play_url}")]
    InvalidPlayUrl { clip_id: i64, play_url: String },

    /// Upstream stream resolution failed
    #[error("Failed to resolve remote source: {message}")]
    Resolution { message: String },

    /// Media tool could not be started
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Media tool exited unsuccessfully
    #[error("{program} exited with code {exit_code:?}: {stderr}")]
    ProcessFailed {
        program: String,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// Probe output could not be parsed
    #[error("Failed to parse probe output: {message}")]
    ProbeParse { message: String },

    /// A step reported success but left no usable file behind
    #[error("{step} produced no output at {}", path.display())]
    MissingOutput { step: &'static str, path: PathBuf },

    /// Notification delivery failed
    #[error("Notification failed: {message}")]
    Notify { message: String },

    /// Job was cancelled while a media tool was running
    #[error("Segment job cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SegmentError {
    /// Build a resolution error from anything printable
    pub fn resolution(message: impl Into<String>) -> Self {
        SegmentError::Resolution {
            message: message.into(),
        }
    }

    /// Build a configuration error from anything printable
    pub fn config(message: impl Into<String>) -> Self {
        SegmentError::Config {
            message: message.into(),
        }
    }
}

/// Result type alias for segment operations
pub type SegmentResult<T> = std::result::Result<T, SegmentError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_output_message_names_step_and_path() {
        let err = SegmentError::MissingOutput {
            step: "merge",
            path: PathBuf::from("/tmp/a.merge.mp4"),
        };
        assert_eq!(err.to_string(), "merge produced no output at /tmp/a.merge.mp4");
    }

    #[test]
    fn test_process_failed_message() {
        let err = SegmentError::ProcessFailed {
            program: "ffmpeg".to_string(),
            exit_code: Some(1),
            stderr: "No such file".to_string(),
        };
        assert_eq!(err.to_string(), "ffmpeg exited with code Some(1): No such file");
    }
}
