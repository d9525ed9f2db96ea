//! Zimu segmenter library
//!
//! Keyframe-aware segment extraction for clips stored in the zimu backend.
//! Remote sources are cut coarsely on keyframes, merged and trimmed; local
//! sources are cut directly. All media work is delegated to ffmpeg/ffprobe.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod planner;
pub mod ports;
pub mod utils;

// Re-export commonly used types
pub use app::{SegmentConfig, SegmentInteractor};
pub use domain::model::{Clip, ClipType, SegmentOutcome, SegmentRequest, TimeRange};
pub use error::{SegmentError, SegmentResult};
