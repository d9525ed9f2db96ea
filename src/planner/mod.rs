//! Keyframe planning for keyframe-anchored cuts

pub mod keyframe_probe;

pub use keyframe_probe::{latest_keyframe, KeyframeProbe};
