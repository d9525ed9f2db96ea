//! Media processing engine: command building, cutting and muxing

pub mod artifacts;
pub mod command;
pub mod extractor;
pub mod merger;

pub use artifacts::{ensure_output, IntermediateFile};
pub use command::{ExtractVariant, MediaCommand, MediaTool, UpstreamHeaders};
pub use extractor::StreamExtractor;
pub use merger::StreamMerger;
