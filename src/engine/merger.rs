//! Muxing of separately cut video and audio files

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::engine::artifacts::ensure_output;
use crate::engine::command::MediaCommand;
use crate::error::SegmentResult;
use crate::ports::ProcessPort;

/// Combines one video and one audio file into a single container
pub struct StreamMerger {
    runner: Arc<dyn ProcessPort>,
}

impl StreamMerger {
    pub fn new(runner: Arc<dyn ProcessPort>) -> Self {
        Self { runner }
    }

    pub async fn merge(
        &self,
        video: &Path,
        audio: &Path,
        destination: &Path,
        cancel: &CancellationToken,
    ) -> SegmentResult<()> {
        let command = MediaCommand::merge(video, audio, destination);
        self.runner.run(&command, cancel).await?;
        ensure_output("merge", destination).await?;

        info!(path = %destination.display(), "Merged video and audio");
        Ok(())
    }
}
