//! Stream-copy extraction of one track over a time range

use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::domain::model::{MediaSource, Track};
use crate::engine::artifacts::ensure_output;
use crate::engine::command::{MediaCommand, UpstreamHeaders};
use crate::error::SegmentResult;
use crate::ports::ProcessPort;

/// Cuts video-only or audio-only ranges without re-encoding
pub struct StreamExtractor {
    runner: Arc<dyn ProcessPort>,
    headers: UpstreamHeaders,
}

impl StreamExtractor {
    pub fn new(runner: Arc<dyn ProcessPort>, headers: UpstreamHeaders) -> Self {
        Self { runner, headers }
    }

    /// Cut `[start, end]` of `source` into `destination`
    ///
    /// `step` names the cut in logs and in `MissingOutput` errors.
    #[allow(clippy::too_many_arguments)]
    pub async fn extract(
        &self,
        step: &'static str,
        source: &MediaSource,
        destination: &Path,
        start: f64,
        end: f64,
        track: Track,
        cancel: &CancellationToken,
    ) -> SegmentResult<()> {
        let command = MediaCommand::extract(source, destination, start, end, track, &self.headers);
        debug!(step, command = %command, "Running extraction");

        self.runner.run(&command, cancel).await?;
        ensure_output(step, destination).await?;

        info!(step, path = %destination.display(), start, end, "Extraction finished");
        Ok(())
    }
}
