// Ports - Interface definitions (contracts)

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::model::*;
use crate::engine::command::MediaCommand;
use crate::error::SegmentResult;

/// Captured result of a media tool run that exited successfully
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    pub stdout: String,
    /// Last lines written to stderr
    pub stderr_tail: String,
}

/// Port for running ffmpeg/ffprobe
///
/// Implementations must return `ProcessFailed` for a non-zero exit and
/// `Cancelled` (after killing the child) when `cancel` fires.
#[async_trait]
pub trait ProcessPort: Send + Sync {
    async fn run(
        &self,
        command: &MediaCommand,
        cancel: &CancellationToken,
    ) -> SegmentResult<ProcessOutput>;
}

/// Port for clip metadata owned by the CRUD layer
#[async_trait]
pub trait ClipLookupPort: Send + Sync {
    /// Fetch a clip, `ClipNotFound` when it does not exist
    async fn find_clip_by_id(&self, clip_id: i64) -> SegmentResult<Clip>;
}

/// Port for best-effort job notifications
#[async_trait]
pub trait NotifyPort: Send + Sync {
    async fn push(&self, title: &str, body: &str) -> SegmentResult<()>;
}

/// Port for resolving remote video ids into stream URLs
#[async_trait]
pub trait SourceResolverPort: Send + Sync {
    /// Content id of the (first page of the) remote video
    async fn resolve_content_id(&self, remote_id: &str) -> SegmentResult<u64>;

    /// First video and audio track of the DASH manifest
    async fn resolve_stream_urls(&self, remote_id: &str, content_id: u64)
        -> SegmentResult<StreamUrls>;
}
