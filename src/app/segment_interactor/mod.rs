// Segment interactor - Orchestrates the segment extraction use case

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::sync::OwnedMutexGuard;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::model::*;
use crate::domain::rules::*;
use crate::engine::{ensure_output, IntermediateFile, StreamExtractor, StreamMerger, UpstreamHeaders};
use crate::error::{SegmentError, SegmentResult};
use crate::planner::KeyframeProbe;
use crate::ports::*;
use crate::utils::format_timestamp;

pub const TITLE_ALREADY_EXISTS: &str = "Segment already exists";
pub const TITLE_AUDIO_FINISHED: &str = "Audio segment finished";
pub const TITLE_VIDEO_FINISHED: &str = "Video segment finished";
pub const TITLE_FINISHED: &str = "Segment finished";

/// Per-filename locks so identical requests run one at a time
#[derive(Debug, Default)]
pub struct JobLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl JobLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for the lock of `key`; released when the guard drops
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            // Entries nobody holds or waits on
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(key.to_string()).or_default())
        };
        lock.lock_owned().await
    }

    /// Number of keys currently tracked
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Settings a segment job needs besides its ports
#[derive(Debug, Clone)]
pub struct SegmentConfig {
    /// Final outputs and intermediates live here
    pub output_dir: PathBuf,
    /// Replaces the first path segment of local play URLs
    pub media_root: String,
    pub headers: UpstreamHeaders,
    pub serialize_duplicates: bool,
}

/// Interactor for the segment use case
pub struct SegmentInteractor {
    lookup: Arc<dyn ClipLookupPort>,
    resolver: Arc<dyn SourceResolverPort>,
    notifier: Arc<dyn NotifyPort>,
    probe: KeyframeProbe,
    extractor: StreamExtractor,
    merger: StreamMerger,
    output_dir: PathBuf,
    media_root: String,
    locks: Option<JobLocks>,
}

impl SegmentInteractor {
    /// Create new segment interactor with injected ports
    pub fn new(
        runner: Arc<dyn ProcessPort>,
        lookup: Arc<dyn ClipLookupPort>,
        resolver: Arc<dyn SourceResolverPort>,
        notifier: Arc<dyn NotifyPort>,
        config: SegmentConfig,
    ) -> Self {
        Self {
            lookup,
            resolver,
            notifier,
            probe: KeyframeProbe::new(Arc::clone(&runner), config.headers.clone()),
            extractor: StreamExtractor::new(Arc::clone(&runner), config.headers),
            merger: StreamMerger::new(runner),
            output_dir: config.output_dir,
            media_root: config.media_root,
            locks: config.serialize_duplicates.then(JobLocks::new),
        }
    }

    pub fn output_dir(&self) -> &std::path::Path {
        &self.output_dir
    }

    /// Produce the segment for `request`, or return the existing one
    pub async fn make(&self, request: SegmentRequest) -> SegmentResult<SegmentOutcome> {
        self.make_with_cancel(request, &CancellationToken::new()).await
    }

    /// Like [`make`](Self::make); a cancelled token kills the running tool
    pub async fn make_with_cancel(
        &self,
        request: SegmentRequest,
        cancel: &CancellationToken,
    ) -> SegmentResult<SegmentOutcome> {
        let range = TimeRange::parse(&request.start_time, &request.end_time)?;
        let filename = output_filename(request.clip_id, &range, request.audio_only);
        info!(
            clip_id = request.clip_id,
            filename = %filename,
            start = %format_timestamp(range.start.seconds),
            end = %format_timestamp(range.end.seconds),
            audio_only = request.audio_only,
            segment_name = ?request.segment_name,
            danmaku = request.danmaku,
            forward = request.forward,
            "Segment requested"
        );

        let clip = self.lookup.find_clip_by_id(request.clip_id).await?;

        let _guard = match &self.locks {
            Some(locks) => Some(locks.acquire(&filename).await),
            None => None,
        };

        let output_path = self.output_dir.join(&filename);
        if ensure_output("cache check", &output_path).await.is_ok() {
            info!(clip_id = clip.id, filename = %filename, "Segment already exists");
            self.notify(
                TITLE_ALREADY_EXISTS,
                &format!("{},{},{}", clip.id, clip.title, filename),
            )
            .await;
            return Ok(SegmentOutcome {
                filename,
                cache_hit: true,
            });
        }

        tokio::fs::create_dir_all(&self.output_dir).await?;

        let job = SegmentJob {
            clip,
            range,
            audio_only: request.audio_only,
            output_filename: filename,
        };

        let title = match job.clip.clip_type {
            ClipType::RemoteVideo => self.cut_remote(&job, cancel).await?,
            ClipType::LocalSource | ClipType::Live | ClipType::EndedLive => {
                self.cut_local(&job, cancel).await?
            }
            ClipType::Unresolved | ClipType::Resolving => {
                return Err(SegmentError::UnsupportedSource {
                    clip_id: job.clip.id,
                    clip_type: job.clip.clip_type.to_string(),
                })
            }
        };

        info!(clip_id = job.clip.id, filename = %job.output_filename, "Segment finished");
        self.notify(
            title,
            &format!(
                "{},{},{},{}",
                job.clip.id, job.clip.author_id, job.clip.title, job.output_filename
            ),
        )
        .await;

        Ok(SegmentOutcome {
            filename: job.output_filename,
            cache_hit: false,
        })
    }

    async fn cut_remote(
        &self,
        job: &SegmentJob,
        cancel: &CancellationToken,
    ) -> SegmentResult<&'static str> {
        let remote_id = remote_video_id(&job.clip)?;
        let content_id = self.resolver.resolve_content_id(&remote_id).await?;
        let urls = self
            .resolver
            .resolve_stream_urls(&remote_id, content_id)
            .await?;

        // Removed on any early return so a partial file never reads as cached
        let output = IntermediateFile::new(self.output_dir.join(&job.output_filename))?;
        let start = job.range.start.seconds;
        let end = job.range.end.seconds;

        if job.audio_only {
            self.extractor
                .extract(
                    "remote audio cut",
                    &MediaSource::Remote(urls.audio_url),
                    output.path(),
                    start,
                    end,
                    Track::Audio,
                    cancel,
                )
                .await?;
            output.keep()?;
            return Ok(TITLE_AUDIO_FINISHED);
        }

        // Both probes run together; the first failure drops the other
        let (keyframe_start, keyframe_end) = tokio::try_join!(
            self.probe
                .nearest_keyframe(&urls.video_url, start_keyframe_window(start), cancel),
            self.probe
                .nearest_keyframe(&urls.video_url, end_keyframe_window(end), cancel),
        )?;
        if keyframe_end <= keyframe_start {
            warn!(
                keyframe_start,
                keyframe_end, "End keyframe not after start keyframe; coarse cut will be empty"
            );
        }

        let raw_video = IntermediateFile::new(
            self.output_dir.join(raw_video_filename(&job.output_filename)),
        )?;
        let raw_audio = IntermediateFile::new(
            self.output_dir.join(raw_audio_filename(&job.output_filename)),
        )?;
        let merged =
            IntermediateFile::new(self.output_dir.join(merged_filename(&job.output_filename)))?;

        self.extractor
            .extract(
                "coarse video cut",
                &MediaSource::Remote(urls.video_url),
                raw_video.path(),
                keyframe_start,
                keyframe_end,
                Track::Video,
                cancel,
            )
            .await?;
        self.extractor
            .extract(
                "coarse audio cut",
                &MediaSource::Remote(urls.audio_url),
                raw_audio.path(),
                keyframe_start,
                keyframe_end,
                Track::Audio,
                cancel,
            )
            .await?;
        self.merger
            .merge(raw_video.path(), raw_audio.path(), merged.path(), cancel)
            .await?;

        let offsets = trim_offsets(&job.range, keyframe_start);
        debug!(
            trim_start = offsets.start,
            trim_end = offsets.end,
            "Trimming merged file"
        );
        self.extractor
            .extract(
                "final cut",
                &MediaSource::Local(merged.path().to_string_lossy().into_owned()),
                output.path(),
                offsets.start,
                offsets.end,
                Track::Video,
                cancel,
            )
            .await?;
        output.keep()?;

        for intermediate in [raw_video, raw_audio, merged] {
            if let Err(e) = intermediate.remove() {
                warn!(error = %e, "Failed to remove intermediate file");
            }
        }
        Ok(TITLE_VIDEO_FINISHED)
    }

    async fn cut_local(
        &self,
        job: &SegmentJob,
        cancel: &CancellationToken,
    ) -> SegmentResult<&'static str> {
        let source = MediaSource::Local(local_source_path(&job.clip, &self.media_root)?);
        let (step, track) = if job.audio_only {
            ("local audio cut", Track::Audio)
        } else {
            ("local video cut", Track::Video)
        };

        let output = IntermediateFile::new(self.output_dir.join(&job.output_filename))?;
        self.extractor
            .extract(
                step,
                &source,
                output.path(),
                job.range.start.seconds,
                job.range.end.seconds,
                track,
                cancel,
            )
            .await?;
        output.keep()?;
        Ok(TITLE_FINISHED)
    }

    async fn notify(&self, title: &str, body: &str) {
        if let Err(e) = self.notifier.push(title, body).await {
            warn!(title, error = %e, "Push notification failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_job_locks_serialize_same_key() {
        let locks = Arc::new(JobLocks::new());
        let guard = locks.acquire("clip-1.mp4").await;

        let waiting = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _second = locks.acquire("clip-1.mp4").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiting.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(5), waiting)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_job_locks_other_keys_do_not_wait() {
        let locks = JobLocks::new();
        let _a = locks.acquire("clip-1.mp4").await;
        let _b = tokio::time::timeout(Duration::from_secs(1), locks.acquire("clip-2.mp4"))
            .await
            .unwrap();
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn test_job_locks_prune_released_keys() {
        let locks = JobLocks::new();
        drop(locks.acquire("clip-1.mp4").await);
        let _b = locks.acquire("clip-2.mp4").await;
        assert_eq!(locks.len(), 1);
    }
}
