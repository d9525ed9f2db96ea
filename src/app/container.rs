use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::adapters::{
    BiliResolver, HttpPush, LogPush, Settings, TokioProcessAdapter, ZimuClipLookup,
};
use crate::app::{
    segment_interactor::{SegmentConfig, SegmentInteractor},
    sweep_interactor::SweepInteractor,
};
use crate::engine::UpstreamHeaders;
use crate::error::{SegmentError, SegmentResult};
use crate::planner::KeyframeProbe;
use crate::ports::{ClipLookupPort, NotifyPort, ProcessPort, SourceResolverPort};

pub trait AppContainer: Send + Sync {
    fn segment_interactor(&self) -> Arc<SegmentInteractor>;
    fn sweep_interactor(&self) -> Arc<SweepInteractor>;
    fn keyframe_probe(&self) -> Arc<KeyframeProbe>;
}

pub struct DefaultAppContainer {
    segment_interactor: Arc<SegmentInteractor>,
    sweep_interactor: Arc<SweepInteractor>,
    keyframe_probe: Arc<KeyframeProbe>,
}

impl DefaultAppContainer {
    pub fn new(settings: &Settings) -> SegmentResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.upstream.timeout_secs))
            .build()
            .map_err(|e| SegmentError::config(format!("Failed to build HTTP client: {}", e)))?;

        let headers = UpstreamHeaders {
            user_agent: settings.upstream.user_agent.clone(),
            referer: settings.upstream.referer.clone(),
        };

        let process_port = Arc::new(TokioProcessAdapter::new(
            settings.media.ffmpeg.clone(),
            settings.media.ffprobe.clone(),
        ));
        let lookup_port = Arc::new(ZimuClipLookup::new(
            client.clone(),
            settings.zimu.api_url.clone(),
        ));
        let resolver_port = Arc::new(BiliResolver::new(
            client,
            settings.upstream.api_url.clone(),
            settings.upstream.cookie.clone(),
            settings.upstream.user_agent.clone(),
        ));
        let notify_port: Arc<dyn NotifyPort> = match &settings.push.url {
            Some(url) => Arc::new(HttpPush::with_timeout(
                url.clone(),
                Duration::from_secs(settings.push.timeout_secs),
            )?),
            None => {
                info!("No push url configured; notifications go to the log");
                Arc::new(LogPush)
            }
        };

        let segment_interactor = Arc::new(SegmentInteractor::new(
            Arc::clone(&process_port) as Arc<dyn ProcessPort>,
            lookup_port as Arc<dyn ClipLookupPort>,
            resolver_port as Arc<dyn SourceResolverPort>,
            notify_port,
            SegmentConfig {
                output_dir: settings.segment.output_dir.clone(),
                media_root: settings.media.local_root.clone(),
                headers: headers.clone(),
                serialize_duplicates: settings.segment.serialize_duplicates,
            },
        ));

        let sweep_interactor = Arc::new(SweepInteractor::new(settings.segment.output_dir.clone()));

        let keyframe_probe = Arc::new(KeyframeProbe::new(
            process_port as Arc<dyn ProcessPort>,
            headers,
        ));

        Ok(Self {
            segment_interactor,
            sweep_interactor,
            keyframe_probe,
        })
    }
}

impl AppContainer for DefaultAppContainer {
    fn segment_interactor(&self) -> Arc<SegmentInteractor> {
        Arc::clone(&self.segment_interactor)
    }

    fn sweep_interactor(&self) -> Arc<SweepInteractor> {
        Arc::clone(&self.sweep_interactor)
    }

    fn keyframe_probe(&self) -> Arc<KeyframeProbe> {
        Arc::clone(&self.keyframe_probe)
    }
}
