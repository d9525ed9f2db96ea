//! Job notification adapters

use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::error::{SegmentError, SegmentResult};
use crate::ports::NotifyPort;

/// Posts `{title, content}` to a push endpoint
pub struct HttpPush {
    client: reqwest::Client,
    url: String,
}

impl HttpPush {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Build with a dedicated client so a stalled endpoint cannot hold a
    /// finished job for the upstream timeout
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> SegmentResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()
            .map_err(|e| SegmentError::config(format!("Failed to build push client: {}", e)))?;
        Ok(Self::new(client, url))
    }
}

#[async_trait]
impl NotifyPort for HttpPush {
    async fn push(&self, title: &str, body: &str) -> SegmentResult<()> {
        let payload = serde_json::json!({
            "title": title,
            "content": body,
        });

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| SegmentError::Notify {
                message: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(SegmentError::Notify {
                message: format!("push endpoint returned HTTP {}", response.status().as_u16()),
            });
        }
        Ok(())
    }
}

/// Notifier used when no push endpoint is configured
#[derive(Debug, Default)]
pub struct LogPush;

#[async_trait]
impl NotifyPort for LogPush {
    async fn push(&self, title: &str, body: &str) -> SegmentResult<()> {
        info!(title, body, "Segment notification");
        Ok(())
    }
}
