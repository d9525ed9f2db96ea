//! Clip lookup against the zimu CRUD backend

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

use crate::domain::model::Clip;
use crate::error::{SegmentError, SegmentResult};
use crate::ports::ClipLookupPort;

/// `GET {api_url}/clips/{id}` client
pub struct ZimuClipLookup {
    client: reqwest::Client,
    api_url: String,
}

impl ZimuClipLookup {
    pub fn new(client: reqwest::Client, api_url: impl Into<String>) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn clip_url(&self, clip_id: i64) -> String {
        format!("{}/clips/{}", self.api_url, clip_id)
    }
}

#[async_trait]
impl ClipLookupPort for ZimuClipLookup {
    async fn find_clip_by_id(&self, clip_id: i64) -> SegmentResult<Clip> {
        let url = self.clip_url(clip_id);
        let lookup_error = |e: reqwest::Error| SegmentError::Lookup {
            message: format!("{}: {}", url, e),
        };

        let response = self.client.get(&url).send().await.map_err(lookup_error)?;
        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::NO_CONTENT => {
                return Err(SegmentError::ClipNotFound { clip_id })
            }
            status if !status.is_success() => {
                return Err(SegmentError::Lookup {
                    message: format!("{} returned HTTP {}", url, status.as_u16()),
                })
            }
            _ => {}
        }

        // The backend answers an unknown id with `null` rather than a 404
        let clip: Option<Clip> = response.json().await.map_err(lookup_error)?;
        let clip = clip.ok_or(SegmentError::ClipNotFound { clip_id })?;
        debug!(clip_id, title = %clip.title, clip_type = %clip.clip_type, "Fetched clip");
        Ok(clip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_url_trims_trailing_slash() {
        let lookup = ZimuClipLookup::new(reqwest::Client::new(), "http://localhost:4000/");
        assert_eq!(lookup.clip_url(42), "http://localhost:4000/clips/42");
    }
}
