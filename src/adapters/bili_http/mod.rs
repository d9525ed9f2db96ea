//! Bilibili web API adapter
//!
//! Resolves a `BV…` id into its cid and the DASH track URLs. Requests carry
//! the configured login cookie; failures are reported once, never retried.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, COOKIE, USER_AGENT};
use serde::Deserialize;
use tracing::{debug, info};

use crate::domain::model::StreamUrls;
use crate::error::{SegmentError, SegmentResult};
use crate::ports::SourceResolverPort;

/// Common `{code, message, data}` envelope of the web API
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    code: i64,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ViewData {
    cid: u64,
}

#[derive(Debug, Deserialize)]
struct PlayUrlData {
    dash: Option<Dash>,
}

#[derive(Debug, Deserialize)]
struct Dash {
    #[serde(default)]
    video: Vec<DashTrack>,
    #[serde(default)]
    audio: Vec<DashTrack>,
}

#[derive(Debug, Deserialize)]
struct DashTrack {
    #[serde(rename = "baseUrl")]
    base_url: String,
}

fn unwrap_envelope<T>(endpoint: &str, envelope: Envelope<T>) -> SegmentResult<T> {
    if envelope.code != 0 {
        return Err(SegmentError::resolution(format!(
            "{} returned code {}: {}",
            endpoint, envelope.code, envelope.message
        )));
    }
    envelope
        .data
        .ok_or_else(|| SegmentError::resolution(format!("{} returned no data", endpoint)))
}

/// Content id from a `/x/web-interface/view` response body
pub fn parse_view_response(body: &str) -> SegmentResult<u64> {
    let envelope: Envelope<ViewData> = serde_json::from_str(body)
        .map_err(|e| SegmentError::resolution(format!("malformed view response: {}", e)))?;
    Ok(unwrap_envelope("view", envelope)?.cid)
}

/// First video and audio track from a `/x/player/playurl` response body
pub fn parse_playurl_response(body: &str) -> SegmentResult<StreamUrls> {
    let envelope: Envelope<PlayUrlData> = serde_json::from_str(body)
        .map_err(|e| SegmentError::resolution(format!("malformed playurl response: {}", e)))?;
    let dash = unwrap_envelope("playurl", envelope)?
        .dash
        .ok_or_else(|| SegmentError::resolution("playurl response has no dash manifest"))?;

    let video_url = dash
        .video
        .into_iter()
        .next()
        .map(|track| track.base_url)
        .ok_or_else(|| SegmentError::resolution("dash manifest has no video track"))?;
    let audio_url = dash
        .audio
        .into_iter()
        .next()
        .map(|track| track.base_url)
        .ok_or_else(|| SegmentError::resolution("dash manifest has no audio track"))?;

    Ok(StreamUrls {
        video_url,
        audio_url,
    })
}

/// HTTP resolver against the Bilibili web API
pub struct BiliResolver {
    client: reqwest::Client,
    api_url: String,
    cookie: String,
    user_agent: String,
}

impl BiliResolver {
    pub fn new(
        client: reqwest::Client,
        api_url: impl Into<String>,
        cookie: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            cookie: cookie.into(),
            user_agent: user_agent.into(),
        }
    }

    fn headers(&self) -> SegmentResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.user_agent)
                .map_err(|e| SegmentError::config(format!("invalid user agent: {}", e)))?,
        );
        if !self.cookie.is_empty() {
            headers.insert(
                COOKIE,
                HeaderValue::from_str(&self.cookie)
                    .map_err(|e| SegmentError::config(format!("invalid cookie: {}", e)))?,
            );
        }
        Ok(headers)
    }

    async fn get_text(&self, url: &str, query: &[(&str, String)]) -> SegmentResult<String> {
        let response = self
            .client
            .get(url)
            .headers(self.headers()?)
            .query(query)
            .send()
            .await
            .map_err(|e| SegmentError::resolution(format!("request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SegmentError::resolution(format!(
                "{} returned HTTP {}",
                url,
                status.as_u16()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| SegmentError::resolution(format!("reading {} failed: {}", url, e)))
    }
}

#[async_trait]
impl SourceResolverPort for BiliResolver {
    async fn resolve_content_id(&self, remote_id: &str) -> SegmentResult<u64> {
        let url = format!("{}/x/web-interface/view", self.api_url);
        let body = self
            .get_text(&url, &[("bvid", remote_id.to_string())])
            .await?;
        let cid = parse_view_response(&body)?;
        info!(bvid = remote_id, cid, "Resolved content id");
        Ok(cid)
    }

    async fn resolve_stream_urls(
        &self,
        remote_id: &str,
        content_id: u64,
    ) -> SegmentResult<StreamUrls> {
        let url = format!("{}/x/player/playurl", self.api_url);
        let query = [
            ("bvid", remote_id.to_string()),
            ("cid", content_id.to_string()),
            ("qn", "120".to_string()),
            ("fnver", "0".to_string()),
            ("fnval", "16".to_string()),
            ("fourk", "1".to_string()),
        ];
        let body = self.get_text(&url, &query).await?;
        let urls = parse_playurl_response(&body)?;
        debug!(video = %urls.video_url, audio = %urls.audio_url, "Resolved stream urls");
        Ok(urls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_view_response() {
        let body = r#"{"code":0,"message":"0","ttl":1,"data":{"bvid":"BV1xx411c7mD","aid":2,"cid":3724723,"title":"t"}}"#;
        assert_eq!(parse_view_response(body).unwrap(), 3724723);
    }

    #[test]
    fn test_parse_view_response_error_code() {
        let body = r#"{"code":-404,"message":"not found","ttl":1}"#;
        let err = parse_view_response(body).unwrap_err();
        assert!(err.to_string().contains("-404"));
    }

    #[test]
    fn test_parse_playurl_takes_first_tracks() {
        let body = r#"{"code":0,"message":"0","data":{"quality":80,"dash":{
            "duration":120,
            "video":[{"id":80,"baseUrl":"https://cdn/v80.m4s","base_url":"https://cdn/v80.m4s"},{"id":64,"baseUrl":"https://cdn/v64.m4s"}],
            "audio":[{"id":30280,"baseUrl":"https://cdn/a280.m4s"},{"id":30216,"baseUrl":"https://cdn/a216.m4s"}]
        }}}"#;
        let urls = parse_playurl_response(body).unwrap();
        assert_eq!(urls.video_url, "https://cdn/v80.m4s");
        assert_eq!(urls.audio_url, "https://cdn/a280.m4s");
    }

    #[test]
    fn test_parse_playurl_without_audio_fails() {
        let body = r#"{"code":0,"data":{"dash":{"video":[{"baseUrl":"https://cdn/v.m4s"}],"audio":[]}}}"#;
        assert!(matches!(
            parse_playurl_response(body),
            Err(SegmentError::Resolution { .. })
        ));
    }

    #[test]
    fn test_parse_playurl_without_dash_fails() {
        let body = r#"{"code":0,"data":{"durl":[{"url":"https://cdn/x.flv"}]}}"#;
        assert!(parse_playurl_response(body).is_err());
        assert!(parse_playurl_response("<html>").is_err());
    }
}
