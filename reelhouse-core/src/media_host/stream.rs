use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reelhouse_model::{AssetKind, LocalFile, UploadedVideo};
use reqwest::{Client, multipart::Form};
use serde::Deserialize;
use tracing::{error, info, instrument};

use super::{VideoHost, check_delete, file_part, read_envelope, urls};
use crate::config::{ApiToken, StreamHostConfig};
use crate::error::{CoreError, UploadError};

/// Client for a Cloudflare Stream style video API.
#[derive(Clone)]
pub struct StreamClient {
    client: Client,
    api_base: String,
    account_id: String,
    api_token: ApiToken,
    customer_subdomain: Option<String>,
}

impl std::fmt::Debug for StreamClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamClient")
            .field("api_base", &self.api_base)
            .field("account_id", &self.account_id)
            .field("customer_subdomain", &self.customer_subdomain)
            .finish_non_exhaustive()
    }
}

impl StreamClient {
    pub fn new(config: &StreamHostConfig) -> Result<Self, CoreError> {
        let account_id = config.account_id.clone().ok_or_else(|| {
            CoreError::Config("STREAM_ACCOUNT_ID is not set".to_string())
        })?;
        let api_token = config.api_token.clone().ok_or_else(|| {
            CoreError::Config("STREAM_API_TOKEN is not set".to_string())
        })?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CoreError::Config(format!("failed to build HTTP client: {e}")))?;

        info!(api_base = %config.api_base, "video host client configured");

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            account_id,
            api_token,
            customer_subdomain: config.customer_subdomain.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/accounts/{}/stream", self.api_base, self.account_id)
    }

    fn to_uploaded(&self, result: StreamVideo, file: &LocalFile) -> UploadedVideo {
        let subdomain = self.customer_subdomain.as_deref();
        result.into_uploaded(file, subdomain)
    }
}

#[async_trait]
impl VideoHost for StreamClient {
    #[instrument(skip_all, fields(size_bytes = file.size_bytes))]
    async fn upload_video(&self, file: &LocalFile) -> Result<UploadedVideo, UploadError> {
        let form = Form::new().part("file", file_part(file, AssetKind::Video).await?);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.api_token.expose())
            .multipart(form)
            .send()
            .await?;

        let result: StreamVideo = read_envelope(response).await.inspect_err(|e| {
            if let UploadError::Rejected { status, body } = e {
                error!(status, body = %body, "video host rejected upload");
            }
        })?;

        info!(asset_id = %result.uid, "video uploaded");
        Ok(self.to_uploaded(result, file))
    }

    async fn delete_video(&self, asset_id: &str) -> Result<(), UploadError> {
        let response = self
            .client
            .delete(format!("{}/{}", self.endpoint(), asset_id))
            .bearer_auth(self.api_token.expose())
            .send()
            .await?;
        check_delete(response).await?;
        info!(asset_id, "video deleted");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StreamVideo {
    uid: String,
    #[serde(default)]
    thumbnail: Option<String>,
    #[serde(default)]
    preview: Option<String>,
    #[serde(default)]
    playback: Option<Playback>,
    #[serde(default)]
    duration: Option<f64>,
    #[serde(default)]
    created: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct Playback {
    #[serde(default)]
    hls: Option<String>,
}

impl StreamVideo {
    fn into_uploaded(self, file: &LocalFile, subdomain: Option<&str>) -> UploadedVideo {
        let playback_url = self
            .playback
            .and_then(|p| p.hls)
            .or(self.preview)
            .or_else(|| subdomain.map(|s| urls::stream_manifest_url(s, &self.uid)));
        let thumbnail_url = self
            .thumbnail
            .or_else(|| subdomain.map(|s| urls::stream_thumbnail_url(s, &self.uid)));

        UploadedVideo {
            // Negative durations mean the host is still encoding.
            duration_seconds: self.duration.filter(|d| *d >= 0.0),
            playback_url,
            thumbnail_url,
            original_name: file.declared_name.clone(),
            size_bytes: file.size_bytes,
            uploaded_at: self.created.unwrap_or_else(Utc::now),
            asset_id: self.uid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media_host::parse_envelope;

    fn file() -> LocalFile {
        LocalFile::new("/tmp/clip.mp4", 2048).with_name("clip.mp4")
    }

    #[test]
    fn maps_processed_video() {
        let body = r#"{
            "success": true,
            "errors": [],
            "result": {
                "uid": "ea95132c",
                "thumbnail": "https://customer-x.test/ea95132c/thumbnails/thumbnail.jpg",
                "preview": "https://customer-x.test/ea95132c/watch",
                "playback": { "hls": "https://customer-x.test/ea95132c/manifest/video.m3u8" },
                "duration": 12.5,
                "created": "2025-03-01T10:00:00Z"
            }
        }"#;
        let video: StreamVideo = parse_envelope(200, body).unwrap();
        let uploaded = video.into_uploaded(&file(), None);

        assert_eq!(uploaded.asset_id, "ea95132c");
        assert_eq!(
            uploaded.playback_url.as_deref(),
            Some("https://customer-x.test/ea95132c/manifest/video.m3u8")
        );
        assert_eq!(uploaded.duration_seconds, Some(12.5));
        assert_eq!(uploaded.original_name.as_deref(), Some("clip.mp4"));
        assert_eq!(uploaded.size_bytes, 2048);
        assert_eq!(uploaded.uploaded_at.to_rfc3339(), "2025-03-01T10:00:00+00:00");
    }

    #[test]
    fn still_processing_video_has_no_duration() {
        let body = r#"{
            "success": true,
            "result": { "uid": "abc", "preview": "https://p.test/abc/watch", "duration": -1 }
        }"#;
        let video: StreamVideo = parse_envelope(200, body).unwrap();
        let uploaded = video.into_uploaded(&file(), None);
        assert_eq!(uploaded.duration_seconds, None);
        assert_eq!(uploaded.playback_url.as_deref(), Some("https://p.test/abc/watch"));
        assert_eq!(uploaded.thumbnail_url, None);
    }

    #[test]
    fn falls_back_to_customer_subdomain_urls() {
        let body = r#"{ "success": true, "result": { "uid": "abc" } }"#;
        let video: StreamVideo = parse_envelope(200, body).unwrap();
        let uploaded = video.into_uploaded(&file(), Some("customer-x.test"));
        assert_eq!(
            uploaded.playback_url.as_deref(),
            Some("https://customer-x.test/abc/manifest/video.m3u8")
        );
        assert_eq!(
            uploaded.thumbnail_url.as_deref(),
            Some("https://customer-x.test/abc/thumbnails/thumbnail.jpg")
        );
    }

    #[test]
    fn client_requires_credentials() {
        let config = StreamHostConfig {
            api_base: "https://api.test".to_string(),
            account_id: None,
            api_token: None,
            customer_subdomain: None,
            timeout: std::time::Duration::from_secs(5),
        };
        assert!(matches!(StreamClient::new(&config), Err(CoreError::Config(_))));
    }
}
