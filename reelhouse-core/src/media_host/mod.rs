//! Remote media hosts: a video streaming service and an image delivery
//! service. Both are consumed through the [`VideoHost`] / [`ImageHost`]
//! traits so the upload pipeline can be exercised without a network.

pub mod images;
pub mod stream;
pub mod urls;

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reelhouse_model::{
    AssetKind, ImageVariant, LocalFile, UploadedImage, UploadedVideo,
    extension_for_mime,
};
use reqwest::{Body, multipart::Part};
use serde::{Deserialize, de::DeserializeOwned};
use tokio_util::io::ReaderStream;
use url::Url;

use crate::error::UploadError;

pub use images::ImagesClient;
pub use stream::StreamClient;
pub use urls::{build_image_url, stream_manifest_url, stream_thumbnail_url};

#[async_trait]
pub trait VideoHost: Send + Sync {
    async fn upload_video(&self, file: &LocalFile) -> Result<UploadedVideo, UploadError>;

    async fn delete_video(&self, asset_id: &str) -> Result<(), UploadError>;
}

#[async_trait]
pub trait ImageHost: Send + Sync {
    /// `title` is sent as upload metadata when present.
    async fn upload_image(
        &self,
        file: &LocalFile,
        title: Option<&str>,
    ) -> Result<UploadedImage, UploadError>;

    async fn delete_image(&self, asset_id: &str) -> Result<(), UploadError>;

    fn image_url(&self, asset_id: &str, variant: ImageVariant) -> String;
}

/// Name sent to the host when the picker did not supply one. The extension
/// follows `mime`, or the kind's default type when `mime` is not known.
pub fn default_upload_name(
    kind: AssetKind,
    mime: &str,
    now: DateTime<Utc>,
) -> String {
    let millis = now.timestamp_millis();
    let ext = match extension_for_mime(mime) {
        "unknown" => extension_for_mime(kind.default_mime_type()),
        ext => ext,
    };
    match kind {
        AssetKind::Video => format!("video_{millis}.{ext}"),
        AssetKind::Image => format!("thumbnail_{millis}.{ext}"),
    }
}

/// Accepts plain paths and `file://` URIs.
pub(crate) fn resolve_local_path(local_uri: &str) -> Result<PathBuf, UploadError> {
    if local_uri.starts_with("file://") {
        let url = Url::parse(local_uri).map_err(|e| {
            UploadError::Malformed(format!("invalid file uri '{local_uri}': {e}"))
        })?;
        return url.to_file_path().map_err(|_| {
            UploadError::Malformed(format!("'{local_uri}' is not a local file"))
        });
    }
    Ok(PathBuf::from(local_uri))
}

/// Streams the file from disk into a multipart part without buffering it.
pub(crate) async fn file_part(
    file: &LocalFile,
    kind: AssetKind,
) -> Result<Part, UploadError> {
    let path = resolve_local_path(&file.local_uri)?;
    let handle = tokio::fs::File::open(&path).await?;
    let length = handle.metadata().await?.len();

    let mime = file.mime_type_or(kind);
    let name = file
        .declared_name
        .clone()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| default_upload_name(kind, mime, Utc::now()));

    Part::stream_with_length(Body::wrap_stream(ReaderStream::new(handle)), length)
        .file_name(name)
        .mime_str(mime)
        .map_err(|e| UploadError::Malformed(format!("invalid mime type: {e}")))
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// Unwraps the `{ success, errors, result }` envelope both hosts use.
pub(crate) fn parse_envelope<T: DeserializeOwned>(
    status: u16,
    body: &str,
) -> Result<T, UploadError> {
    if !(200..300).contains(&status) {
        return Err(UploadError::Rejected {
            status,
            body: body.to_string(),
        });
    }

    let envelope: Envelope<T> = serde_json::from_str(body).map_err(|e| {
        UploadError::Malformed(format!("response is not a valid envelope: {e}"))
    })?;

    if !envelope.success {
        if let Some(first) = envelope.errors.first() {
            tracing::debug!(
                code = first.code,
                message = %first.message,
                "media host reported failure"
            );
        }
        return Err(UploadError::Rejected {
            status,
            body: body.to_string(),
        });
    }

    envelope
        .result
        .ok_or_else(|| UploadError::Malformed("envelope has no result".to_string()))
}

/// Reads the response body and hands it to [`parse_envelope`].
pub(crate) async fn read_envelope<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, UploadError> {
    let status = response.status().as_u16();
    let body = response.text().await?;
    parse_envelope(status, &body)
}

/// Delete endpoints may answer with an empty body; only the status matters.
pub(crate) async fn check_delete(response: reqwest::Response) -> Result<(), UploadError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body = response.text().await.unwrap_or_default();
    Err(UploadError::Rejected {
        status: status.as_u16(),
        body,
    })
}
