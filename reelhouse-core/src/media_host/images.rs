use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reelhouse_model::{AssetKind, ImageVariant, LocalFile, UploadedImage};
use reqwest::{Client, multipart::Form};
use serde::Deserialize;
use tracing::{error, info, instrument};

use super::{ImageHost, check_delete, file_part, read_envelope, urls};
use crate::config::{ApiToken, ImageHostConfig};
use crate::error::{CoreError, UploadError};

/// Client for a Cloudflare Images style API.
#[derive(Clone)]
pub struct ImagesClient {
    client: Client,
    api_base: String,
    account_id: String,
    api_token: ApiToken,
    delivery_url: String,
}

impl std::fmt::Debug for ImagesClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagesClient")
            .field("api_base", &self.api_base)
            .field("account_id", &self.account_id)
            .field("delivery_url", &self.delivery_url)
            .finish_non_exhaustive()
    }
}

impl ImagesClient {
    pub fn new(config: &ImageHostConfig) -> Result<Self, CoreError> {
        let account_id = config.account_id.clone().ok_or_else(|| {
            CoreError::Config("IMAGES_ACCOUNT_ID is not set".to_string())
        })?;
        let api_token = config.api_token.clone().ok_or_else(|| {
            CoreError::Config("IMAGES_API_TOKEN is not set".to_string())
        })?;
        let delivery_url = config.delivery_url.clone().ok_or_else(|| {
            CoreError::Config("IMAGES_DELIVERY_URL is not set".to_string())
        })?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CoreError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            account_id,
            api_token,
            delivery_url,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/accounts/{}/images/v1", self.api_base, self.account_id)
    }
}

#[async_trait]
impl ImageHost for ImagesClient {
    #[instrument(skip_all, fields(size_bytes = file.size_bytes))]
    async fn upload_image(
        &self,
        file: &LocalFile,
        title: Option<&str>,
    ) -> Result<UploadedImage, UploadError> {
        let mut form = Form::new().part("file", file_part(file, AssetKind::Image).await?);
        if let Some(title) = title {
            form = form.text("metadata", serde_json::json!({ "title": title }).to_string());
        }

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(self.api_token.expose())
            .multipart(form)
            .send()
            .await?;

        let result: HostedImage = read_envelope(response).await.inspect_err(|e| {
            if let UploadError::Rejected { status, body } = e {
                error!(status, body = %body, "image host rejected upload");
            }
        })?;

        info!(asset_id = %result.id, "image uploaded");
        Ok(result.into_uploaded(&self.delivery_url))
    }

    async fn delete_image(&self, asset_id: &str) -> Result<(), UploadError> {
        let response = self
            .client
            .delete(format!("{}/{}", self.endpoint(), asset_id))
            .bearer_auth(self.api_token.expose())
            .send()
            .await?;
        check_delete(response).await?;
        info!(asset_id, "image deleted");
        Ok(())
    }

    fn image_url(&self, asset_id: &str, variant: ImageVariant) -> String {
        urls::build_image_url(&self.delivery_url, asset_id, variant)
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct HostedImage {
    id: String,
    #[serde(default)]
    variants: Vec<String>,
    #[serde(default)]
    uploaded: Option<DateTime<Utc>>,
}

impl HostedImage {
    fn into_uploaded(self, delivery_url: &str) -> UploadedImage {
        let delivery_url = self.variants.into_iter().next().unwrap_or_else(|| {
            urls::build_image_url(delivery_url, &self.id, ImageVariant::Public)
        });
        UploadedImage {
            asset_id: self.id,
            delivery_url,
            uploaded_at: self.uploaded.unwrap_or_else(Utc::now),
        }
    }
}
