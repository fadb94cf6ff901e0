//! Turns a locally selected file into a hosted asset while reporting coarse
//! progress.

pub mod progress;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reelhouse_model::{
    AssetKind, ImageVariant, LocalFile, UploadedImage, UploadedVideo,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::DEFAULT_MAX_VIDEO_BYTES;
use crate::error::{CoreError, Result, UploadError};
use crate::media_host::{ImageHost, VideoHost};

pub use progress::{NoProgress, ProgressSink, ProgressTicker, progress_steps};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Videos above this size are rejected before any network call.
    pub max_video_bytes: u64,
    pub progress_interval: Duration,
    pub progress_step: u8,
    /// Highest synthetic value; 100 is only reported once the host answers.
    pub progress_cap: u8,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_video_bytes: DEFAULT_MAX_VIDEO_BYTES,
            progress_interval: Duration::from_millis(200),
            progress_step: 5,
            progress_cap: 95,
        }
    }
}

/// Uploads assets to the configured hosts. Holds no per-upload state, so a
/// single pipeline can serve concurrent uploads.
#[derive(Clone)]
pub struct UploadPipeline {
    videos: Arc<dyn VideoHost>,
    images: Arc<dyn ImageHost>,
    policy: UploadPolicy,
}

impl std::fmt::Debug for UploadPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadPipeline")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl UploadPipeline {
    pub fn new(
        videos: Arc<dyn VideoHost>,
        images: Arc<dyn ImageHost>,
        policy: UploadPolicy,
    ) -> Self {
        Self {
            videos,
            images,
            policy,
        }
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    pub fn video_host(&self) -> &Arc<dyn VideoHost> {
        &self.videos
    }

    pub fn image_host(&self) -> &Arc<dyn ImageHost> {
        &self.images
    }

    pub fn image_url(&self, asset_id: &str, variant: ImageVariant) -> String {
        self.images.image_url(asset_id, variant)
    }

    pub fn check_video_size(&self, file: &LocalFile) -> Result<()> {
        if file.size_bytes > self.policy.max_video_bytes {
            return Err(CoreError::PayloadTooLarge {
                size_bytes: file.size_bytes,
                limit_bytes: self.policy.max_video_bytes,
            });
        }
        Ok(())
    }

    pub async fn upload_video(
        &self,
        file: &LocalFile,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<UploadedVideo> {
        self.check_video_size(file)?;

        let video = self
            .drive(AssetKind::Video, self.videos.upload_video(file), sink, cancel)
            .await?;
        info!(
            asset_id = %video.asset_id,
            size_bytes = file.size_bytes,
            "video upload complete"
        );
        Ok(video)
    }

    /// Images have no size ceiling.
    pub async fn upload_image(
        &self,
        file: &LocalFile,
        title: Option<&str>,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<UploadedImage> {
        let image = self
            .drive(
                AssetKind::Image,
                self.images.upload_image(file, title),
                sink,
                cancel,
            )
            .await?;
        info!(asset_id = %image.asset_id, "image upload complete");
        Ok(image)
    }

    /// Races the host call against cancellation while feeding synthetic
    /// progress to `sink`. The ticker lives only for the duration of this
    /// call.
    async fn drive<T, F>(
        &self,
        kind: AssetKind,
        upload: F,
        sink: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, UploadError>>,
    {
        if cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }

        let mut ticker = ProgressTicker::start(&self.policy, cancel);
        tokio::pin!(upload);

        let outcome = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break Err(CoreError::Cancelled),
                result = &mut upload => {
                    break result.map_err(|source| CoreError::UploadFailed { kind, source });
                }
                Some(percent) = ticker.next() => {
                    debug!(%kind, percent, "upload progress");
                    sink.report(percent);
                }
            }
        };

        match outcome {
            Ok(asset) => {
                ticker.finish(sink);
                Ok(asset)
            }
            Err(CoreError::Cancelled) => {
                ticker.stop();
                info!(%kind, "upload cancelled");
                Err(CoreError::Cancelled)
            }
            Err(source) => {
                ticker.stop();
                warn!(%kind, error = %source, "upload failed");
                Err(source)
            }
        }
    }
}
