//! Content intake: upload the selected assets, then persist one record that
//! references them. New records always start out pending moderation.

use std::sync::Arc;

use reelhouse_model::{
    AssetKind, ContentRecord, LocalFile, ModerationStatus, NewContent,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::database::ports::content::ContentRepository;
use crate::error::{CoreError, OrphanedAsset, RegistrationError, Result};
use crate::session::{SessionProvider, require_user};
use crate::upload::{NoProgress, ProgressSink, UploadPipeline};

/// Metadata title attached to poster uploads.
pub const POSTER_TITLE: &str = "Movie Thumbnail";

pub const MAX_TITLE_CHARS: usize = 100;
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// What the user filled in on the submission form.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub title: String,
    pub description: String,
    pub video: Option<LocalFile>,
    pub image: Option<LocalFile>,
    pub category: Option<String>,
}

impl Submission {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        video: LocalFile,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            video: Some(video),
            image: None,
            category: None,
        }
    }

    pub fn with_image(mut self, image: LocalFile) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistrationPhase {
    Started,
    UploadingVideo,
    UploadingImage,
    Saving,
    Done,
}

/// Overall progress across the whole registration, `0..=100`.
pub trait RegistrationProgress: Send + Sync {
    fn on_progress(&self, phase: RegistrationPhase, percent: u8);
}

impl<F> RegistrationProgress for F
where
    F: Fn(RegistrationPhase, u8) + Send + Sync,
{
    fn on_progress(&self, phase: RegistrationPhase, percent: u8) {
        self(phase, percent)
    }
}

impl RegistrationProgress for NoProgress {
    fn on_progress(&self, _phase: RegistrationPhase, _percent: u8) {}
}

/// Maps one upload's `0..=100` onto a slice of the overall bar.
struct PhaseSink<'a> {
    overall: &'a dyn RegistrationProgress,
    phase: RegistrationPhase,
    from: u8,
    to: u8,
}

impl ProgressSink for PhaseSink<'_> {
    fn report(&self, percent: u8) {
        let span = u16::from(self.to - self.from);
        let scaled = u16::from(self.from) + span * u16::from(percent.min(100)) / 100;
        self.overall.on_progress(self.phase, scaled as u8);
    }
}

/// Validated, trimmed form contents.
#[derive(Debug)]
struct Accepted<'a> {
    title: &'a str,
    description: &'a str,
    video: &'a LocalFile,
    image: Option<&'a LocalFile>,
    category: Option<String>,
}

pub struct RegistrationService {
    content: Arc<dyn ContentRepository>,
    uploads: UploadPipeline,
}

impl std::fmt::Debug for RegistrationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationService")
            .field("uploads", &self.uploads)
            .finish_non_exhaustive()
    }
}

impl RegistrationService {
    pub fn new(content: Arc<dyn ContentRepository>, uploads: UploadPipeline) -> Self {
        Self { content, uploads }
    }

    /// Checks the form in the order the fields appear, then the video size.
    /// Nothing leaves the device when this fails.
    pub fn validate(&self, submission: &Submission) -> Result<()> {
        self.accept(submission).map(|_| ())
    }

    fn accept<'a>(&self, submission: &'a Submission) -> Result<Accepted<'a>> {
        let title = submission.title.trim();
        if title.is_empty() {
            return Err(CoreError::ValidationFailed("Please enter a title.".to_string()));
        }
        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(CoreError::ValidationFailed(format!(
                "The title must be {MAX_TITLE_CHARS} characters or fewer."
            )));
        }

        let description = submission.description.trim();
        if description.is_empty() {
            return Err(CoreError::ValidationFailed(
                "Please enter a description.".to_string(),
            ));
        }
        if description.chars().count() > MAX_DESCRIPTION_CHARS {
            return Err(CoreError::ValidationFailed(format!(
                "The description must be {MAX_DESCRIPTION_CHARS} characters or fewer."
            )));
        }

        let video = submission.video.as_ref().ok_or_else(|| {
            CoreError::ValidationFailed("Please select a video.".to_string())
        })?;
        self.uploads.check_video_size(video)?;

        let category = submission
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        Ok(Accepted {
            title,
            description,
            video,
            image: submission.image.as_ref(),
            category,
        })
    }

    /// Resolves the user from `session` after the form checks pass.
    pub async fn register_for_session(
        &self,
        session: &dyn SessionProvider,
        submission: &Submission,
        progress: &dyn RegistrationProgress,
        cancel: &CancellationToken,
    ) -> std::result::Result<ContentRecord, RegistrationError> {
        self.accept(submission).map_err(RegistrationError::Rejected)?;
        let user_id = require_user(session).map_err(RegistrationError::Rejected)?;
        self.register(user_id, submission, progress, cancel).await
    }

    /// Uploads the video, then the poster if one was picked, then inserts the
    /// record as pending moderation.
    ///
    /// A failed poster upload aborts the whole registration. Assets that
    /// reached a host before a later step failed are reported in the error
    /// and are not deleted.
    #[instrument(skip_all, fields(%user_id))]
    pub async fn register(
        &self,
        user_id: Uuid,
        submission: &Submission,
        progress: &dyn RegistrationProgress,
        cancel: &CancellationToken,
    ) -> std::result::Result<ContentRecord, RegistrationError> {
        let accepted = self.accept(submission).map_err(RegistrationError::Rejected)?;
        let mut uploaded: Vec<OrphanedAsset> = Vec::new();

        progress.on_progress(RegistrationPhase::Started, 10);

        let video_sink = PhaseSink {
            overall: progress,
            phase: RegistrationPhase::UploadingVideo,
            from: 10,
            to: 50,
        };
        let video = self
            .uploads
            .upload_video(accepted.video, &video_sink, cancel)
            .await
            .map_err(|source| RegistrationError::UploadFailed {
                orphaned: Vec::new(),
                source,
            })?;
        uploaded.push(OrphanedAsset {
            kind: AssetKind::Video,
            asset_id: video.asset_id.clone(),
        });

        let mut image_asset_id = None;
        if let Some(image) = accepted.image {
            let image_sink = PhaseSink {
                overall: progress,
                phase: RegistrationPhase::UploadingImage,
                from: 60,
                to: 80,
            };
            match self
                .uploads
                .upload_image(image, Some(POSTER_TITLE), &image_sink, cancel)
                .await
            {
                Ok(image) => {
                    uploaded.push(OrphanedAsset {
                        kind: AssetKind::Image,
                        asset_id: image.asset_id.clone(),
                    });
                    image_asset_id = Some(image.asset_id);
                }
                Err(source) => {
                    log_orphans(&uploaded, "poster upload failed");
                    return Err(RegistrationError::UploadFailed {
                        orphaned: uploaded,
                        source,
                    });
                }
            }
        }

        if cancel.is_cancelled() {
            log_orphans(&uploaded, "registration cancelled before saving");
            return Err(RegistrationError::UploadFailed {
                orphaned: uploaded,
                source: CoreError::Cancelled,
            });
        }

        progress.on_progress(RegistrationPhase::Saving, 90);

        let new_content = NewContent {
            title: accepted.title.to_string(),
            description: accepted.description.to_string(),
            video_asset_id: video.asset_id.clone(),
            image_asset_id,
            category: accepted.category,
            moderation: ModerationStatus::Pending,
            created_by: user_id,
            created_at: video.uploaded_at,
        };

        let record = match self.content.insert(new_content).await {
            Ok(record) => record,
            Err(err) => {
                log_orphans(&uploaded, "content record could not be saved");
                return Err(RegistrationError::NotSaved {
                    orphaned: uploaded,
                    source: CoreError::PersistenceFailed(err),
                });
            }
        };

        progress.on_progress(RegistrationPhase::Done, 100);
        info!(
            content_id = %record.id,
            video_asset_id = %record.video_asset_id,
            "content submitted for moderation"
        );
        Ok(record)
    }

    /// Deletes assets left behind by a failed registration. Returns the ones
    /// that could not be deleted.
    pub async fn discard_orphans(
        &self,
        orphaned: &[OrphanedAsset],
    ) -> Vec<OrphanedAsset> {
        let mut remaining = Vec::new();
        for asset in orphaned {
            let result = match asset.kind {
                AssetKind::Video => {
                    self.uploads.video_host().delete_video(&asset.asset_id).await
                }
                AssetKind::Image => {
                    self.uploads.image_host().delete_image(&asset.asset_id).await
                }
            };
            if let Err(err) = result {
                warn!(
                    kind = %asset.kind,
                    asset_id = %asset.asset_id,
                    error = %err,
                    "orphaned asset could not be deleted"
                );
                remaining.push(asset.clone());
            }
        }
        remaining
    }
}

fn log_orphans(orphaned: &[OrphanedAsset], reason: &str) {
    for asset in orphaned {
        warn!(
            kind = %asset.kind,
            asset_id = %asset.asset_id,
            reason,
            "remote asset left without a content record"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn phase_sink_scales_into_its_slice() {
        let seen = Mutex::new(Vec::new());
        let overall = |phase: RegistrationPhase, p: u8| seen.lock().unwrap().push((phase, p));
        let sink = PhaseSink {
            overall: &overall,
            phase: RegistrationPhase::UploadingVideo,
            from: 10,
            to: 50,
        };
        sink.report(0);
        sink.report(50);
        sink.report(95);
        sink.report(100);

        let seen = seen.lock().unwrap();
        let values: Vec<u8> = seen.iter().map(|(_, p)| *p).collect();
        assert_eq!(values, vec![10, 30, 48, 50]);
        assert!(seen.iter().all(|(phase, _)| *phase == RegistrationPhase::UploadingVideo));
    }

    #[test]
    fn submission_builder_sets_optional_parts() {
        let submission = Submission::new("Film", "About", LocalFile::new("/v.mp4", 1))
            .with_image(LocalFile::new("/p.jpg", 1))
            .with_category("Drama");
        assert!(submission.image.is_some());
        assert_eq!(submission.category.as_deref(), Some("Drama"));
    }
}
