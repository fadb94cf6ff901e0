use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use reelhouse_model::{
    ContentId, ContentSummary, PercentWindow, WatchProgress, WatchState,
    progress_percentage,
};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::config::WatchConfig;
use crate::database::ports::content::ContentRepository;
use crate::database::ports::watch_progress::{
    WatchProgressRepository, WatchProgressWrite,
};
use crate::error::{CoreError, Result};

/// A progress row joined with its content. `content` is `None` when the
/// record has since been removed.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchedItem {
    pub progress: WatchProgress,
    pub content: Option<ContentSummary>,
}

impl WatchedItem {
    pub fn state(&self) -> WatchState {
        self.progress.state()
    }
}

/// Keeps one progress row per (user, content) and reads it back as
/// continue-watching and history views.
pub struct WatchProgressTracker {
    progress: Arc<dyn WatchProgressRepository>,
    content: Arc<dyn ContentRepository>,
    continue_watching_limit: usize,
}

impl std::fmt::Debug for WatchProgressTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchProgressTracker")
            .field("continue_watching_limit", &self.continue_watching_limit)
            .finish_non_exhaustive()
    }
}

impl WatchProgressTracker {
    pub fn new(
        progress: Arc<dyn WatchProgressRepository>,
        content: Arc<dyn ContentRepository>,
        config: &WatchConfig,
    ) -> Self {
        Self {
            progress,
            content,
            continue_watching_limit: config.continue_watching_limit,
        }
    }

    /// Overwrites the pair's progress with this position. The store always
    /// reflects the latest call, so seeking back lowers the percentage.
    #[instrument(skip(self), level = "debug")]
    pub async fn record_progress(
        &self,
        user_id: Uuid,
        content_id: ContentId,
        progress_time_seconds: f64,
        duration_seconds: f64,
    ) -> Result<WatchProgress> {
        if !progress_time_seconds.is_finite() {
            return Err(CoreError::ValidationFailed(format!(
                "invalid playback position: {progress_time_seconds}"
            )));
        }
        let progress_time_seconds = progress_time_seconds.max(0.0);

        let write = WatchProgressWrite {
            user_id,
            content_id,
            progress_time_seconds,
            progress_percentage: progress_percentage(
                progress_time_seconds,
                duration_seconds,
            ),
            watched_at: Utc::now(),
        };
        let saved = self.progress.upsert(write).await?;
        debug!(
            %user_id,
            %content_id,
            percentage = saved.progress_percentage,
            "watch progress saved"
        );
        Ok(saved)
    }

    /// Records the end of the item as the current position.
    pub async fn mark_watched(
        &self,
        user_id: Uuid,
        content_id: ContentId,
        duration_seconds: f64,
    ) -> Result<WatchProgress> {
        self.record_progress(user_id, content_id, duration_seconds, duration_seconds)
            .await
    }

    /// Removes the pair's row. Returns whether one existed.
    pub async fn clear(&self, user_id: Uuid, content_id: ContentId) -> Result<bool> {
        Ok(self.progress.delete(user_id, content_id).await?)
    }

    pub async fn get(
        &self,
        user_id: Uuid,
        content_id: ContentId,
    ) -> Result<Option<WatchProgress>> {
        Ok(self.progress.get(user_id, content_id).await?)
    }

    pub async fn state(&self, user_id: Uuid, content_id: ContentId) -> Result<WatchState> {
        Ok(self
            .get(user_id, content_id)
            .await?
            .map(|p| p.state())
            .unwrap_or(WatchState::NoProgress))
    }

    /// Started but unfinished items (`[5, 95)` percent), most recent first.
    pub async fn list_continue_watching(&self, user_id: Uuid) -> Result<Vec<WatchedItem>> {
        let rows = self
            .progress
            .list_for_user(
                user_id,
                PercentWindow::CONTINUE_WATCHING,
                Some(self.continue_watching_limit),
            )
            .await?;
        self.join_content(rows).await
    }

    /// Every progress row for the user, most recent first.
    pub async fn list_history(&self, user_id: Uuid) -> Result<Vec<WatchedItem>> {
        let rows = self
            .progress
            .list_for_user(user_id, PercentWindow::ALL, None)
            .await?;
        self.join_content(rows).await
    }

    async fn join_content(&self, rows: Vec<WatchProgress>) -> Result<Vec<WatchedItem>> {
        let ids: Vec<ContentId> = rows.iter().map(|r| r.content_id).collect();
        let mut summaries: HashMap<ContentId, ContentSummary> = self
            .content
            .get_many(&ids)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        Ok(rows
            .into_iter()
            .map(|progress| WatchedItem {
                content: summaries.remove(&progress.content_id),
                progress,
            })
            .collect())
    }
}
