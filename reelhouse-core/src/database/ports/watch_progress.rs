use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reelhouse_model::{ContentId, PercentWindow, WatchProgress};
use uuid::Uuid;

use crate::error::StoreError;

/// Values written by a single progress update.
#[derive(Debug, Clone, PartialEq)]
pub struct WatchProgressWrite {
    pub user_id: Uuid,
    pub content_id: ContentId,
    pub progress_time_seconds: f64,
    pub progress_percentage: f64,
    pub watched_at: DateTime<Utc>,
}

#[async_trait]
pub trait WatchProgressRepository: Send + Sync {
    /// Insert or overwrite the row for `(user_id, content_id)` atomically.
    ///
    /// Concurrent calls for the same pair must leave exactly one row behind;
    /// implementations resolve this in the store, not with read-then-write.
    async fn upsert(
        &self,
        write: WatchProgressWrite,
    ) -> Result<WatchProgress, StoreError>;

    async fn get(
        &self,
        user_id: Uuid,
        content_id: ContentId,
    ) -> Result<Option<WatchProgress>, StoreError>;

    /// Rows for a user whose percentage falls in `window`, most recently
    /// watched first.
    async fn list_for_user(
        &self,
        user_id: Uuid,
        window: PercentWindow,
        limit: Option<usize>,
    ) -> Result<Vec<WatchProgress>, StoreError>;

    /// Returns whether a row was deleted.
    async fn delete(
        &self,
        user_id: Uuid,
        content_id: ContentId,
    ) -> Result<bool, StoreError>;
}
