use async_trait::async_trait;
use reelhouse_model::{
    ContentId, ContentRecord, ContentSummary, ModerationStatus, NewContent,
};
use uuid::Uuid;

use crate::error::StoreError;

/// Optional filters for listing published content.
///
/// Implementations must never return records whose moderation status is not
/// listable, whatever filters are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    /// Exact category match.
    pub category: Option<String>,
    pub created_by: Option<Uuid>,
    /// Case-insensitive partial match on the title.
    pub title_contains: Option<String>,
}

impl CatalogFilter {
    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::default()
        }
    }

    pub fn created_by(user_id: Uuid) -> Self {
        Self {
            created_by: Some(user_id),
            ..Self::default()
        }
    }

    pub fn title_contains(needle: impl Into<String>) -> Self {
        Self {
            title_contains: Some(needle.into()),
            ..Self::default()
        }
    }
}

#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Persist a new record and return it with its store-assigned id.
    async fn insert(&self, content: NewContent) -> Result<ContentRecord, StoreError>;

    /// Direct lookup by id, regardless of moderation status.
    async fn get(&self, id: ContentId) -> Result<Option<ContentRecord>, StoreError>;

    /// Summaries for the given ids. Missing ids are skipped and the result
    /// order is unspecified.
    async fn get_many(
        &self,
        ids: &[ContentId],
    ) -> Result<Vec<ContentSummary>, StoreError>;

    /// Published records matching `filter`, newest first.
    async fn list_listable(
        &self,
        filter: &CatalogFilter,
    ) -> Result<Vec<ContentRecord>, StoreError>;

    /// Administrative moderation transition.
    async fn set_moderation(
        &self,
        id: ContentId,
        status: ModerationStatus,
    ) -> Result<ContentRecord, StoreError>;

    /// Administrative removal. Returns whether a row was deleted.
    async fn delete(&self, id: ContentId) -> Result<bool, StoreError>;
}
