use async_trait::async_trait;
use reelhouse_model::{ContentId, MyListEntry};
use uuid::Uuid;

use crate::error::StoreError;

#[async_trait]
pub trait MyListRepository: Send + Sync {
    /// Fails with [`StoreError::UniqueViolation`] if the pair already exists.
    async fn add(
        &self,
        user_id: Uuid,
        content_id: ContentId,
    ) -> Result<MyListEntry, StoreError>;

    async fn remove(
        &self,
        user_id: Uuid,
        content_id: ContentId,
    ) -> Result<bool, StoreError>;

    async fn contains(
        &self,
        user_id: Uuid,
        content_id: ContentId,
    ) -> Result<bool, StoreError>;

    /// Entries for a user, most recently added first.
    async fn list(&self, user_id: Uuid) -> Result<Vec<MyListEntry>, StoreError>;

    async fn count(&self, user_id: Uuid) -> Result<u64, StoreError>;
}
