//! Titles a user has saved for later.

use std::collections::HashMap;
use std::sync::Arc;

use reelhouse_model::{ContentId, ContentSummary, MyListEntry};
use tracing::info;
use uuid::Uuid;

use crate::database::ports::content::ContentRepository;
use crate::database::ports::my_list::MyListRepository;
use crate::error::{CoreError, Result, StoreError};

/// A saved entry joined with its content, `None` if the content is gone.
#[derive(Debug, Clone, PartialEq)]
pub struct MyListItem {
    pub entry: MyListEntry,
    pub content: Option<ContentSummary>,
}

#[derive(Clone)]
pub struct MyListService {
    entries: Arc<dyn MyListRepository>,
    content: Arc<dyn ContentRepository>,
}

impl std::fmt::Debug for MyListService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MyListService").finish_non_exhaustive()
    }
}

impl MyListService {
    pub fn new(
        entries: Arc<dyn MyListRepository>,
        content: Arc<dyn ContentRepository>,
    ) -> Self {
        Self { entries, content }
    }

    pub async fn add(&self, user_id: Uuid, content_id: ContentId) -> Result<MyListEntry> {
        match self.entries.add(user_id, content_id).await {
            Ok(entry) => {
                info!(%user_id, %content_id, "added to my list");
                Ok(entry)
            }
            Err(StoreError::UniqueViolation { .. }) => Err(CoreError::AlreadyInList),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn remove(&self, user_id: Uuid, content_id: ContentId) -> Result<bool> {
        Ok(self.entries.remove(user_id, content_id).await?)
    }

    pub async fn contains(&self, user_id: Uuid, content_id: ContentId) -> Result<bool> {
        Ok(self.entries.contains(user_id, content_id).await?)
    }

    /// Most recently added first.
    pub async fn list(&self, user_id: Uuid) -> Result<Vec<MyListItem>> {
        let entries = self.entries.list(user_id).await?;
        let ids: Vec<ContentId> = entries.iter().map(|e| e.content_id).collect();
        let mut summaries: HashMap<ContentId, ContentSummary> = self
            .content
            .get_many(&ids)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        Ok(entries
            .into_iter()
            .map(|entry| MyListItem {
                content: summaries.remove(&entry.content_id),
                entry,
            })
            .collect())
    }

    pub async fn count(&self, user_id: Uuid) -> Result<u64> {
        Ok(self.entries.count(user_id).await?)
    }
}
