//! Read side for published content.
//!
//! Every listing goes through [`ContentRepository::list_listable`], which
//! only ever returns published records. Pending and rejected submissions are
//! reachable by id alone.

use std::collections::HashMap;
use std::sync::Arc;

use reelhouse_model::{ContentId, ContentRecord, ModerationStatus};
use tracing::{debug, info};
use uuid::Uuid;

use crate::database::ports::content::{CatalogFilter, ContentRepository};
use crate::error::{CoreError, Result, StoreError};

/// Published records grouped under one display category.
#[derive(Debug, Clone, PartialEq)]
pub struct Shelf {
    pub category: String,
    pub items: Vec<ContentRecord>,
}

#[derive(Clone)]
pub struct CatalogService {
    content: Arc<dyn ContentRepository>,
}

impl std::fmt::Debug for CatalogService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogService").finish_non_exhaustive()
    }
}

impl CatalogService {
    pub fn new(content: Arc<dyn ContentRepository>) -> Self {
        Self { content }
    }

    /// Published records, newest first, optionally restricted to a category.
    pub async fn list(&self, category: Option<&str>) -> Result<Vec<ContentRecord>> {
        let filter = match category {
            Some(category) => CatalogFilter::category(category),
            None => CatalogFilter::default(),
        };
        Ok(self.content.list_listable(&filter).await?)
    }

    /// Published records grouped by display category. Shelves appear in the
    /// order their first (newest) record does.
    pub async fn shelves(&self) -> Result<Vec<Shelf>> {
        let records = self.content.list_listable(&CatalogFilter::default()).await?;

        let mut shelves: Vec<Shelf> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for record in records {
            let category = record.display_category().to_string();
            match index.get(&category) {
                Some(&at) => shelves[at].items.push(record),
                None => {
                    index.insert(category.clone(), shelves.len());
                    shelves.push(Shelf {
                        category,
                        items: vec![record],
                    });
                }
            }
        }
        Ok(shelves)
    }

    /// Case-insensitive partial title match. A blank query matches nothing
    /// and does not reach the store.
    pub async fn search(&self, query: &str) -> Result<Vec<ContentRecord>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let results = self
            .content
            .list_listable(&CatalogFilter::title_contains(query))
            .await?;
        debug!(query, hits = results.len(), "catalog search");
        Ok(results)
    }

    /// Published work by one creator.
    pub async fn by_creator(&self, user_id: Uuid) -> Result<Vec<ContentRecord>> {
        Ok(self
            .content
            .list_listable(&CatalogFilter::created_by(user_id))
            .await?)
    }

    /// Direct lookup in any moderation state, so a submitter can check on
    /// their own record.
    pub async fn get(&self, id: ContentId) -> Result<Option<ContentRecord>> {
        Ok(self.content.get(id).await?)
    }

    /// Moves a record to `status`. Only published records show up in the
    /// listings above.
    pub async fn moderate(
        &self,
        id: ContentId,
        status: ModerationStatus,
    ) -> Result<ContentRecord> {
        let record = self
            .content
            .set_moderation(id, status)
            .await
            .map_err(|err| match err {
                StoreError::NotFound => {
                    CoreError::NotFound(format!("content {id}"))
                }
                other => CoreError::PersistenceFailed(other),
            })?;
        info!(content_id = %id, %status, "moderation status changed");
        Ok(record)
    }
}
