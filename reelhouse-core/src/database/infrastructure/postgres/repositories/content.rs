use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reelhouse_model::{
    ContentId, ContentRecord, ContentSummary, ModerationStatus, NewContent,
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use super::escape_like;
use crate::database::ports::content::{CatalogFilter, ContentRepository};
use crate::error::StoreError;

const CONTENT_COLUMNS: &str = "\
    id, title, description, video_asset_id, image_asset_id, category, \
    moderation_status, created_by, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct ContentRow {
    id: Uuid,
    title: String,
    description: String,
    video_asset_id: String,
    image_asset_id: Option<String>,
    category: Option<String>,
    moderation_status: String,
    created_by: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ContentRow> for ContentRecord {
    type Error = StoreError;

    fn try_from(row: ContentRow) -> Result<Self, Self::Error> {
        let moderation = row
            .moderation_status
            .parse::<ModerationStatus>()
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(ContentRecord {
            id: ContentId(row.id),
            title: row.title,
            description: row.description,
            video_asset_id: row.video_asset_id,
            image_asset_id: row.image_asset_id,
            category: row.category,
            moderation,
            created_by: row.created_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SummaryRow {
    id: Uuid,
    title: String,
    description: String,
    image_asset_id: Option<String>,
    video_asset_id: String,
    category: Option<String>,
}

impl From<SummaryRow> for ContentSummary {
    fn from(row: SummaryRow) -> Self {
        ContentSummary {
            id: ContentId(row.id),
            title: row.title,
            description: row.description,
            image_asset_id: row.image_asset_id,
            video_asset_id: row.video_asset_id,
            category: row.category,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PostgresContentRepository {
    pool: PgPool,
}

impl PostgresContentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ContentRepository for PostgresContentRepository {
    async fn insert(&self, content: NewContent) -> Result<ContentRecord, StoreError> {
        let sql = format!(
            "INSERT INTO content (
                title, description, video_asset_id, image_asset_id, category,
                moderation_status, created_by, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING {CONTENT_COLUMNS}"
        );

        let row = sqlx::query_as::<_, ContentRow>(&sql)
            .bind(&content.title)
            .bind(&content.description)
            .bind(&content.video_asset_id)
            .bind(&content.image_asset_id)
            .bind(&content.category)
            .bind(content.moderation.as_str())
            .bind(content.created_by)
            .bind(content.created_at)
            .fetch_one(self.pool())
            .await?;

        debug!(content_id = %row.id, "content row inserted");
        row.try_into()
    }

    async fn get(&self, id: ContentId) -> Result<Option<ContentRecord>, StoreError> {
        let sql = format!("SELECT {CONTENT_COLUMNS} FROM content WHERE id = $1");
        sqlx::query_as::<_, ContentRow>(&sql)
            .bind(id.to_uuid())
            .fetch_optional(self.pool())
            .await?
            .map(ContentRecord::try_from)
            .transpose()
    }

    async fn get_many(
        &self,
        ids: &[ContentId],
    ) -> Result<Vec<ContentSummary>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = ids.iter().map(ContentId::to_uuid).collect();

        let rows = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT id, title, description, image_asset_id, video_asset_id, category
            FROM content
            WHERE id = ANY($1)
            "#,
        )
        .bind(&ids)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(ContentSummary::from).collect())
    }

    async fn list_listable(
        &self,
        filter: &CatalogFilter,
    ) -> Result<Vec<ContentRecord>, StoreError> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {CONTENT_COLUMNS} FROM content WHERE moderation_status = "
        ));
        query.push_bind(ModerationStatus::Published.as_str());

        if let Some(category) = &filter.category {
            query.push(" AND category = ").push_bind(category.clone());
        }
        if let Some(created_by) = filter.created_by {
            query.push(" AND created_by = ").push_bind(created_by);
        }
        if let Some(needle) = &filter.title_contains {
            query
                .push(" AND title ILIKE ")
                .push_bind(format!("%{}%", escape_like(needle)));
        }
        query.push(" ORDER BY created_at DESC");

        let rows = query
            .build_query_as::<ContentRow>()
            .fetch_all(self.pool())
            .await?;

        rows.into_iter().map(ContentRecord::try_from).collect()
    }

    async fn set_moderation(
        &self,
        id: ContentId,
        status: ModerationStatus,
    ) -> Result<ContentRecord, StoreError> {
        let sql = format!(
            "UPDATE content
             SET moderation_status = $2, updated_at = now()
             WHERE id = $1
             RETURNING {CONTENT_COLUMNS}"
        );

        sqlx::query_as::<_, ContentRow>(&sql)
            .bind(id.to_uuid())
            .bind(status.as_str())
            .fetch_one(self.pool())
            .await?
            .try_into()
    }

    async fn delete(&self, id: ContentId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM content WHERE id = $1")
            .bind(id.to_uuid())
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
