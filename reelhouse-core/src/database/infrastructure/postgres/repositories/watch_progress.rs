use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reelhouse_model::{ContentId, PercentWindow, WatchProgress};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::database::ports::watch_progress::{
    WatchProgressRepository, WatchProgressWrite,
};
use crate::error::StoreError;

const PROGRESS_COLUMNS: &str = "\
    user_id, content_id, progress_time_seconds, progress_percentage, last_watched_at";

#[derive(Debug, sqlx::FromRow)]
struct ProgressRow {
    user_id: Uuid,
    content_id: Uuid,
    progress_time_seconds: f64,
    progress_percentage: f64,
    last_watched_at: DateTime<Utc>,
}

impl From<ProgressRow> for WatchProgress {
    fn from(row: ProgressRow) -> Self {
        WatchProgress {
            user_id: row.user_id,
            content_id: ContentId(row.content_id),
            progress_time_seconds: row.progress_time_seconds,
            progress_percentage: row.progress_percentage,
            last_watched_at: row.last_watched_at,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PostgresWatchProgressRepository {
    pool: PgPool,
}

impl PostgresWatchProgressRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl WatchProgressRepository for PostgresWatchProgressRepository {
    async fn upsert(
        &self,
        write: WatchProgressWrite,
    ) -> Result<WatchProgress, StoreError> {
        // The unique (user_id, content_id) constraint makes this a single
        // atomic statement; concurrent writers for a pair serialize on it.
        let sql = format!(
            "INSERT INTO watch_progress (
                user_id, content_id, progress_time_seconds, progress_percentage,
                last_watched_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $5)
            ON CONFLICT (user_id, content_id) DO UPDATE SET
                progress_time_seconds = EXCLUDED.progress_time_seconds,
                progress_percentage = EXCLUDED.progress_percentage,
                last_watched_at = EXCLUDED.last_watched_at,
                updated_at = EXCLUDED.updated_at
            RETURNING {PROGRESS_COLUMNS}"
        );

        let row = sqlx::query_as::<_, ProgressRow>(&sql)
            .bind(write.user_id)
            .bind(write.content_id.to_uuid())
            .bind(write.progress_time_seconds)
            .bind(write.progress_percentage)
            .bind(write.watched_at)
            .fetch_one(self.pool())
            .await?;

        Ok(row.into())
    }

    async fn get(
        &self,
        user_id: Uuid,
        content_id: ContentId,
    ) -> Result<Option<WatchProgress>, StoreError> {
        let sql = format!(
            "SELECT {PROGRESS_COLUMNS} FROM watch_progress
             WHERE user_id = $1 AND content_id = $2"
        );

        let row = sqlx::query_as::<_, ProgressRow>(&sql)
            .bind(user_id)
            .bind(content_id.to_uuid())
            .fetch_optional(self.pool())
            .await?;

        Ok(row.map(WatchProgress::from))
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        window: PercentWindow,
        limit: Option<usize>,
    ) -> Result<Vec<WatchProgress>, StoreError> {
        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {PROGRESS_COLUMNS} FROM watch_progress WHERE user_id = "
        ));
        query.push_bind(user_id);

        if window.min.is_finite() {
            query.push(" AND progress_percentage >= ").push_bind(window.min);
        }
        if window.max_exclusive.is_finite() {
            query
                .push(" AND progress_percentage < ")
                .push_bind(window.max_exclusive);
        }
        query.push(" ORDER BY last_watched_at DESC");
        if let Some(limit) = limit {
            query.push(" LIMIT ").push_bind(limit as i64);
        }

        let rows = query
            .build_query_as::<ProgressRow>()
            .fetch_all(self.pool())
            .await?;

        Ok(rows.into_iter().map(WatchProgress::from).collect())
    }

    async fn delete(
        &self,
        user_id: Uuid,
        content_id: ContentId,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "DELETE FROM watch_progress WHERE user_id = $1 AND content_id = $2",
        )
        .bind(user_id)
        .bind(content_id.to_uuid())
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
