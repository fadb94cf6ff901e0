use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reelhouse_model::{ContentId, MyListEntry};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::ports::my_list::MyListRepository;
use crate::error::StoreError;

#[derive(Debug, sqlx::FromRow)]
struct EntryRow {
    user_id: Uuid,
    content_id: Uuid,
    added_at: DateTime<Utc>,
}

impl From<EntryRow> for MyListEntry {
    fn from(row: EntryRow) -> Self {
        MyListEntry {
            user_id: row.user_id,
            content_id: ContentId(row.content_id),
            added_at: row.added_at,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PostgresMyListRepository {
    pool: PgPool,
}

impl PostgresMyListRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl MyListRepository for PostgresMyListRepository {
    async fn add(
        &self,
        user_id: Uuid,
        content_id: ContentId,
    ) -> Result<MyListEntry, StoreError> {
        let row = sqlx::query_as::<_, EntryRow>(
            r#"
            INSERT INTO my_list (user_id, content_id)
            VALUES ($1, $2)
            RETURNING user_id, content_id, added_at
            "#,
        )
        .bind(user_id)
        .bind(content_id.to_uuid())
        .fetch_one(self.pool())
        .await?;

        Ok(row.into())
    }

    async fn remove(
        &self,
        user_id: Uuid,
        content_id: ContentId,
    ) -> Result<bool, StoreError> {
        let result =
            sqlx::query("DELETE FROM my_list WHERE user_id = $1 AND content_id = $2")
                .bind(user_id)
                .bind(content_id.to_uuid())
                .execute(self.pool())
                .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn contains(
        &self,
        user_id: Uuid,
        content_id: ContentId,
    ) -> Result<bool, StoreError> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM my_list WHERE user_id = $1 AND content_id = $2)",
        )
        .bind(user_id)
        .bind(content_id.to_uuid())
        .fetch_one(self.pool())
        .await?;
        Ok(exists)
    }

    async fn list(&self, user_id: Uuid) -> Result<Vec<MyListEntry>, StoreError> {
        let rows = sqlx::query_as::<_, EntryRow>(
            r#"
            SELECT user_id, content_id, added_at
            FROM my_list
            WHERE user_id = $1
            ORDER BY added_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;

        Ok(rows.into_iter().map(MyListEntry::from).collect())
    }

    async fn count(&self, user_id: Uuid) -> Result<u64, StoreError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM my_list WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(self.pool())
                .await?;
        Ok(count.max(0) as u64)
    }
}
