//! Repository for the `to_publish` delivery queue.

use crate::models::{EditorRow, ToPublishRow};
use pipeline_common::Result;
use sqlx::PgPool;

#[derive(Clone)]
pub struct ToPublishRepo {
    pool: PgPool,
}

impl ToPublishRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Planner step 7: insert the winner's payload with the computed timestamp.
    /// Takes an executor so the caller can run this in the same transaction as
    /// the editor delete.
    pub async fn insert_winner<'e, E>(
        executor: E,
        winner: &EditorRow,
        time: i64,
    ) -> Result<i64>
    where
        E: sqlx::Executor<'e, Database = sqlx::Postgres>,
    {
        let row: (i64,) = sqlx::query_as(
            "INSERT INTO to_publish (text, topic, mood, author, names, length, time, final_score, \
             pic, prepare, preview, published) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, false, false, false, false) RETURNING id",
        )
        .bind(&winner.text)
        .bind(&winner.topic)
        .bind(&winner.mood)
        .bind(&winner.author)
        .bind(&winner.names)
        .bind(winner.length)
        .bind(time)
        .bind(winner.final_score.unwrap_or(5.0))
        .fetch_one(executor)
        .await?;
        Ok(row.0)
    }

    pub async fn fetch_pic_false(&self, limit: i64) -> Result<Vec<ToPublishRow>> {
        let rows = sqlx::query_as::<_, ToPublishRow>(
            "SELECT * FROM to_publish WHERE pic = false ORDER BY id ASC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn update_pic(&self, id: i64, pic_base64: &str) -> Result<()> {
        sqlx::query("UPDATE to_publish SET pic_base64 = $1, pic = true WHERE id = $2")
            .bind(pic_base64)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn fetch_prepare_false(&self, limit: i64) -> Result<Vec<ToPublishRow>> {
        let rows = sqlx::query_as::<_, ToPublishRow>(
            "SELECT * FROM to_publish WHERE prepare = false ORDER BY id ASC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn update_prepared(&self, id: i64, text_prepared: Option<&str>) -> Result<()> {
        sqlx::query("UPDATE to_publish SET text_prepared = $1, prepare = true WHERE id = $2")
            .bind(text_prepared)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Publisher's batch: ready rows ordered by `id`.
    pub async fn fetch_ready_to_publish(&self, now: i64) -> Result<Vec<ToPublishRow>> {
        let rows = sqlx::query_as::<_, ToPublishRow>(
            "SELECT * FROM to_publish WHERE published = false AND pic AND prepare AND time <= $1 \
             ORDER BY id ASC",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn mark_published(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE to_publish SET published = true WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Idempotent guard for Planner step 8: true iff some row here hasn't been
    /// delivered yet (used to decide whether closing the chain is still valid).
    pub async fn has_unpublished(&self) -> Result<bool> {
        let row: (i64,) =
            sqlx::query_as("SELECT count(*) FROM to_publish WHERE published = false")
                .fetch_one(&self.pool)
                .await?;
        Ok(row.0 > 0)
    }

    /// Cleaner: drop rows already delivered.
    pub async fn delete_published(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM to_publish WHERE published = true")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
