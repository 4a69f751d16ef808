//! Repository for the `published` historical ledger (and chain control).

use crate::models::{PublishedRow, ToPublishRow};
use pipeline_common::Result;
use sqlx::PgPool;

#[derive(Clone)]
pub struct PublishedRepo {
    pool: PgPool,
}

impl PublishedRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The row with the maximum id, if `published` is non-empty.
    pub async fn fetch_max(&self) -> Result<Option<PublishedRow>> {
        let row = sqlx::query_as::<_, PublishedRow>(
            "SELECT * FROM published ORDER BY id DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    /// Planner round precondition: empty table, or max-id row has `next = false`.
    pub async fn round_permitted(&self) -> Result<bool> {
        Ok(match self.fetch_max().await? {
            None => true,
            Some(row) => !row.next,
        })
    }

    /// Planner step 8, idempotent: only flips `next` if it is still `false`.
    pub async fn close_chain_on_max(&self) -> Result<()> {
        sqlx::query(
            "UPDATE published SET next = true WHERE id = (SELECT id FROM published ORDER BY id DESC LIMIT 1) AND next = false",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Publisher: move a delivered `to_publish` record into the ledger.
    pub async fn insert_from_delivery(
        &self,
        source: &ToPublishRow,
        published_at: i64,
        next: bool,
    ) -> Result<i64> {
        let row: (i64,) = sqlx::query_as(
            "INSERT INTO published (text, topic, mood, author, names, length, published_at, next) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
        )
        .bind(&source.text)
        .bind(&source.topic)
        .bind(&source.mood)
        .bind(&source.author)
        .bind(&source.names)
        .bind(source.length)
        .bind(published_at)
        .bind(next)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.0)
    }

    /// Most recent `limit` rows, newest first.
    pub async fn fetch_recent(&self, limit: i64) -> Result<Vec<PublishedRow>> {
        let rows = sqlx::query_as::<_, PublishedRow>(
            "SELECT * FROM published ORDER BY id DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
