//! Repository for the singleton `state` row (long/medium-term distributions).

use crate::models::{CategoryWeight, StateRow};
use pipeline_common::Result;
use sqlx::types::Json;
use sqlx::PgPool;

#[derive(Clone)]
pub struct StateRepo {
    pool: PgPool,
}

impl StateRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn fetch(&self) -> Result<Option<StateRow>> {
        let row = sqlx::query_as::<_, StateRow>("SELECT * FROM state WHERE id = 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// LTU: upsert the long-term topic/mood distributions and bump the timestamp.
    pub async fn upsert_lt(
        &self,
        lt_topic: &[CategoryWeight],
        lt_mood: &[CategoryWeight],
        updated_at: i64,
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO state (id, lt_topic, lt_mood, lt_updated_at) VALUES (1, $1, $2, $3) \
             ON CONFLICT (id) DO UPDATE SET lt_topic = $1, lt_mood = $2, lt_updated_at = $3",
        )
        .bind(Json(lt_topic))
        .bind(Json(lt_mood))
        .bind(updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// MTB: upsert the medium-term topic/mood/author distributions.
    pub async fn upsert_mt(
        &self,
        mt_topic: &[CategoryWeight],
        mt_mood: &[CategoryWeight],
        mt_author: &[CategoryWeight],
    ) -> Result<()> {
        sqlx::query(
            "INSERT INTO state (id, mt_topic, mt_mood, mt_author) VALUES (1, $1, $2, $3) \
             ON CONFLICT (id) DO UPDATE SET mt_topic = $1, mt_mood = $2, mt_author = $3",
        )
        .bind(Json(mt_topic))
        .bind(Json(mt_mood))
        .bind(Json(mt_author))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
