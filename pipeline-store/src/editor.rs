//! Repository for the `editor` candidate pool.

use crate::models::EditorRow;
use chrono::NaiveDate;
use pipeline_common::Result;
use sqlx::PgPool;

#[derive(Clone)]
pub struct EditorRepo {
    pool: PgPool,
}

impl EditorRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Planner step 2: reset `mt`, `time`, `analyzed` on every row. `lt` is untouched.
    pub async fn reset_mt_time_analyzed(&self) -> Result<()> {
        sqlx::query("UPDATE editor SET mt = false, time = false, analyzed = false")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// LTU: re-open LT scoring on rows the previous distribution already covered.
    pub async fn reset_lt_true_to_false(&self) -> Result<()> {
        sqlx::query("UPDATE editor SET lt = false WHERE lt = true")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn fetch_mt_false(&self) -> Result<Vec<EditorRow>> {
        let rows = sqlx::query_as::<_, EditorRow>("SELECT * FROM editor WHERE mt = false")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Rows TimeScorer must assign scores to this round.
    pub async fn fetch_time_false(&self) -> Result<Vec<EditorRow>> {
        let rows = sqlx::query_as::<_, EditorRow>("SELECT * FROM editor WHERE time = false")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// LTM batch: at most 5 rows with `lt=false` and non-null topic/mood.
    pub async fn fetch_lt_false_batch(&self, limit: i64) -> Result<Vec<EditorRow>> {
        let rows = sqlx::query_as::<_, EditorRow>(
            "SELECT * FROM editor WHERE lt = false AND topic IS NOT NULL AND mood IS NOT NULL \
             ORDER BY id ASC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Aggregator's scan: all three prerequisite flags set, not yet analyzed.
    pub async fn fetch_ready_for_aggregation(&self) -> Result<Vec<EditorRow>> {
        let rows = sqlx::query_as::<_, EditorRow>(
            "SELECT * FROM editor WHERE lt AND mt AND time AND NOT analyzed",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Planner step 6: the winning candidate, if any row has been fully scored.
    pub async fn fetch_top_candidate(&self) -> Result<Option<EditorRow>> {
        let row = sqlx::query_as::<_, EditorRow>(
            "SELECT * FROM editor WHERE analyzed AND final_score IS NOT NULL \
             ORDER BY final_score DESC, time_best DESC, time_expire DESC, id ASC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update_lt_scores(&self, id: i64, lt_topic: i16, lt_mood: i16) -> Result<()> {
        sqlx::query("UPDATE editor SET lt_topic = $1, lt_mood = $2, lt = true WHERE id = $3")
            .bind(lt_topic)
            .bind(lt_mood)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn update_mt_scores(
        &self,
        id: i64,
        mt_topic: i16,
        mt_mood: i16,
        mt_author: i16,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE editor SET mt_topic = $1, mt_mood = $2, mt_author = $3, mt = true WHERE id = $4",
        )
        .bind(mt_topic)
        .bind(mt_mood)
        .bind(mt_author)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn update_time_scores(&self, id: i64, time_best: i16, time_expire: i16) -> Result<()> {
        sqlx::query("UPDATE editor SET time_best = $1, time_expire = $2, time = true WHERE id = $3")
            .bind(time_best)
            .bind(time_expire)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Aggregator: write the computed value and the flag in the same statement.
    pub async fn update_final_score(&self, id: i64, final_score: f64) -> Result<()> {
        sqlx::query("UPDATE editor SET final_score = $1, analyzed = true WHERE id = $2")
            .bind(final_score)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        sqlx::query("DELETE FROM editor WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Cleaner: drop rows whose `post_time + expire` has passed `today`.
    pub async fn delete_expired(&self, today: NaiveDate) -> Result<u64> {
        let result = sqlx::query("DELETE FROM editor WHERE (post_time + expire) < $1")
            .bind(today)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
