//! Planner (spec §4.1): the core orchestrator. Decides the next publication
//! moment, sequences MTB/TimeScorer/Aggregator, and hands winners to `to_publish`.

use crate::{aggregator::Aggregator, mtb::MediumTermBalancer, time_scorer::TimeScorer};
use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Timelike, Utc};
use pipeline_common::Result;
use pipeline_store::{EditorRepo, PublishedRepo, PublishedRow, ToPublishRepo};
use tracing::info;

/// Step 5: how long the Planner waits for Aggregator to catch up before
/// selecting a winner.
const AGGREGATOR_SETTLE_SECONDS: u64 = 30;

#[derive(Clone)]
pub struct Planner {
    editor: EditorRepo,
    to_publish: ToPublishRepo,
    published: PublishedRepo,
    mtb: MediumTermBalancer,
    time_scorer: TimeScorer,
    aggregator: Aggregator,
    per_hour: u32,
    min_hour: u32,
    max_hour: u32,
}

impl Planner {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        editor: EditorRepo,
        to_publish: ToPublishRepo,
        published: PublishedRepo,
        mtb: MediumTermBalancer,
        time_scorer: TimeScorer,
        aggregator: Aggregator,
        per_hour: u32,
        min_hour: u32,
        max_hour: u32,
    ) -> Self {
        Self {
            editor,
            to_publish,
            published,
            mtb,
            time_scorer,
            aggregator,
            per_hour,
            min_hour,
            max_hour,
        }
    }

    /// Runs one round if the precondition holds (no pending successor);
    /// returns whether a round actually ran and advanced a winner.
    pub async fn run_round(&self, now: DateTime<Utc>) -> Result<bool> {
        if !self.published.round_permitted().await? {
            return Ok(false);
        }

        let last = self.published.fetch_max().await?;
        let next_unix = self.compute_next_moment(now, last.as_ref());
        let target_date = Utc.timestamp_opt(next_unix, 0).unwrap().date_naive();
        let target_hour = Utc.timestamp_opt(next_unix, 0).unwrap().hour();

        self.editor.reset_mt_time_analyzed().await?;
        self.mtb.run_round().await?;
        self.time_scorer.score_all(target_hour, target_date).await?;

        tokio::time::sleep(std::time::Duration::from_secs(AGGREGATOR_SETTLE_SECONDS)).await;
        self.aggregator.run_once().await?;

        let Some(winner) = self.editor.fetch_top_candidate().await? else {
            info!("planner round found no scored candidate; aborting without changes");
            return Ok(false);
        };

        let mut tx = self.to_publish.pool().begin().await?;
        let winner_id = winner.id;
        pipeline_store::ToPublishRepo::insert_winner(&mut *tx, &winner, next_unix).await?;
        sqlx::query("DELETE FROM editor WHERE id = $1")
            .bind(winner_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        // Idempotent re-entry guard (spec §4.1 step 8): only close the chain
        // while a queued successor actually exists in `to_publish`.
        if self.to_publish.has_unpublished().await? {
            self.published.close_chain_on_max().await?;
        }

        info!(winner_id, next_unix, target_hour, "planner advanced a winner");
        Ok(true)
    }

    /// Step 1: the next publication timestamp and implied target hour,
    /// snapped into the configured `[MIN_HOUR, MAX_HOUR]` UTC window.
    fn compute_next_moment(&self, now: DateTime<Utc>, last: Option<&PublishedRow>) -> i64 {
        match last {
            None => {
                let hour = now.hour();
                if hour > self.max_hour {
                    self.snap_to(now.date_naive() + chrono::Duration::days(1), self.min_hour)
                } else if hour < self.min_hour {
                    self.snap_to(now.date_naive(), self.min_hour)
                } else {
                    now.timestamp()
                }
            }
            Some(row) => {
                let throughput_seconds =
                    (row.length as f64 / self.per_hour as f64 * 3600.0) as i64;
                let candidate = row.published_at + throughput_seconds;
                let candidate_dt = Utc.timestamp_opt(candidate, 0).unwrap();
                let hour = candidate_dt.hour();
                if hour >= self.min_hour && hour <= self.max_hour {
                    candidate
                } else if hour < self.min_hour {
                    self.snap_to(candidate_dt.date_naive(), self.min_hour)
                } else {
                    self.snap_to(
                        candidate_dt.date_naive() + chrono::Duration::days(1),
                        self.min_hour,
                    )
                }
            }
        }
    }

    fn snap_to(&self, date: NaiveDate, hour: u32) -> i64 {
        Utc.with_ymd_and_hms(date.year(), date.month(), date.day(), hour, 0, 0)
            .unwrap()
            .timestamp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn planner_with_window(min_hour: u32, max_hour: u32, per_hour: u32) -> (u32, u32, u32) {
        (min_hour, max_hour, per_hour)
    }

    fn compute_next_moment_standalone(
        now: DateTime<Utc>,
        last: Option<&PublishedRow>,
        per_hour: u32,
        min_hour: u32,
        max_hour: u32,
    ) -> i64 {
        match last {
            None => {
                let hour = now.hour();
                if hour > max_hour {
                    let date = now.date_naive() + chrono::Duration::days(1);
                    Utc.with_ymd_and_hms(date.year(), date.month(), date.day(), min_hour, 0, 0)
                        .unwrap()
                        .timestamp()
                } else if hour < min_hour {
                    let date = now.date_naive();
                    Utc.with_ymd_and_hms(date.year(), date.month(), date.day(), min_hour, 0, 0)
                        .unwrap()
                        .timestamp()
                } else {
                    now.timestamp()
                }
            }
            Some(row) => {
                let throughput_seconds = (row.length as f64 / per_hour as f64 * 3600.0) as i64;
                let candidate = row.published_at + throughput_seconds;
                let candidate_dt = Utc.timestamp_opt(candidate, 0).unwrap();
                let hour = candidate_dt.hour();
                if hour >= min_hour && hour <= max_hour {
                    candidate
                } else {
                    let date = if hour < min_hour {
                        candidate_dt.date_naive()
                    } else {
                        candidate_dt.date_naive() + chrono::Duration::days(1)
                    };
                    Utc.with_ymd_and_hms(date.year(), date.month(), date.day(), min_hour, 0, 0)
                        .unwrap()
                        .timestamp()
                }
            }
        }
    }

    #[test]
    fn cold_start_snaps_into_window_when_too_early() {
        let (min_hour, max_hour, per_hour) = planner_with_window(9, 21, 300);
        let now = dt(2026, 7, 31, 3);
        let next = compute_next_moment_standalone(now, None, per_hour, min_hour, max_hour);
        let expected = dt(2026, 7, 31, 9).timestamp();
        assert_eq!(next, expected);
    }

    #[test]
    fn cold_start_snaps_to_tomorrow_when_too_late() {
        let (min_hour, max_hour, per_hour) = planner_with_window(9, 21, 300);
        let now = dt(2026, 7, 31, 22);
        let next = compute_next_moment_standalone(now, None, per_hour, min_hour, max_hour);
        let expected = dt(2026, 8, 1, 9).timestamp();
        assert_eq!(next, expected);
    }

    #[test]
    fn window_rollover_snaps_to_next_day_min_hour() {
        let last = PublishedRow {
            id: 1,
            text: String::new(),
            topic: None,
            mood: None,
            author: None,
            names: vec![],
            length: 600,
            published_at: dt(2026, 7, 31, 20).timestamp(),
            next: false,
        };
        let next = compute_next_moment_standalone(dt(2026, 7, 31, 20), Some(&last), 300, 9, 21);
        let expected = dt(2026, 8, 1, 9).timestamp();
        assert_eq!(next, expected);
    }

    #[test]
    fn in_window_candidate_is_kept_as_is() {
        let last = PublishedRow {
            id: 1,
            text: String::new(),
            topic: None,
            mood: None,
            author: None,
            names: vec![],
            length: 3000,
            published_at: dt(2026, 7, 31, 10).timestamp(),
            next: false,
        };
        let next = compute_next_moment_standalone(dt(2026, 7, 31, 10), Some(&last), 300, 9, 21);
        let expected = dt(2026, 7, 31, 10).timestamp() + (3000.0 / 300.0 * 3600.0) as i64;
        assert_eq!(next, expected);
    }
}
