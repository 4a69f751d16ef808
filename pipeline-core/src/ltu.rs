//! LongTermUpdater (spec §4.4): refreshes the long-term topic/mood distribution.

use pipeline_clients::Classifier;
use pipeline_common::Result;
use pipeline_store::{EditorRepo, PublishedRepo, StateRepo};
use std::collections::BTreeSet;
use tracing::info;

#[derive(Clone)]
pub struct LongTermUpdater {
    editor: EditorRepo,
    published: PublishedRepo,
    state: StateRepo,
    classifier: Classifier,
    lt_posts: u32,
    interval_seconds: i64,
}

impl LongTermUpdater {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        editor: EditorRepo,
        published: PublishedRepo,
        state: StateRepo,
        classifier: Classifier,
        per_hour: u32,
        min_hour: u32,
        max_hour: u32,
        lt_posts: u32,
    ) -> Self {
        let interval_seconds = interval_seconds(per_hour, min_hour, max_hour, lt_posts);
        Self {
            editor,
            published,
            state,
            classifier,
            lt_posts,
            interval_seconds,
        }
    }

    /// Runs an update if the configured interval has elapsed since the last
    /// one. Returns whether an update actually ran.
    pub async fn maybe_run(&self, now: i64) -> Result<bool> {
        let last_updated = self.state.fetch().await?.map(|s| s.lt_updated_at).unwrap_or(0);
        if now - last_updated < self.interval_seconds {
            return Ok(false);
        }
        self.run_update(now).await?;
        Ok(true)
    }

    async fn run_update(&self, now: i64) -> Result<()> {
        let recent = self.published.fetch_recent(self.lt_posts as i64).await?;
        let topics = dedupe_comma_split(recent.iter().filter_map(|r| r.topic.as_deref()));
        let moods = dedupe_comma_split(recent.iter().filter_map(|r| r.mood.as_deref()));

        let lt_topic = self
            .classifier
            .categorize(
                "Summarize the long-term topic distribution of these posts",
                &topics.join(", "),
            )
            .await
            .unwrap_or_default();
        let lt_mood = self
            .classifier
            .categorize(
                "Summarize the long-term mood distribution of these posts",
                &moods.join(", "),
            )
            .await
            .unwrap_or_default();

        self.state.upsert_lt(&lt_topic, &lt_mood, now).await?;
        self.editor.reset_lt_true_to_false().await?;

        info!("long-term distribution refreshed");
        Ok(())
    }
}

/// `temp = PER_HOUR * (MAX_HOUR - MIN_HOUR) / 700`,
/// `intervalHours = round(LT_POSTS / temp * 24)`.
fn interval_seconds(per_hour: u32, min_hour: u32, max_hour: u32, lt_posts: u32) -> i64 {
    let temp = per_hour as f64 * (max_hour as f64 - min_hour as f64) / 700.0;
    let interval_hours = if temp > 0.0 {
        (lt_posts as f64 / temp * 24.0).round()
    } else {
        24.0
    };
    (interval_hours * 3600.0) as i64
}

fn dedupe_comma_split<'a>(fields: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    for field in fields {
        for part in field.split(',') {
            let part = part.trim().to_string();
            if !part.is_empty() && seen.insert(part.clone()) {
                out.push(part);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedupe_removes_repeats_across_fields() {
        let fields = vec!["politics, tech", "tech, sports"];
        let out = dedupe_comma_split(fields.into_iter());
        assert_eq!(out, vec!["politics", "tech", "sports"]);
    }

    #[test]
    fn interval_scales_with_lt_posts() {
        let base = interval_seconds(300, 9, 21, 50);
        let doubled = interval_seconds(300, 9, 21, 100);
        assert!(doubled > base);
    }
}
