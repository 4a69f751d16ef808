//! LongTermMonitor (spec §4.5): per-candidate novelty against the LT distribution.

use pipeline_clients::Classifier;
use pipeline_common::Result;
use pipeline_store::{EditorRepo, StateRepo};
use tracing::info;

const BATCH_SIZE: i64 = 5;

#[derive(Clone)]
pub struct LongTermMonitor {
    editor: EditorRepo,
    state: StateRepo,
    classifier: Classifier,
}

impl LongTermMonitor {
    pub fn new(editor: EditorRepo, state: StateRepo, classifier: Classifier) -> Self {
        Self {
            editor,
            state,
            classifier,
        }
    }

    pub async fn run_once(&self) -> Result<usize> {
        let rows = self.editor.fetch_lt_false_batch(BATCH_SIZE).await?;
        if rows.is_empty() {
            return Ok(0);
        }

        let state = self.state.fetch().await?;
        let (lt_topic_empty, lt_mood_empty) = match &state {
            Some(s) => (s.lt_topic.0.is_empty(), s.lt_mood.0.is_empty()),
            None => (true, true),
        };

        for row in &rows {
            let topic_score = if lt_topic_empty {
                5
            } else {
                self.classifier
                    .diversification_score(
                        "Score topical novelty against the long-term distribution",
                        row.topic.as_deref().unwrap_or(""),
                    )
                    .await
            };
            let mood_score = if lt_mood_empty {
                5
            } else {
                self.classifier
                    .diversification_score(
                        "Score mood novelty against the long-term distribution",
                        row.mood.as_deref().unwrap_or(""),
                    )
                    .await
            };
            self.editor.update_lt_scores(row.id, topic_score, mood_score).await?;
        }

        info!(count = rows.len(), "long-term monitor scored rows");
        Ok(rows.len())
    }
}
