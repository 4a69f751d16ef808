//! MediumTermBalancer (spec §4.3): short-horizon topic/mood/author diversity.

use pipeline_clients::Classifier;
use pipeline_common::Result;
use pipeline_store::{EditorRepo, PublishedRepo, PublishedRow, StateRepo};
use tracing::info;

#[derive(Clone)]
pub struct MediumTermBalancer {
    editor: EditorRepo,
    published: PublishedRepo,
    state: StateRepo,
    classifier: Classifier,
    mt_posts: u32,
}

impl MediumTermBalancer {
    pub fn new(
        editor: EditorRepo,
        published: PublishedRepo,
        state: StateRepo,
        classifier: Classifier,
        mt_posts: u32,
    ) -> Self {
        Self {
            editor,
            published,
            state,
            classifier,
            mt_posts,
        }
    }

    pub async fn run_round(&self) -> Result<()> {
        let recent = self.published.fetch_recent(self.mt_posts as i64).await?;
        let topics = extract_field(&recent, |r| r.topic.as_deref());
        let moods = extract_field(&recent, |r| r.mood.as_deref());
        let authors = extract_field(&recent, |r| r.author.as_deref());

        let mt_topic = self
            .classifier
            .categorize(
                "Summarize the medium-term topic distribution of these posts",
                &topics.join(", "),
            )
            .await
            .unwrap_or_default();
        let mt_mood = self
            .classifier
            .categorize(
                "Summarize the medium-term mood distribution of these posts",
                &moods.join(", "),
            )
            .await
            .unwrap_or_default();
        let mt_author = self
            .classifier
            .categorize(
                "Summarize the medium-term author distribution of these posts",
                &authors.join(", "),
            )
            .await
            .unwrap_or_default();

        self.state.upsert_mt(&mt_topic, &mt_mood, &mt_author).await?;

        let rows = self.editor.fetch_mt_false().await?;
        for row in &rows {
            let topic_score = self
                .classifier
                .diversification_score(
                    "Score topical diversification against the medium-term distribution",
                    row.topic.as_deref().unwrap_or(""),
                )
                .await;
            let mood_score = self
                .classifier
                .diversification_score(
                    "Score mood diversification against the medium-term distribution",
                    row.mood.as_deref().unwrap_or(""),
                )
                .await;

            let author = row.author.as_deref().unwrap_or("").trim();
            let author_score = if author.is_empty() {
                -1
            } else {
                self.classifier
                    .diversification_score(
                        "Score author-rotation diversification against the medium-term distribution",
                        author,
                    )
                    .await
            };

            self.editor
                .update_mt_scores(row.id, topic_score, mood_score, author_score)
                .await?;
        }

        if !rows.is_empty() {
            info!(count = rows.len(), "medium-term balancer scored rows");
        }
        Ok(())
    }
}

fn extract_field<'a>(
    rows: &'a [PublishedRow],
    field: impl Fn(&'a PublishedRow) -> Option<&'a str>,
) -> Vec<String> {
    rows.iter()
        .filter_map(field)
        .flat_map(|s| s.split(',').map(|p| p.trim().to_string()))
        .filter(|s| !s.is_empty())
        .collect()
}
