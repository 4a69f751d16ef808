//! Publisher (spec §4.7): scheduled dispatch with chain-control handoff.

use pipeline_clients::Telegram;
use pipeline_common::Result;
use pipeline_store::PublishedRepo;
use pipeline_store::ToPublishRepo;
use tracing::{info, warn};

pub const PUBLISH_INTERVAL_SECONDS: u64 = 1800;

#[derive(Clone)]
pub struct Publisher {
    to_publish: ToPublishRepo,
    published: PublishedRepo,
    telegram: Telegram,
}

impl Publisher {
    pub fn new(to_publish: ToPublishRepo, published: PublishedRepo, telegram: Telegram) -> Self {
        Self {
            to_publish,
            published,
            telegram,
        }
    }

    /// Delivers the whole ready batch, sleeping `PUBLISH_INTERVAL_SECONDS`
    /// between posts. The last row in the batch re-arms the Planner by
    /// closing with `next=false`.
    pub async fn run_once(&self, now: i64) -> Result<usize> {
        let rows = self.to_publish.fetch_ready_to_publish(now).await?;
        let count = rows.len();

        for (i, row) in rows.iter().enumerate() {
            let is_last = i == count - 1;
            let caption = row.text_prepared.as_deref().unwrap_or(&row.text);
            let pic = row.pic_base64.as_deref().unwrap_or_default();

            match self.telegram.send_photo(pic, caption).await {
                Ok(()) => {
                    self.published
                        .insert_from_delivery(row, now, !is_last)
                        .await?;
                    self.to_publish.mark_published(row.id).await?;
                    info!(id = row.id, "published record delivered");
                }
                Err(e) => {
                    warn!(id = row.id, "publisher failed to deliver: {e}");
                    continue;
                }
            }

            if !is_last {
                tokio::time::sleep(std::time::Duration::from_secs(PUBLISH_INTERVAL_SECONDS)).await;
            }
        }

        Ok(count)
    }
}
