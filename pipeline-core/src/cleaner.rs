//! Cleaner (spec §4.7): periodic GC of expired `editor` rows and delivered `to_publish` rows.

use chrono::NaiveDate;
use pipeline_common::Result;
use pipeline_store::{EditorRepo, ToPublishRepo};
use tracing::info;

#[derive(Clone)]
pub struct Cleaner {
    editor: EditorRepo,
    to_publish: ToPublishRepo,
}

impl Cleaner {
    pub fn new(editor: EditorRepo, to_publish: ToPublishRepo) -> Self {
        Self { editor, to_publish }
    }

    pub async fn run_once(&self, today: NaiveDate) -> Result<(u64, u64)> {
        let expired = self.editor.delete_expired(today).await?;
        let delivered = self.to_publish.delete_published().await?;
        if expired > 0 || delivered > 0 {
            info!(expired, delivered, "cleaner swept stale rows");
        }
        Ok((expired, delivered))
    }
}
