//! Painter (spec §4.7): image generation side-channel into `to_publish`.

use base64::Engine;
use pipeline_clients::ImageGenerator;
use pipeline_common::Result;
use pipeline_store::ToPublishRepo;
use tracing::warn;

const BATCH_SIZE: i64 = 10;

#[derive(Clone)]
pub struct Painter {
    to_publish: ToPublishRepo,
    image_gen: ImageGenerator,
}

impl Painter {
    pub fn new(to_publish: ToPublishRepo, image_gen: ImageGenerator) -> Self {
        Self {
            to_publish,
            image_gen,
        }
    }

    pub async fn run_once(&self) -> Result<usize> {
        let rows = self.to_publish.fetch_pic_false(BATCH_SIZE).await?;
        for row in &rows {
            match self.image_gen.generate(&row.text).await {
                Ok(bytes) => {
                    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
                    self.to_publish.update_pic(row.id, &encoded).await?;
                }
                Err(e) => warn!(id = row.id, "painter failed to render image: {e}"),
            }
        }
        Ok(rows.len())
    }
}
