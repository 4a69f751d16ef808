//! Image generation webhook client (spec §6, §4.7 Painter).

use pipeline_common::{PipelineError, Result};
use serde::Serialize;
use std::time::Duration;
use tracing::warn;

const MAX_RETRIES: u32 = 3;
const BACKOFF_STEP: Duration = Duration::from_secs(2);

#[derive(Debug, Clone)]
pub struct ImageGenerator {
    endpoint: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    text: &'a str,
}

impl ImageGenerator {
    pub fn new(endpoint: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to build image generator http client");
        Self { endpoint, client }
    }

    /// Returns raw image bytes. Retries up to 3x with linear backoff on 5xx/429.
    pub async fn generate(&self, text: &str) -> Result<Vec<u8>> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let response = self
                .client
                .post(&self.endpoint)
                .json(&ImageRequest { text })
                .send()
                .await?;

            let status = response.status();
            if status.is_success() {
                let bytes = response.bytes().await?;
                if bytes.is_empty() {
                    return Err(PipelineError::Delivery(
                        "image generator returned an empty body".into(),
                    ));
                }
                return Ok(bytes.to_vec());
            }

            let retryable = status.is_server_error() || status.as_u16() == 429;
            if !retryable || attempt >= MAX_RETRIES {
                return Err(PipelineError::Delivery(format!(
                    "image generator failed with status {status}"
                )));
            }

            warn!("image generator returned {status}, retrying (attempt {attempt}/{MAX_RETRIES})");
            tokio::time::sleep(BACKOFF_STEP * attempt).await;
        }
    }
}
