//! LLM classifier client (spec §6): prompt + payload in, schema-shaped JSON out.

use pipeline_store::CategoryWeight;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Clone)]
pub struct Classifier {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct ClassifierRequest<'a> {
    prompt: &'a str,
    payload: &'a str,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CategoryArrayResponse {
    categories: Vec<CategoryWeight>,
}

#[derive(Debug, Deserialize)]
struct DiversificationResponse {
    diversification_score: i32,
}

impl Classifier {
    pub fn new(endpoint: String, api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to build classifier http client");
        Self {
            endpoint,
            api_key,
            client,
        }
    }

    /// Category-array family: e.g. `topic_categories: [{topic, weight}, ...]`.
    /// Malformed output is treated as absent (spec §7): caller should skip the write.
    pub async fn categorize(&self, prompt: &str, payload: &str) -> Option<Vec<CategoryWeight>> {
        let response = self.request(prompt, payload, 0.2, 512).await.ok()?;
        match response.json::<CategoryArrayResponse>().await {
            Ok(body) => Some(body.categories),
            Err(e) => {
                warn!("classifier returned malformed category array: {e}");
                None
            }
        }
    }

    /// Diversification-scalar family: an integer 1..10. Defaults to 5 on any
    /// failure or malformed output (spec §4.5, §7).
    pub async fn diversification_score(&self, prompt: &str, payload: &str) -> i16 {
        const DEFAULT: i16 = 5;
        let Ok(response) = self.request(prompt, payload, 0.2, 16).await else {
            return DEFAULT;
        };
        match response.json::<DiversificationResponse>().await {
            Ok(body) => body.diversification_score.clamp(1, 10) as i16,
            Err(e) => {
                warn!("classifier returned malformed diversification score: {e}");
                DEFAULT
            }
        }
    }

    async fn request(
        &self,
        prompt: &str,
        payload: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> reqwest::Result<reqwest::Response> {
        self.client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&ClassifierRequest {
                prompt,
                payload,
                temperature,
                max_tokens,
            })
            .send()
            .await
    }
}
