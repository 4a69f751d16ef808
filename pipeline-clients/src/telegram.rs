//! Telegram-style delivery surface client (spec §6, §4.7 Publisher).

use base64::Engine;
use pipeline_common::{PipelineError, Result};
use reqwest::multipart;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Telegram {
    bot_token: String,
    chat_id: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct SendPhotoResponse {
    ok: bool,
}

impl Telegram {
    pub fn new(bot_token: String, chat_id: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build telegram http client");
        Self {
            bot_token,
            chat_id,
            client,
        }
    }

    /// `sendPhoto` with the base64-decoded photo, a MarkdownV2 caption, parse
    /// mode `MarkdownV2`. Success is HTTP 200 with `{ok: true}`.
    pub async fn send_photo(&self, photo_base64: &str, caption: &str) -> Result<()> {
        let photo_bytes = base64::engine::general_purpose::STANDARD
            .decode(photo_base64)
            .map_err(|e| PipelineError::Delivery(format!("invalid pic-base64: {e}")))?;

        let url = format!("https://api.telegram.org/bot{}/sendPhoto", self.bot_token);
        let form = multipart::Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("caption", caption.to_string())
            .text("parse_mode", "MarkdownV2")
            .part(
                "photo",
                multipart::Part::bytes(photo_bytes).file_name("post.jpg"),
            );

        let response = self.client.post(&url).multipart(form).send().await?;
        let status = response.status();
        let body: SendPhotoResponse = response.json().await?;

        if !status.is_success() || !body.ok {
            return Err(PipelineError::Delivery(format!(
                "telegram delivery failed: status={status} ok={}",
                body.ok
            )));
        }
        Ok(())
    }
}
