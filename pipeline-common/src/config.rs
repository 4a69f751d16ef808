//! Environment-sourced configuration for every pipeline task.

use crate::error::{PipelineError, Result};
use std::env;

/// Aggregator dimension weights (spec §4.6), expected to sum to 1.0.
#[derive(Debug, Clone, Copy)]
pub struct AggregatorWeights {
    pub lt_topic: f64,
    pub lt_mood: f64,
    pub mt_topic: f64,
    pub mt_mood: f64,
    pub mt_author: f64,
    pub time_best: f64,
    pub time_expire: f64,
}

impl Default for AggregatorWeights {
    fn default() -> Self {
        Self {
            lt_topic: 0.15,
            lt_mood: 0.15,
            mt_topic: 0.15,
            mt_mood: 0.15,
            mt_author: 0.15,
            time_best: 0.20,
            time_expire: 0.05,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,

    /// Characters/hour throughput used to derive the next publication moment.
    pub per_hour: u32,
    /// Inclusive UTC publication window.
    pub min_hour: u32,
    pub max_hour: u32,

    pub lt_posts: u32,
    pub mt_posts: u32,
    pub weights: AggregatorWeights,

    pub classifier_endpoint: String,
    pub classifier_api_key: String,
    pub image_endpoint: String,

    pub telegram_bot_token: String,
    pub telegram_chat_id: String,
    pub channel_subscribe_url: String,
}

fn env_var(key: &str) -> Result<String> {
    env::var(key).map_err(|_| PipelineError::Config(format!("{key} must be set")))
}

fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T> {
    match env::var(key) {
        Ok(v) => v
            .parse()
            .map_err(|_| PipelineError::Config(format!("invalid {key}"))),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let min_hour = env_parse_or("MIN_HOUR", 9u32)?;
        let max_hour = env_parse_or("MAX_HOUR", 21u32)?;
        if min_hour > 23 || max_hour > 23 || min_hour > max_hour {
            return Err(PipelineError::Config(format!(
                "invalid publication window MIN_HOUR={min_hour} MAX_HOUR={max_hour}"
            )));
        }

        Ok(Self {
            database_url: env_var("DATABASE_URL")?,

            per_hour: env_parse_or("PER_HOUR", 300u32)?,
            min_hour,
            max_hour,

            lt_posts: env_parse_or("LT_POSTS", 50u32)?,
            mt_posts: env_parse_or("MT_POSTS", 20u32)?,
            weights: AggregatorWeights::default(),

            classifier_endpoint: env_var_or("CLASSIFIER_ENDPOINT", "http://localhost:9100/classify"),
            classifier_api_key: env_var_or("CLASSIFIER_API_KEY", ""),
            image_endpoint: env_var_or("IMAGE_ENDPOINT", "http://localhost:9200/generate"),

            telegram_bot_token: env_var("TELEGRAM_BOT_TOKEN")?,
            telegram_chat_id: env_var("TELEGRAM_CHAT_ID")?,
            channel_subscribe_url: env_var_or(
                "CHANNEL_SUBSCRIBE_URL",
                "https://t.me/news_anthology",
            ),
        })
    }
}
