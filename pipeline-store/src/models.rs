//! Strongly-typed rows for the four pipeline tables.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A single labeled weight in a topic/mood/author distribution (spec §3, §6).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategoryWeight {
    pub label: String,
    pub weight: f64,
}

#[derive(Debug, Clone, FromRow)]
pub struct EditorRow {
    pub id: i64,
    pub text: String,
    pub topic: Option<String>,
    pub mood: Option<String>,
    pub author: Option<String>,
    pub names: Vec<String>,
    pub length: i32,
    pub post_time: NaiveDate,
    pub expire: i32,
    pub best_times: Vec<i32>,

    pub lt_topic: Option<i16>,
    pub lt_mood: Option<i16>,
    pub mt_topic: Option<i16>,
    pub mt_mood: Option<i16>,
    pub mt_author: Option<i16>,
    pub time_best: Option<i16>,
    pub time_expire: Option<i16>,
    pub final_score: Option<f64>,

    pub lt: bool,
    pub mt: bool,
    pub time: bool,
    pub analyzed: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct ToPublishRow {
    pub id: i64,
    pub text: String,
    pub topic: Option<String>,
    pub mood: Option<String>,
    pub author: Option<String>,
    pub names: Vec<String>,
    pub length: i32,

    pub time: i64,
    pub final_score: f64,

    pub pic_base64: Option<String>,
    pub text_prepared: Option<String>,

    pub pic: bool,
    pub prepare: bool,
    pub preview: bool,
    pub published: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct PublishedRow {
    pub id: i64,
    pub text: String,
    pub topic: Option<String>,
    pub mood: Option<String>,
    pub author: Option<String>,
    pub names: Vec<String>,
    pub length: i32,

    pub published_at: i64,
    pub next: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct StateRow {
    pub id: i32,
    pub lt_topic: sqlx::types::Json<Vec<CategoryWeight>>,
    pub lt_mood: sqlx::types::Json<Vec<CategoryWeight>>,
    pub mt_topic: sqlx::types::Json<Vec<CategoryWeight>>,
    pub mt_mood: sqlx::types::Json<Vec<CategoryWeight>>,
    pub mt_author: sqlx::types::Json<Vec<CategoryWeight>>,
    pub lt_updated_at: i64,
}
