//! Aggregator (spec §4.6): single final score with missing-dimension
//! weight redistribution.

use pipeline_common::{AggregatorWeights, Result};
use pipeline_store::{EditorRepo, EditorRow};
use tracing::info;

#[derive(Clone)]
pub struct Aggregator {
    editor: EditorRepo,
    weights: AggregatorWeights,
}

impl Aggregator {
    pub fn new(editor: EditorRepo, weights: AggregatorWeights) -> Self {
        Self { editor, weights }
    }

    /// One scan: advance every row with all three prerequisite flags set.
    pub async fn run_once(&self) -> Result<usize> {
        let rows = self.editor.fetch_ready_for_aggregation().await?;
        for row in &rows {
            let score = final_score(row, &self.weights);
            self.editor.update_final_score(row.id, score).await?;
        }
        if !rows.is_empty() {
            info!(count = rows.len(), "aggregator scored rows");
        }
        Ok(rows.len())
    }
}

/// A dimension is valid iff its stored score is present, numeric, and > 0.
fn final_score(row: &EditorRow, weights: &AggregatorWeights) -> f64 {
    let dims: [(Option<i16>, f64); 7] = [
        (row.lt_topic, weights.lt_topic),
        (row.lt_mood, weights.lt_mood),
        (row.mt_topic, weights.mt_topic),
        (row.mt_mood, weights.mt_mood),
        (row.mt_author, weights.mt_author),
        (row.time_best, weights.time_best),
        (row.time_expire, weights.time_expire),
    ];

    let mut valid: Vec<(f64, f64)> = Vec::with_capacity(7);
    let mut invalid_weight = 0.0;
    for (score, weight) in dims {
        match score {
            Some(s) if s > 0 => valid.push((s as f64, weight)),
            _ => invalid_weight += weight,
        }
    }

    if valid.is_empty() {
        return 5.0;
    }

    let redistributed_bonus = invalid_weight / valid.len() as f64;
    let mut weighted_sum = 0.0;
    let mut weight_sum = 0.0;
    for (score, weight) in valid {
        let adjusted = weight + redistributed_bonus;
        weighted_sum += score * adjusted;
        weight_sum += adjusted;
    }

    let result = (weighted_sum / weight_sum).clamp(1.0, 10.0);
    (result * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn row(scores: [Option<i16>; 7]) -> EditorRow {
        EditorRow {
            id: 1,
            text: String::new(),
            topic: None,
            mood: None,
            author: None,
            names: vec![],
            length: 0,
            post_time: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            expire: 5,
            best_times: vec![],
            lt_topic: scores[0],
            lt_mood: scores[1],
            mt_topic: scores[2],
            mt_mood: scores[3],
            mt_author: scores[4],
            time_best: scores[5],
            time_expire: scores[6],
            final_score: None,
            lt: true,
            mt: true,
            time: true,
            analyzed: false,
        }
    }

    #[test]
    fn all_dimensions_equal_yields_same_score() {
        let weights = AggregatorWeights::default();
        let r = row([Some(7), Some(7), Some(7), Some(7), Some(7), Some(7), Some(7)]);
        assert_eq!(final_score(&r, &weights), 7.0);
    }

    #[test]
    fn invalid_dimension_redistributes_without_changing_uniform_mean() {
        let weights = AggregatorWeights::default();
        let r = row([Some(10), Some(10), Some(10), Some(10), Some(-1), Some(10), Some(10)]);
        assert_eq!(final_score(&r, &weights), 10.0);
    }

    #[test]
    fn all_invalid_defaults_to_five() {
        let weights = AggregatorWeights::default();
        let r = row([None, None, Some(-1), None, Some(0), None, None]);
        assert_eq!(final_score(&r, &weights), 5.0);
    }
}
