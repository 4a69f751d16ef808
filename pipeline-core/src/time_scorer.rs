//! TimeScorer (spec §4.2): best-hour fitness and expiration urgency.

use chrono::NaiveDate;
use pipeline_common::Result;
use pipeline_store::{EditorRepo, EditorRow};

#[derive(Clone)]
pub struct TimeScorer {
    editor: EditorRepo,
}

impl TimeScorer {
    pub fn new(editor: EditorRepo) -> Self {
        Self { editor }
    }

    /// Scores every `editor` row with `time = false` for the given target
    /// hour/date, then sets `time = true` on each. Returns the row count.
    pub async fn score_all(&self, target_hour: u32, target_date: NaiveDate) -> Result<usize> {
        let rows = self.editor.fetch_time_false().await?;
        if rows.is_empty() {
            return Ok(0);
        }

        let rarity = rarity_map(&rows);
        let penalties = entropy_penalties(&rows);

        for (row, penalty) in rows.iter().zip(penalties) {
            let stage_b = best_hour_base_score(row, target_hour, &rarity);
            let time_best = ((stage_b.round() as i64) - penalty as i64).max(1) as i16;
            let time_expire = expire_score(row.post_time, row.expire, target_date);
            self.editor.update_time_scores(row.id, time_best, time_expire).await?;
        }

        Ok(rows.len())
    }
}

fn circular_dist(a: u32, b: u32) -> u32 {
    let d = (a as i64 - b as i64).unsigned_abs() as u32;
    d.min(24 - d)
}

/// Stage A: `rarity(h) = 1 - frequency of h across candidates' best_times`.
fn rarity_map(rows: &[EditorRow]) -> [f64; 24] {
    let mut counts = [0u32; 24];
    let mut total = 0u32;
    for row in rows {
        if row.best_times.is_empty() {
            continue;
        }
        total += 1;
        for &h in &row.best_times {
            if (0..24).contains(&h) {
                counts[h as usize] += 1;
            }
        }
    }
    let mut rarity = [1.0; 24];
    if total > 0 {
        for (h, count) in counts.iter().enumerate() {
            rarity[h] = 1.0 - (*count as f64 / total as f64);
        }
    }
    rarity
}

/// Stage B: base score from circular distance to the closest `best_times`
/// entry, plus a rarity bonus on that closest hour.
fn best_hour_base_score(row: &EditorRow, target_hour: u32, rarity: &[f64; 24]) -> f64 {
    if row.best_times.is_empty() {
        return 5.0;
    }

    let closest = row
        .best_times
        .iter()
        .filter(|&&b| (0..24).contains(&b))
        .map(|&b| (circular_dist(target_hour, b as u32), b as u32))
        .min_by_key(|&(d, _)| d);

    let Some((dmin, bmin)) = closest else {
        return 5.0;
    };

    let base = (10i64 - dmin as i64).max(1) as f64;
    let bonus = rarity[bmin as usize] * 3.0;
    (base + bonus).clamp(1.0, 10.0)
}

/// Marginal contribution of one row to the 24-hour coverage vector.
fn row_contribution(row: &EditorRow) -> [f64; 24] {
    let mut contrib = [0.0; 24];
    if row.best_times.is_empty() {
        return contrib;
    }
    for (h, slot) in contrib.iter_mut().enumerate() {
        let dmin = row
            .best_times
            .iter()
            .filter(|&&b| (0..24).contains(&b))
            .map(|&b| circular_dist(h as u32, b as u32))
            .min();
        if let Some(d) = dmin {
            *slot = (10i64 - d as i64).max(0) as f64;
        }
    }
    contrib
}

fn shannon_entropy(cov: &[f64; 24]) -> f64 {
    let s: f64 = cov.iter().sum();
    if s <= 0.0 {
        return 0.0;
    }
    -cov.iter()
        .filter(|&&c| c > 0.0)
        .map(|&c| {
            let p = c / s;
            p * p.log2()
        })
        .sum::<f64>()
}

/// Stage C: rank rows by the entropy gained by their own marginal
/// contribution, re-added to the aggregate coverage, and penalize by rank.
fn entropy_penalties(rows: &[EditorRow]) -> Vec<i16> {
    let contributions: Vec<[f64; 24]> = rows.iter().map(row_contribution).collect();

    let mut coverage = [0.0; 24];
    for contrib in &contributions {
        for (c, v) in coverage.iter_mut().zip(contrib.iter()) {
            *c += v;
        }
    }
    let base_entropy = shannon_entropy(&coverage);

    let delta_h: Vec<f64> = contributions
        .iter()
        .map(|contrib| {
            let mut covp = coverage;
            for (c, v) in covp.iter_mut().zip(contrib.iter()) {
                *c += v;
            }
            shannon_entropy(&covp) - base_entropy
        })
        .collect();

    let mut order: Vec<usize> = (0..rows.len()).collect();
    order.sort_by(|&a, &b| {
        let empty_a = rows[a].best_times.is_empty();
        let empty_b = rows[b].best_times.is_empty();
        match (empty_a, empty_b) {
            (false, true) => std::cmp::Ordering::Less,
            (true, false) => std::cmp::Ordering::Greater,
            _ => delta_h[b]
                .partial_cmp(&delta_h[a])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(rows[a].id.cmp(&rows[b].id)),
        }
    });

    let mut penalties = vec![0i16; rows.len()];
    for (rank, &idx) in order.iter().enumerate() {
        penalties[idx] = if rows[idx].best_times.is_empty() {
            3
        } else {
            match rank {
                0 | 1 => 0,
                2 | 3 => 1,
                4 | 5 => 2,
                _ => 3,
            }
        };
    }
    penalties
}

/// Expiration urgency (spec §4.2): 10 once expired, else a 10-point-wide
/// piecewise bucket of the elapsed fraction of the candidate's shelf life.
fn expire_score(post_time: NaiveDate, expire: i32, current_date: NaiveDate) -> i16 {
    if expire <= 0 {
        return 10;
    }
    let elapsed_days = (current_date - post_time).num_days();
    if elapsed_days >= expire as i64 {
        return 10;
    }
    let ratio_pct = (elapsed_days as f64 / expire as f64) * 100.0;
    let bucket = (ratio_pct / 10.0).floor().clamp(0.0, 9.0) as i16;
    bucket + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: i64, best_times: Vec<i32>, post_time: NaiveDate, expire: i32) -> EditorRow {
        EditorRow {
            id,
            text: String::new(),
            topic: None,
            mood: None,
            author: None,
            names: vec![],
            length: 0,
            post_time,
            expire,
            best_times,
            lt_topic: None,
            lt_mood: None,
            mt_topic: None,
            mt_mood: None,
            mt_author: None,
            time_best: None,
            time_expire: None,
            final_score: None,
            lt: false,
            mt: false,
            time: false,
            analyzed: false,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn expire_score_reaches_ten_at_boundary() {
        let post = date(2026, 1, 1);
        assert_eq!(expire_score(post, 10, date(2026, 1, 1)), 1);
        assert_eq!(expire_score(post, 10, date(2026, 1, 11)), 10);
        assert_eq!(expire_score(post, 10, date(2026, 1, 20)), 10);
    }

    #[test]
    fn expire_score_monotone_non_decreasing() {
        let post = date(2026, 1, 1);
        let mut last = 0;
        for offset in 0..15 {
            let score = expire_score(post, 10, post + chrono::Duration::days(offset));
            assert!(score >= last);
            last = score;
        }
    }

    #[test]
    fn best_hour_match_scores_near_max() {
        let rows = vec![row(1, vec![12], date(2026, 1, 1), 5)];
        let penalties = entropy_penalties(&rows);
        let rarity = rarity_map(&rows);
        let base = best_hour_base_score(&rows[0], 12, &rarity);
        let time_best = ((base.round() as i64) - penalties[0] as i64).max(1);
        assert!(time_best >= 10 - penalties[0] as i64);
    }

    #[test]
    fn entropy_ranking_matches_scenario() {
        let rows = vec![
            row(1, vec![9], date(2026, 1, 1), 5),
            row(2, vec![9], date(2026, 1, 1), 5),
            row(3, vec![15], date(2026, 1, 1), 5),
        ];
        let penalties = entropy_penalties(&rows);
        // row 3 (rarer direction at targetHour=12) should rank best (penalty 0).
        assert_eq!(penalties[2], 0);
        // among the tied {9} rows, lower id gets the better rank.
        assert_eq!(penalties[0], 0);
        assert_eq!(penalties[1], 1);
    }

    #[test]
    fn empty_best_times_defaults_to_five() {
        let rows = vec![row(1, vec![], date(2026, 1, 1), 5)];
        let rarity = rarity_map(&rows);
        assert_eq!(best_hour_base_score(&rows[0], 12, &rarity), 5.0);
    }
}
