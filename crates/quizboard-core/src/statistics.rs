//! Summary statistics, histogram buckets, and per-question statistics.
//!
//! Percentages are taken against a detected maximum score because exports
//! rarely carry one authoritative denominator. When no denominator can be
//! found every percentage is 0 rather than NaN.

use serde::{Deserialize, Serialize};

use crate::meta::ReconciledGroup;
use crate::model::{AnalyticsSummary, Classification, ParsedScore, Row};
use crate::normalize::normalize;
use crate::score::extract_score;

/// Minimum percentage counted as a pass.
pub const PASS_THRESHOLD: f64 = 50.0;

/// Width of one histogram bucket, in percentage points.
pub const BUCKET_WIDTH: f64 = 20.0;

/// Number of histogram buckets covering 0–100%.
pub const BUCKET_COUNT: usize = 5;

/// The denominator for a set of parsed scores.
///
/// The largest non-zero `max` wins; with no `max` anywhere, fall back to the
/// largest raw score. Never negative, never NaN.
pub fn detected_max_score(scores: &[ParsedScore]) -> f64 {
    let largest_max = scores
        .iter()
        .filter_map(ParsedScore::usable_max)
        .fold(None, |acc: Option<f64>, m| Some(acc.map_or(m, |a| a.max(m))));

    match largest_max {
        Some(m) => m,
        None => scores.iter().map(|s| s.score).fold(0.0, f64::max),
    }
}

/// Each score as a percentage of `denominator`, or all zeros without one.
pub fn percentages(scores: &[ParsedScore], denominator: f64) -> Vec<f64> {
    scores
        .iter()
        .map(|s| {
            if denominator > 0.0 {
                s.score * 100.0 / denominator
            } else {
                0.0
            }
        })
        .collect()
}

/// Parse every row's total-score cell.
pub fn total_scores(rows: &[Row]) -> Vec<ParsedScore> {
    rows.iter()
        .map(|r| extract_score(r.total_score_cell()))
        .collect()
}

/// Compute the dashboard summary.
///
/// A load error or an empty response set yields an all-zero summary.
pub fn compute_summary(rows: &[Row], had_load_error: bool) -> AnalyticsSummary {
    if had_load_error || rows.is_empty() {
        return AnalyticsSummary::default();
    }

    let scores = total_scores(rows);
    let detected = detected_max_score(&scores);
    let pcts = percentages(&scores, detected);

    let total = pcts.len();
    let avg = pcts.iter().sum::<f64>() / total as f64;
    let min = pcts.iter().copied().fold(f64::INFINITY, f64::min);
    let max = pcts.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let pass_count = pcts.iter().filter(|p| **p >= PASS_THRESHOLD).count();

    AnalyticsSummary {
        total_students: total,
        avg,
        min,
        max,
        pass_count,
        pass_rate: pass_count as f64 / total as f64 * 100.0,
        detected_max_score: detected,
    }
}

/// One 20-point slice of the score distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramBucket {
    pub label: String,
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Score distribution over the full response set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub buckets: Vec<HistogramBucket>,
    /// Rows left out for lack of a usable maximum or an out-of-range percentage.
    pub excluded: usize,
}

impl Histogram {
    pub fn counts(&self) -> Vec<usize> {
        self.buckets.iter().map(|b| b.count).collect()
    }
}

/// Bucket for a percentage: `[0,20)`, `[20,40)`, `[40,60)`, `[60,80)`, `[80,100]`.
pub fn bucket_index(percent: f64) -> Option<usize> {
    if !(0.0..=100.0).contains(&percent) {
        return None;
    }
    Some(((percent / BUCKET_WIDTH).floor() as usize).min(BUCKET_COUNT - 1))
}

/// Histogram of total-score percentages, each row against its own maximum.
///
/// Rows without a usable maximum are excluded from every bucket.
pub fn compute_histogram(rows: &[Row]) -> Histogram {
    let mut buckets: Vec<HistogramBucket> = (0..BUCKET_COUNT)
        .map(|i| {
            let lower = i as f64 * BUCKET_WIDTH;
            let upper = lower + BUCKET_WIDTH;
            HistogramBucket {
                label: format!("{lower:.0}-{upper:.0}%"),
                lower,
                upper,
                count: 0,
            }
        })
        .collect();

    let mut excluded = 0;
    for score in total_scores(rows) {
        match score.percent().and_then(bucket_index) {
            Some(i) => buckets[i].count += 1,
            None => excluded += 1,
        }
    }

    Histogram { buckets, excluded }
}

/// Statistics for one quiz question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionStats {
    pub question: String,
    /// Rows with a non-empty answer.
    pub answered: usize,
    /// Mean score over rows with a non-empty score cell.
    pub avg_score: f64,
    /// Detected maximum for this question's score column.
    pub max_score: f64,
    pub avg_percent: f64,
    /// Rows whose answer matches the meta table's correct answer, when known.
    pub correct_count: Option<usize>,
}

/// Compare an answer to the expected one, ignoring case and whitespace runs.
pub fn is_correct_answer(answer: &str, correct: &str) -> bool {
    let answer = normalize(answer);
    !answer.is_empty() && answer.to_lowercase() == normalize(correct).to_lowercase()
}

/// Per-question statistics for every quiz (non personal-info) group.
pub fn compute_question_stats(rows: &[Row], groups: &[ReconciledGroup]) -> Vec<QuestionStats> {
    groups
        .iter()
        .filter(|g| g.classification == Classification::Quiz)
        .map(|g| {
            let answered = rows
                .iter()
                .filter(|r| !r.get(&g.group.question_key).trim().is_empty())
                .count();

            let scores: Vec<ParsedScore> = rows
                .iter()
                .map(|r| r.get(&g.group.score_key))
                .filter(|cell| !cell.trim().is_empty())
                .map(extract_score)
                .collect();
            let avg_score = if scores.is_empty() {
                0.0
            } else {
                scores.iter().map(|s| s.score).sum::<f64>() / scores.len() as f64
            };
            let max_score = detected_max_score(&scores);
            let avg_percent = if max_score > 0.0 {
                avg_score / max_score * 100.0
            } else {
                0.0
            };

            let correct_count = g.correct_answer.as_deref().map(|correct| {
                rows.iter()
                    .filter(|r| is_correct_answer(r.get(&g.group.question_key), correct))
                    .count()
            });

            QuestionStats {
                question: g.group.base_name.clone(),
                answered,
                avg_score,
                max_score,
                avg_percent,
                correct_count,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::groups::detect_groups;
    use crate::meta::reconcile;
    use crate::model::MetaRow;

    fn rows_with_totals(totals: &[&str]) -> Vec<Row> {
        totals
            .iter()
            .enumerate()
            .map(|(i, t)| {
                [("Username", format!("user{i}")), ("Total score", t.to_string())]
                    .into_iter()
                    .collect()
            })
            .collect()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn five_and_ten_out_of_ten() {
        let summary = compute_summary(&rows_with_totals(&["5/10", "10/10"]), false);
        assert_eq!(summary.total_students, 2);
        assert!(approx(summary.detected_max_score, 10.0));
        assert!(approx(summary.avg, 75.0));
        assert!(approx(summary.min, 50.0));
        assert!(approx(summary.max, 100.0));
        assert_eq!(summary.pass_count, 2);
        assert!(approx(summary.pass_rate, 100.0));
    }

    #[test]
    fn three_and_eight_out_of_ten() {
        let summary = compute_summary(&rows_with_totals(&["3/10", "8/10"]), false);
        assert!(approx(summary.avg, 55.0));
        assert_eq!(summary.pass_count, 1);
        assert!(approx(summary.pass_rate, 50.0));
    }

    #[test]
    fn empty_or_errored_is_all_zero() {
        assert_eq!(compute_summary(&[], false), AnalyticsSummary::default());
        let rows = rows_with_totals(&["9/10"]);
        let summary = compute_summary(&rows, true);
        assert_eq!(summary, AnalyticsSummary::default());
        assert!(!summary.avg.is_nan());
    }

    #[test]
    fn falls_back_to_largest_raw_score() {
        let scores = vec![
            extract_score("4"),
            extract_score("8"),
            extract_score("garbage"),
        ];
        assert!(approx(detected_max_score(&scores), 8.0));
        let pcts = percentages(&scores, 8.0);
        assert_eq!(pcts, vec![50.0, 100.0, 0.0]);
    }

    #[test]
    fn explicit_max_beats_raw_scores() {
        let scores = vec![extract_score("12"), extract_score("3/5")];
        assert!(approx(detected_max_score(&scores), 5.0));
    }

    #[test]
    fn no_denominator_means_zero_percentages() {
        let summary = compute_summary(&rows_with_totals(&["", "n/a"]), false);
        assert_eq!(summary.total_students, 2);
        assert_eq!(summary.detected_max_score, 0.0);
        assert_eq!(summary.avg, 0.0);
        assert_eq!(summary.min, 0.0);
        assert_eq!(summary.max, 0.0);
        assert_eq!(summary.pass_count, 0);
    }

    #[test]
    fn total_score_aliases_are_honoured() {
        let rows: Vec<Row> = vec![
            [("TotalScore", "6/10")].into_iter().collect(),
            [("Total Score", "2/10")].into_iter().collect(),
        ];
        let summary = compute_summary(&rows, false);
        assert!(approx(summary.avg, 40.0));
    }

    #[test]
    fn bucket_boundaries_are_half_open() {
        assert_eq!(bucket_index(0.0), Some(0));
        assert_eq!(bucket_index(19.99), Some(0));
        assert_eq!(bucket_index(20.0), Some(1));
        assert_eq!(bucket_index(40.0), Some(2));
        assert_eq!(bucket_index(60.0), Some(3));
        assert_eq!(bucket_index(80.0), Some(4));
        assert_eq!(bucket_index(100.0), Some(4));
        assert_eq!(bucket_index(100.5), None);
        assert_eq!(bucket_index(-1.0), None);
    }

    #[test]
    fn histogram_counts_each_row_once() {
        let rows = rows_with_totals(&["2/10", "4/10", "6/10", "8/10", "10/10", "5", ""]);
        let hist = compute_histogram(&rows);
        assert_eq!(hist.counts(), vec![0, 1, 1, 1, 2]);
        assert_eq!(hist.excluded, 2);
        assert_eq!(hist.counts().iter().sum::<usize>() + hist.excluded, rows.len());
        assert_eq!(hist.buckets[0].label, "0-20%");
        assert_eq!(hist.buckets[4].label, "80-100%");
    }

    #[test]
    fn histogram_uses_each_rows_own_max() {
        let rows = rows_with_totals(&["1/2", "5/20"]);
        assert_eq!(compute_histogram(&rows).counts(), vec![0, 1, 1, 0, 0]);
    }

    #[test]
    fn question_stats_for_quiz_groups() {
        let headers: Vec<String> = ["Name", "Name [Score]", "2+2?", "2+2? [Score]"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let metas: Vec<MetaRow> = vec![[("Question", "2+2?"), ("Section", "Maths"), ("CorrectAnswer", "4")]
            .into_iter()
            .collect()];
        let groups = reconcile(&detect_groups(&headers), &metas);
        let rows: Vec<Row> = vec![
            [("Name", "A"), ("2+2?", "4"), ("2+2? [Score]", "1/1")]
                .into_iter()
                .collect(),
            [("Name", "B"), ("2+2?", " 5 "), ("2+2? [Score]", "0/1")]
                .into_iter()
                .collect(),
            [("Name", "C"), ("2+2?", ""), ("2+2? [Score]", "")]
                .into_iter()
                .collect(),
        ];

        let stats = compute_question_stats(&rows, &groups);
        assert_eq!(stats.len(), 1);
        let s = &stats[0];
        assert_eq!(s.question, "2+2?");
        assert_eq!(s.answered, 2);
        assert!(approx(s.avg_score, 0.5));
        assert!(approx(s.max_score, 1.0));
        assert!(approx(s.avg_percent, 50.0));
        assert_eq!(s.correct_count, Some(1));
    }

    #[test]
    fn correct_answer_comparison() {
        assert!(is_correct_answer(" Paris ", "paris"));
        assert!(is_correct_answer("New  York", "new york"));
        assert!(!is_correct_answer("", ""));
        assert!(!is_correct_answer("Lyon", "Paris"));
    }
}
