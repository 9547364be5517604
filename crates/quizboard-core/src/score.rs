//! Lenient score cell parsing.
//!
//! Score cells are free text. Anything that is not `x/y` or a bare number
//! becomes [`ParsedScore::NONE`] instead of an error.

use std::sync::OnceLock;

use regex::Regex;

use crate::model::ParsedScore;

fn fraction_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^\s*(\d+(?:\.\d+)?)\s*/\s*(\d+(?:\.\d+)?)\s*$").expect("valid fraction regex")
    })
}

/// Parse a score cell.
///
/// - `""` → `{0, Some(0)}`
/// - `"7/10"` → `{7, Some(10)}`
/// - `"5"` → `{5, None}`
/// - anything else → `{0, Some(0)}`
pub fn extract_score(cell: &str) -> ParsedScore {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return ParsedScore::NONE;
    }

    if let Some(caps) = fraction_pattern().captures(trimmed) {
        let score = caps[1].parse::<f64>();
        let max = caps[2].parse::<f64>();
        if let (Ok(score), Ok(max)) = (score, max) {
            if !(score.is_finite() && max.is_finite()) {
                return ParsedScore::NONE;
            }
            return ParsedScore {
                score,
                max: Some(max),
            };
        }
    }

    match trimmed.parse::<f64>() {
        Ok(score) if score.is_finite() => ParsedScore { score, max: None },
        _ => ParsedScore::NONE,
    }
}

/// Coerce a raw cell to a number, for sorting non-score columns.
pub(crate) fn coerce_number(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}
