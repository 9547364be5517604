//! Question-group detection from response headers.
//!
//! Exports name their columns `<question>`, `<question> [Score]` and
//! optionally `<question> [Feedback]`. Header lookups are expressed as ordered
//! lists of [`HeaderStrategy`] values; the first strategy that finds a header
//! wins, and within a strategy the first header in input order wins.

use crate::model::QuestionGroup;
use crate::normalize::normalize;

const SCORE_SUFFIX: &str = "[score]";
const FEEDBACK_SUFFIX: &str = "[feedback]";

/// One way of recognizing a header as belonging to a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderStrategy {
    /// Header is exactly the base name.
    ExactQuestion,
    /// Header equals the base name once trimmed.
    TrimmedQuestion,
    /// Trimmed header is `"<base> [Feedback]"`, suffix case-insensitive.
    PairedFeedback,
    /// Header contains the base name and ends with `[feedback]`.
    ContainedFeedback,
}

/// Question-column strategies, in priority order.
pub const QUESTION_STRATEGIES: [HeaderStrategy; 2] =
    [HeaderStrategy::ExactQuestion, HeaderStrategy::TrimmedQuestion];

/// Feedback-column strategies, in priority order.
pub const FEEDBACK_STRATEGIES: [HeaderStrategy; 2] = [
    HeaderStrategy::PairedFeedback,
    HeaderStrategy::ContainedFeedback,
];

impl HeaderStrategy {
    pub fn matches(self, header: &str, base_name: &str) -> bool {
        match self {
            HeaderStrategy::ExactQuestion => header == base_name,
            HeaderStrategy::TrimmedQuestion => header.trim() == base_name,
            HeaderStrategy::PairedFeedback => strip_suffix_ci(header, FEEDBACK_SUFFIX)
                .and_then(|rest| rest.strip_suffix(' '))
                .is_some_and(|rest| rest == base_name),
            HeaderStrategy::ContainedFeedback => {
                header.contains(base_name) && strip_suffix_ci(header, FEEDBACK_SUFFIX).is_some()
            }
        }
    }
}

/// Find the first header matching any strategy, trying strategies in order.
pub fn find_header<'a>(
    headers: &'a [String],
    base_name: &str,
    strategies: &[HeaderStrategy],
) -> Option<&'a str> {
    strategies.iter().find_map(|strategy| {
        headers
            .iter()
            .find(|h| strategy.matches(h, base_name))
            .map(String::as_str)
    })
}

/// Strip a case-insensitive ASCII suffix from the trimmed text.
fn strip_suffix_ci<'a>(text: &'a str, suffix: &str) -> Option<&'a str> {
    let trimmed = text.trim();
    let split = trimmed.len().checked_sub(suffix.len())?;
    if !trimmed.is_char_boundary(split) {
        return None;
    }
    let (head, tail) = trimmed.split_at(split);
    tail.eq_ignore_ascii_case(suffix).then_some(head)
}

/// The base name of a score header, or `None` if it is not a score header.
pub fn score_base_name(header: &str) -> Option<&str> {
    strip_suffix_ci(header, SCORE_SUFFIX).map(str::trim_end)
}

/// Group response headers into question/score/feedback triples.
///
/// Score columns without a matching question column are dropped. Output order
/// follows the order of the score columns in `headers`.
pub fn detect_groups(headers: &[String]) -> Vec<QuestionGroup> {
    let mut groups = Vec::new();

    for score_key in headers {
        let Some(base_name) = score_base_name(score_key) else {
            continue;
        };
        if base_name.is_empty() {
            tracing::debug!("ignoring score column with empty question name: {score_key:?}");
            continue;
        }

        let Some(question_key) = find_header(headers, base_name, &QUESTION_STRATEGIES) else {
            tracing::debug!("dropping score column without question column: {score_key:?}");
            continue;
        };
        let feedback_key = find_header(headers, base_name, &FEEDBACK_STRATEGIES);

        groups.push(QuestionGroup {
            base_name: base_name.to_string(),
            normalized_name: normalize(base_name),
            question_key: question_key.to_string(),
            score_key: score_key.clone(),
            feedback_key: feedback_key.map(str::to_string),
        });
    }

    groups
}
