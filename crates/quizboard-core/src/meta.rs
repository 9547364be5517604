//! Joining question groups against the meta table.
//!
//! Classification is two-tier: a meta row for the question is authoritative,
//! and only when none exists does the keyword heuristic run.

use std::collections::HashMap;

use serde::Serialize;

use crate::model::{Classification, ClassificationSource, MetaRow, QuestionGroup};
use crate::normalize::normalize;

/// `Section` value marking a question as personal info.
pub const PERSONAL_INFO_SECTION: &str = "Personal Info";

/// Keywords that mark an unannotated question as personal info.
pub const PERSONAL_INFO_KEYWORDS: [&str; 5] = ["name", "email", "identity", "contact", "mobile"];

/// Meta rows indexed by normalized question text.
#[derive(Debug, Clone, Default)]
pub struct MetaIndex {
    by_question: HashMap<String, MetaRow>,
}

impl MetaIndex {
    /// Index meta rows by `normalize(Question)`. Later duplicates replace
    /// earlier ones; rows without question text are skipped.
    pub fn build(meta_rows: &[MetaRow]) -> Self {
        let mut by_question = HashMap::new();
        for row in meta_rows {
            let key = normalize(row.question());
            if key.is_empty() {
                continue;
            }
            by_question.insert(key, row.clone());
        }
        Self { by_question }
    }

    pub fn lookup(&self, normalized_name: &str) -> Option<&MetaRow> {
        self.by_question.get(normalized_name)
    }

    pub fn len(&self) -> usize {
        self.by_question.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_question.is_empty()
    }
}

/// Fallback classification from the question text alone.
pub fn classify_by_keyword(base_name: &str) -> Classification {
    let lower = base_name.to_lowercase();
    if PERSONAL_INFO_KEYWORDS.iter().any(|k| lower.contains(k)) {
        Classification::PersonalInfo
    } else {
        Classification::Quiz
    }
}

/// Classification from a meta row's `Section`.
pub fn classify_by_meta(meta: &MetaRow) -> Classification {
    let is_personal = meta
        .section()
        .is_some_and(|s| normalize(s) == PERSONAL_INFO_SECTION);
    if is_personal {
        Classification::PersonalInfo
    } else {
        Classification::Quiz
    }
}

/// Classify a group, reporting which tier decided.
pub fn classify(
    group: &QuestionGroup,
    index: &MetaIndex,
) -> (Classification, ClassificationSource) {
    match index.lookup(&group.normalized_name) {
        Some(meta) => (classify_by_meta(meta), ClassificationSource::Meta),
        None => (
            classify_by_keyword(&group.base_name),
            ClassificationSource::Heuristic,
        ),
    }
}

/// A question group with its classification and meta annotations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledGroup {
    pub group: QuestionGroup,
    pub classification: Classification,
    pub source: ClassificationSource,
    pub section: Option<String>,
    pub question_type: Option<String>,
    pub correct_answer: Option<String>,
}

impl ReconciledGroup {
    pub fn is_personal_info(&self) -> bool {
        self.classification == Classification::PersonalInfo
    }
}

/// Join every group against the meta table.
pub fn reconcile(groups: &[QuestionGroup], meta_rows: &[MetaRow]) -> Vec<ReconciledGroup> {
    let index = MetaIndex::build(meta_rows);
    let reconciled: Vec<ReconciledGroup> = groups
        .iter()
        .map(|group| {
            let (classification, source) = classify(group, &index);
            let meta = index.lookup(&group.normalized_name);
            ReconciledGroup {
                group: group.clone(),
                classification,
                source,
                section: meta.and_then(|m| m.section()).map(str::to_string),
                question_type: meta.and_then(|m| m.question_type()).map(str::to_string),
                correct_answer: meta.and_then(|m| m.correct_answer()).map(str::to_string),
            }
        })
        .collect();

    let matched = reconciled
        .iter()
        .filter(|g| g.source == ClassificationSource::Meta)
        .count();
    tracing::debug!(
        "reconciled {} groups against {} meta rows ({matched} matched)",
        reconciled.len(),
        index.len()
    );

    reconciled
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(base: &str) -> QuestionGroup {
        QuestionGroup {
            base_name: base.to_string(),
            normalized_name: normalize(base),
            question_key: base.to_string(),
            score_key: format!("{base} [Score]"),
            feedback_key: None,
        }
    }

    fn meta(question: &str, section: &str) -> MetaRow {
        [("Question", question), ("Section", section)]
            .into_iter()
            .collect()
    }

    #[test]
    fn meta_section_is_authoritative() {
        let metas = vec![meta("Favourite  colour?", "Personal Info")];
        let out = reconcile(&[group("Favourite colour?")], &metas);
        assert_eq!(out[0].classification, Classification::PersonalInfo);
        assert_eq!(out[0].source, ClassificationSource::Meta);
        assert_eq!(out[0].section.as_deref(), Some("Personal Info"));
    }

    #[test]
    fn meta_overrides_keyword() {
        let metas = vec![meta("Name the capital of France", "Geography")];
        let out = reconcile(&[group("Name the capital of France")], &metas);
        assert_eq!(out[0].classification, Classification::Quiz);
        assert_eq!(out[0].source, ClassificationSource::Meta);
    }

    #[test]
    fn keyword_fallback_without_meta() {
        let out = reconcile(&[group("Your Email address"), group("2 + 2 = ?")], &[]);
        assert_eq!(out[0].classification, Classification::PersonalInfo);
        assert_eq!(out[0].source, ClassificationSource::Heuristic);
        assert_eq!(out[1].classification, Classification::Quiz);
        assert_eq!(out[1].source, ClassificationSource::Heuristic);
    }

    #[test]
    fn keyword_match_is_case_insensitive_substring() {
        assert_eq!(classify_by_keyword("MOBILE number"), Classification::PersonalInfo);
        assert_eq!(classify_by_keyword("Surname"), Classification::PersonalInfo);
        assert_eq!(classify_by_keyword("Contact details"), Classification::PersonalInfo);
        assert_eq!(classify_by_keyword("Solve for x"), Classification::Quiz);
    }

    #[test]
    fn duplicate_meta_last_write_wins() {
        let metas = vec![
            meta("Q1", "Personal Info"),
            [("Question", " Q1 "), ("Section", "Maths"), ("CorrectAnswer", "4")]
                .into_iter()
                .collect(),
        ];
        let out = reconcile(&[group("Q1")], &metas);
        assert_eq!(out[0].classification, Classification::Quiz);
        assert_eq!(out[0].correct_answer.as_deref(), Some("4"));
    }

    #[test]
    fn section_whitespace_is_normalized() {
        let m = meta("Q", "  Personal   Info ");
        assert_eq!(classify_by_meta(&m), Classification::PersonalInfo);
        let m = meta("Q", "");
        assert_eq!(classify_by_meta(&m), Classification::Quiz);
    }

    #[test]
    fn index_skips_empty_questions() {
        let index = MetaIndex::build(&[meta("", "Personal Info"), meta("Q2", "Maths")]);
        assert_eq!(index.len(), 1);
        assert!(index.lookup("Q2").is_some());
    }
}
