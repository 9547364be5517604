//! Core data model types for quizboard.
//!
//! Rows and meta rows are produced by the table reader and never modified by
//! the reconciliation code. Everything else here is derived from them.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SelectionError;

/// Column name used for the synthetic total-score column.
pub const TOTAL_SCORE_COLUMN: &str = "Total score";

/// Header spellings accepted for the total score, in priority order.
pub const TOTAL_SCORE_ALIASES: [&str; 3] = ["Total score", "Total Score", "TotalScore"];

/// Conventional (not enforced) identity column of the response table.
pub const USERNAME_COLUMN: &str = "Username";

/// One student submission: column name to cell text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    cells: HashMap<String, String>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cell under `column`, or `""` when the column is absent.
    pub fn get(&self, column: &str) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn contains_column(&self, column: &str) -> bool {
        self.cells.contains_key(column)
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.cells.insert(column.into(), value.into());
    }

    /// Every cell value, in no particular order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.cells.values().map(String::as_str)
    }

    /// The first non-empty total-score cell among [`TOTAL_SCORE_ALIASES`].
    pub fn total_score_cell(&self) -> &str {
        TOTAL_SCORE_ALIASES
            .iter()
            .map(|alias| self.get(alias))
            .find(|cell| !cell.trim().is_empty())
            .unwrap_or("")
    }

    /// Returns `true` if every cell is empty or whitespace.
    pub fn is_blank(&self) -> bool {
        self.cells.values().all(|v| v.trim().is_empty())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// One row of the meta table describing a question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetaRow {
    fields: Row,
}

impl MetaRow {
    pub const QUESTION: &'static str = "Question";
    pub const SECTION: &'static str = "Section";
    pub const TYPE: &'static str = "Type";
    pub const CORRECT_ANSWER: &'static str = "CorrectAnswer";

    /// Raw question text, possibly with irregular whitespace.
    pub fn question(&self) -> &str {
        self.fields.get(Self::QUESTION)
    }

    pub fn section(&self) -> Option<&str> {
        non_empty(self.fields.get(Self::SECTION))
    }

    pub fn question_type(&self) -> Option<&str> {
        non_empty(self.fields.get(Self::TYPE))
    }

    pub fn correct_answer(&self) -> Option<&str> {
        non_empty(self.fields.get(Self::CORRECT_ANSWER))
    }

    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column)
    }
}

impl From<Row> for MetaRow {
    fn from(fields: Row) -> Self {
        Self { fields }
    }
}

impl<K, V> FromIterator<(K, V)> for MetaRow
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

fn non_empty(s: &str) -> Option<&str> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// The columns belonging to one quiz question in the response table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionGroup {
    /// Score header with the `[Score]` suffix removed.
    pub base_name: String,
    /// Whitespace-collapsed `base_name`; the join key into the meta table.
    pub normalized_name: String,
    /// Header holding the student's answer.
    pub question_key: String,
    /// Header holding the score cell.
    pub score_key: String,
    /// Header holding grader feedback, when the export has one.
    pub feedback_key: Option<String>,
}

/// A score cell parsed into numbers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParsedScore {
    pub score: f64,
    /// `None` for a bare number, `Some(0.0)` for "no usable score".
    pub max: Option<f64>,
}

impl ParsedScore {
    /// The "no score" value produced for empty and unparsable cells.
    pub const NONE: ParsedScore = ParsedScore {
        score: 0.0,
        max: Some(0.0),
    };

    /// The maximum, if it can serve as a denominator.
    pub fn usable_max(&self) -> Option<f64> {
        self.max.filter(|m| *m > 0.0)
    }

    /// Percentage against the cell's own maximum.
    pub fn percent(&self) -> Option<f64> {
        self.usable_max().map(|m| self.score * 100.0 / m)
    }
}

/// Whether a question group captures identity data or a scored question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    PersonalInfo,
    Quiz,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::PersonalInfo => write!(f, "personal info"),
            Classification::Quiz => write!(f, "quiz"),
        }
    }
}

/// Which tier of the classifier decided a group's classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationSource {
    Meta,
    Heuristic,
}

impl fmt::Display for ClassificationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassificationSource::Meta => write!(f, "meta"),
            ClassificationSource::Heuristic => write!(f, "heuristic"),
        }
    }
}

/// Dashboard summary over the whole response set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSummary {
    pub total_students: usize,
    /// Mean percentage.
    pub avg: f64,
    /// Lowest percentage.
    pub min: f64,
    /// Highest percentage.
    pub max: f64,
    pub pass_count: usize,
    pub pass_rate: f64,
    pub detected_max_score: f64,
}

/// The parameters that pick which two source texts are loaded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub level: u8,
    pub location: String,
    pub month: String,
}

impl Selection {
    pub fn new(level: u8, location: impl Into<String>, month: impl Into<String>) -> Self {
        Self {
            level,
            location: location.into(),
            month: month.into(),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/level {}", self.location, self.month, self.level)
    }
}

/// The enumerations a [`Selection`] is validated against.
///
/// An empty `locations` or `months` list accepts any value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRules {
    #[serde(default = "default_levels")]
    pub levels: Vec<u8>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub months: Vec<String>,
}

fn default_levels() -> Vec<u8> {
    (0..=4).collect()
}

impl Default for SelectionRules {
    fn default() -> Self {
        Self {
            levels: default_levels(),
            locations: Vec::new(),
            months: Vec::new(),
        }
    }
}

impl SelectionRules {
    pub fn validate(&self, selection: &Selection) -> Result<(), SelectionError> {
        if !self.levels.contains(&selection.level) {
            return Err(SelectionError::UnknownLevel {
                level: selection.level,
                allowed: self.levels.clone(),
            });
        }
        if !self.locations.is_empty() && !self.locations.contains(&selection.location) {
            return Err(SelectionError::UnknownLocation(selection.location.clone()));
        }
        if !self.months.is_empty() && !self.months.contains(&selection.month) {
            return Err(SelectionError::UnknownMonth(selection.month.clone()));
        }
        Ok(())
    }
}

/// Sort direction for the query engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl fmt::Display for SortDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDir::Asc => write!(f, "asc"),
            SortDir::Desc => write!(f, "desc"),
        }
    }
}

impl FromStr for SortDir {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDir::Asc),
            "desc" | "descending" => Ok(SortDir::Desc),
            other => Err(format!("unknown sort direction: {other}")),
        }
    }
}
