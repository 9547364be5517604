//! Load controller and the reconciled dataset.
//!
//! A load moves the dashboard through `Idle → Loading → {Loaded | Errored}`.
//! Every load is tagged with a [`LoadTicket`]; a result is applied only if
//! its ticket is still the current one, so a slow earlier request can never
//! overwrite a faster later one.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{ExportError, LoadError};
use crate::groups::detect_groups;
use crate::meta::{reconcile, ReconciledGroup};
use crate::model::{
    AnalyticsSummary, Classification, MetaRow, ParsedScore, Row, Selection, USERNAME_COLUMN,
};
use crate::query::{self, NumericColumns, QueryPage, QueryParams};
use crate::score::extract_score;
use crate::statistics::{
    compute_histogram, compute_question_stats, compute_summary, is_correct_answer, Histogram,
    QuestionStats,
};
use crate::table::{export_csv, parse_table, Table};
use crate::traits::{SourceFetcher, SourceKind};

/// A fully loaded and reconciled response set.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// The parameters this dataset was loaded for.
    pub selection: Selection,
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
    pub meta_rows: Vec<MetaRow>,
    pub groups: Vec<ReconciledGroup>,
    /// Why the meta table is missing, if it is.
    pub meta_error: Option<LoadError>,
    pub loaded_at: DateTime<Utc>,
    numeric: NumericColumns,
}

impl Dataset {
    /// Build a dataset from parsed tables. Fails with
    /// [`LoadError::EmptyDataset`] when the response table has no rows.
    pub fn new(
        selection: Selection,
        responses: Table,
        meta_rows: Vec<MetaRow>,
    ) -> Result<Self, LoadError> {
        if responses.rows.is_empty() {
            return Err(LoadError::EmptyDataset);
        }

        let detected = detect_groups(&responses.headers);
        let numeric = NumericColumns::from_groups(&detected);
        let groups = reconcile(&detected, &meta_rows);

        Ok(Self {
            selection,
            headers: responses.headers,
            rows: responses.rows,
            meta_rows,
            groups,
            meta_error: None,
            loaded_at: Utc::now(),
            numeric,
        })
    }

    pub fn with_meta_error(mut self, error: LoadError) -> Self {
        self.meta_error = Some(error);
        self
    }

    pub fn personal_info_groups(&self) -> impl Iterator<Item = &ReconciledGroup> {
        self.groups.iter().filter(|g| g.is_personal_info())
    }

    pub fn quiz_groups(&self) -> impl Iterator<Item = &ReconciledGroup> {
        self.groups
            .iter()
            .filter(|g| g.classification == Classification::Quiz)
    }

    pub fn numeric_columns(&self) -> &NumericColumns {
        &self.numeric
    }

    pub fn summary(&self) -> AnalyticsSummary {
        compute_summary(&self.rows, false)
    }

    /// Histogram over every row, regardless of any search.
    pub fn histogram(&self) -> Histogram {
        compute_histogram(&self.rows)
    }

    pub fn question_stats(&self) -> Vec<QuestionStats> {
        compute_question_stats(&self.rows, &self.groups)
    }

    pub fn query(&self, params: &QueryParams) -> QueryPage<'_> {
        query::query(&self.rows, params, &self.numeric)
    }

    /// One page of rows plus the full-set summary.
    pub fn view(&self, params: &QueryParams) -> DashboardView<'_> {
        DashboardView {
            page: self.query(params),
            summary: self.summary(),
        }
    }

    /// The filtered and sorted (not paginated) rows as CSV.
    pub fn export(&self, params: &QueryParams) -> Result<String, ExportError> {
        let selected = query::select_rows(&self.rows, params, &self.numeric);
        export_csv(&self.headers, selected)
    }

    /// Per-question breakdown for the row at `index`.
    pub fn student_detail(&self, index: usize) -> Option<StudentDetail> {
        let row = self.rows.get(index)?;
        let summary = self.summary();
        let total = extract_score(row.total_score_cell());
        let percent = if summary.detected_max_score > 0.0 {
            total.score * 100.0 / summary.detected_max_score
        } else {
            0.0
        };

        let mut personal_info = Vec::new();
        let mut answers = Vec::new();
        for g in &self.groups {
            let answer = row.get(&g.group.question_key).to_string();
            match g.classification {
                Classification::PersonalInfo => personal_info.push(PersonalAnswer {
                    question: g.group.base_name.clone(),
                    answer,
                }),
                Classification::Quiz => {
                    let feedback = g
                        .group
                        .feedback_key
                        .as_deref()
                        .map(|k| row.get(k).trim())
                        .filter(|f| !f.is_empty())
                        .map(str::to_string);
                    let is_correct = g
                        .correct_answer
                        .as_deref()
                        .map(|c| is_correct_answer(&answer, c));
                    answers.push(QuizAnswer {
                        question: g.group.base_name.clone(),
                        score: extract_score(row.get(&g.group.score_key)),
                        answer,
                        feedback,
                        correct_answer: g.correct_answer.clone(),
                        is_correct,
                    });
                }
            }
        }

        Some(StudentDetail {
            index,
            username: row.get(USERNAME_COLUMN).to_string(),
            total,
            percent,
            personal_info,
            answers,
        })
    }
}

/// One personal-info answer of a student.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonalAnswer {
    pub question: String,
    pub answer: String,
}

/// One quiz answer of a student, with grading annotations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizAnswer {
    pub question: String,
    pub answer: String,
    pub score: ParsedScore,
    pub feedback: Option<String>,
    pub correct_answer: Option<String>,
    pub is_correct: Option<bool>,
}

/// Everything known about one submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudentDetail {
    /// Position in the response table.
    pub index: usize,
    pub username: String,
    pub total: ParsedScore,
    /// Total as a percentage of the detected max score.
    pub percent: f64,
    pub personal_info: Vec<PersonalAnswer>,
    pub answers: Vec<QuizAnswer>,
}

/// One page of rows together with the summary over the whole response set.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView<'a> {
    pub page: QueryPage<'a>,
    pub summary: AnalyticsSummary,
}

/// Tag identifying one load request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    id: Uuid,
    selection: Selection,
}

impl LoadTicket {
    fn new(selection: Selection) -> Self {
        Self {
            id: Uuid::new_v4(),
            selection,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }
}

/// Where the dashboard is in its load cycle.
#[derive(Debug, Clone)]
pub enum LoadState {
    Idle,
    Loading(LoadTicket),
    Loaded(Box<Dataset>),
    Errored {
        selection: Selection,
        error: LoadError,
    },
}

impl LoadState {
    pub fn name(&self) -> &'static str {
        match self {
            LoadState::Idle => "idle",
            LoadState::Loading(_) => "loading",
            LoadState::Loaded(_) => "loaded",
            LoadState::Errored { .. } => "errored",
        }
    }
}

/// Retrieve and reconcile both source texts for `selection`.
///
/// The response table is fetched first; the meta table is only requested
/// once that succeeded, and its failure degrades to an empty meta set.
pub async fn load_dataset<F>(fetcher: &F, selection: &Selection) -> Result<Dataset, LoadError>
where
    F: SourceFetcher + ?Sized,
{
    let text = fetcher
        .fetch(SourceKind::Responses, selection)
        .await
        .map_err(|e| LoadError::SourceUnavailable(e.to_string()))?;
    let responses = parse_table(&text).map_err(|e| LoadError::SourceUnavailable(e.to_string()))?;

    let meta = match fetcher.fetch(SourceKind::Meta, selection).await {
        Ok(text) => parse_table(&text).map_err(|e| LoadError::MetaUnavailable(e.to_string())),
        Err(e) => Err(LoadError::MetaUnavailable(e.to_string())),
    };

    match meta {
        Ok(table) => {
            let meta_rows = table.rows.into_iter().map(MetaRow::from).collect();
            Dataset::new(selection.clone(), responses, meta_rows)
        }
        Err(error) => {
            tracing::warn!("{selection}: {error}; falling back to heuristic classification");
            Ok(Dataset::new(selection.clone(), responses, Vec::new())?.with_meta_error(error))
        }
    }
}

/// Holds the current load state and the derived views over it.
#[derive(Debug)]
pub struct Dashboard {
    state: LoadState,
}

impl Default for Dashboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Dashboard {
    pub fn new() -> Self {
        Self {
            state: LoadState::Idle,
        }
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    /// Start a load: drops all derived state and returns the new ticket.
    pub fn begin_load(&mut self, selection: Selection) -> LoadTicket {
        let ticket = LoadTicket::new(selection);
        tracing::debug!("loading {} (ticket {})", ticket.selection, ticket.id);
        self.state = LoadState::Loading(ticket.clone());
        ticket
    }

    /// Apply a finished load. Returns `false` and leaves the state untouched
    /// if `ticket` is not the load currently in flight.
    pub fn complete(&mut self, ticket: &LoadTicket, result: Result<Dataset, LoadError>) -> bool {
        let is_current = matches!(&self.state, LoadState::Loading(current) if current.id == ticket.id);
        if !is_current {
            tracing::debug!(
                "discarding stale result for {} (ticket {})",
                ticket.selection,
                ticket.id
            );
            return false;
        }

        self.state = match result {
            Ok(dataset) => {
                tracing::info!(
                    "loaded {} rows and {} question groups for {}",
                    dataset.rows.len(),
                    dataset.groups.len(),
                    ticket.selection
                );
                LoadState::Loaded(Box::new(dataset))
            }
            Err(error) => {
                tracing::warn!("load failed for {}: {error}", ticket.selection);
                LoadState::Errored {
                    selection: ticket.selection.clone(),
                    error,
                }
            }
        };
        true
    }

    /// Run a whole load cycle for `selection`.
    pub async fn load<F>(&mut self, fetcher: &F, selection: Selection) -> &LoadState
    where
        F: SourceFetcher + ?Sized,
    {
        let ticket = self.begin_load(selection);
        let result = load_dataset(fetcher, ticket.selection()).await;
        self.complete(&ticket, result);
        &self.state
    }

    pub fn into_state(self) -> LoadState {
        self.state
    }

    pub fn dataset(&self) -> Option<&Dataset> {
        match &self.state {
            LoadState::Loaded(dataset) => Some(dataset),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&LoadError> {
        match &self.state {
            LoadState::Errored { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Summary for the current state; all zeros unless loaded.
    pub fn summary(&self) -> AnalyticsSummary {
        match &self.state {
            LoadState::Loaded(dataset) => dataset.summary(),
            LoadState::Errored { .. } => compute_summary(&[], true),
            LoadState::Idle | LoadState::Loading(_) => AnalyticsSummary::default(),
        }
    }

    pub fn query(&self, params: &QueryParams) -> QueryPage<'_> {
        match self.dataset() {
            Some(dataset) => dataset.query(params),
            None => QueryPage::empty(),
        }
    }

    /// The reconciled query result: the requested page plus the summary.
    pub fn view(&self, params: &QueryParams) -> DashboardView<'_> {
        match self.dataset() {
            Some(dataset) => dataset.view(params),
            None => DashboardView {
                page: QueryPage::empty(),
                summary: self.summary(),
            },
        }
    }
}
