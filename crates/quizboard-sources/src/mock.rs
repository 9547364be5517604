//! In-memory source for testing loads without files or a server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use quizboard_core::error::SourceError;
use quizboard_core::model::Selection;
use quizboard_core::traits::{SourceFetcher, SourceKind};

/// A mock source returning canned text per kind, optionally per selection.
///
/// Kinds with no text configured fail with [`SourceError::NotFound`].
#[derive(Default)]
pub struct MockSource {
    /// Text served for any selection.
    texts: HashMap<SourceKind, String>,
    /// Text served for one selection only; takes precedence.
    by_selection: HashMap<(Selection, SourceKind), String>,
    call_count: AtomicU32,
    last_selection: Mutex<Option<Selection>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `text` as the response table for every selection.
    pub fn with_responses(mut self, text: &str) -> Self {
        self.texts.insert(SourceKind::Responses, text.to_string());
        self
    }

    /// Serve `text` as the meta table for every selection.
    pub fn with_meta(mut self, text: &str) -> Self {
        self.texts.insert(SourceKind::Meta, text.to_string());
        self
    }

    /// Serve `text` for `kind` only when `selection` is requested.
    pub fn with_selection(mut self, selection: Selection, kind: SourceKind, text: &str) -> Self {
        self.by_selection
            .insert((selection, kind), text.to_string());
        self
    }

    /// Number of fetches made, successful or not.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn last_selection(&self) -> Option<Selection> {
        self.last_selection
            .lock()
            .ok()
            .and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl SourceFetcher for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, kind: SourceKind, selection: &Selection) -> Result<String, SourceError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_selection.lock() {
            *last = Some(selection.clone());
        }

        self.by_selection
            .get(&(selection.clone(), kind))
            .or_else(|| self.texts.get(&kind))
            .cloned()
            .ok_or_else(|| SourceError::NotFound(format!("{kind} for {selection}")))
    }
}
