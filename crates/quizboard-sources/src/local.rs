//! Sources that read tables from the local filesystem.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::instrument;

use quizboard_core::error::SourceError;
use quizboard_core::model::Selection;
use quizboard_core::traits::{SourceFetcher, SourceKind};

use crate::template::PathTemplates;

async fn read_text(path: &Path) -> Result<String, SourceError> {
    tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => SourceError::NotFound(path.display().to_string()),
        _ => SourceError::Io(format!("{}: {e}", path.display())),
    })
}

/// Reads `{root}/{rendered template}` for each selection.
#[derive(Debug, Clone)]
pub struct LocalSource {
    root: PathBuf,
    paths: PathTemplates,
}

impl LocalSource {
    pub fn new(root: impl Into<PathBuf>, paths: PathTemplates) -> Self {
        Self {
            root: root.into(),
            paths,
        }
    }

    pub fn path(&self, kind: SourceKind, selection: &Selection) -> PathBuf {
        self.root.join(self.paths.render(kind, selection))
    }
}

#[async_trait]
impl SourceFetcher for LocalSource {
    fn name(&self) -> &str {
        "local"
    }

    #[instrument(skip(self, kind, selection), fields(kind = %kind, selection = %selection))]
    async fn fetch(&self, kind: SourceKind, selection: &Selection) -> Result<String, SourceError> {
        read_text(&self.path(kind, selection)).await
    }
}

/// Two explicit files, ignoring the selection.
///
/// Used when the response (and optionally meta) file is named directly on
/// the command line.
#[derive(Debug, Clone)]
pub struct FileSource {
    responses: PathBuf,
    meta: Option<PathBuf>,
}

impl FileSource {
    pub fn new(responses: impl Into<PathBuf>, meta: Option<PathBuf>) -> Self {
        Self {
            responses: responses.into(),
            meta,
        }
    }
}

#[async_trait]
impl SourceFetcher for FileSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch(&self, kind: SourceKind, _selection: &Selection) -> Result<String, SourceError> {
        match kind {
            SourceKind::Responses => read_text(&self.responses).await,
            SourceKind::Meta => match &self.meta {
                Some(path) => read_text(path).await,
                None => Err(SourceError::NotFound("no meta file given".into())),
            },
        }
    }
}
