//! The retrieval seam between the load controller and the outside world.
//!
//! Implemented by the `quizboard-sources` crate (HTTP, local files, mock).

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::model::Selection;

/// Which of the two source texts to retrieve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Responses,
    Meta,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Responses => write!(f, "responses"),
            SourceKind::Meta => write!(f, "meta"),
        }
    }
}

/// Something that can produce the raw text of a response or meta table.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Human-readable source name (e.g. "http").
    fn name(&self) -> &str;

    /// Retrieve the raw text for `kind` under `selection`.
    async fn fetch(&self, kind: SourceKind, selection: &Selection) -> Result<String, SourceError>;
}
