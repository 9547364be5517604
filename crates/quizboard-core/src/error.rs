//! Error types for loading, parsing, and exporting quiz tables.
//!
//! Source errors are defined here rather than in `quizboard-sources` so the
//! load controller can classify a failed fetch without string matching.

use thiserror::Error;

/// Errors that end (or degrade) a load cycle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    /// The response text could not be retrieved or was not tabular.
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    /// The response text parsed but contained no usable rows.
    #[error("response table contains no rows")]
    EmptyDataset,

    /// The meta text was missing or unparsable. Never fatal.
    #[error("meta table unavailable: {0}")]
    MetaUnavailable(String),
}

impl LoadError {
    /// Returns `true` if this error leaves the load in the errored state.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, LoadError::MetaUnavailable(_))
    }
}

/// Errors that can occur while retrieving a source text.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Nothing exists at the requested location.
    #[error("not found: {0}")]
    NotFound(String),

    /// The server answered with an error status.
    #[error("HTTP error (status {status}): {message}")]
    Http { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// A local read failed.
    #[error("I/O error: {0}")]
    Io(String),
}

impl SourceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SourceError::NotFound(_))
    }
}

/// Errors from turning delimited text into a table.
#[derive(Debug, Error)]
pub enum TableError {
    /// The text does not look like a delimited table (empty, HTML, ...).
    #[error("not a table: {0}")]
    NotTabular(&'static str),

    /// The CSV reader rejected the text.
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors for selection parameters outside their configured sets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("level {level} is not one of {allowed:?}")]
    UnknownLevel { level: u8, allowed: Vec<u8> },

    #[error("unknown location: {0}")]
    UnknownLocation(String),

    #[error("unknown month: {0}")]
    UnknownMonth(String),
}

/// Errors while serializing rows back to CSV.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to flush CSV writer: {0}")]
    Io(#[from] std::io::Error),

    #[error("exported CSV is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}
