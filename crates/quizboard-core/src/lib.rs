//! quizboard-core — Reconciliation and analytics for quiz response exports.
//!
//! This crate turns a response table and an optional meta table into a
//! reconciled dataset: question groups detected from headers, classified
//! against the meta table, with summary statistics and a query engine on top.

pub mod engine;
pub mod error;
pub mod groups;
pub mod meta;
pub mod model;
pub mod normalize;
pub mod query;
pub mod score;
pub mod statistics;
pub mod table;
pub mod traits;

pub use engine::{
    load_dataset, Dashboard, DashboardView, Dataset, LoadState, LoadTicket, StudentDetail,
};
pub use error::{ExportError, LoadError, SelectionError, SourceError, TableError};
pub use model::{Row, Selection};
pub use traits::{SourceFetcher, SourceKind};
