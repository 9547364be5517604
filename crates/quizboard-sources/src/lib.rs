//! quizboard-sources — Where response and meta tables come from.
//!
//! Implements the `SourceFetcher` trait over HTTP, the local filesystem,
//! and an in-memory mock, plus the configuration that picks between them.

pub mod config;
pub mod http;
pub mod local;
pub mod mock;
pub mod template;

pub use config::{create_source, load_config, QuizboardConfig, SourceConfig};
pub use http::HttpSource;
pub use local::{FileSource, LocalSource};
pub use mock::MockSource;
pub use quizboard_core::error::SourceError;
pub use template::{PathTemplate, PathTemplates, TemplateError};
