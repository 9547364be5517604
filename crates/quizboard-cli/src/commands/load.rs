//! Loading a dataset from the command line arguments.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use quizboard_core::{Dashboard, Dataset, LoadState, Selection, SourceFetcher};
use quizboard_sources::config::load_config_from;
use quizboard_sources::{create_source, FileSource, QuizboardConfig};

/// Arguments shared by every command that loads a dataset.
#[derive(Args, Debug, Clone)]
pub struct LoadArgs {
    /// Quiz level
    #[arg(long, required_unless_present = "responses")]
    pub level: Option<u8>,

    /// Location
    #[arg(long, required_unless_present = "responses")]
    pub location: Option<String>,

    /// Month
    #[arg(long, required_unless_present = "responses")]
    pub month: Option<String>,

    /// Config file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Read responses from this file instead of the configured source
    #[arg(long)]
    pub responses: Option<PathBuf>,

    /// Meta file to pair with --responses
    #[arg(long, requires = "responses")]
    pub meta: Option<PathBuf>,
}

impl LoadArgs {
    fn selection(&self) -> Selection {
        Selection::new(
            self.level.unwrap_or(0),
            self.location.clone().unwrap_or_else(|| "local".into()),
            self.month.clone().unwrap_or_else(|| "local".into()),
        )
    }
}

/// Load config, pick a source, and run one load cycle.
pub async fn load(args: &LoadArgs) -> Result<(QuizboardConfig, Dataset)> {
    let config = load_config_from(args.config.as_deref())?;
    let selection = args.selection();

    let source: Box<dyn SourceFetcher> = match &args.responses {
        Some(responses) => Box::new(FileSource::new(responses, args.meta.clone())),
        None => {
            config
                .selection_rules()
                .validate(&selection)
                .context("invalid selection")?;
            create_source(&config)?
        }
    };
    tracing::debug!("loading {selection} from {} source", source.name());

    let mut dashboard = Dashboard::new();
    dashboard.load(&*source, selection.clone()).await;

    match dashboard.into_state() {
        LoadState::Loaded(dataset) => Ok((config, *dataset)),
        LoadState::Errored { error, .. } => {
            Err(anyhow::Error::new(error).context(format!("failed to load {selection}")))
        }
        other => anyhow::bail!("load of {selection} ended in state {}", other.name()),
    }
}
