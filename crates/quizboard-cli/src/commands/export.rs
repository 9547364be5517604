//! The `quizboard export` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use quizboard_core::query::DEFAULT_PAGE_SIZE;

use super::load::{load, LoadArgs};
use super::query::QueryArgs;

pub async fn execute(load_args: LoadArgs, query: QueryArgs, output: Option<PathBuf>) -> Result<()> {
    let (_, dataset) = load(&load_args).await?;

    let params = query.params(1, DEFAULT_PAGE_SIZE);
    let csv = dataset.export(&params).context("failed to write CSV")?;
    let count = dataset.query(&params).filtered_count;

    match output {
        Some(path) => {
            std::fs::write(&path, csv)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Exported {count} rows to {}", path.display());
        }
        None => print!("{csv}"),
    }

    Ok(())
}
