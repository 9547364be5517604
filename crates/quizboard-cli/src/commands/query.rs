//! The `quizboard query` command.

use anyhow::Result;
use clap::Args;
use comfy_table::{Cell, Table};

use quizboard_core::model::{Row, SortDir, TOTAL_SCORE_COLUMN, USERNAME_COLUMN};
use quizboard_core::query::{QueryParams, SortSpec};
use quizboard_core::score::extract_score;
use quizboard_core::Dataset;

use super::load::{load, LoadArgs};

/// Search and sort options shared by `query` and `export`.
#[derive(Args, Debug, Clone, Default)]
pub struct QueryArgs {
    /// Case-insensitive text to match in any cell
    #[arg(long, default_value = "")]
    pub search: String,

    /// Column to sort by
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    pub desc: bool,
}

impl QueryArgs {
    pub fn params(&self, page: usize, page_size: usize) -> QueryParams {
        let dir = if self.desc { SortDir::Desc } else { SortDir::Asc };
        QueryParams {
            search: self.search.clone(),
            sort: self.sort.as_ref().map(|key| SortSpec::new(key.clone(), dir)),
            page,
            page_size,
        }
    }
}

pub async fn execute(
    load_args: LoadArgs,
    query: QueryArgs,
    page: usize,
    page_size: Option<usize>,
) -> Result<()> {
    anyhow::ensure!(page >= 1, "page must be at least 1");
    let (config, dataset) = load(&load_args).await?;

    let params = query.params(page, page_size.unwrap_or(config.page_size));
    let view = dataset.view(&params);
    let result = &view.page;

    let mut table = Table::new();
    let personal: Vec<&str> = dataset
        .personal_info_groups()
        .map(|g| g.group.question_key.as_str())
        .collect();

    let mut header = vec!["#".to_string(), USERNAME_COLUMN.to_string()];
    header.extend(personal.iter().map(|s| s.to_string()));
    header.push(TOTAL_SCORE_COLUMN.to_string());
    header.push("%".to_string());
    table.set_header(header);

    let detected = view.summary.detected_max_score;
    for row in &result.rows {
        let mut cells = vec![
            Cell::new(row_index(&dataset, row).map_or("?".into(), |i| i.to_string())),
            Cell::new(row.get(USERNAME_COLUMN)),
        ];
        cells.extend(personal.iter().map(|key| Cell::new(row.get(key))));
        cells.push(Cell::new(row.total_score_cell()));
        cells.push(Cell::new(percent_label(row, detected)));
        table.add_row(cells);
    }

    println!("{table}");
    println!(
        "Page {} of {} ({} matching of {} rows)",
        result.page,
        result.total_pages,
        result.filtered_count,
        dataset.rows.len()
    );
    println!(
        "Average {:.1}%, {} of {} passed ({:.1}%)",
        view.summary.avg,
        view.summary.pass_count,
        view.summary.total_students,
        view.summary.pass_rate
    );

    Ok(())
}

/// Position of `row` in the dataset, for use with `quizboard student`.
fn row_index(dataset: &Dataset, row: &Row) -> Option<usize> {
    dataset.rows.iter().position(|r| std::ptr::eq(r, row))
}

fn percent_label(row: &Row, detected_max: f64) -> String {
    if detected_max > 0.0 {
        let score = extract_score(row.total_score_cell()).score;
        format!("{:.1}%", score * 100.0 / detected_max)
    } else {
        "-".to_string()
    }
}
