//! The `quizboard summary` command.

use anyhow::Result;
use comfy_table::{Cell, Table};
use serde::Serialize;

use quizboard_core::model::{AnalyticsSummary, Selection};
use quizboard_core::statistics::{Histogram, QuestionStats};

use super::load::{load, LoadArgs};

#[derive(Serialize)]
struct SummaryReport<'a> {
    selection: &'a Selection,
    summary: AnalyticsSummary,
    histogram: Histogram,
    questions: Vec<QuestionStats>,
    meta_error: Option<String>,
}

pub async fn execute(load_args: LoadArgs, format: String) -> Result<()> {
    let (_, dataset) = load(&load_args).await?;

    let report = SummaryReport {
        selection: &dataset.selection,
        summary: dataset.summary(),
        histogram: dataset.histogram(),
        questions: dataset.question_stats(),
        meta_error: dataset.meta_error.as_ref().map(|e| e.to_string()),
    };

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "table" => print_report(&report),
        other => anyhow::bail!("unknown format: {other} (expected table or json)"),
    }

    Ok(())
}

fn print_report(report: &SummaryReport<'_>) {
    let s = &report.summary;

    let mut table = Table::new();
    table.set_header(vec![
        "Students", "Average", "Min", "Max", "Passed", "Pass rate", "Max score",
    ]);
    table.add_row(vec![
        Cell::new(s.total_students),
        Cell::new(format!("{:.1}%", s.avg)),
        Cell::new(format!("{:.1}%", s.min)),
        Cell::new(format!("{:.1}%", s.max)),
        Cell::new(s.pass_count),
        Cell::new(format!("{:.1}%", s.pass_rate)),
        Cell::new(s.detected_max_score),
    ]);
    println!("{}\n{table}", report.selection);

    let mut dist = Table::new();
    dist.set_header(vec!["Range", "Students"]);
    for bucket in &report.histogram.buckets {
        dist.add_row(vec![Cell::new(&bucket.label), Cell::new(bucket.count)]);
    }
    println!("\nScore distribution\n{dist}");
    if report.histogram.excluded > 0 {
        println!("{} rows without a usable max score", report.histogram.excluded);
    }

    if !report.questions.is_empty() {
        let mut questions = Table::new();
        questions.set_header(vec!["Question", "Answered", "Avg score", "Avg %", "Correct"]);
        for q in &report.questions {
            questions.add_row(vec![
                Cell::new(&q.question),
                Cell::new(q.answered),
                Cell::new(format!("{:.2} / {}", q.avg_score, q.max_score)),
                Cell::new(format!("{:.1}%", q.avg_percent)),
                Cell::new(q.correct_count.map_or("-".to_string(), |c| c.to_string())),
            ]);
        }
        println!("\nQuestions\n{questions}");
    }

    if let Some(err) = &report.meta_error {
        println!("\nNote: {err}; classification is heuristic.");
    }
}
