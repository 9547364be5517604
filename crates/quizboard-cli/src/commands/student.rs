//! The `quizboard student` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use quizboard_core::engine::StudentDetail;

use super::load::{load, LoadArgs};

pub async fn execute(load_args: LoadArgs, index: usize, format: String) -> Result<()> {
    let (_, dataset) = load(&load_args).await?;

    let Some(detail) = dataset.student_detail(index) else {
        anyhow::bail!(
            "no student at index {index} ({} rows loaded)",
            dataset.rows.len()
        );
    };

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&detail)?),
        "table" => print_detail(&detail),
        other => anyhow::bail!("unknown format: {other} (expected table or json)"),
    }

    Ok(())
}

fn print_detail(detail: &StudentDetail) {
    let name = if detail.username.is_empty() {
        "(no username)"
    } else {
        detail.username.as_str()
    };
    println!(
        "#{} {name}: {} ({:.1}%)",
        detail.index,
        format_score(detail.total.score, detail.total.max),
        detail.percent
    );

    if !detail.personal_info.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Field", "Answer"]);
        for p in &detail.personal_info {
            table.add_row(vec![Cell::new(&p.question), Cell::new(&p.answer)]);
        }
        println!("\n{table}");
    }

    let mut table = Table::new();
    table.set_header(vec!["Question", "Answer", "Score", "Correct", "Feedback"]);
    for a in &detail.answers {
        let correct = match a.is_correct {
            Some(true) => "yes",
            Some(false) => "no",
            None => "-",
        };
        table.add_row(vec![
            Cell::new(&a.question),
            Cell::new(&a.answer),
            Cell::new(format_score(a.score.score, a.score.max)),
            Cell::new(correct),
            Cell::new(a.feedback.as_deref().unwrap_or("")),
        ]);
    }
    println!("\n{table}");
}

fn format_score(score: f64, max: Option<f64>) -> String {
    match max {
        Some(m) if m > 0.0 => format!("{score}/{m}"),
        _ => format!("{score}"),
    }
}
