//! The `quizboard groups` command.

use anyhow::Result;
use comfy_table::{Cell, Table};

use super::load::{load, LoadArgs};

pub async fn execute(load_args: LoadArgs) -> Result<()> {
    let (_, dataset) = load(&load_args).await?;

    if let Some(err) = &dataset.meta_error {
        println!("Note: {err}; classification is heuristic.\n");
    }

    let mut table = Table::new();
    table.set_header(vec![
        "Question",
        "Class",
        "Decided by",
        "Section",
        "Type",
        "Feedback column",
        "Correct answer",
    ]);

    for g in &dataset.groups {
        table.add_row(vec![
            Cell::new(&g.group.base_name),
            Cell::new(g.classification),
            Cell::new(g.source),
            Cell::new(g.section.as_deref().unwrap_or("-")),
            Cell::new(g.question_type.as_deref().unwrap_or("-")),
            Cell::new(if g.group.feedback_key.is_some() { "yes" } else { "no" }),
            Cell::new(g.correct_answer.as_deref().unwrap_or("-")),
        ]);
    }

    println!("{table}");
    println!(
        "{} groups: {} personal info, {} quiz",
        dataset.groups.len(),
        dataset.personal_info_groups().count(),
        dataset.quiz_groups().count()
    );

    Ok(())
}
