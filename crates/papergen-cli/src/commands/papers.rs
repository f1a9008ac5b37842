//! The `papergen papers`, `show` and `delete` commands.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};
use uuid::Uuid;

use super::{open, open_for_update, print_paper};

pub fn list(course_key: String, config_path: Option<PathBuf>) -> Result<()> {
    let (_, store) = open(config_path.as_deref())?;
    let course = store.resolve_course(&course_key)?;
    let papers = store.papers_for_course(course.id);

    if papers.is_empty() {
        println!("No papers generated for {} yet.", course.code);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Paper", "Exam", "Blueprint", "Questions", "Generated"]);
    for summary in &papers {
        table.add_row(vec![
            Cell::new(summary.header.id),
            Cell::new(summary.header.exam_type),
            Cell::new(summary.blueprint_name.as_deref().unwrap_or("(deleted)")),
            Cell::new(summary.question_count),
            Cell::new(summary.header.generated_at.format("%Y-%m-%d %H:%M")),
        ]);
    }
    println!("{table}");
    println!("{} paper(s) for {}", papers.len(), course.code);

    Ok(())
}

pub fn show(paper_id: Uuid, config_path: Option<PathBuf>) -> Result<()> {
    let (_, store) = open(config_path.as_deref())?;
    let paper = store.paper(paper_id)?;
    let code = store
        .course(paper.course_id)
        .map(|c| c.code)
        .unwrap_or_else(|| paper.course_id.to_string());
    print_paper(&paper, &code);
    Ok(())
}

pub fn delete(paper_id: Uuid, config_path: Option<PathBuf>) -> Result<()> {
    let (config, store, _lock) = open_for_update(config_path.as_deref())?;
    store.delete_paper(paper_id)?;
    store.save(&config.data_file)?;
    println!("Deleted paper {paper_id}");
    Ok(())
}
