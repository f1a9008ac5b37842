pub mod blueprints;
pub mod check;
pub mod generate;
pub mod init;
pub mod papers;
pub mod validate;

use std::path::Path;

use anyhow::Result;
use comfy_table::{Cell, Table};

use papergen_core::paper::GeneratedPaper;
use papergen_store::{
    load_config_from, open_store, open_store_for_update, DataFileLock, InMemoryStore,
    PapergenConfig,
};

/// Load the config and the store it points at.
pub(crate) fn open(config_path: Option<&Path>) -> Result<(PapergenConfig, InMemoryStore)> {
    let config = load_config_from(config_path)?;
    let store = open_store(&config)?;
    Ok((config, store))
}

/// Like [`open`], for commands that save. Other writers block until the
/// returned lock is dropped.
pub(crate) fn open_for_update(
    config_path: Option<&Path>,
) -> Result<(PapergenConfig, InMemoryStore, DataFileLock)> {
    let config = load_config_from(config_path)?;
    let (store, lock) = open_store_for_update(&config)?;
    Ok((config, store, lock))
}

pub(crate) fn print_paper(paper: &GeneratedPaper, course_code: &str) {
    println!(
        "Paper {} ({}, {}) generated {}",
        paper.paper_id,
        course_code,
        paper.exam_type,
        paper.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
    );

    let mut part_a = Table::new();
    part_a.set_header(vec!["Q", "CO", "Marks", "Question"]);
    for entry in &paper.part_a {
        part_a.add_row(vec![
            Cell::new(entry.position),
            Cell::new(format!("CO{}", entry.co_number)),
            Cell::new(entry.marks),
            Cell::new(&entry.question_text),
        ]);
    }
    println!("\nPart A\n{part_a}");

    let mut part_b = Table::new();
    part_b.set_header(vec!["Q", "CO", "Marks", "Question"]);
    for group in &paper.part_b {
        for option in &group.options {
            part_b.add_row(vec![
                Cell::new(format!("{}{}", group.question_number, option.option)),
                Cell::new(format!("CO{}", option.co_number)),
                Cell::new(option.marks),
                Cell::new(&option.question_text),
            ]);
        }
    }
    println!("\nPart B (answer either option)\n{part_b}");

    println!(
        "{} questions, {} marks",
        paper.question_count(),
        paper.total_marks()
    );
}
