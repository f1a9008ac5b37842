//! The `papergen check` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use comfy_table::{Cell, Table};
use uuid::Uuid;

use papergen_core::engine::{PaperGenerator, PaperPart};

use super::open;

pub async fn execute(
    course_key: String,
    blueprint_id: Option<Uuid>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (config, store) = open(config_path.as_deref())?;
    let course = store.resolve_course(&course_key)?;
    let blueprint = store.resolve_blueprint(blueprint_id)?;

    let shared = Arc::new(store);
    let generator = PaperGenerator::new(
        shared.clone(),
        shared.clone(),
        shared,
        config.generator_config(),
    );
    let report = generator
        .check_feasibility(course.id, &blueprint.structure)
        .await?;

    let mut table = Table::new();
    table.set_header(vec!["Slot", "CO", "Marks", "Needed", "Matching", "Unused", ""]);
    for slot in &report.slots {
        let label = match slot.part {
            PaperPart::A => format!("A{}", slot.position),
            PaperPart::B => format!("B{}", slot.position),
        };
        table.add_row(vec![
            Cell::new(label),
            Cell::new(format!("CO{}", slot.co)),
            Cell::new(slot.marks),
            Cell::new(slot.required),
            Cell::new(slot.total),
            Cell::new(slot.unused),
            Cell::new(if slot.is_satisfied() { "ok" } else { "SHORT" }),
        ]);
    }

    println!("{} with blueprint \"{}\"\n{table}", course.code, blueprint.name);

    let short = report.shortfalls().count();
    if short == 0 {
        println!("Enough unused questions for another paper.");
    } else {
        println!("{short} requirement(s) cannot be met.");
    }

    Ok(())
}
