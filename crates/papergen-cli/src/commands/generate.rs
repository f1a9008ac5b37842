//! The `papergen generate` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use uuid::Uuid;

use papergen_core::engine::PaperGenerator;
use papergen_core::model::ExamType;

use super::{open_for_update, print_paper};

pub async fn execute(
    course_key: String,
    exam_type: Option<ExamType>,
    blueprint_id: Option<Uuid>,
    seed: Option<u64>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (mut config, store, _lock) = open_for_update(config_path.as_deref())?;
    if seed.is_some() {
        config.seed = seed;
    }

    let course = store.resolve_course(&course_key)?;
    let blueprint = store.resolve_blueprint(blueprint_id)?;
    let exam_type = exam_type.unwrap_or(config.default_exam_type);

    let shared = Arc::new(store.clone());
    let generator = PaperGenerator::new(
        shared.clone(),
        shared.clone(),
        shared,
        config.generator_config(),
    );

    let paper = generator
        .generate_from(course.id, &blueprint, exam_type)
        .await
        .with_context(|| format!("failed to generate paper for {}", course.code))?;

    store
        .save(&config.data_file)
        .with_context(|| format!("failed to save {}", config.data_file.display()))?;

    if let Some(path) = output {
        paper.save_json(&path)?;
        eprintln!("Paper written to {}", path.display());
    }

    println!("Blueprint: {}", blueprint.name);
    print_paper(&paper, &course.code);

    Ok(())
}
