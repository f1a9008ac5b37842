//! The `papergen blueprints` command family.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::{Cell, Table};
use uuid::Uuid;

use papergen_core::blueprint::read_blueprint_file;

use super::{open, open_for_update};

#[derive(Subcommand)]
pub enum Action {
    /// List blueprints, newest first
    List,

    /// Add a blueprint from a .json or .toml structure file
    Add {
        /// Blueprint name
        #[arg(long)]
        name: String,

        /// File holding the structure (or a full blueprint document)
        #[arg(long)]
        file: PathBuf,
    },

    /// Make a blueprint the default
    SetDefault {
        #[arg(long)]
        id: Uuid,
    },

    /// Delete a blueprint other than the default
    Remove {
        #[arg(long)]
        id: Uuid,
    },
}

pub fn execute(action: Action, config_path: Option<PathBuf>) -> Result<()> {
    match action {
        Action::List => list(config_path),
        action => update(action, config_path),
    }
}

fn list(config_path: Option<PathBuf>) -> Result<()> {
    let (_, store) = open(config_path.as_deref())?;
    let blueprints = store.blueprints();
    if blueprints.is_empty() {
        println!("No blueprints.");
        return Ok(());
    }
    let mut table = Table::new();
    table.set_header(vec!["Id", "Name", "Default", "Questions", "Updated"]);
    for bp in &blueprints {
        table.add_row(vec![
            Cell::new(bp.id),
            Cell::new(&bp.name),
            Cell::new(if bp.is_default { "yes" } else { "" }),
            Cell::new(bp.structure.question_count()),
            Cell::new(bp.updated_at.format("%Y-%m-%d %H:%M")),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn update(action: Action, config_path: Option<PathBuf>) -> Result<()> {
    let (config, store, _lock) = open_for_update(config_path.as_deref())?;

    match action {
        Action::List => return Ok(()),
        Action::Add { name, file } => {
            let doc = read_blueprint_file(&file)?;
            // Accept either a bare structure or a whole blueprint document.
            let structure = doc.get("structure").cloned().unwrap_or(doc);
            let bp = store.create_blueprint(&name, &structure)?;
            println!("Added blueprint {} ({})", bp.name, bp.id);
        }
        Action::SetDefault { id } => {
            let bp = store.set_default_blueprint(id)?;
            println!("Default blueprint is now {} ({})", bp.name, bp.id);
        }
        Action::Remove { id } => {
            store.delete_blueprint(id)?;
            println!("Removed blueprint {id}");
        }
    }

    store
        .save(&config.data_file)
        .with_context(|| format!("failed to save {}", config.data_file.display()))
}
