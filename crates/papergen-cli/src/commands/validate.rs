//! The `papergen validate` command.

use std::path::PathBuf;

use anyhow::Result;

use papergen_core::blueprint::{read_blueprint_file, validate_blueprint};

pub fn execute(blueprint_path: PathBuf) -> Result<()> {
    let doc = read_blueprint_file(&blueprint_path)?;
    let violations = validate_blueprint(&doc);

    let name = doc.get("name").and_then(|n| n.as_str()).unwrap_or("<unnamed>");
    println!("Blueprint: {name}");

    if violations.is_empty() {
        println!("Blueprint is valid.");
        return Ok(());
    }

    for v in &violations {
        println!("  ERROR: {v}");
    }
    anyhow::bail!("{} violation(s) found", violations.len())
}
