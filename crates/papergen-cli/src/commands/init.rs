//! The `papergen init` command.

use std::path::Path;

use anyhow::{Context, Result};

use papergen_store::sample::seed_demo;
use papergen_store::{DataFileLock, InMemoryStore, PapergenConfig};

pub fn execute() -> Result<()> {
    let config = PapergenConfig::default();

    if Path::new("papergen.toml").exists() {
        println!("papergen.toml already exists, skipping.");
    } else {
        let text = format!("# papergen configuration\n\n{}", config.to_toml()?);
        std::fs::write("papergen.toml", text).context("failed to write papergen.toml")?;
        println!("Created papergen.toml");
    }

    let data_file = &config.data_file;
    let _lock = DataFileLock::acquire(data_file)?;
    if data_file.exists() {
        println!("{} already exists, skipping.", data_file.display());
    } else {
        let store = InMemoryStore::new();
        let (course, blueprint) = seed_demo(&store)?;
        store.save(data_file)?;
        println!(
            "Created {} with course {} and default blueprint \"{}\"",
            data_file.display(),
            course.code,
            blueprint.name
        );
    }

    println!("\nNext steps:");
    println!("  1. Run: papergen check --course CS101");
    println!("  2. Run: papergen generate --course CS101 --exam-type mid_term");

    Ok(())
}
