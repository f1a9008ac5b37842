//! papergen configuration and store factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use papergen_core::engine::GeneratorConfig;
use papergen_core::model::ExamType;

use crate::file_lock::DataFileLock;
use crate::memory::InMemoryStore;

/// Top-level papergen configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PapergenConfig {
    /// JSON snapshot holding the question bank, blueprints and papers.
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
    /// Fixed seed for question selection. Unset draws from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Exam type used when a command does not name one.
    #[serde(default = "default_exam_type")]
    pub default_exam_type: ExamType,
}

fn default_data_file() -> PathBuf {
    PathBuf::from("./papergen-data.json")
}
fn default_exam_type() -> ExamType {
    ExamType::MidTerm
}

impl Default for PapergenConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
            seed: None,
            default_exam_type: default_exam_type(),
        }
    }
}

impl PapergenConfig {
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig { seed: self.seed }
    }

    /// The config file written by `papergen init`.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize config")
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `papergen.toml` in the current directory
/// 2. `~/.config/papergen/config.toml`
///
/// Environment variable overrides: `PAPERGEN_DATA_FILE`, `PAPERGEN_SEED`.
pub fn load_config() -> Result<PapergenConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<PapergenConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("papergen.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            debug!(path = %path.display(), "reading config");
            parse_config(&path)?
        }
        None => PapergenConfig::default(),
    };

    if let Ok(data_file) = std::env::var("PAPERGEN_DATA_FILE") {
        config.data_file = PathBuf::from(data_file);
    }
    if let Ok(seed) = std::env::var("PAPERGEN_SEED") {
        config.seed = Some(
            seed.trim()
                .parse()
                .with_context(|| format!("PAPERGEN_SEED is not a number: {seed}"))?,
        );
    }

    config.data_file = PathBuf::from(resolve_env_vars(&config.data_file.to_string_lossy()));

    Ok(config)
}

fn parse_config(path: &Path) -> Result<PapergenConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str::<PapergenConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("papergen"))
}

/// Open the store named by the config. A missing data file yields an empty store.
pub fn open_store(config: &PapergenConfig) -> Result<InMemoryStore> {
    if config.data_file.exists() {
        InMemoryStore::load(&config.data_file)
            .with_context(|| format!("failed to load data file: {}", config.data_file.display()))
    } else {
        debug!(path = %config.data_file.display(), "data file missing, starting empty");
        Ok(InMemoryStore::new())
    }
}

/// Lock the configured data file, then open it. Keep the lock until the
/// store has been saved.
pub fn open_store_for_update(config: &PapergenConfig) -> Result<(InMemoryStore, DataFileLock)> {
    let lock = DataFileLock::acquire(&config.data_file)
        .with_context(|| format!("failed to lock data file: {}", config.data_file.display()))?;
    let store = open_store(config)?;
    Ok((store, lock))
}
