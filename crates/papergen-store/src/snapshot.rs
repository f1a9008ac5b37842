//! Whole-store JSON snapshots.
//!
//! The store is small enough to live in memory; a snapshot file keeps it
//! between runs. Writes go to a temporary file in the same directory and are
//! renamed over the target, so a crash never leaves a half-written file.

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use papergen_core::model::{
    Blueprint, Course, Outcome, PaperHeader, PaperId, Placement, Question, Unit,
};

use crate::error::StoreError;

/// Everything the store holds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Bumped on every save; a mismatch on save means another writer got there first.
    #[serde(default)]
    pub revision: u64,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub units: Vec<Unit>,
    #[serde(default)]
    pub outcomes: Vec<Outcome>,
    /// Questions in creation order.
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub blueprints: Vec<Blueprint>,
    #[serde(default)]
    pub papers: Vec<PaperHeader>,
    #[serde(default)]
    pub placements: Vec<StoredPlacement>,
}

/// A placement row together with the paper it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPlacement {
    pub paper_id: PaperId,
    #[serde(flatten)]
    pub placement: Placement,
}

impl Snapshot {
    /// Read a snapshot file.
    pub fn read(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;
        debug!(
            path = %path.display(),
            questions = snapshot.questions.len(),
            papers = snapshot.papers.len(),
            "loaded snapshot"
        );
        Ok(snapshot)
    }

    /// The revision recorded in a snapshot file, without loading the rest.
    pub fn read_revision(path: &Path) -> Result<u64, StoreError> {
        #[derive(Deserialize)]
        struct Revision {
            #[serde(default)]
            revision: u64,
        }
        let content = std::fs::read_to_string(path)?;
        let header: Revision = serde_json::from_str(&content)?;
        Ok(header.revision)
    }

    /// Atomically replace `path` with this snapshot.
    pub fn write(&self, path: &Path) -> Result<(), StoreError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let json = serde_json::to_string_pretty(self)?;
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(json.as_bytes())?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;

        debug!(path = %path.display(), "saved snapshot");
        Ok(())
    }
}
