//! papergen-store — Storage collaborators for the generation engine.
//!
//! Provides an in-memory implementation of the question repository, usage
//! tracker and paper store traits, blueprint management, JSON snapshots on
//! disk with a cross-process writer lock, and configuration loading.

pub mod config;
pub mod error;
pub mod file_lock;
pub mod memory;
pub mod sample;
pub mod snapshot;

pub use config::{load_config, load_config_from, open_store, open_store_for_update, PapergenConfig};
pub use error::StoreError;
pub use file_lock::DataFileLock;
pub use memory::{InMemoryStore, NewQuestion, PaperSummary};
pub use snapshot::Snapshot;
