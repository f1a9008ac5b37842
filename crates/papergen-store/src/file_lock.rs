//! Advisory lock serialising writers of one data file across processes.
//!
//! The data file itself is replaced by rename on every save, so the lock is
//! taken on a sibling `<data file>.lock` that is never renamed or removed.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs4::fs_std::FileExt;
use tracing::debug;

use crate::error::StoreError;

/// Exclusive hold on a data file. Released when dropped.
#[derive(Debug)]
pub struct DataFileLock {
    _file: File,
    path: PathBuf,
}

impl DataFileLock {
    /// Block until no other holder has the lock for `data_file`.
    pub fn acquire(data_file: &Path) -> Result<Self, StoreError> {
        let path = lock_path(data_file);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;

        debug!(path = %path.display(), "waiting for data file lock");
        FileExt::lock_exclusive(&file)?;
        debug!(path = %path.display(), "data file lock held");

        Ok(Self { _file: file, path })
    }

    /// The lock file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn lock_path(data_file: &Path) -> PathBuf {
    let mut name = data_file.as_os_str().to_owned();
    name.push(".lock");
    PathBuf::from(name)
}
