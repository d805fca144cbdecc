//! Per-IDE-type process exclusion
//!
//! Every mutating lifecycle operation for a given IDE type runs under an
//! exclusive advisory lock on that type's `lock` file. Acquisition blocks
//! until the holder releases; the lock is dropped with the guard, and the
//! OS releases it if the process dies.

use crate::Result;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::Path;

/// RAII guard for one IDE type's exclusive lock
pub struct IdeLock {
    lock_file: File,
}

impl IdeLock {
    /// Block until the lock for the given lock file is held
    pub fn acquire(lock_path: &Path) -> Result<Self> {
        if let Some(parent) = lock_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(lock_path)?;

        file.lock_exclusive()?;

        Ok(Self { lock_file: file })
    }

    /// Acquire without blocking, returning None when another process holds it
    pub fn try_acquire(lock_path: &Path) -> Result<Option<Self>> {
        if let Some(parent) = lock_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(lock_path)?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(Some(Self { lock_file: file })),
            Err(_) => Ok(None),
        }
    }
}

impl Drop for IdeLock {
    fn drop(&mut self) {
        let _ = self.lock_file.unlock();
    }
}
