//! File system operations
//!
//! Byte-level persistence primitives. Nothing here removes a document; leaving
//! the active tree always goes through the lifecycle mover.

use log::{debug, error};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{Stage, StorageError, StorageResult};

#[cfg(unix)]
const DIR_MODE: u32 = 0o755;

/// Create a directory and its parents (owner rwx, group/other rx)
pub fn create_directory(path: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(DIR_MODE);
    }
    builder.create(path)
}

/// Check if file exists
pub fn file_exists(path: &Path) -> bool {
    path.is_file()
}

fn temp_path_for(path: &Path) -> PathBuf {
    path.with_extension(format!(
        "{}.tmp",
        path.extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
    ))
}

#[derive(Debug, Clone)]
pub struct FileStore {
    sync_writes: bool,
}

impl FileStore {
    pub fn new(sync_writes: bool) -> Self {
        Self { sync_writes }
    }

    /// Create missing parent directories and an empty file. Idempotent.
    pub fn ensure_exists(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            create_directory(parent)
                .map_err(|e| StorageError::from_io(Stage::EnsureExists, parent, e))?;
        }

        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map_err(|e| {
                error!("Failed to create {}: {}", path.display(), e);
                StorageError::from_io(Stage::EnsureExists, path, e)
            })?;

        Ok(())
    }

    /// Replace the contents of `path` with `data`.
    ///
    /// The bytes go to a sibling temporary file first and are renamed into
    /// place, so a reader sees either the old contents or all of `data`.
    pub fn write(&self, path: &Path, data: &[u8]) -> StorageResult<()> {
        let temp_path = temp_path_for(path);

        if let Err(e) = self.write_temp(&temp_path, data) {
            error!("Failed to write {}: {}", temp_path.display(), e);
            let _ = fs::remove_file(&temp_path);
            return Err(StorageError::from_io(Stage::Write, path, e));
        }

        if let Err(e) = fs::rename(&temp_path, path) {
            error!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            );
            let _ = fs::remove_file(&temp_path);
            return Err(StorageError::from_io(Stage::Write, path, e));
        }

        debug!("Wrote {} bytes to {}", data.len(), path.display());
        Ok(())
    }

    fn write_temp(&self, temp_path: &Path, data: &[u8]) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp_path)?;
        file.write_all(data)?;
        file.flush()?;
        if self.sync_writes {
            file.sync_all()?;
        }
        Ok(())
    }

    /// Full contents of `path`
    pub fn read(&self, path: &Path) -> StorageResult<Vec<u8>> {
        fs::read(path).map_err(|e| StorageError::from_io(Stage::Read, path, e))
    }

    pub fn exists(&self, path: &Path) -> bool {
        file_exists(path)
    }
}
