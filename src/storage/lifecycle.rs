//! Tree transitions for stored documents
//!
//! Documents leave the active tree by rename only, so at no point does a
//! document exist in two trees.

use log::{error, info};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Stage, StorageError, StorageResult};
use crate::storage::filesystem::{create_directory, file_exists};
use crate::storage::paths::{PathResolver, Tree, UnitKey, relocated_file_name};

#[derive(Debug, Clone)]
pub struct LifecycleMover {
    paths: PathResolver,
}

impl LifecycleMover {
    pub fn new(paths: PathResolver) -> Self {
        Self { paths }
    }

    /// Move the active file of `revision` into the Archive tree
    pub fn move_to_archive(&self, unit: &UnitKey, revision: u64) -> StorageResult<PathBuf> {
        self.relocate(Tree::Archive, unit, revision)
    }

    /// Move the active file of `revision` into the Trash tree
    pub fn move_to_trash(&self, unit: &UnitKey, revision: u64) -> StorageResult<PathBuf> {
        self.relocate(Tree::Trash, unit, revision)
    }

    /// Move a relocated document back into the active tree.
    ///
    /// Only an absent or empty active file is replaced; anything else belongs to
    /// another writer and is left alone.
    pub fn restore(&self, unit: &UnitKey, revision: u64, from: &Path) -> StorageResult<()> {
        let target = self.paths.locate(Tree::Latest, unit, revision);
        let occupied = fs::metadata(&target)
            .map(|meta| meta.len() > 0)
            .unwrap_or(false);
        if occupied {
            return Err(StorageError::VersionConflict {
                unit: unit.to_string(),
                revision,
            });
        }

        fs::rename(from, &target).map_err(|e| StorageError::from_io(Stage::Move, from, e))?;
        info!("Restored {} v{} from {}", unit, revision, from.display());
        Ok(())
    }

    fn relocate(&self, tree: Tree, unit: &UnitKey, revision: u64) -> StorageResult<PathBuf> {
        let source = self.paths.locate(Tree::Latest, unit, revision);
        if !file_exists(&source) {
            return Err(StorageError::not_found(
                Stage::Move,
                source.display().to_string(),
            ));
        }

        let dest_dir = self.paths.unit_dir(tree, unit);
        create_directory(&dest_dir).map_err(|e| StorageError::from_io(Stage::Move, &dest_dir, e))?;

        let destination = free_destination(&dest_dir, revision);
        fs::rename(&source, &destination).map_err(|e| {
            if e.kind() == io::ErrorKind::CrossesDevices {
                error!(
                    "{} and {} are on different volumes; rename is not possible",
                    source.display(),
                    destination.display()
                );
            } else {
                error!(
                    "Failed to move {} to {}: {}",
                    source.display(),
                    destination.display(),
                    e
                );
            }
            StorageError::from_io(Stage::Move, &source, e)
        })?;

        info!(
            "Moved {} v{} to {} ({})",
            unit,
            revision,
            tree,
            destination.display()
        );
        Ok(destination)
    }
}

/// `v<N>.json`, or the first free `v<N>_<k>.json` when that slot already holds
/// an earlier relocation of the same revision.
fn free_destination(dir: &Path, revision: u64) -> PathBuf {
    let mut generation = 0u64;
    loop {
        let candidate = dir.join(relocated_file_name(revision, generation));
        if !candidate.exists() {
            return candidate;
        }
        generation += 1;
    }
}
