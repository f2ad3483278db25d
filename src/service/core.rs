//! Storage service
//!
//! Composes path construction, revision resolution, file persistence and tree
//! transitions into create/read/update/delete for Apps, Modules and Languages.
//! Every operation on a unit runs under that unit's lock and stops at the first
//! failing stage.

use log::{debug, info, warn};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use crate::config::VaultConfig;
use crate::error::{Stage, StorageError, StorageResult};
use crate::service::mirror::{LogMirror, MetadataMirror, MirrorEvent, PayloadDescriptor};
use crate::storage::filesystem::create_directory;
use crate::storage::{
    FileStore, LifecycleMover, MoveOutcome, PathResolver, Tree, UnitKey, UnitLocks, UpdateOutcome,
    VersionResolver, WriteOutcome,
};

pub struct StorageService {
    paths: PathResolver,
    versions: VersionResolver,
    files: FileStore,
    mover: LifecycleMover,
    locks: UnitLocks,
    mirror: Arc<dyn MetadataMirror>,
}

impl StorageService {
    pub fn new(root: impl AsRef<Path>, sync_writes: bool) -> Self {
        let paths = PathResolver::new(root.as_ref());
        Self {
            versions: VersionResolver::new(paths.clone()),
            mover: LifecycleMover::new(paths.clone()),
            files: FileStore::new(sync_writes),
            locks: UnitLocks::new(),
            mirror: Arc::new(LogMirror),
            paths,
        }
    }

    pub fn from_config(config: &VaultConfig) -> Self {
        Self::new(config.storage_root_path(), config.sync_writes)
    }

    /// Replace the metadata mirror events are reported to
    pub fn with_mirror(mut self, mirror: Arc<dyn MetadataMirror>) -> Self {
        self.mirror = mirror;
        self
    }

    /// Create the three tree roots if they are missing
    pub fn prepare(&self) -> StorageResult<()> {
        for tree in [Tree::Latest, Tree::Archive, Tree::Trash] {
            let dir = self.paths.tree_dir(tree);
            create_directory(&dir).map_err(|e| StorageError::from_io(Stage::EnsureExists, &dir, e))?;
        }
        info!("Storage root ready: {}", self.paths.root().display());
        Ok(())
    }

    pub fn paths(&self) -> &PathResolver {
        &self.paths
    }

    // ═══ GENERIC OPERATIONS ═══

    /// Store `payload` as the next revision of `unit`
    pub fn create(&self, unit: &UnitKey, payload: &[u8]) -> StorageResult<WriteOutcome> {
        self.locks.with_unit(unit, || -> StorageResult<WriteOutcome> {
            let revision = self.versions.next_revision(unit)?;
            let written = self.write_revision(unit, revision, payload)?;
            self.report(MirrorEvent::Committed {
                unit: unit.clone(),
                revision,
                payload: PayloadDescriptor::for_payload(payload),
            });
            Ok(written)
        })
    }

    /// Contents of the latest active revision of `unit`
    pub fn read(&self, unit: &UnitKey) -> StorageResult<Vec<u8>> {
        self.locks.with_unit(unit, || -> StorageResult<Vec<u8>> {
            let revision = self.latest_or_not_found(unit, Stage::ResolveVersion)?;
            let path = self.paths.locate(Tree::Latest, unit, revision);
            debug!("Reading {} v{}", unit, revision);
            self.files.read(&path)
        })
    }

    /// Archive the latest active revision of `unit` and write `payload` in its place.
    ///
    /// Nothing is written when archiving fails. When the write fails, the
    /// archived document is moved back into the active tree.
    pub fn update(&self, unit: &UnitKey, payload: &[u8]) -> StorageResult<UpdateOutcome> {
        self.locks.with_unit(unit, || -> StorageResult<UpdateOutcome> {
            let previous = self.latest_or_not_found(unit, Stage::Move)?;
            let destination = self.mover.move_to_archive(unit, previous)?;

            let written = self
                .versions
                .next_revision(unit)
                .and_then(|revision| self.write_revision(unit, revision, payload));

            let written = match written {
                Ok(written) => written,
                Err(e) => {
                    if let Err(restore_err) = self.mover.restore(unit, previous, &destination) {
                        warn!(
                            "Could not restore {} v{} from {}: {}",
                            unit,
                            previous,
                            destination.display(),
                            restore_err
                        );
                    }
                    return Err(e);
                }
            };

            self.report(MirrorEvent::Archived {
                unit: unit.clone(),
                revision: previous,
                destination: destination.clone(),
            });
            self.report(MirrorEvent::Committed {
                unit: unit.clone(),
                revision: written.revision,
                payload: PayloadDescriptor::for_payload(payload),
            });

            Ok(UpdateOutcome {
                archived: MoveOutcome {
                    unit: unit.clone(),
                    revision: previous,
                    destination,
                },
                written,
            })
        })
    }

    /// Move the latest active revision of `unit` to the Trash tree
    pub fn delete(&self, unit: &UnitKey) -> StorageResult<MoveOutcome> {
        self.locks.with_unit(unit, || -> StorageResult<MoveOutcome> {
            let revision = self.latest_or_not_found(unit, Stage::Move)?;
            let destination = self.mover.move_to_trash(unit, revision)?;
            self.report(MirrorEvent::Trashed {
                unit: unit.clone(),
                revision,
                destination: destination.clone(),
            });
            Ok(MoveOutcome {
                unit: unit.clone(),
                revision,
                destination,
            })
        })
    }

    pub fn next_revision(&self, unit: &UnitKey) -> StorageResult<u64> {
        self.versions.next_revision(unit)
    }

    pub fn latest_revision(&self, unit: &UnitKey) -> StorageResult<Option<u64>> {
        self.versions.latest_revision(unit)
    }

    /// Revision numbers of `unit` present in `tree`
    pub fn revisions(&self, unit: &UnitKey, tree: Tree) -> StorageResult<BTreeSet<u64>> {
        self.versions.revisions(tree, unit)
    }

    /// Every kept `(revision, generation)` of `unit` in `tree`
    pub fn generations(&self, unit: &UnitKey, tree: Tree) -> StorageResult<BTreeSet<(u64, u64)>> {
        self.versions.generations(tree, unit)
    }

    // ═══ APP ═══

    pub fn create_app(&self, payload: &[u8], app: &str) -> StorageResult<WriteOutcome> {
        self.create(&UnitKey::app(app)?, payload)
    }

    pub fn read_app(&self, app: &str) -> StorageResult<Vec<u8>> {
        self.read(&UnitKey::app(app)?)
    }

    pub fn update_app(&self, app: &str, payload: &[u8]) -> StorageResult<UpdateOutcome> {
        self.update(&UnitKey::app(app)?, payload)
    }

    pub fn delete_app(&self, app: &str) -> StorageResult<MoveOutcome> {
        self.delete(&UnitKey::app(app)?)
    }

    // ═══ MODULE ═══

    pub fn create_module(
        &self,
        app: &str,
        module: &str,
        payload: &[u8],
    ) -> StorageResult<WriteOutcome> {
        self.create(&UnitKey::module(app, module)?, payload)
    }

    pub fn read_module(&self, app: &str, module: &str) -> StorageResult<Vec<u8>> {
        self.read(&UnitKey::module(app, module)?)
    }

    pub fn update_module(
        &self,
        app: &str,
        module: &str,
        payload: &[u8],
    ) -> StorageResult<UpdateOutcome> {
        self.update(&UnitKey::module(app, module)?, payload)
    }

    pub fn delete_module(&self, app: &str, module: &str) -> StorageResult<MoveOutcome> {
        self.delete(&UnitKey::module(app, module)?)
    }

    // ═══ LANGUAGE ═══

    pub fn create_language(
        &self,
        app: &str,
        module: &str,
        language: &str,
        payload: &[u8],
    ) -> StorageResult<WriteOutcome> {
        self.create(&UnitKey::language(app, module, language)?, payload)
    }

    pub fn read_language(&self, app: &str, module: &str, language: &str) -> StorageResult<Vec<u8>> {
        self.read(&UnitKey::language(app, module, language)?)
    }

    pub fn update_language(
        &self,
        app: &str,
        module: &str,
        language: &str,
        payload: &[u8],
    ) -> StorageResult<UpdateOutcome> {
        self.update(&UnitKey::language(app, module, language)?, payload)
    }

    pub fn delete_language(
        &self,
        app: &str,
        module: &str,
        language: &str,
    ) -> StorageResult<MoveOutcome> {
        self.delete(&UnitKey::language(app, module, language)?)
    }

    // ═══ INTERNALS ═══

    fn latest_or_not_found(&self, unit: &UnitKey, stage: Stage) -> StorageResult<u64> {
        self.versions.latest_revision(unit)?.ok_or_else(|| {
            StorageError::not_found(
                stage,
                format!("{} (no active revision)", self.paths.unit_dir(Tree::Latest, unit).display()),
            )
        })
    }

    /// Caller must hold the unit lock
    fn write_revision(
        &self,
        unit: &UnitKey,
        revision: u64,
        payload: &[u8],
    ) -> StorageResult<WriteOutcome> {
        let path = self.paths.locate(Tree::Latest, unit, revision);
        if self.files.exists(&path) {
            return Err(StorageError::VersionConflict {
                unit: unit.to_string(),
                revision,
            });
        }

        self.files.ensure_exists(&path)?;
        self.files.write(&path, payload)?;

        info!(
            "Stored {} v{} ({} bytes) at {}",
            unit,
            revision,
            payload.len(),
            path.display()
        );
        Ok(WriteOutcome {
            unit: unit.clone(),
            revision,
            path,
        })
    }

    fn report(&self, event: MirrorEvent) {
        if let Err(e) = self.mirror.record(&event) {
            warn!(
                "{} v{} stored but not mirrored: {}",
                event.unit(),
                event.revision(),
                e
            );
        }
    }
}
