//! Async access to the storage service
//!
//! Storage calls block on the filesystem, so each one runs on tokio's blocking
//! pool instead of the reactor threads of an async caller.

use std::collections::BTreeSet;
use std::io;
use std::sync::Arc;
use tokio::task;

use crate::error::{Stage, StorageError, StorageResult};
use crate::service::core::StorageService;
use crate::storage::{MoveOutcome, Tree, UnitKey, UpdateOutcome, WriteOutcome};

/// Cheaply clonable async front of a shared `StorageService`
#[derive(Clone)]
pub struct VaultHandle {
    service: Arc<StorageService>,
}

impl VaultHandle {
    pub fn new(service: StorageService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }

    pub fn service(&self) -> &Arc<StorageService> {
        &self.service
    }

    pub async fn create(&self, unit: UnitKey, payload: Vec<u8>) -> StorageResult<WriteOutcome> {
        self.run(move |service| service.create(&unit, &payload)).await
    }

    pub async fn read(&self, unit: UnitKey) -> StorageResult<Vec<u8>> {
        self.run(move |service| service.read(&unit)).await
    }

    pub async fn update(&self, unit: UnitKey, payload: Vec<u8>) -> StorageResult<UpdateOutcome> {
        self.run(move |service| service.update(&unit, &payload)).await
    }

    pub async fn delete(&self, unit: UnitKey) -> StorageResult<MoveOutcome> {
        self.run(move |service| service.delete(&unit)).await
    }

    pub async fn revisions(&self, unit: UnitKey, tree: Tree) -> StorageResult<BTreeSet<u64>> {
        self.run(move |service| service.revisions(&unit, tree)).await
    }

    pub async fn generations(
        &self,
        unit: UnitKey,
        tree: Tree,
    ) -> StorageResult<BTreeSet<(u64, u64)>> {
        self.run(move |service| service.generations(&unit, tree)).await
    }

    async fn run<T, F>(&self, op: F) -> StorageResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&StorageService) -> StorageResult<T> + Send + 'static,
    {
        let service = Arc::clone(&self.service);
        task::spawn_blocking(move || op(&service))
            .await
            .map_err(|e| StorageError::Io {
                stage: Stage::Dispatch,
                path: self.service.paths().root().to_path_buf(),
                source: io::Error::other(e.to_string()),
            })?
    }
}
