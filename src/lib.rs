//! Versioned, file-backed storage for localization documents.
//!
//! Documents are addressed as App → Module → Language. Every write creates a
//! new numbered revision under `Latest/`, updates move the superseded revision
//! to `Archive/`, and deletes move it to `Trash/`.

pub mod cli;
pub mod config;
pub mod error;
pub mod service;
pub mod storage;
pub mod utils;

pub use error::{StorageError, StorageResult};
pub use service::{StorageService, VaultHandle};
pub use storage::{Level, Tree, UnitKey};
