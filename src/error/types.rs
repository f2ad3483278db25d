//! Error types
//!
//! Every storage failure names the stage it happened in so callers can tell a
//! failed version lookup from a failed write or move.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Pipeline stage an error was raised in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ResolveVersion,
    EnsureExists,
    Write,
    Read,
    Move,
    Dispatch,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ResolveVersion => "resolve-version",
            Stage::EnsureExists => "ensure-exists",
            Stage::Write => "write",
            Stage::Read => "read",
            Stage::Move => "move",
            Stage::Dispatch => "dispatch",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Storage engine errors
#[derive(Debug)]
pub enum StorageError {
    /// Malformed unit key or a segment that would escape the tree
    InvalidKey(String),
    /// No revision to read, or no active file to move
    NotFound { stage: Stage, path: String },
    /// The revision slot was taken by another writer
    VersionConflict { unit: String, revision: u64 },
    Io {
        stage: Stage,
        path: PathBuf,
        source: io::Error,
    },
}

impl StorageError {
    /// Wrap an I/O error, folding `ErrorKind::NotFound` into `StorageError::NotFound`
    pub fn from_io(stage: Stage, path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            StorageError::NotFound {
                stage,
                path: path.display().to_string(),
            }
        } else {
            StorageError::Io {
                stage,
                path: path.to_path_buf(),
                source,
            }
        }
    }

    pub fn not_found(stage: Stage, path: impl Into<String>) -> Self {
        StorageError::NotFound {
            stage,
            path: path.into(),
        }
    }

    /// Short type tag used in structured error reports
    pub fn kind(&self) -> &'static str {
        match self {
            StorageError::InvalidKey(_) => "InvalidKey",
            StorageError::NotFound { .. } => "NotFound",
            StorageError::VersionConflict { .. } => "VersionConflict",
            StorageError::Io { .. } => "IOError",
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            StorageError::NotFound { stage, .. } | StorageError::Io { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Only reads are safe to repeat blindly; a retried write could skip past a gap.
    pub fn is_retryable(&self) -> bool {
        match self {
            StorageError::Io { stage, source, .. } => {
                *stage == Stage::Read && source.kind() != io::ErrorKind::CrossesDevices
            }
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::InvalidKey(k) => write!(f, "Invalid unit key: {}", k),
            StorageError::NotFound { stage, path } => write!(f, "[{}] Not found: {}", stage, path),
            StorageError::VersionConflict { unit, revision } => {
                write!(f, "Revision v{} of {} was written concurrently", revision, unit)
            }
            StorageError::Io {
                stage,
                path,
                source,
            } => write!(f, "[{}] IO error on {}: {}", stage, path.display(), source),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
