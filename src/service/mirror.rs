//! Metadata mirror seam
//!
//! The relational store that keeps app/module/language/version rows lives
//! outside this crate. The service reports what it did through `MetadataMirror`
//! and does not depend on the mirror succeeding.

use log::info;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use crate::storage::UnitKey;

/// What the mirror needs to know about a stored payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadDescriptor {
    pub size_bytes: u64,
    pub is_draft: bool,
    pub active: bool,
}

impl PayloadDescriptor {
    pub fn for_payload(payload: &[u8]) -> Self {
        Self {
            size_bytes: payload.len() as u64,
            is_draft: true,
            active: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorEvent {
    Committed {
        unit: UnitKey,
        revision: u64,
        payload: PayloadDescriptor,
    },
    Archived {
        unit: UnitKey,
        revision: u64,
        destination: PathBuf,
    },
    Trashed {
        unit: UnitKey,
        revision: u64,
        destination: PathBuf,
    },
}

impl MirrorEvent {
    pub fn unit(&self) -> &UnitKey {
        match self {
            MirrorEvent::Committed { unit, .. }
            | MirrorEvent::Archived { unit, .. }
            | MirrorEvent::Trashed { unit, .. } => unit,
        }
    }

    pub fn revision(&self) -> u64 {
        match self {
            MirrorEvent::Committed { revision, .. }
            | MirrorEvent::Archived { revision, .. }
            | MirrorEvent::Trashed { revision, .. } => *revision,
        }
    }
}

#[derive(Debug)]
pub struct MirrorError(pub String);

impl fmt::Display for MirrorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Metadata mirror error: {}", self.0)
    }
}

impl std::error::Error for MirrorError {}

/// Receiver of storage history rows
pub trait MetadataMirror: Send + Sync {
    fn record(&self, event: &MirrorEvent) -> Result<(), MirrorError>;
}

/// Writes every event to the log
#[derive(Debug, Default)]
pub struct LogMirror;

impl MetadataMirror for LogMirror {
    fn record(&self, event: &MirrorEvent) -> Result<(), MirrorError> {
        match event {
            MirrorEvent::Committed {
                unit,
                revision,
                payload,
            } => info!(
                "mirror: committed {} v{} ({} bytes, draft={}, active={})",
                unit, revision, payload.size_bytes, payload.is_draft, payload.active
            ),
            MirrorEvent::Archived {
                unit,
                revision,
                destination,
            } => info!(
                "mirror: archived {} v{} at {}",
                unit,
                revision,
                destination.display()
            ),
            MirrorEvent::Trashed {
                unit,
                revision,
                destination,
            } => info!(
                "mirror: trashed {} v{} at {}",
                unit,
                revision,
                destination.display()
            ),
        }
        Ok(())
    }
}

/// Keeps the history in memory, in the order it was reported
#[derive(Debug, Default)]
pub struct MemoryMirror {
    events: Mutex<Vec<MirrorEvent>>,
}

impl MemoryMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<MirrorEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// History rows for one unit
    pub fn history(&self, unit: &UnitKey) -> Vec<MirrorEvent> {
        self.events()
            .into_iter()
            .filter(|event| event.unit() == unit)
            .collect()
    }
}

impl MetadataMirror for MemoryMirror {
    fn record(&self, event: &MirrorEvent) -> Result<(), MirrorError> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.clone());
        Ok(())
    }
}
