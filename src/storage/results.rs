//! Storage result types
//!
//! Defines result structures returned by storage operations.

use std::path::PathBuf;

use crate::storage::paths::UnitKey;

/// A revision written into the active tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOutcome {
    pub unit: UnitKey,
    pub revision: u64,
    pub path: PathBuf,
}

/// A revision moved out of the active tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub unit: UnitKey,
    pub revision: u64,
    pub destination: PathBuf,
}

/// Result of an update: the archived predecessor and its replacement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub archived: MoveOutcome,
    pub written: WriteOutcome,
}
