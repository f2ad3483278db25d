//! Storage service
//!
//! The operation surface consumed by request layers, plus the seam to the
//! external metadata mirror.

pub mod core;
pub mod handle;
pub mod mirror;

pub use self::core::StorageService;
pub use handle::VaultHandle;
pub use mirror::{LogMirror, MemoryMirror, MetadataMirror, MirrorError, MirrorEvent, PayloadDescriptor};
