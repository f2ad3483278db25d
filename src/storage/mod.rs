//! Versioned document storage
//!
//! Path construction, revision resolution, byte persistence and tree
//! transitions for App/Module/Language documents.

pub mod filesystem;
pub mod lifecycle;
pub mod locks;
pub mod paths;
pub mod results;
pub mod versions;

pub use filesystem::FileStore;
pub use lifecycle::LifecycleMover;
pub use locks::UnitLocks;
pub use paths::{Level, PathResolver, Tree, UnitKey};
pub use results::{MoveOutcome, UpdateOutcome, WriteOutcome};
pub use versions::VersionResolver;
