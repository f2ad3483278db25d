//! Error handling
//!
//! Defines the storage error type and its mapping to the outer boundary.

pub mod handlers;
pub mod types;

pub use handlers::{ErrorReport, error_to_status};
pub use types::*;
