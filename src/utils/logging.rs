//! Logging utilities
//!
//! Provides logging setup and configuration.

use env_logger::{Builder, Env};

/// Setup logging; `RUST_LOG` wins over `default_level`
pub fn setup_logging(default_level: &str) {
    Builder::from_env(Env::default().default_filter_or(default_level)).init();
}
