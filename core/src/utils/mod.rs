//! Utility functions and helpers
//!
//! This module provides helpers used throughout the codebase: naming
//! conventions, lazily derived schema state and logger setup.

pub mod derived;
pub mod naming;

pub use derived::Derived;
pub use naming::Naming;

use crate::config::EngineConfig;

/// Initialize `env_logger` with the configured level
///
/// Uses [`EngineConfig::log_filter`]; `RUST_LOG` still takes precedence.
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_logging(config: &EngineConfig) {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, config.log_filter()),
    )
    .try_init();
}
