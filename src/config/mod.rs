//! Campus Configuration Module
//!
//! Provides the deployment configuration loaded from TOML files: sensor bands,
//! energy thresholds, detector tuning, pipeline risk floors and run history
//! retention.
//!
//! ## Loading Order
//!
//! 1. `CAMPUS_CONFIG` environment variable (path to TOML file)
//! 2. `campus_config.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! Call `config::init()` once at startup, then `config::get()` anywhere:
//!
//! ```ignore
//! // In main():
//! config::init(CampusConfig::load());
//!
//! // Anywhere in the codebase:
//! let threshold = config::get().energy.high_consumption_threshold_kwh;
//! ```

mod campus_config;
pub mod defaults;

pub use campus_config::*;

use std::sync::OnceLock;

/// Global campus configuration, initialized once at startup.
static CAMPUS_CONFIG: OnceLock<CampusConfig> = OnceLock::new();

/// Initialize the global campus configuration.
///
/// Later calls are ignored with a warning.
pub fn init(config: CampusConfig) {
    if CAMPUS_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once, ignoring");
    }
}

/// Get a reference to the global campus configuration.
///
/// Falls back to built-in defaults if `init()` was never called (library
/// users and tests).
pub fn get() -> &'static CampusConfig {
    CAMPUS_CONFIG.get_or_init(CampusConfig::default)
}
