//! Parsing and validation of `ccguard.toml` configuration files.
//!
//! This crate reads the configuration file and produces a strongly-typed
//! [`GuardConfig`]: which checks are allowed, denied or kept at warning
//! level, plus the options of the checks that have any.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_file, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
