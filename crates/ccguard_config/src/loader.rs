//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::GuardConfig;
use std::path::Path;

/// The file name looked up in a project directory.
pub const CONFIG_FILE_NAME: &str = "ccguard.toml";

/// Loads and validates `ccguard.toml` from a project directory.
pub fn load_config(project_dir: &Path) -> Result<GuardConfig, ConfigError> {
    load_config_file(&project_dir.join(CONFIG_FILE_NAME))
}

/// Loads and validates a configuration file at an explicit path.
pub fn load_config_file(path: &Path) -> Result<GuardConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    load_config_from_str(&content)
}

/// Parses and validates a configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<GuardConfig, ConfigError> {
    let config: GuardConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks that selections do not contradict each other and options are usable.
fn validate_config(config: &GuardConfig) -> Result<(), ConfigError> {
    let checks = &config.checks;
    if let Some(name) = checks.allow.iter().find(|name| checks.deny.contains(name)) {
        return Err(ConfigError::ValidationError(format!(
            "check '{name}' is both allowed and denied"
        )));
    }

    let extension_lists = [
        (
            "include-order.header-extensions",
            &config.include_order.header_extensions,
        ),
        (
            "include-order.source-extensions",
            &config.include_order.source_extensions,
        ),
        (
            "local-methods-and-types.source-extensions",
            &config.local_methods_and_types.source_extensions,
        ),
        (
            "preprocessing-directives.header-extensions",
            &config.preprocessing_directives.header_extensions,
        ),
    ];
    for (field, list) in extension_lists {
        if list.is_empty() {
            return Err(ConfigError::ValidationError(format!("{field} is empty")));
        }
        if let Some(bad) = list.iter().find(|ext| !ext.starts_with('.') || ext.len() < 2) {
            return Err(ConfigError::ValidationError(format!(
                "{field}: '{bad}' must look like '.ext'"
            )));
        }
    }

    if config.include_order.project_root_markers.is_empty() {
        return Err(ConfigError::ValidationError(
            "include-order.project-root-markers is empty".to_string(),
        ));
    }
    if config.type_conversions.clip_function.is_empty() {
        return Err(ConfigError::ValidationError(
            "type-conversions.clip-function is empty".to_string(),
        ));
    }
    Ok(())
}
