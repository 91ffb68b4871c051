//! Errors reported by the command-line front end.

use std::path::PathBuf;

use ccguard_common::InternalError;
use ccguard_config::ConfigError;

/// Anything that stops a `ccguard` command before or while it checks units.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// A file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// A translation-unit dump is not valid JSON for the unit model.
    #[error("{}: malformed translation unit: {source}", path.display())]
    Json {
        /// The dump being parsed.
        path: PathBuf,
        /// The underlying error.
        source: serde_json::Error,
    },

    /// A translation unit refers to ids it does not contain.
    #[error("{}: {source}", path.display())]
    Invalid {
        /// The dump being validated.
        path: PathBuf,
        /// What is missing.
        source: InternalError,
    },

    /// The configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Check selectors that name no registered check.
    #[error("unknown check(s): {}", .0.join(", "))]
    UnknownChecks(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_checks_lists_names() {
        let err = CliError::UnknownChecks(vec!["no-such".into(), "X999".into()]);
        assert_eq!(err.to_string(), "unknown check(s): no-such, X999");
    }

    #[test]
    fn io_error_names_the_file() {
        let err = CliError::Io {
            path: PathBuf::from("unit.json"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(err.to_string(), "failed to read unit.json: gone");
    }
}
