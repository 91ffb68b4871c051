//! Conformance test helpers for ccguard.
//!
//! Provides shared pipeline functions that run a translation unit through
//! validation and the check engine and return structured results for
//! assertion in integration tests.

#![warn(missing_docs)]

use ccguard_ast::TranslationUnit;
use ccguard_checks::CheckEngine;
use ccguard_common::GuardResult;
use ccguard_config::{ConfigError, GuardConfig};
use ccguard_diagnostics::{Diagnostic, DiagnosticSink, Severity};

/// Result of running validation and all enabled checks on one unit.
pub struct PipelineResult {
    /// All diagnostics, in the engine's output order.
    pub diagnostics: Vec<Diagnostic>,
    /// Whether any errors were emitted.
    pub has_errors: bool,
    /// Number of error-severity diagnostics.
    pub error_count: usize,
    /// Number of warning-severity diagnostics.
    pub warning_count: usize,
}

impl PipelineResult {
    /// Diagnostics carrying `code` (e.g. `"C103"`).
    pub fn with_code(&self, code: &str) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.code.to_string() == code)
            .collect()
    }

    /// Messages of the diagnostics carrying `code`.
    pub fn messages_of(&self, code: &str) -> Vec<&str> {
        self.with_code(code)
            .into_iter()
            .map(|d| d.message.as_str())
            .collect()
    }

    /// Renders every diagnostic to one line, for whole-output comparisons.
    pub fn rendered(&self) -> Vec<String> {
        self.diagnostics
            .iter()
            .map(|d| {
                format!(
                    "{}:{}-{} {} {} {}",
                    d.primary_span.file.as_raw(),
                    d.primary_span.start,
                    d.primary_span.end,
                    d.severity,
                    d.code,
                    d.message
                )
            })
            .collect()
    }
}

/// Creates a configuration with the given deny/allow selections.
pub fn make_config(deny: &[&str], allow: &[&str]) -> Result<GuardConfig, ConfigError> {
    let quote = |names: &[&str]| {
        names
            .iter()
            .map(|n| format!("\"{n}\""))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let toml_str = format!(
        "[checks]\ndeny = [{}]\nallow = [{}]\n",
        quote(deny),
        quote(allow)
    );
    ccguard_config::load_config_from_str(&toml_str)
}

/// Creates a configuration in which only the check named `selector` runs.
pub fn only(selector: &str) -> GuardConfig {
    let mut config = GuardConfig::default();
    config.checks.allow = CheckEngine::with_defaults()
        .checks()
        .filter(|c| c.name() != selector && c.code().to_string() != selector)
        .map(|c| c.name().to_string())
        .collect();
    config
}

/// Validates `tu` and runs every enabled check on it.
pub fn run_pipeline(tu: &TranslationUnit, config: &GuardConfig) -> GuardResult<PipelineResult> {
    tu.validate()?;
    let engine = CheckEngine::new(config);
    let sources = tu.source_db();
    let sink = DiagnosticSink::new();
    engine.run(tu, &sources, &sink);
    let diagnostics = sink.take_all();
    let error_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Error)
        .count();
    let warning_count = diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .count();
    Ok(PipelineResult {
        has_errors: error_count > 0,
        diagnostics,
        error_count,
        warning_count,
    })
}

/// Runs all checks at their default severity.
pub fn full_pipeline(tu: &TranslationUnit) -> GuardResult<PipelineResult> {
    run_pipeline(tu, &GuardConfig::default())
}

/// Runs a single check, selected by name or code.
pub fn check_only(tu: &TranslationUnit, selector: &str) -> GuardResult<PipelineResult> {
    run_pipeline(tu, &only(selector))
}

/// Parses a JSON translation-unit dump.
pub fn load_json_unit(json: &str) -> Result<TranslationUnit, serde_json::Error> {
    serde_json::from_str(json)
}
