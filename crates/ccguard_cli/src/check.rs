//! `ccguard check`: runs the checks over translation-unit dumps.
//!
//! 1. Load configuration (`--config` or the nearest `ccguard.toml`)
//! 2. Fold `--allow`/`--deny` into it and build the engine
//! 3. Load, validate and check every unit in parallel
//! 4. Collapse findings repeated across units (shared headers)
//! 5. Render diagnostics

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use ccguard_checks::CheckEngine;
use ccguard_common::ContentHash;
use ccguard_diagnostics::{
    Diagnostic, DiagnosticRenderer, DiagnosticSink, Severity, TerminalRenderer,
};
use ccguard_source::{ResolvedSpan, SourceDb};
use rayon::prelude::*;
use serde::Serialize;

use crate::error::CliError;
use crate::pipeline::{load_unit, merge_selection, resolve_config};
use crate::{CheckArgs, GlobalArgs, ReportFormat};

/// Diagnostics produced for one translation unit.
pub struct UnitReport {
    /// The dump the unit was loaded from.
    pub path: PathBuf,
    /// File contents, for rendering.
    pub sources: SourceDb,
    /// Findings in location order.
    pub diagnostics: Vec<Diagnostic>,
}

/// A finding resolved to a file position, as written by `--format json`.
#[derive(Serialize)]
struct JsonFinding<'a> {
    file: Option<String>,
    line: Option<u32>,
    column: Option<u32>,
    #[serde(flatten)]
    diagnostic: &'a Diagnostic,
}

/// Runs the `ccguard check` command.
///
/// Returns exit code 0 if no errors were reported, 1 otherwise.
pub fn run(args: &CheckArgs, global: &GlobalArgs) -> Result<i32, CliError> {
    let cwd = std::env::current_dir().map_err(|source| CliError::Io {
        path: PathBuf::from("."),
        source,
    })?;
    let config = merge_selection(resolve_config(global, &cwd)?, args);
    let engine = CheckEngine::new(&config);
    let unknown = engine.unknown_checks();
    if !unknown.is_empty() {
        return Err(CliError::UnknownChecks(unknown));
    }

    let reports = check_units(&engine, &args.units)?;
    let findings = dedupe(&reports);

    match args.format {
        ReportFormat::Text => {
            let renderer = TerminalRenderer::new(global.color, 100);
            for (sources, diag, _) in &findings {
                eprintln!("{}", renderer.render(diag, sources));
            }
        }
        ReportFormat::Json => {
            let out: Vec<JsonFinding<'_>> = findings
                .iter()
                .map(|(_, diag, at)| JsonFinding {
                    file: at.as_ref().map(|r| r.file_path.display().to_string()),
                    line: at.as_ref().map(|r| r.start_line),
                    column: at.as_ref().map(|r| r.start_col),
                    diagnostic: diag,
                })
                .collect();
            let json = serde_json::to_string_pretty(&out).unwrap_or_else(|_| "[]".to_string());
            println!("{json}");
        }
    }

    let errors = findings
        .iter()
        .filter(|(_, d, _)| d.severity == Severity::Error)
        .count();
    let warnings = findings
        .iter()
        .filter(|(_, d, _)| d.severity == Severity::Warning)
        .count();
    if !global.quiet && args.format == ReportFormat::Text {
        eprintln!(
            "   Result: {} error(s), {} warning(s) in {} unit(s)",
            errors,
            warnings,
            reports.len()
        );
    }

    Ok(if errors > 0 { 1 } else { 0 })
}

/// Checks every unit in parallel; the first unit that fails to load aborts the run.
pub fn check_units(engine: &CheckEngine, paths: &[PathBuf]) -> Result<Vec<UnitReport>, CliError> {
    paths
        .par_iter()
        .map(|path| check_unit(engine, path))
        .collect()
}

/// Loads one dump and runs the engine over it.
pub fn check_unit(engine: &CheckEngine, path: &Path) -> Result<UnitReport, CliError> {
    let unit = load_unit(path)?;
    let sources = unit.source_db();
    let sink = DiagnosticSink::new();
    engine.run(&unit, &sources, &sink);
    Ok(UnitReport {
        path: path.to_path_buf(),
        sources,
        diagnostics: sink.take_all(),
    })
}

/// Drops findings already reported by an earlier unit.
///
/// Units are compared by resolved position rather than by span, since file
/// ids are local to each unit.
pub fn dedupe(reports: &[UnitReport]) -> Vec<(&SourceDb, &Diagnostic, Option<ResolvedSpan>)> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for report in reports {
        for diag in &report.diagnostics {
            let at = report.sources.resolve_span(diag.primary_span);
            // Unresolvable spans only collapse within their own unit.
            let key = match &at {
                Some(_) => diag.fingerprint(&report.sources),
                None => {
                    let local = format!(
                        "{}#{:?}|{}|{}",
                        report.path.display(),
                        diag.primary_span,
                        diag.code,
                        diag.message
                    );
                    ContentHash::from_bytes(local.as_bytes())
                }
            };
            if seen.insert(key) {
                out.push((&report.sources, diag, at));
            } else {
                tracing::trace!(code = %diag.code, message = %diag.message, "duplicate finding");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ccguard_ast::{FileKind, TuBuilder};
    use ccguard_config::GuardConfig;
    use std::fs;
    use tempfile::TempDir;

    /// Writes a unit whose main file includes a header declaring an unscoped enum.
    fn write_unit(dir: &Path, name: &str) -> PathBuf {
        let mut b = TuBuilder::with_source(dir.join(format!("{name}.cc")), "int x;\n");
        let header = b.add_file(
            dir.join("color.hh"),
            FileKind::User,
            Some("enum Color { Red };\n".to_string()),
        );
        b.in_file(header);
        b.enumeration(None, "Color", false);
        let dump = dir.join(format!("{name}.json"));
        fs::write(&dump, serde_json::to_string(&b.finish()).unwrap()).unwrap();
        dump
    }

    fn only_enum_class() -> CheckEngine {
        let mut config = GuardConfig::default();
        config.checks.allow = CheckEngine::with_defaults()
            .check_names()
            .into_iter()
            .filter(|n| *n != "enum-class")
            .map(String::from)
            .collect();
        CheckEngine::new(&config)
    }

    #[test]
    fn shared_header_findings_are_reported_once() {
        let tmp = TempDir::new().unwrap();
        let units = vec![write_unit(tmp.path(), "a"), write_unit(tmp.path(), "b")];
        let engine = only_enum_class();
        let reports = check_units(&engine, &units).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].diagnostics.len(), 1);
        assert_eq!(reports[1].diagnostics.len(), 1);

        let findings = dedupe(&reports);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].1.message, "enum class MUST be used");
        let at = findings[0].2.as_ref().unwrap();
        assert!(at.file_path.ends_with("color.hh"));
        assert_eq!(at.start_line, 1);
    }

    #[test]
    fn unreadable_unit_aborts() {
        let tmp = TempDir::new().unwrap();
        let units = vec![write_unit(tmp.path(), "a"), tmp.path().join("missing.json")];
        let result = check_units(&only_enum_class(), &units);
        assert!(matches!(result, Err(CliError::Io { .. })));
    }

    #[test]
    fn deny_sets_exit_code() {
        let tmp = TempDir::new().unwrap();
        let config = tmp.path().join("ccguard.toml");
        fs::write(&config, "[checks]\ndeny = [\"enum-class\"]\n").unwrap();
        let args = CheckArgs {
            units: vec![write_unit(tmp.path(), "a")],
            allow: vec![],
            deny: vec![],
            format: ReportFormat::Json,
        };
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
            config: Some(config.display().to_string()),
        };
        assert_eq!(run(&args, &global).unwrap(), 1);

        let relaxed = CheckArgs {
            allow: vec!["enum-class".into()],
            deny: vec![],
            ..args
        };
        assert_eq!(run(&relaxed, &global).unwrap(), 0);
    }

    #[test]
    fn unknown_selector_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let config = tmp.path().join("ccguard.toml");
        fs::write(&config, "").unwrap();
        let args = CheckArgs {
            units: vec![],
            allow: vec!["no-such-check".into()],
            deny: vec![],
            format: ReportFormat::Text,
        };
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
            config: Some(config.display().to_string()),
        };
        let err = run(&args, &global).unwrap_err();
        assert!(matches!(err, CliError::UnknownChecks(names) if names == vec!["no-such-check"]));
    }
}
