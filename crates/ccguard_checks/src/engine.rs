//! Check engine that manages registration, selection, and execution.
//!
//! The `CheckEngine` accepts a `GuardConfig` to control which checks are
//! denied, allowed, or warned, then walks each translation unit once,
//! dispatching matches to every enabled check and replaying the unit's
//! preprocessor events to their callbacks.

use std::collections::HashSet;

use ccguard_ast::{FileKind, PpEvent, TranslationUnit};
use ccguard_config::GuardConfig;
use ccguard_diagnostics::{Diagnostic, DiagnosticSink, Severity};
use ccguard_source::SourceDb;

use crate::finder::MatchFinder;
use crate::rules::register_builtin_checks;
use crate::{Check, CheckContext, PpCallbacks};

/// The engine that orchestrates running checks on translation units.
///
/// Checks are registered at construction time. A check can be selected in
/// the configuration by its name (`derived-classes`) or its code (`C103`).
/// Allowed checks do not run; denied checks report errors; all others report
/// at their default severity. When a check is both allowed and denied,
/// allow wins.
pub struct CheckEngine {
    /// All registered checks.
    checks: Vec<Box<dyn Check>>,
    /// Selectors of checks promoted to error severity.
    denied: HashSet<String>,
    /// Selectors of checks that do not run.
    allowed: HashSet<String>,
    /// Selectors kept at warning severity.
    warned: HashSet<String>,
    /// Options handed to checks through [`CheckContext`].
    config: GuardConfig,
}

impl CheckEngine {
    /// Creates a new engine configured by the given `GuardConfig`.
    ///
    /// All builtin checks are registered automatically.
    pub fn new(config: &GuardConfig) -> Self {
        let mut engine = Self {
            checks: Vec::new(),
            denied: config.checks.deny.iter().cloned().collect(),
            allowed: config.checks.allow.iter().cloned().collect(),
            warned: config.checks.warn.iter().cloned().collect(),
            config: config.clone(),
        };
        register_builtin_checks(&mut engine);
        engine
    }

    /// Creates a new engine with default configuration (no overrides).
    pub fn with_defaults() -> Self {
        Self::new(&GuardConfig::default())
    }

    /// Registers a check with the engine.
    pub fn register(&mut self, check: Box<dyn Check>) {
        self.checks.push(check);
    }

    /// Returns the number of registered checks.
    pub fn check_count(&self) -> usize {
        self.checks.len()
    }

    /// Returns the names of all registered checks.
    pub fn check_names(&self) -> Vec<&str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    /// Iterates over the registered checks.
    pub fn checks(&self) -> impl Iterator<Item = &dyn Check> {
        self.checks.iter().map(|c| c.as_ref())
    }

    /// Returns the selectors in the configuration that name no registered check.
    pub fn unknown_checks(&self) -> Vec<String> {
        let mut unknown: Vec<String> = self
            .denied
            .iter()
            .chain(&self.allowed)
            .chain(&self.warned)
            .filter(|sel| !self.checks.iter().any(|c| selects(sel, c.as_ref())))
            .cloned()
            .collect();
        unknown.sort();
        unknown.dedup();
        unknown
    }

    /// Returns `true` if the check runs under the current configuration.
    pub fn is_enabled(&self, check: &dyn Check) -> bool {
        !self.allowed.iter().any(|sel| selects(sel, check))
    }

    /// Returns the severity the check's findings are reported at.
    pub fn severity_of(&self, check: &dyn Check) -> Severity {
        let denied = self.denied.iter().any(|sel| selects(sel, check));
        check.default_severity().escalated(denied)
    }

    /// Runs all enabled checks on one translation unit.
    ///
    /// Findings located in system headers or compiler pseudo-files are
    /// dropped. The rest are emitted sorted by location and code, with exact
    /// duplicates removed, so repeated runs produce identical output.
    pub fn run(&self, tu: &TranslationUnit, sources: &SourceDb, sink: &DiagnosticSink) {
        let main = tu
            .file_path(tu.main_file)
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        let _unit = tracing::debug_span!("check_unit", file = %main).entered();

        let active: Vec<&dyn Check> = self
            .checks
            .iter()
            .map(|c| c.as_ref())
            .filter(|c| {
                let enabled = self.is_enabled(*c);
                if !enabled {
                    tracing::trace!(check = c.name(), "skipping allowed check");
                }
                enabled
            })
            .collect();
        let temp_sinks: Vec<DiagnosticSink> = active.iter().map(|_| DiagnosticSink::new()).collect();
        let context = |slot: usize| CheckContext {
            tu,
            sources,
            config: &self.config,
            sink: &temp_sinks[slot],
        };

        let matchers: Vec<_> = active
            .iter()
            .enumerate()
            .flat_map(|(slot, check)| {
                check
                    .register_patterns()
                    .into_iter()
                    .map(move |m| (slot, m))
            })
            .collect();
        let matched = MatchFinder::new(&matchers).run(tu, |slot, m| {
            active[slot].on_match(m, &context(slot));
        });

        let mut callbacks: Vec<(usize, Box<dyn PpCallbacks>)> = active
            .iter()
            .enumerate()
            .filter_map(|(slot, check)| check.preprocessor_callbacks().map(|cb| (slot, cb)))
            .collect();
        let mut reached_end = false;
        for event in &tu.pp_events {
            reached_end |= matches!(event, PpEvent::EndOfMainFile);
            for (slot, cb) in &mut callbacks {
                replay(cb.as_mut(), event, &context(*slot));
            }
        }
        if !reached_end {
            for (slot, cb) in &mut callbacks {
                cb.end_of_main_file(&context(*slot));
            }
        }
        drop(callbacks);

        let mut findings = Vec::new();
        for (check, temp) in active.iter().zip(&temp_sinks) {
            let severity = self.severity_of(*check);
            let before = findings.len();
            for mut diag in temp.take_all() {
                if in_foreign_file(tu, &diag) {
                    continue;
                }
                diag.severity = severity;
                findings.push(diag);
            }
            if findings.len() > before {
                tracing::debug!(check = check.name(), count = findings.len() - before, "findings");
            }
        }
        findings.sort_by(|a, b| {
            (a.primary_span, a.code, &a.message).cmp(&(b.primary_span, b.code, &b.message))
        });
        findings.dedup_by(|a, b| {
            a.primary_span == b.primary_span && a.code == b.code && a.message == b.message
        });

        tracing::debug!(
            checks = active.len(),
            matches = matched,
            pp_events = tu.pp_events.len(),
            diagnostics = findings.len(),
            "unit checked"
        );
        for diag in findings {
            sink.emit(diag);
        }
    }
}

fn selects(selector: &str, check: &dyn Check) -> bool {
    selector == check.name() || selector.eq_ignore_ascii_case(&check.code().to_string())
}

fn in_foreign_file(tu: &TranslationUnit, diag: &Diagnostic) -> bool {
    matches!(
        tu.file(diag.primary_span.file).map(|f| f.kind),
        Some(FileKind::System | FileKind::Builtin)
    )
}

pub(crate) fn replay(cb: &mut dyn PpCallbacks, event: &PpEvent, cx: &CheckContext<'_>) {
    match event {
        PpEvent::FileChanged { file, reason, loc } => cb.file_changed(*file, *reason, *loc, cx),
        PpEvent::InclusionDirective(directive) => cb.inclusion_directive(directive, cx),
        PpEvent::MacroDefined { name, span } => cb.macro_defined(name, *span, cx),
        PpEvent::MacroUndefined { name, span } => cb.macro_undefined(name, *span, cx),
        PpEvent::MacroExpands { name, span } => cb.macro_expands(name, *span, cx),
        PpEvent::Conditional { directive, span } => cb.conditional(*directive, *span, cx),
        PpEvent::Pragma { span } => cb.pragma(*span, cx),
        PpEvent::EndOfMainFile => cb.end_of_main_file(cx),
    }
}
