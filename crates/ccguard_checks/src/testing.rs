//! Runs a single check over a unit, without the engine's filtering.

use ccguard_ast::{PpEvent, TranslationUnit};
use ccguard_config::GuardConfig;
use ccguard_diagnostics::{Diagnostic, DiagnosticSink};

use crate::engine::replay;
use crate::finder::MatchFinder;
use crate::{Check, CheckContext};

pub(crate) fn run_check(check: &dyn Check, tu: &TranslationUnit) -> Vec<Diagnostic> {
    run_check_with(check, tu, &GuardConfig::default())
}

pub(crate) fn run_check_with(
    check: &dyn Check,
    tu: &TranslationUnit,
    config: &GuardConfig,
) -> Vec<Diagnostic> {
    let sources = tu.source_db();
    let sink = DiagnosticSink::new();
    let cx = CheckContext {
        tu,
        sources: &sources,
        config,
        sink: &sink,
    };
    let matchers: Vec<_> = check
        .register_patterns()
        .into_iter()
        .map(|m| (0, m))
        .collect();
    MatchFinder::new(&matchers).run(tu, |_, m| check.on_match(m, &cx));
    if let Some(mut cb) = check.preprocessor_callbacks() {
        for event in &tu.pp_events {
            replay(cb.as_mut(), event, &cx);
        }
        if !tu.pp_events.contains(&PpEvent::EndOfMainFile) {
            cb.end_of_main_file(&cx);
        }
    }
    sink.take_all()
}

pub(crate) fn messages(diags: &[Diagnostic]) -> Vec<&str> {
    diags.iter().map(|d| d.message.as_str()).collect()
}
