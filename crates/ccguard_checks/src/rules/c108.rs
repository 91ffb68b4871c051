//! C108: Unions — unions must not be used.

use ccguard_ast::TagKind;
use ccguard_diagnostics::{Category, Diagnostic, DiagnosticCode, Label, Severity};

use crate::{Check, CheckContext, DeclPattern, MatchResult, Matcher, Pattern};

/// Flags every union declaration.
pub struct Unions;

impl Check for Unions {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Class, 108)
    }

    fn name(&self) -> &str {
        "unions-must-not-be-used"
    }

    fn description(&self) -> &str {
        "unions must not be used"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn register_patterns(&self) -> Vec<Matcher> {
        vec![Matcher::new(Pattern::Decl(DeclPattern::Record), "union")]
    }

    fn on_match(&self, m: &MatchResult<'_>, cx: &CheckContext<'_>) {
        let Some(id) = m.decl() else { return };
        let tu = cx.tu;
        let Some(record) = tu.record(id) else { return };
        if record.tag != TagKind::Union {
            return;
        }
        let decl = tu.decl(id);
        cx.sink.emit(
            Diagnostic::warning(self.code(), "Unions must not be used", decl.span)
                .with_label(Label::primary(record.tag_span, "union declared here"))
                .with_note(format!("Remove union '{}'", tu.display_name(id))),
        );
    }
}
