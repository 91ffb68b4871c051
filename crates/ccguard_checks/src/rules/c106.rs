//! C106: ProtectedAccess — the `protected` access specifier must not be used.

use ccguard_ast::AccessSpecifier;
use ccguard_diagnostics::{Category, Diagnostic, DiagnosticCode, Severity};

use crate::{Check, CheckContext, DeclPattern, MatchResult, Matcher, Pattern};

/// Flags every `protected:` label.
pub struct ProtectedAccess;

impl Check for ProtectedAccess {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Class, 106)
    }

    fn name(&self) -> &str {
        "protected-must-not-be-used"
    }

    fn description(&self) -> &str {
        "the protected access specifier must not be used"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn register_patterns(&self) -> Vec<Matcher> {
        vec![Matcher::new(Pattern::Decl(DeclPattern::AccessSpec), "access")]
    }

    fn on_match(&self, m: &MatchResult<'_>, cx: &CheckContext<'_>) {
        let Some(id) = m.decl() else { return };
        let decl = cx.tu.decl(id);
        if decl.access == AccessSpecifier::Protected {
            cx.sink.emit(
                Diagnostic::warning(self.code(), "protected modifier must not be used", decl.span)
                    .with_help("use `private` members and a public interface instead"),
            );
        }
    }
}
