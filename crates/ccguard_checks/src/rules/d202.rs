//! D202: EnumClass — enumerations must be scoped.

use ccguard_ast::DeclKind;
use ccguard_diagnostics::{
    Category, Diagnostic, DiagnosticCode, Label, Replacement, Severity, SuggestedFix,
};

use crate::{Check, CheckContext, DeclPattern, MatchResult, Matcher, Pattern};

/// Flags unscoped `enum` declarations.
pub struct EnumClass;

impl Check for EnumClass {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Declaration, 202)
    }

    fn name(&self) -> &str {
        "enum-class"
    }

    fn description(&self) -> &str {
        "enumerations must be declared as enum class"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn register_patterns(&self) -> Vec<Matcher> {
        vec![Matcher::new(Pattern::Decl(DeclPattern::Enum), "enum")]
    }

    fn on_match(&self, m: &MatchResult<'_>, cx: &CheckContext<'_>) {
        let Some(id) = m.decl() else { return };
        let decl = cx.tu.decl(id);
        let DeclKind::Enum(data) = &decl.kind else {
            return;
        };
        if data.scoped {
            return;
        }
        let mut diag = Diagnostic::warning(self.code(), "enum class MUST be used", decl.span)
            .with_label(Label::primary(
                decl.span,
                format!("'{}' is unscoped", cx.tu.display_name(id)),
            ));
        if let Some(keyword) = data.keyword_span {
            diag = diag.with_fix(SuggestedFix::single(
                "insert class",
                Replacement::insert(keyword.end_point(), " class"),
            ));
        }
        cx.sink.emit(diag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{messages, run_check};
    use ccguard_ast::TuBuilder;

    #[test]
    fn unscoped_enum_gets_class_inserted() {
        let mut b = TuBuilder::new("main.cc");
        let e = b.enumeration(None, "Colour", false);
        b.enumeration(None, "Shape", true);
        let tu = b.finish();

        let diags = run_check(&EnumClass, &tu);
        assert_eq!(messages(&diags), vec!["enum class MUST be used"]);
        let DeclKind::Enum(data) = &tu.decl(e).kind else {
            panic!("expected enum");
        };
        let edit = &diags[0].fix.as_ref().unwrap().replacements[0];
        assert!(edit.is_insertion());
        assert_eq!(edit.span, data.keyword_span.unwrap().end_point());
        assert_eq!(edit.new_text, " class");
    }
}
