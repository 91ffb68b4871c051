//! D206: UseNoexcept — functions must declare that they do not throw.

use ccguard_ast::FunctionKind;
use ccguard_diagnostics::{
    Category, Diagnostic, DiagnosticCode, Replacement, Severity, SuggestedFix,
};

use crate::{Check, CheckContext, DeclPattern, MatchResult, Matcher, Pattern};

/// Flags functions, methods and lambdas not declared `noexcept`.
pub struct UseNoexcept;

impl Check for UseNoexcept {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Declaration, 206)
    }

    fn name(&self) -> &str {
        "use-noexcept"
    }

    fn description(&self) -> &str {
        "functions, methods and lambdas must be noexcept"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn register_patterns(&self) -> Vec<Matcher> {
        vec![Matcher::new(Pattern::Decl(DeclPattern::Function), "function")]
    }

    fn on_match(&self, m: &MatchResult<'_>, cx: &CheckContext<'_>) {
        let Some(id) = m.decl() else { return };
        let tu = cx.tu;
        let decl = tu.decl(id);
        let Some(function) = decl.as_function() else {
            return;
        };
        if tu.canonical_decl(id) != id
            || function.is_noexcept
            || function.is_deleted
            || decl.is_implicit
            || function.function_kind == FunctionKind::DeductionGuide
            || decl.name.starts_with("__builtin")
        {
            return;
        }

        let is_lambda = tu.is_lambda_call_operator(id);
        let message = if is_lambda {
            String::from("Lambda should be noexcept")
        } else if tu.parent_record(id).is_some() {
            format!("Method '{}' should be noexcept", tu.display_name(id))
        } else {
            format!("Function '{}' should be noexcept", tu.display_name(id))
        };

        let mut diag =
            Diagnostic::warning(self.code(), message, decl.span).with_help("insert 'noexcept'");
        // `noexcept` goes after a written `const`, whose position is unknown.
        if is_lambda || !function.is_const {
            diag = diag.with_fix(SuggestedFix::single(
                "insert 'noexcept'",
                Replacement::insert(function.params_range.end_point(), " noexcept"),
            ));
        }
        cx.sink.emit(diag);
    }
}
