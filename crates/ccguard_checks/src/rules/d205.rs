//! D205: UseNodiscard — results of value-returning functions must not be ignored.

use ccguard_ast::{AttrKind, FunctionKind, OverloadedOperator};
use ccguard_diagnostics::{
    Category, Diagnostic, DiagnosticCode, Replacement, Severity, SuggestedFix,
};

use crate::{Check, CheckContext, DeclPattern, MatchResult, Matcher, Pattern};

/// Flags value-returning functions and methods declared without
/// `[[nodiscard]]`.
///
/// Out-of-line definitions are skipped since the attribute belongs on the
/// in-class declaration. Assignment and prefix increment/decrement operators
/// returning a reference are exempt, as are lambdas, templates,
/// `[[noreturn]]` functions and compiler builtins.
pub struct UseNodiscard;

impl Check for UseNodiscard {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Declaration, 205)
    }

    fn name(&self) -> &str {
        "use-nodiscard"
    }

    fn description(&self) -> &str {
        "non-void functions must be marked [[nodiscard]]"
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

        if decl.is_implicit
            || decl.name.starts_with("__builtin")
            || function.is_deleted
            || function.described_template.is_some()
            || function.is_template_instantiation()
            || tu.is_lambda_call_operator(id)
        {
            return;
        }
        if matches!(
            function.function_kind,
            FunctionKind::Constructor | FunctionKind::Destructor | FunctionKind::DeductionGuide
        ) {
            return;
        }
        if tu.types.is_void(function.return_type)
            || decl.has_attr(AttrKind::NoReturn)
            || decl.has_attr(AttrKind::NoDiscard)
        {
            return;
        }

        // Out-of-line definitions and other redeclarations.
        if decl.lexical_parent != decl.parent || tu.canonical_decl(id) != id {
            return;
        }

        let returns_reference = tu.types.is_reference(function.return_type);
        let chaining_operator = match function.operator {
            Some(OverloadedOperator::Equal) => true,
            Some(OverloadedOperator::PlusPlus | OverloadedOperator::MinusMinus) => {
                function.function_kind == FunctionKind::Method && function.params.is_empty()
            }
            _ => false,
        };
        if chaining_operator && returns_reference {
            return;
        }

        let start = decl.range.start_point();
        cx.sink.emit(
            Diagnostic::warning(
                self.code(),
                format!("function '{}' should be marked [[nodiscard]]", tu.display_name(id)),
                start,
            )
            .with_fix(SuggestedFix::single(
                "add [[nodiscard]]",
                Replacement::insert(start, "[[nodiscard]] "),
            )),
        );
    }
}
