//! E302: TernaryOperator — the conditional operator must not be used.

use ccguard_diagnostics::{Category, Diagnostic, DiagnosticCode, Severity};

use crate::{Check, CheckContext, ExprPattern, MatchResult, Matcher, Pattern};

/// Flags `c ? a : b` expressions.
pub struct TernaryOperator;

impl Check for TernaryOperator {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Expression, 302)
    }

    fn name(&self) -> &str {
        "ternary-operator-must-not-be-used"
    }

    fn description(&self) -> &str {
        "the conditional operator must not be used"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn register_patterns(&self) -> Vec<Matcher> {
        vec![Matcher::new(Pattern::Expr(ExprPattern::Conditional), "ternary")]
    }

    fn on_match(&self, m: &MatchResult<'_>, cx: &CheckContext<'_>) {
        let Some(id) = m.expr() else { return };
        cx.sink.emit(
            Diagnostic::warning(
                self.code(),
                "Ternary operator must not be used",
                cx.tu.expr(id).span.start_point(),
            )
            .with_help("use an if statement"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{messages, run_check};
    use ccguard_ast::{BuiltinKind, ExprKind, TuBuilder};

    #[test]
    fn conditional_expression_fires() {
        let mut b = TuBuilder::new("main.cc");
        let int = b.builtin(BuiltinKind::Int);
        let bool_ty = b.builtin(BuiltinKind::Bool);
        let condition = b.expr(ExprKind::BoolLiteral { value: true }, bool_ty);
        let then_expr = b.expr(ExprKind::IntegerLiteral { value: 1 }, int);
        let else_expr = b.expr(ExprKind::IntegerLiteral { value: 2 }, int);
        let ternary = b.expr(
            ExprKind::Conditional {
                condition,
                then_expr,
                else_expr,
            },
            int,
        );
        let v = b.var(None, "x", int);
        b.edit_var(v, |var| var.init = Some(ternary));
        let tu = b.finish();

        assert_eq!(
            messages(&run_check(&TernaryOperator, &tu)),
            vec!["Ternary operator must not be used"]
        );
    }
}
