//! E301: CommaOperator — the built-in comma operator must not be used.

use ccguard_ast::{BinaryOp, ExprKind};
use ccguard_diagnostics::{Category, Diagnostic, DiagnosticCode, Severity};

use crate::{Check, CheckContext, ExprPattern, MatchResult, Matcher, Pattern};

/// Flags `a, b` expressions.
pub struct CommaOperator;

impl Check for CommaOperator {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Expression, 301)
    }

    fn name(&self) -> &str {
        "comma-operator-must-not-be-used"
    }

    fn description(&self) -> &str {
        "the comma operator must not be used"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn register_patterns(&self) -> Vec<Matcher> {
        vec![Matcher::new(
            Pattern::Expr(ExprPattern::Binary(&[BinaryOp::Comma])),
            "comma",
        )]
    }

    fn on_match(&self, m: &MatchResult<'_>, cx: &CheckContext<'_>) {
        let Some(id) = m.expr() else { return };
        if let ExprKind::Binary { op_span, .. } = &cx.tu.expr(id).kind {
            cx.sink.emit(Diagnostic::warning(
                self.code(),
                "Comma operator must not be used",
                *op_span,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{messages, run_check};
    use ccguard_ast::{BuiltinKind, TuBuilder};

    #[test]
    fn comma_is_reported_at_the_operator() {
        let mut b = TuBuilder::new("main.cc");
        let int = b.builtin(BuiltinKind::Int);
        let binary = |b: &mut TuBuilder, op| {
            let lhs = b.expr(ExprKind::IntegerLiteral { value: 1 }, int);
            let rhs = b.expr(ExprKind::IntegerLiteral { value: 2 }, int);
            let op_span = b.span();
            let e = b.expr(ExprKind::Binary { op, lhs, rhs, op_span }, int);
            (e, op_span)
        };
        let (comma, comma_span) = binary(&mut b, BinaryOp::Comma);
        let (add, _) = binary(&mut b, BinaryOp::Add);
        let v = b.var(None, "x", int);
        b.edit_var(v, |var| var.init = Some(comma));
        let w = b.var(None, "y", int);
        b.edit_var(w, |var| var.init = Some(add));
        let tu = b.finish();

        let diags = run_check(&CommaOperator, &tu);
        assert_eq!(messages(&diags), vec!["Comma operator must not be used"]);
        assert_eq!(diags[0].primary_span, comma_span);
    }
}
