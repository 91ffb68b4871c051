//! E303: FloatingPointComparison — floating values must not be compared for equality.

use ccguard_ast::{BinaryOp, ExprKind};
use ccguard_diagnostics::{Category, Diagnostic, DiagnosticCode, Severity};

use crate::{Check, CheckContext, ExprPattern, MatchResult, Matcher, Pattern};

/// Flags `==` and `!=` with a floating-point operand.
pub struct FloatingPointComparison;

impl Check for FloatingPointComparison {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Expression, 303)
    }

    fn name(&self) -> &str {
        "floating-point-comparison"
    }

    fn description(&self) -> &str {
        "floating point values must not be compared with == or !="
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn register_patterns(&self) -> Vec<Matcher> {
        vec![Matcher::new(
            Pattern::Expr(ExprPattern::Binary(&[BinaryOp::Eq, BinaryOp::Ne])),
            "equality",
        )]
    }

    fn on_match(&self, m: &MatchResult<'_>, cx: &CheckContext<'_>) {
        let Some(id) = m.expr() else { return };
        let tu = cx.tu;
        let ExprKind::Binary {
            lhs, rhs, op_span, ..
        } = &tu.expr(id).kind
        else {
            return;
        };
        let floating = |e| tu.types.is_floating(tu.expr(e).ty);
        if floating(*lhs) || floating(*rhs) {
            cx.sink.emit(
                Diagnostic::warning(
                    self.code(),
                    "Floating point expressions MUST NOT be checked for equality or inequality",
                    *op_span,
                )
                .with_help("compare the difference against a tolerance"),
            );
        }
    }
}
