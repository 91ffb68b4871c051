//! E304: LambdaImplicitCapture — lambdas must list what they capture.

use ccguard_ast::{CaptureDefault, ExprKind};
use ccguard_diagnostics::{Category, Diagnostic, DiagnosticCode, Label, Severity};

use crate::{Check, CheckContext, ExprPattern, MatchResult, Matcher, Pattern};

/// Flags lambdas with a `=` or `&` capture default.
pub struct LambdaImplicitCapture;

impl Check for LambdaImplicitCapture {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Expression, 304)
    }

    fn name(&self) -> &str {
        "lambda-implicit-capture"
    }

    fn description(&self) -> &str {
        "lambda captures must be explicit"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn register_patterns(&self) -> Vec<Matcher> {
        vec![Matcher::new(Pattern::Expr(ExprPattern::Lambda), "lambda")]
    }

    fn on_match(&self, m: &MatchResult<'_>, cx: &CheckContext<'_>) {
        let Some(id) = m.expr() else { return };
        let expr = cx.tu.expr(id);
        let ExprKind::Lambda {
            capture_default,
            capture_default_span,
            ..
        } = &expr.kind
        else {
            return;
        };
        let token = match capture_default {
            CaptureDefault::None => return,
            CaptureDefault::ByCopy => "=",
            CaptureDefault::ByRef => "&",
        };
        let mut diag = Diagnostic::warning(
            self.code(),
            "Lambda function capture must be explicit",
            expr.span.start_point(),
        );
        if let Some(span) = capture_default_span {
            diag = diag.with_label(Label::secondary(
                *span,
                format!("implicit capture by '{token}'"),
            ));
        }
        cx.sink.emit(diag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{messages, run_check};
    use ccguard_ast::{BuiltinKind, TuBuilder};

    #[test]
    fn capture_defaults_fire() {
        let mut b = TuBuilder::new("main.cc");
        let void = b.builtin(BuiltinKind::Void);
        let f = b.function(None, "run", void, &[]);
        let mut stmts = Vec::new();
        for capture_default in [CaptureDefault::ByCopy, CaptureDefault::ByRef, CaptureDefault::None] {
            let (class, _) = b.lambda_class(Some(f), void, &[]);
            let span = b.span();
            let lambda = b.expr(
                ExprKind::Lambda {
                    class,
                    capture_default,
                    capture_default_span: Some(span),
                    explicit_result_type: false,
                },
                void,
            );
            stmts.push(b.expr_stmt(lambda));
        }
        let body = b.compound(stmts);
        b.set_body(f, body);
        let tu = b.finish();

        let diags = run_check(&LambdaImplicitCapture, &tu);
        assert_eq!(
            messages(&diags),
            vec![
                "Lambda function capture must be explicit",
                "Lambda function capture must be explicit",
            ]
        );
        assert_eq!(diags[1].labels[0].message, "implicit capture by '&'");
    }
}
