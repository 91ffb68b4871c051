//! E305: LambdaReturnType — non-generic lambdas must spell out their result type.

use ccguard_ast::ExprKind;
use ccguard_diagnostics::{
    Category, Diagnostic, DiagnosticCode, Replacement, Severity, SuggestedFix,
};

use crate::{is_generic_lambda, Check, CheckContext, ExprPattern, MatchResult, Matcher, Pattern};

/// Flags value-returning lambdas without `-> T`.
pub struct LambdaReturnType;

impl Check for LambdaReturnType {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Expression, 305)
    }

    fn name(&self) -> &str {
        "lambda-return-type"
    }

    fn description(&self) -> &str {
        "lambdas without auto parameters must declare their return type"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn register_patterns(&self) -> Vec<Matcher> {
        vec![Matcher::new(Pattern::Expr(ExprPattern::Lambda), "lambda")]
    }

    fn on_match(&self, m: &MatchResult<'_>, cx: &CheckContext<'_>) {
        let Some(id) = m.expr() else { return };
        let tu = cx.tu;
        let ExprKind::Lambda {
            class,
            explicit_result_type,
            ..
        } = &tu.expr(id).kind
        else {
            return;
        };
        if *explicit_result_type || is_generic_lambda(tu, *class) {
            return;
        }
        let Some(call) = tu.lambda_call_operator(*class).and_then(|c| tu.function(c)) else {
            return;
        };
        if tu.types.is_void(call.return_type) {
            return;
        }
        let Some(body) = call.body else { return };

        let at = tu.stmt(body).span.start_point();
        let ret = tu.type_name(call.return_type);
        cx.sink.emit(
            Diagnostic::warning(
                self.code(),
                "Lambda function without auto arguments must have explicit return type",
                at,
            )
            .with_fix(SuggestedFix::single(
                "add return type",
                Replacement::insert(at, format!(" -> {ret}")),
            )),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{messages, run_check};
    use ccguard_ast::{BuiltinKind, CaptureDefault, DeclId, QualType, StmtId, TuBuilder, Type};

    fn lambda(
        b: &mut TuBuilder,
        f: DeclId,
        ret: QualType,
        params: &[QualType],
        explicit: bool,
    ) -> StmtId {
        let (class, call) = b.lambda_class(Some(f), ret, params);
        let body = b.compound(vec![]);
        b.set_body(call, body);
        let e = b.expr(
            ExprKind::Lambda {
                class,
                capture_default: CaptureDefault::None,
                capture_default_span: None,
                explicit_result_type: explicit,
            },
            ret,
        );
        b.expr_stmt(e)
    }

    #[test]
    fn implicit_result_type_gets_fix() {
        let mut b = TuBuilder::new("main.cc");
        let void = b.builtin(BuiltinKind::Void);
        let int = b.builtin(BuiltinKind::Int);
        let auto_param = b.intern(Type::TemplateTypeParm {
            name: String::from("auto"),
        });
        let f = b.function(None, "run", void, &[]);
        let stmts = vec![
            lambda(&mut b, f, int, &[int], false),
            lambda(&mut b, f, int, &[int], true),
            lambda(&mut b, f, void, &[], false),
            lambda(&mut b, f, int, &[auto_param], false),
        ];
        let body = b.compound(stmts);
        b.set_body(f, body);
        let tu = b.finish();

        let diags = run_check(&LambdaReturnType, &tu);
        assert_eq!(
            messages(&diags),
            vec!["Lambda function without auto arguments must have explicit return type"]
        );
        assert_eq!(diags[0].fix.as_ref().unwrap().replacements[0].new_text, " -> int");
    }
}
