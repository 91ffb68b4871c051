//! D207: VarargFunctions — C-style variadic functions must not be used.

use ccguard_ast::{DeclId, ExprId, ExprKind, TranslationUnit};
use ccguard_diagnostics::{Category, Diagnostic, DiagnosticCode, Severity};
use ccguard_source::Span;

use crate::{
    strip_implicit, Check, CheckContext, DeclPattern, ExprPattern, MatchResult, Matcher, Pattern,
    PpCallbacks,
};

const VA_ARG_MESSAGE: &str =
    "do not use va_arg to define c-style vararg functions; use variadic templates instead";
const VARARG_DEFINITION_MESSAGE: &str =
    "do not define c-style vararg functions; use variadic templates instead";
const VA_LIST_MESSAGE: &str =
    "do not declare variables of type va_list; use variadic templates instead";

/// Flags definitions of and calls to C-style variadic functions, `va_arg`
/// (as an expression and as a macro) and `va_list` variables.
///
/// A call passing a single literal `0` through the ellipsis is the usual
/// overload-resolution idiom and is allowed.
pub struct VarargFunctions;

impl Check for VarargFunctions {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Declaration, 207)
    }

    fn name(&self) -> &str {
        "vararg-functions-must-not-be-used"
    }

    fn description(&self) -> &str {
        "c-style variadic functions must not be defined or called"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn register_patterns(&self) -> Vec<Matcher> {
        vec![
            Matcher::new(Pattern::Expr(ExprPattern::VaArg), "va-use"),
            Matcher::new(Pattern::Expr(ExprPattern::Call), "call"),
            Matcher::new(Pattern::Decl(DeclPattern::Function), "definition"),
            Matcher::new(Pattern::Decl(DeclPattern::Var), "va-list"),
        ]
    }

    fn on_match(&self, m: &MatchResult<'_>, cx: &CheckContext<'_>) {
        let tu = cx.tu;
        let (message, span) = match m.key {
            "va-use" => match m.expr() {
                Some(id) => (VA_ARG_MESSAGE, tu.expr(id).span),
                None => return,
            },
            "call" => {
                let Some(id) = m.expr() else { return };
                let ExprKind::Call {
                    callee: Some(callee),
                    args,
                } = &tu.expr(id).kind
                else {
                    return;
                };
                let variadic = tu.function(*callee).is_some_and(|f| f.is_variadic);
                if !variadic || is_zero_sentinel_call(tu, *callee, args) {
                    return;
                }
                ("do not call c-style vararg functions", tu.expr(id).span)
            }
            "definition" => {
                let Some(id) = m.decl() else { return };
                let is_variadic_definition = tu
                    .function(id)
                    .is_some_and(|f| f.is_variadic && f.body.is_some());
                if !is_variadic_definition {
                    return;
                }
                (VARARG_DEFINITION_MESSAGE, tu.decl(id).span)
            }
            "va-list" => {
                let Some(id) = m.decl() else { return };
                let decl = tu.decl(id);
                let holds_va_list = decl.as_var().is_some_and(|v| tu.types.is_va_list(v.ty));
                if decl.is_implicit || !holds_va_list {
                    return;
                }
                (VA_LIST_MESSAGE, decl.range.start_point())
            }
            _ => return,
        };
        cx.sink.emit(Diagnostic::warning(self.code(), message, span));
    }

    fn preprocessor_callbacks(&self) -> Option<Box<dyn PpCallbacks>> {
        Some(Box::new(VaArgMacroCallbacks { code: self.code() }))
    }
}

/// Exactly one argument beyond the named parameters, and it is the literal `0`.
fn is_zero_sentinel_call(tu: &TranslationUnit, callee: DeclId, args: &[ExprId]) -> bool {
    let Some(function) = tu.function(callee) else {
        return false;
    };
    if args.len() != function.params.len() + 1 {
        return false;
    }
    args.last().is_some_and(|&last| {
        matches!(
            tu.expr(strip_implicit(tu, last)).kind,
            ExprKind::IntegerLiteral { value: 0 }
        )
    })
}

struct VaArgMacroCallbacks {
    code: DiagnosticCode,
}

impl PpCallbacks for VaArgMacroCallbacks {
    fn macro_expands(&mut self, name: &str, span: Span, cx: &CheckContext<'_>) {
        if name == "va_arg" {
            cx.sink
                .emit(Diagnostic::warning(self.code, VA_ARG_MESSAGE, span));
        }
    }
}
