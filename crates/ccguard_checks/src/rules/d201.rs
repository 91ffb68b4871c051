//! D201: Auto — placeholder types must not hide what a declaration is.

use ccguard_ast::{DeclId, ExprKind, QualType, StmtId, StmtKind, TranslationUnit, Type};
use ccguard_diagnostics::{
    Category, Diagnostic, DiagnosticCode, Replacement, Severity, SuggestedFix,
};

use crate::{
    is_auto_placeholder, is_generic_lambda, strip_implicit, Check, CheckContext, DeclPattern,
    MatchResult, Matcher, Pattern,
};

/// Flags `auto` variables and deduced return types.
///
/// Allowed: structured bindings, init-captures, variables holding a lambda,
/// constrained placeholders (`Iterator auto it`), generic lambda parameters,
/// trailing return types, and templates whose result depends on a template
/// parameter. A lambda may deduce its return type only if it is generic.
pub struct Auto;

impl Check for Auto {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Declaration, 201)
    }

    fn name(&self) -> &str {
        "auto"
    }

    fn description(&self) -> &str {
        "auto must not be used for variables or deduced return types"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn register_patterns(&self) -> Vec<Matcher> {
        vec![
            Matcher::new(Pattern::Decl(DeclPattern::Var), "variable"),
            Matcher::new(Pattern::Decl(DeclPattern::Function), "function-return"),
            Matcher::new(Pattern::Decl(DeclPattern::FunctionTemplate), "template-return"),
            Matcher::new(Pattern::Decl(DeclPattern::Record), "lambda"),
        ]
    }

    fn on_match(&self, m: &MatchResult<'_>, cx: &CheckContext<'_>) {
        let Some(id) = m.decl() else { return };
        match m.key {
            "variable" => self.check_variable(id, cx),
            "function-return" => self.check_function(id, cx),
            "template-return" => self.check_template(id, cx),
            "lambda" => self.check_lambda(id, cx),
            _ => {}
        }
    }
}

impl Auto {
    fn check_variable(&self, id: DeclId, cx: &CheckContext<'_>) {
        let tu = cx.tu;
        let decl = tu.decl(id);
        let Some(var) = decl.as_var() else { return };
        let Some(Type::Auto { constrained, .. }) = tu.types.written_auto(var.ty) else {
            return;
        };
        if *constrained || var.is_init_capture || var.is_decomposition {
            return;
        }
        if var.is_param && decl.parent.is_some_and(|f| tu.is_lambda_call_operator(f)) {
            return;
        }
        let holds_lambda = var
            .init
            .is_some_and(|init| matches!(tu.expr(strip_implicit(tu, init)).kind, ExprKind::Lambda { .. }))
            || tu
                .record_of_type(tu.types.non_reference(var.ty))
                .and_then(|r| tu.record(r))
                .is_some_and(|r| r.is_lambda);
        if holds_lambda {
            return;
        }

        let mut diag = Diagnostic::warning(self.code(), "Do not declare auto variables", decl.span);
        if let Some(type_span) = var.type_span.filter(|_| is_deduced(tu, var.ty)) {
            let actual = tu.type_name(var.ty);
            diag = diag
                .with_help(format!("use the actual type '{actual}'"))
                .with_fix(SuggestedFix::single(
                    "use actual type",
                    Replacement::replace(type_span, actual),
                ));
        }
        cx.sink.emit(diag);
    }

    fn check_function(&self, id: DeclId, cx: &CheckContext<'_>) {
        let tu = cx.tu;
        let decl = tu.decl(id);
        let Some(function) = decl.as_function() else { return };
        if !matches!(tu.types.get(function.return_type.ty), Type::Auto { .. }) {
            return;
        }
        if function.trailing_return
            || function.is_template_instantiation()
            || tu.is_lambda_call_operator(id)
        {
            return;
        }
        let ret = function.return_type;
        if tu.types.is_dependent(ret) || tu.types.is_undeduced_auto(ret) {
            return;
        }

        let actual = tu.type_name(ret);
        let mut diag = Diagnostic::warning(self.code(), "Do not use auto as return type", decl.span)
            .with_help(format!("use the actual type '{actual}'"));
        if let Some(span) = function.return_type_span {
            diag = diag.with_fix(SuggestedFix::single(
                "use actual type",
                Replacement::replace(span, actual),
            ));
        }
        cx.sink.emit(diag);
    }

    fn check_template(&self, id: DeclId, cx: &CheckContext<'_>) {
        let tu = cx.tu;
        let decl = tu.decl(id);
        let Some(template) = decl.as_template() else { return };
        let Some(function) = tu.function(template.templated) else { return };
        if tu.is_lambda_call_operator(template.templated) || function.trailing_return {
            return;
        }
        if !tu.types.is_undeduced_auto(function.return_type) {
            return;
        }
        if function
            .body
            .is_some_and(|body| returns_dependent(tu, body))
        {
            return;
        }
        cx.sink.emit(Diagnostic::warning(
            self.code(),
            "Do not use auto as return type",
            decl.span,
        ));
    }

    fn check_lambda(&self, id: DeclId, cx: &CheckContext<'_>) {
        let tu = cx.tu;
        if !tu.record(id).is_some_and(|r| r.is_lambda) {
            return;
        }
        let Some(call) = tu.lambda_call_operator(id) else { return };
        let Some(function) = tu.function(call) else { return };
        if is_generic_lambda(tu, id) || !is_auto_placeholder(tu, function.return_type) {
            return;
        }
        let mut diag = Diagnostic::warning(
            self.code(),
            "Lambda with non-auto arguments MUST not use auto as return type",
            tu.decl(id).span,
        );
        if is_deduced(tu, function.return_type) {
            diag = diag.with_note(format!(
                "Use actual type '{}'",
                tu.type_name(function.return_type)
            ));
        }
        cx.sink.emit(diag);
    }
}

fn is_deduced(tu: &TranslationUnit, ty: QualType) -> bool {
    !tu.types.is_dependent(ty)
        && matches!(
            tu.types.written_auto(ty),
            Some(Type::Auto {
                deduced: Some(_),
                ..
            })
        )
}

/// Whether any `return` reachable through compound and control-flow
/// statements yields a dependent type.
fn returns_dependent(tu: &TranslationUnit, stmt: StmtId) -> bool {
    let Some(node) = tu.stmts.try_get(stmt) else {
        return false;
    };
    match &node.kind {
        StmtKind::Return { value } => {
            value.is_some_and(|v| tu.types.is_dependent(tu.expr(v).ty))
        }
        kind => kind
            .child_stmts()
            .into_iter()
            .any(|child| returns_dependent(tu, child)),
    }
}
