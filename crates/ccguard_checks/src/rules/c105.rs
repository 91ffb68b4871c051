//! C105: OperatorOverloading — banned operators, `*this` returns, and
//! complementary comparison operators.

use ccguard_ast::{
    DeclId, ExprKind, FunctionDecl, OverloadedOperator, QualType, StmtId, StmtKind,
    TranslationUnit, UnaryOp,
};
use ccguard_diagnostics::{Category, Diagnostic, DiagnosticCode, Label, Severity};

use crate::{strip_implicit, Check, CheckContext, DeclPattern, MatchResult, Matcher, Pattern};

use OverloadedOperator as Op;

/// Constrains user-defined operators.
///
/// - `&&`, `||` and unary `&` must not be overloaded.
/// - Assignment operators return `*this` on every path.
/// - Comparisons come in complete sets: `==` with `!=`, `<` with `>`,
///   `<=` with `>=`; `==` and `<` together imply `<=`, and `<=` or `>=`
///   imply `==`.
/// - A non-const `operator[]` has a const overload with the same parameter.
///
/// Each missing partner is reported once, at the first declaration of the
/// operator that requires it.
pub struct OperatorOverloading;

/// The operand types of a binary operator, as seen by overload lookup.
#[derive(Clone, Copy)]
struct Operands {
    /// The record the left operand names, if any.
    left_record: Option<DeclId>,
    left: QualType,
    right: QualType,
    /// Where free operators for this pair are looked up.
    scope: Option<DeclId>,
}

impl Check for OperatorOverloading {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Class, 105)
    }

    fn name(&self) -> &str {
        "operator-overloading"
    }

    fn description(&self) -> &str {
        "restricts overloadable operators and requires complementary comparisons"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn register_patterns(&self) -> Vec<Matcher> {
        vec![Matcher::new(Pattern::Decl(DeclPattern::Function), "operator")]
    }

    fn on_match(&self, m: &MatchResult<'_>, cx: &CheckContext<'_>) {
        let Some(id) = m.decl() else { return };
        let tu = cx.tu;
        let decl = tu.decl(id);
        let Some(function) = decl.as_function() else { return };
        let Some(op) = function.operator else { return };
        if decl.is_implicit {
            return;
        }
        let is_method = tu.parent_record(id).is_some();
        let anchor = decl.range.start_point();
        let emit = |message: String| {
            cx.sink.emit(
                Diagnostic::warning(self.code(), message, anchor)
                    .with_label(Label::primary(decl.span, format!("'{}' declared here", decl.name))),
            );
        };

        if op.is_assignment() {
            if is_method {
                if let Some(body) = function.body {
                    self.check_returns_self(tu, body, cx);
                }
            }
            return;
        }
        // The remaining rules concern the entity, not each of its declarations.
        if tu.canonical_decl(id) != id {
            return;
        }

        match op {
            Op::Amp if function.params.len() == usize::from(!is_method) => {
                emit(format!("overloading '{}' is disallowed", decl.name));
            }
            Op::AmpAmp | Op::PipePipe => {
                emit(format!("overloading '{}' is disallowed", decl.name));
            }
            Op::Subscript if is_method && !function.is_const => {
                if !has_const_subscript(tu, id, function) {
                    emit(String::from(
                        "If operator[] overloaded with non-const version, const version MUST be present.",
                    ));
                }
            }
            Op::EqualEqual => {
                let Some(operands) = operands(tu, id, function) else { return };
                if !has_operator(tu, operands, Op::ExclaimEqual) {
                    emit(pair_message("==", "!="));
                }
                if has_operator(tu, operands, Op::Less) && !has_operator(tu, operands, Op::LessEqual) {
                    emit(String::from("If == and < overloaded, <= MUST be overloaded as well"));
                }
            }
            Op::ExclaimEqual | Op::Less | Op::Greater | Op::LessEqual | Op::GreaterEqual => {
                let Some(operands) = operands(tu, id, function) else { return };
                for &required in complements(op) {
                    // With both `<=` and `>=` present, `<=` alone reports a missing `==`.
                    let reported_elsewhere = op == Op::GreaterEqual
                        && required == Op::EqualEqual
                        && has_operator(tu, operands, Op::LessEqual);
                    if !reported_elsewhere && !has_operator(tu, operands, required) {
                        emit(pair_message(op.token(), required.token()));
                    }
                }
            }
            _ => {}
        }
    }
}

impl OperatorOverloading {
    /// Every `return` reachable through compound and control-flow statements
    /// must return `*this`.
    fn check_returns_self(&self, tu: &TranslationUnit, stmt: StmtId, cx: &CheckContext<'_>) {
        let Some(node) = tu.stmts.try_get(stmt) else { return };
        match &node.kind {
            StmtKind::Return { value } => {
                if !value.is_some_and(|v| returns_self(tu, v)) {
                    cx.sink.emit(
                        Diagnostic::warning(
                            self.code(),
                            "Assignment operator must return reference to this",
                            node.span,
                        )
                        .with_help("return `*this`"),
                    );
                }
            }
            kind => {
                for child in kind.child_stmts() {
                    self.check_returns_self(tu, child, cx);
                }
            }
        }
    }
}

fn returns_self(tu: &TranslationUnit, value: ccguard_ast::ExprId) -> bool {
    match &tu.expr(strip_implicit(tu, value)).kind {
        ExprKind::Unary {
            op: UnaryOp::Deref,
            operand,
        } => matches!(tu.expr(strip_implicit(tu, *operand)).kind, ExprKind::This),
        _ => false,
    }
}

fn pair_message(have: &str, need: &str) -> String {
    format!("If {have} overloaded, {need} MUST be overloaded as well")
}

fn complements(op: Op) -> &'static [Op] {
    match op {
        Op::EqualEqual => &[Op::ExclaimEqual],
        Op::ExclaimEqual => &[Op::EqualEqual],
        Op::Less => &[Op::Greater],
        Op::Greater => &[Op::Less],
        Op::LessEqual => &[Op::GreaterEqual, Op::EqualEqual],
        Op::GreaterEqual => &[Op::LessEqual, Op::EqualEqual],
        _ => &[],
    }
}

fn operands(tu: &TranslationUnit, id: DeclId, function: &FunctionDecl) -> Option<Operands> {
    let decl = tu.decl(id);
    if let Some(record) = tu.parent_record(id) {
        if function.params.len() != 1 {
            return None;
        }
        return Some(Operands {
            left_record: Some(record),
            left: tu.param_type(function, 0)?,
            right: tu.param_type(function, 0)?,
            scope: tu.decl(record).parent,
        });
    }
    if function.params.len() != 2 {
        return None;
    }
    let left = tu.param_type(function, 0)?;
    let right = tu.param_type(function, 1)?;
    let left_record = tu.record_of_type(tu.types.non_reference(left));
    let scope = match left_record {
        Some(record) => tu.decl(record).parent,
        None => decl.parent,
    };
    Some(Operands {
        left_record,
        left,
        right,
        scope,
    })
}

/// Looks up `op` for the operand pair: members of the left operand's class
/// first, then free operators in the scope that declares it.
fn has_operator(tu: &TranslationUnit, operands: Operands, op: Op) -> bool {
    if let Some(record) = operands.left_record {
        let member = tu.methods(record).any(|(_, _, f)| {
            f.operator == Some(op)
                && f.params.len() == 1
                && tu
                    .param_type(f, 0)
                    .is_some_and(|p| tu.types.same_type(p, operands.right))
        });
        if member {
            return true;
        }
    }
    let members = match operands.scope {
        Some(scope) => tu.decl(scope).members(),
        None => tu.top_level.as_slice(),
    };
    members.iter().any(|&candidate| {
        let Some(f) = tu.function(candidate) else {
            return false;
        };
        if f.operator != Some(op) || f.params.len() != 2 {
            return false;
        }
        let (Some(p0), Some(p1)) = (tu.param_type(f, 0), tu.param_type(f, 1)) else {
            return false;
        };
        let left_matches = match operands.left_record {
            Some(record) => tu.is_record_type(tu.types.non_reference(p0), record),
            None => tu
                .types
                .same_unqualified(tu.types.non_reference(p0), tu.types.non_reference(operands.left)),
        };
        left_matches && tu.types.same_type(p1, operands.right)
    })
}

fn has_const_subscript(tu: &TranslationUnit, id: DeclId, function: &FunctionDecl) -> bool {
    let (Some(record), Some(param)) = (tu.parent_record(id), tu.param_type(function, 0)) else {
        return true;
    };
    tu.methods(record).any(|(_, _, f)| {
        f.operator == Some(Op::Subscript)
            && f.is_const
            && tu
                .param_type(f, 0)
                .is_some_and(|p| tu.types.same_type(p, param))
    })
}
