//! E307: SwitchStatement — every case body must be a braced block.

use ccguard_ast::StmtKind;
use ccguard_diagnostics::{Category, Diagnostic, DiagnosticCode, Severity};

use crate::{Check, CheckContext, MatchResult, Matcher, Pattern, StmtPattern};

/// Flags `case` and `default` labels whose statement is not compound.
pub struct SwitchStatement;

impl Check for SwitchStatement {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Expression, 307)
    }

    fn name(&self) -> &str {
        "switch-statement"
    }

    fn description(&self) -> &str {
        "case statements must be scoped with braces"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn register_patterns(&self) -> Vec<Matcher> {
        vec![Matcher::new(Pattern::Stmt(StmtPattern::Case), "case")]
    }

    fn on_match(&self, m: &MatchResult<'_>, cx: &CheckContext<'_>) {
        let Some(id) = m.stmt() else { return };
        let tu = cx.tu;
        let StmtKind::Case { colon, sub, .. } = &tu.stmt(id).kind else {
            return;
        };
        if tu.stmts.try_get(*sub).is_some_and(|s| s.kind.is_compound()) {
            return;
        }
        cx.sink.emit(Diagnostic::warning(
            self.code(),
            "Case statement must be scoped statement",
            *colon,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{messages, run_check};
    use ccguard_ast::{BuiltinKind, ExprKind, TuBuilder};

    #[test]
    fn unbraced_cases_fire_at_colon() {
        let mut b = TuBuilder::new("main.cc");
        let int = b.builtin(BuiltinKind::Int);
        let void = b.builtin(BuiltinKind::Void);
        let f = b.function(None, "dispatch", void, &[int]);

        let brk = b.stmt(StmtKind::Break);
        let braced = b.compound(vec![brk]);
        let one = b.expr(ExprKind::IntegerLiteral { value: 1 }, int);
        let colon_ok = b.span();
        let scoped = b.stmt(StmtKind::Case {
            value: Some(one),
            colon: colon_ok,
            sub: braced,
        });
        let bare = b.stmt(StmtKind::Break);
        let colon_bad = b.span();
        let default = b.stmt(StmtKind::Case {
            value: None,
            colon: colon_bad,
            sub: bare,
        });
        let cases = b.compound(vec![scoped, default]);
        let condition = b.expr(ExprKind::IntegerLiteral { value: 0 }, int);
        let switch = b.stmt(StmtKind::Switch {
            condition,
            body: cases,
        });
        let body = b.compound(vec![switch]);
        b.set_body(f, body);
        let tu = b.finish();

        let diags = run_check(&SwitchStatement, &tu);
        assert_eq!(messages(&diags), vec!["Case statement must be scoped statement"]);
        assert_eq!(diags[0].primary_span, colon_bad);
    }
}
