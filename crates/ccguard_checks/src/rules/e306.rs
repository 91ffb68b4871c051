//! E306: Strings — C string literals must not be used.

use ccguard_ast::{CastKind, DeclKind, ExprKind};
use ccguard_diagnostics::{Category, Diagnostic, DiagnosticCode, Severity};

use crate::{Check, CheckContext, ExprPattern, MatchResult, Matcher, Node, Pattern};

/// Flags string literals, except the operand of a user-defined literal
/// operator (`"abc"_s`) and the message of a `static_assert`.
pub struct Strings;

impl Check for Strings {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Expression, 306)
    }

    fn name(&self) -> &str {
        "strings"
    }

    fn description(&self) -> &str {
        "C string literals must not be used"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn register_patterns(&self) -> Vec<Matcher> {
        vec![Matcher::new(Pattern::Expr(ExprPattern::StringLiteral), "string")]
    }

    fn on_match(&self, m: &MatchResult<'_>, cx: &CheckContext<'_>) {
        let Some(id) = m.expr() else { return };
        let tu = cx.tu;

        // The first ancestor written in the source.
        let spelled_parent = m.ancestors.iter().rev().find(|node| match node {
            Node::Expr(e) => !matches!(
                tu.expr(*e).kind,
                ExprKind::Paren { .. }
                    | ExprKind::Cast {
                        cast_kind: CastKind::Implicit,
                        ..
                    }
            ),
            _ => true,
        });
        let allowed = match spelled_parent {
            Some(Node::Expr(e)) => matches!(tu.expr(*e).kind, ExprKind::UserDefinedLiteral { .. }),
            Some(Node::Decl(d)) => matches!(tu.decl(*d).kind, DeclKind::StaticAssert(_)),
            _ => false,
        };
        if allowed {
            return;
        }
        cx.sink.emit(
            Diagnostic::warning(self.code(), "C-String literals MUST not be used", tu.expr(id).span)
                .with_help("use std::string or std::string_view literals"),
        );
    }
}
