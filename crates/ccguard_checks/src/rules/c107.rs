//! C107: FriendDeclarations — friends are banned except for symmetric
//! operators and a class template befriending its own specializations.

use ccguard_ast::{DeclId, DeclKind, FriendTarget, TranslationUnit};
use ccguard_diagnostics::{Category, Diagnostic, DiagnosticCode, Severity};

use crate::{Check, CheckContext, DeclPattern, MatchResult, Matcher, Pattern};

/// Flags `friend` declarations.
///
/// Allowed are binary operator friends taking the befriending class in
/// exactly one of their two parameters (`operator<<(std::ostream &, const T &)`),
/// and `template <typename U> friend class C;` inside class template `C`.
pub struct FriendDeclarations;

impl Check for FriendDeclarations {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Class, 107)
    }

    fn name(&self) -> &str {
        "friend-declarations"
    }

    fn description(&self) -> &str {
        "friend declarations must not be used"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn register_patterns(&self) -> Vec<Matcher> {
        vec![Matcher::new(Pattern::Decl(DeclPattern::Friend), "friend")]
    }

    fn on_match(&self, m: &MatchResult<'_>, cx: &CheckContext<'_>) {
        let Some(id) = m.decl() else { return };
        let tu = cx.tu;
        let decl = tu.decl(id);
        let DeclKind::Friend(friend) = &decl.kind else { return };
        let enclosing = decl.lexical_parent.filter(|&p| tu.record(p).is_some());

        match (&friend.target, enclosing) {
            (None, _) => {
                cx.sink.emit(Diagnostic::warning(
                    self.code(),
                    "Unresolved friend declaration",
                    decl.span,
                ));
                return;
            }
            (Some(FriendTarget::Decl(target)), Some(class)) => {
                if is_symmetric_operator(tu, *target, class) || is_own_template(tu, *target, class)
                {
                    return;
                }
            }
            _ => {}
        }
        cx.sink.emit(
            Diagnostic::warning(self.code(), "Friend declaration must not be used", decl.span)
                .with_help("expose the needed functionality through the public interface"),
        );
    }
}

fn is_symmetric_operator(tu: &TranslationUnit, target: DeclId, class: DeclId) -> bool {
    let Some(function) = tu.function(target) else {
        return false;
    };
    if function.operator.is_none() || function.params.len() != 2 {
        return false;
    }
    let takes_class = |index| {
        tu.param_type(function, index)
            .is_some_and(|ty| tu.is_record_type(tu.types.non_reference(ty), class))
    };
    takes_class(0) != takes_class(1)
}

fn is_own_template(tu: &TranslationUnit, target: DeclId, class: DeclId) -> bool {
    let Some(record) = tu.record(class) else {
        return false;
    };
    if !record.is_templated && record.specialization.is_none() {
        return false;
    }
    matches!(tu.decl(target).kind, DeclKind::ClassTemplate(_))
        && tu.qualified_name(target) == tu.qualified_name(class)
}
