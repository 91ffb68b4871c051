//! C101: AssignmentOperators — concrete classes must declare copy and move assignment.

use ccguard_ast::{OverloadedOperator, ParamPassing, TagKind};
use ccguard_diagnostics::{Category, Diagnostic, DiagnosticCode, Label, Severity};

use crate::{Check, CheckContext, DeclPattern, MatchResult, Matcher, Pattern};

/// Requires every non-abstract `class` to declare both `operator=(const T &)`
/// and `operator=(T &&)`.
///
/// Defaulted and deleted declarations count; the point is that the class
/// states its assignment semantics. Structs and lambda closures are exempt.
pub struct AssignmentOperators;

impl Check for AssignmentOperators {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Class, 101)
    }

    fn name(&self) -> &str {
        "assignment-operators"
    }

    fn description(&self) -> &str {
        "non-abstract class must declare copy- and move-assignment operators"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn register_patterns(&self) -> Vec<Matcher> {
        vec![Matcher::new(
            Pattern::Decl(DeclPattern::RecordDefinition),
            "record",
        )]
    }

    fn on_match(&self, m: &MatchResult<'_>, cx: &CheckContext<'_>) {
        let Some(id) = m.decl() else { return };
        let tu = cx.tu;
        let Some(record) = tu.record(id) else { return };
        if record.is_abstract || record.is_lambda || record.tag == TagKind::Struct {
            return;
        }

        let mut has_copy = false;
        let mut has_move = false;
        for (_, decl, function) in tu.methods(id) {
            if decl.is_implicit || function.operator != Some(OverloadedOperator::Equal) {
                continue;
            }
            match tu.record_param_passing(function, id) {
                Some(ParamPassing::LValueRef { is_const: true }) => has_copy = true,
                Some(ParamPassing::RValueRef) => has_move = true,
                _ => {}
            }
        }

        let decl = tu.decl(id);
        let anchor = record.bases.first().map_or(decl.span, |b| b.span);
        let name = tu.display_name(id);
        for (present, kind, signature) in [
            (has_move, "move", format!("{name} &operator=({name} &&)")),
            (has_copy, "copy", format!("{name} &operator=(const {name} &)")),
        ] {
            if present {
                continue;
            }
            cx.sink.emit(
                Diagnostic::warning(
                    self.code(),
                    format!("Non-abstract class '{name}' must implement {kind}-assignment operator"),
                    anchor,
                )
                .with_label(Label::primary(decl.span, format!("'{name}' declared here")))
                .with_help(format!("declare `{signature}`, defaulted or deleted if appropriate")),
            );
        }
    }
}
