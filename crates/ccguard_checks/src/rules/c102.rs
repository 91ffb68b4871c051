//! C102: ClassMethods — member functions are defined outside the class body.

use ccguard_ast::{DeclId, TranslationUnit};
use ccguard_diagnostics::{Category, Diagnostic, DiagnosticCode, Label, Severity};

use crate::{Check, CheckContext, DeclPattern, MatchResult, Matcher, Pattern};

/// Flags member functions whose body is written inside the class definition.
///
/// Members of class templates (and of classes nested in them) are exempt
/// since their definitions must be visible at the point of instantiation.
pub struct ClassMethods;

impl Check for ClassMethods {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Class, 102)
    }

    fn name(&self) -> &str {
        "class-methods"
    }

    fn description(&self) -> &str {
        "member functions must be implemented outside the class definition"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn register_patterns(&self) -> Vec<Matcher> {
        vec![Matcher::new(Pattern::Decl(DeclPattern::Function), "method")]
    }

    fn on_match(&self, m: &MatchResult<'_>, cx: &CheckContext<'_>) {
        let Some(id) = m.decl() else { return };
        let tu = cx.tu;
        let decl = tu.decl(id);
        let Some(function) = decl.as_function() else { return };
        if function.body.is_none()
            || decl.is_implicit
            || function.is_defaulted
            || function.is_deleted
            || function.is_template_instantiation()
        {
            return;
        }
        let Some(record) = tu.parent_record(id) else { return };
        if in_template(tu, record) || tu.is_lambda_call_operator(id) {
            return;
        }
        let defined_in_class = decl
            .lexical_parent
            .is_some_and(|lexical| tu.record(lexical).is_some());
        if !defined_in_class {
            return;
        }

        let name = tu.display_name(id);
        cx.sink.emit(
            Diagnostic::warning(
                self.code(),
                format!("function '{name}' must be implemented outside class definition"),
                decl.span,
            )
            .with_label(Label::primary(decl.span, "body written inside the class"))
            .with_help(format!(
                "declare '{name}' in the class and define it as `{}::{name}` after the class",
                tu.qualified_name(record)
            )),
        );
    }
}

/// Whether `record` or any class enclosing it is a template pattern.
fn in_template(tu: &TranslationUnit, record: DeclId) -> bool {
    std::iter::once(record)
        .chain(tu.ancestors(record))
        .any(|r| tu.record(r).is_some_and(|data| data.is_templated))
}
