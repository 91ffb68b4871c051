//! D204: TemplateSpecializations — specializations live next to their primary template.

use ccguard_ast::{DeclId, DeclKind, SpecializationKind, TranslationUnit};
use ccguard_diagnostics::{Category, Diagnostic, DiagnosticCode, Label, Severity};

use crate::{Check, CheckContext, DeclPattern, MatchResult, Matcher, Pattern};

/// Flags explicit and partial specializations defined in a different file
/// than the primary template's definition.
pub struct TemplateSpecializations;

impl Check for TemplateSpecializations {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Declaration, 204)
    }

    fn name(&self) -> &str {
        "template-specializations"
    }

    fn description(&self) -> &str {
        "template specializations must be defined in the same file as the primary template"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn register_patterns(&self) -> Vec<Matcher> {
        vec![
            Matcher::new(Pattern::Decl(DeclPattern::ClassTemplate), "class"),
            Matcher::new(Pattern::Decl(DeclPattern::FunctionTemplate), "function"),
        ]
    }

    fn on_match(&self, m: &MatchResult<'_>, cx: &CheckContext<'_>) {
        let Some(id) = m.decl() else { return };
        let tu = cx.tu;
        let decl = tu.decl(id);
        let Some(template) = decl.as_template() else {
            return;
        };
        if !is_definition(tu, template.templated) {
            return;
        }

        for &spec in &template.specializations {
            let Some(kind) = specialization_kind(tu, spec) else {
                continue;
            };
            if kind.is_instantiation() || !is_definition(tu, spec) {
                continue;
            }
            let spec_decl = tu.decl(spec);
            if spec_decl.span.file == decl.span.file {
                continue;
            }
            let what = match (m.key, kind) {
                ("function", _) => "Function template specialization",
                (_, SpecializationKind::PartialSpecialization) => {
                    "Partial class template specialization"
                }
                _ => "Class template specialization",
            };
            cx.sink.emit(
                Diagnostic::warning(
                    self.code(),
                    format!(
                        "{what} '{}' should be defined in the same file as '{}'",
                        tu.display_name(spec),
                        tu.qualified_name(id)
                    ),
                    spec_decl.span,
                )
                .with_label(Label::secondary(decl.span, "template first defined here")),
            );
        }
    }
}

fn specialization_kind(tu: &TranslationUnit, id: DeclId) -> Option<SpecializationKind> {
    let info = match &tu.decls.try_get(id)?.kind {
        DeclKind::Record(r) => r.specialization,
        DeclKind::Function(f) => f.specialization,
        _ => None,
    };
    info.map(|s| s.kind)
}

fn is_definition(tu: &TranslationUnit, id: DeclId) -> bool {
    match tu.decls.try_get(id).map(|d| &d.kind) {
        Some(DeclKind::Record(r)) => r.is_definition,
        Some(DeclKind::Function(f)) => f.body.is_some() || f.is_defaulted,
        _ => false,
    }
}
