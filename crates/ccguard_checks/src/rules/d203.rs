//! D203: LocalMethodsAndTypes — file-local entities belong in an anonymous namespace.

use ccguard_ast::{DeclId, DeclKind, SpecializationKind, TranslationUnit};
use ccguard_diagnostics::{Category, Diagnostic, DiagnosticCode, Severity};

use crate::{is_source_file, Check, CheckContext, DeclPattern, MatchResult, Matcher, Pattern};

/// Flags functions, variables and records first declared in an
/// implementation file outside an anonymous namespace.
///
/// Members, locals, parameters, `extern "C"` entities, explicit
/// specializations, implicit declarations and `main` are exempt.
pub struct LocalMethodsAndTypes;

impl Check for LocalMethodsAndTypes {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Declaration, 203)
    }

    fn name(&self) -> &str {
        "local-methods-and-types"
    }

    fn description(&self) -> &str {
        "declarations local to an implementation file must be in an anonymous namespace"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn register_patterns(&self) -> Vec<Matcher> {
        vec![
            Matcher::new(Pattern::Decl(DeclPattern::Function), "Function"),
            Matcher::new(Pattern::Decl(DeclPattern::Var), "Variable"),
            Matcher::new(Pattern::Decl(DeclPattern::Record), "Record"),
        ]
    }

    fn on_match(&self, m: &MatchResult<'_>, cx: &CheckContext<'_>) {
        let Some(id) = m.decl() else { return };
        let tu = cx.tu;
        let decl = tu.decl(id);
        let first_id = tu.canonical_decl(id);
        if first_id != id
            || decl.is_implicit
            || is_exempt_kind(tu, id)
            || has_local_ancestor(tu, id)
        {
            return;
        }

        let first = tu.decl(first_id);
        let in_source = tu.file_path(first.span.file).is_some_and(|path| {
            is_source_file(path, &cx.config.local_methods_and_types.source_extensions)
        });
        if !in_source {
            return;
        }
        cx.sink.emit(
            Diagnostic::warning(
                self.code(),
                format!(
                    "{} '{}' should be in an anonymous namespace",
                    m.key,
                    tu.display_name(id)
                ),
                decl.span,
            )
            .with_help("wrap the declaration in `namespace { ... }`"),
        );
    }
}

fn is_explicit_specialization(kind: SpecializationKind) -> bool {
    matches!(
        kind,
        SpecializationKind::ExplicitSpecialization | SpecializationKind::PartialSpecialization
    )
}

fn is_exempt_kind(tu: &TranslationUnit, id: DeclId) -> bool {
    let decl = tu.decl(id);
    match &decl.kind {
        DeclKind::Function(f) => {
            f.is_extern_c
                || decl.name == "main"
                || f.specialization.is_some_and(|s| is_explicit_specialization(s.kind))
        }
        DeclKind::Var(v) => {
            v.is_param
                || v.is_extern_c
                || v.specialization.is_some_and(|s| is_explicit_specialization(s.kind))
        }
        DeclKind::Record(r) => r.specialization.is_some_and(|s| is_explicit_specialization(s.kind)),
        _ => true,
    }
}

/// Inside an anonymous namespace, a function or a record.
fn has_local_ancestor(tu: &TranslationUnit, id: DeclId) -> bool {
    tu.ancestors(id).any(|a| match &tu.decl(a).kind {
        DeclKind::Namespace(ns) => ns.anonymous,
        DeclKind::Function(_) | DeclKind::Record(_) => true,
        _ => false,
    })
}
