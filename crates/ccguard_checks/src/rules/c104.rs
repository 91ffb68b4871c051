//! C104: StructsAndClasses — `struct` for plain aggregates, `class` for
//! everything with behavior, private data in classes.

use ccguard_ast::{AccessSpecifier, DeclId, FunctionKind, TagKind, TranslationUnit};
use ccguard_diagnostics::{
    Category, Diagnostic, DiagnosticCode, Replacement, Severity, SuggestedFix,
};

use crate::{Check, CheckContext, DeclPattern, MatchResult, Matcher, Pattern};

/// Checks that the class-key matches what the type is.
///
/// A type must be a `class` as soon as it has a user-provided copy or move
/// operation, a user-provided destructor, is not an aggregate, or has a
/// non-static non-const method. Otherwise it must be a `struct`. Non-const
/// data members of a `class` must be private.
pub struct StructsAndClasses;

/// The first property found that makes a type a class.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ClassReason {
    CopyConstructor,
    MoveConstructor,
    CopyAssignment,
    MoveAssignment,
    Destructor,
    NotAggregate,
    NonConstMethod,
}

impl ClassReason {
    fn message(self, name: &str) -> String {
        let what = match self {
            ClassReason::NotAggregate => {
                return format!("Non-aggregate type '{name}' must be declared as a class");
            }
            ClassReason::CopyConstructor => "a user-provided copy constructor",
            ClassReason::MoveConstructor => "a user-provided move constructor",
            ClassReason::CopyAssignment => "a user-provided copy assignment operator",
            ClassReason::MoveAssignment => "a user-provided move assignment operator",
            ClassReason::Destructor => "a user-provided destructor",
            ClassReason::NonConstMethod => "non-const methods",
        };
        format!("Type '{name}' with {what} must be declared as a class")
    }
}

fn class_reason(tu: &TranslationUnit, record: DeclId) -> Option<ClassReason> {
    let provided = |pred: fn(&TranslationUnit, DeclId) -> bool| {
        tu.methods(record)
            .any(|(id, _, _)| pred(tu, id) && tu.is_user_provided(id))
    };
    if provided(TranslationUnit::is_copy_constructor) {
        return Some(ClassReason::CopyConstructor);
    }
    if provided(TranslationUnit::is_move_constructor) {
        return Some(ClassReason::MoveConstructor);
    }
    if provided(TranslationUnit::is_copy_assignment) {
        return Some(ClassReason::CopyAssignment);
    }
    if provided(TranslationUnit::is_move_assignment) {
        return Some(ClassReason::MoveAssignment);
    }
    if tu
        .destructor(record)
        .is_some_and(|dtor| tu.is_user_provided(dtor))
    {
        return Some(ClassReason::Destructor);
    }
    if !tu.record(record).is_some_and(|r| r.is_aggregate) {
        return Some(ClassReason::NotAggregate);
    }
    let has_mutator = tu.methods(record).any(|(id, _, f)| {
        // Special members reaching here are compiler-provided.
        let special = matches!(
            f.function_kind,
            FunctionKind::Constructor | FunctionKind::Destructor
        ) || tu.is_copy_assignment(id)
            || tu.is_move_assignment(id);
        !special && !f.is_static && !f.is_const
    });
    has_mutator.then_some(ClassReason::NonConstMethod)
}

impl Check for StructsAndClasses {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Class, 104)
    }

    fn name(&self) -> &str {
        "structs-and-classes"
    }

    fn description(&self) -> &str {
        "plain aggregates are structs, types with behavior are classes with private data"
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
        if record.tag == TagKind::Union || record.is_lambda {
            return;
        }
        let name = tu.display_name(id);

        match (class_reason(tu, id), record.tag) {
            (Some(reason), TagKind::Struct) => cx.sink.emit(
                Diagnostic::warning(self.code(), reason.message(&name), record.tag_span).with_fix(
                    SuggestedFix::single("use class", Replacement::replace(record.tag_span, "class")),
                ),
            ),
            (None, TagKind::Class) => cx.sink.emit(
                Diagnostic::warning(
                    self.code(),
                    format!("Type '{name}' must be declared as a struct"),
                    record.tag_span,
                )
                .with_fix(SuggestedFix::single(
                    "use struct",
                    Replacement::replace(record.tag_span, "struct"),
                )),
            ),
            _ => {}
        }

        if record.tag != TagKind::Class {
            return;
        }
        for (_, field_decl, field) in tu.fields(id) {
            if tu.types.canonical(field.ty).is_const {
                continue;
            }
            if !matches!(
                field_decl.access,
                AccessSpecifier::Public | AccessSpecifier::Protected
            ) {
                continue;
            }
            cx.sink.emit(
                Diagnostic::warning(
                    self.code(),
                    "All non-const data members of class MUST be private",
                    field_decl.span,
                )
                .with_note(format!("'{}' is a member of class '{name}'", field_decl.name))
                .with_fix(SuggestedFix::single(
                    "make field private",
                    Replacement::insert(field_decl.range, "private: "),
                )),
            );
        }
    }
}
