//! Queries shared by several checks.

use std::path::Path;

use ccguard_ast::{DeclId, ExprId, ExprKind, FunctionKind, QualType, TranslationUnit, Type};
use ccguard_common::has_extension;
use ccguard_source::FileId;

/// Returns `true` if `record` is an interface: no data members, not
/// effectively final, abstract, and every user-declared method other than
/// the destructor is pure virtual.
pub fn is_interface(tu: &TranslationUnit, record: DeclId) -> bool {
    let Some(data) = tu.record(record) else {
        return false;
    };
    if tu.fields(record).next().is_some() {
        return false;
    }
    if tu.is_effectively_final(record) {
        return false;
    }
    let all_pure = tu.methods(record).all(|(_, decl, f)| {
        f.function_kind == FunctionKind::Destructor || decl.is_implicit || f.is_pure
    });
    all_pure && data.is_abstract
}

/// Returns `true` if `file`'s path ends in one of `extensions`.
pub fn is_header(tu: &TranslationUnit, file: FileId, extensions: &[String]) -> bool {
    tu.file_path(file)
        .is_some_and(|path| has_extension(path, extensions))
}

/// Returns `true` if `path` is an implementation file per `extensions`.
pub fn is_source_file(path: &Path, extensions: &[String]) -> bool {
    has_extension(path, extensions)
}

/// Returns `true` if `ty` is an `auto` placeholder, written directly, behind
/// a reference or pointer, or as the invented parameter of a generic lambda.
pub fn is_auto_placeholder(tu: &TranslationUnit, ty: QualType) -> bool {
    match tu.types.get(ty.ty) {
        Type::Auto { .. } => true,
        Type::TemplateTypeParm { name } => name == "auto",
        Type::LValueReference { pointee }
        | Type::RValueReference { pointee }
        | Type::Pointer { pointee } => is_auto_placeholder(tu, *pointee),
        _ => false,
    }
}

/// Returns `true` if the call operator of lambda class `class` takes an
/// `auto` parameter.
pub fn is_generic_lambda(tu: &TranslationUnit, class: DeclId) -> bool {
    let Some(function) = tu.lambda_call_operator(class).and_then(|c| tu.function(c)) else {
        return false;
    };
    (0..function.params.len())
        .filter_map(|i| tu.param_type(function, i))
        .any(|ty| is_auto_placeholder(tu, ty))
}

/// Looks through parentheses.
pub fn strip_parens(tu: &TranslationUnit, mut expr: ExprId) -> ExprId {
    while let ExprKind::Paren { inner } = &tu.expr(expr).kind {
        expr = *inner;
    }
    expr
}

/// Looks through parentheses and implicit conversions.
pub fn strip_implicit(tu: &TranslationUnit, mut expr: ExprId) -> ExprId {
    loop {
        match &tu.expr(expr).kind {
            ExprKind::Paren { inner } => expr = *inner,
            ExprKind::Cast {
                cast_kind: ccguard_ast::CastKind::Implicit,
                operand,
            } => expr = *operand,
            _ => return expr,
        }
    }
}
