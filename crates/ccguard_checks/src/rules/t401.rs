//! T401: TypeConversions — implicit and explicit conversions must not lose data.
//!
//! Every implicit conversion, `static_cast` and functional cast is classified
//! by its source and destination type:
//!
//! - identity, added qualifiers, null pointer to pointer, pointer to `void *`,
//!   array and function decay, and derived to base are allowed;
//! - integral conversions are allowed when every source value fits: same
//!   signedness needs a destination at least as wide, unsigned to signed a
//!   strictly wider one;
//! - integers convert to floating point when the mantissa holds every value,
//!   and floating point widens freely;
//! - the remaining arithmetic conversions are lossy: written implicitly they
//!   must be made explicit, and as casts they must go through the clipping or
//!   rounding utilities instead;
//! - any other implicit conversion must be written out.
//!
//! `dynamic_cast`, `reinterpret_cast`, `const_cast` and C-style casts are
//! always reported.

use ccguard_ast::{
    BuiltinKind, CastKind, DeclKind, ExprId, ExprKind, QualType, TranslationUnit, Type,
};
use ccguard_config::ConversionOptions;
use ccguard_diagnostics::{Category, Diagnostic, DiagnosticCode, Severity};

use crate::{strip_parens, Check, CheckContext, ExprPattern, MatchResult, Matcher, Pattern};

/// Flags lossy numeric conversions, implicit conversions outside the safe
/// set, and the banned cast spellings.
pub struct TypeConversions;

/// How a conversion from one type to another is judged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Conversion {
    Allowed,
    /// Arithmetic narrowing that needs the clipping utility.
    LossyNumeric,
    /// Floating point to integer, which needs a rounding utility.
    LossyRounding,
    /// Not covered by any rule.
    Unsupported,
}

impl Check for TypeConversions {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Type, 401)
    }

    fn name(&self) -> &str {
        "type-conversions"
    }

    fn description(&self) -> &str {
        "conversions must be explicit and lossless, and only static_cast may be used"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn register_patterns(&self) -> Vec<Matcher> {
        vec![Matcher::new(Pattern::Expr(ExprPattern::Cast), "cast").with_instantiations()]
    }

    fn on_match(&self, m: &MatchResult<'_>, cx: &CheckContext<'_>) {
        let Some(id) = m.expr() else { return };
        let tu = cx.tu;
        let expr = tu.expr(id);
        let ExprKind::Cast { cast_kind, operand } = &expr.kind else {
            return;
        };
        let at = expr.span.start_point();

        let banned = match cast_kind {
            CastKind::Dynamic | CastKind::Reinterpret | CastKind::Const => {
                cast_kind.keyword().map(|kw| format!("{kw} MUST not be used"))
            }
            CastKind::CStyle => Some(String::from("C-style cast MUST not be used")),
            CastKind::Implicit | CastKind::Static | CastKind::Functional => None,
        };
        if let Some(message) = banned {
            if !m.in_instantiation {
                cx.sink.emit(
                    Diagnostic::warning(self.code(), message, at).with_help("use static_cast"),
                );
            }
            return;
        }

        let source = tu.expr(*operand).ty;
        let target = expr.ty;
        if tu.types.is_dependent(source) || tu.types.is_dependent(target) {
            return;
        }
        let implicit = *cast_kind == CastKind::Implicit;
        let verdict = classify(tu, *operand, source, target);
        let options = &cx.config.type_conversions;
        let diag = match verdict {
            Conversion::Allowed => return,
            _ if implicit => {
                let message = format!(
                    "Implicit conversion from '{}' to '{}' must be explicit",
                    tu.type_name(source),
                    tu.type_name(target)
                );
                let diag = Diagnostic::warning(self.code(), message, at);
                match verdict {
                    Conversion::LossyNumeric | Conversion::LossyRounding => {
                        diag.with_help(format!("use {}", utilities(tu, verdict, target, options)))
                    }
                    _ => diag,
                }
            }
            Conversion::LossyNumeric | Conversion::LossyRounding => Diagnostic::warning(
                self.code(),
                lossy_message(tu, verdict, source, target, options),
                at,
            ),
            Conversion::Unsupported => return,
        };
        cx.sink.emit(diag);
    }
}

/// Message for an explicit cast that narrows.
fn lossy_message(
    tu: &TranslationUnit,
    verdict: Conversion,
    source: QualType,
    target: QualType,
    options: &ConversionOptions,
) -> String {
    format!(
        "Conversion from '{}' to '{}' may lose data; use {}",
        tu.type_name(source.unqualified()),
        tu.type_name(target.unqualified()),
        utilities(tu, verdict, target, options)
    )
}

/// The clipping or rounding calls that spell a lossy conversion to `target`.
fn utilities(
    tu: &TranslationUnit,
    verdict: Conversion,
    target: QualType,
    options: &ConversionOptions,
) -> String {
    let to = tu.type_name(target.unqualified());
    if verdict == Conversion::LossyRounding {
        options
            .rounding_functions
            .iter()
            .map(|f| format!("{f}<{to}>"))
            .collect::<Vec<_>>()
            .join(" or ")
    } else {
        format!("{}<{to}>", options.clip_function)
    }
}

fn classify(
    tu: &TranslationUnit,
    operand: ExprId,
    source: QualType,
    target: QualType,
) -> Conversion {
    let types = &tu.types;
    let from = types.canonical(source);
    let to = types.canonical(target);
    if types.same_unqualified(from, to) || adds_qualifiers(tu, from, to) {
        return Conversion::Allowed;
    }

    match (types.get(from.ty), types.get(to.ty)) {
        (
            Type::Builtin {
                builtin: BuiltinKind::NullPtr,
            },
            Type::Pointer { .. },
        ) => Conversion::Allowed,
        (_, Type::Pointer { .. }) if is_null_literal(tu, operand) => Conversion::Allowed,
        (Type::Pointer { pointee: from_p }, Type::Pointer { pointee: to_p }) => {
            let (from_p, to_p) = (types.canonical(*from_p), types.canonical(*to_p));
            let widened = to_p.has_quals_of(from_p);
            if widened && (types.is_void(to_p) || derives(tu, from_p, to_p)) {
                Conversion::Allowed
            } else {
                Conversion::Unsupported
            }
        }
        (Type::Array { element, .. }, Type::Pointer { pointee }) => {
            if types.same_unqualified(*element, *pointee) && pointee.has_quals_of(*element) {
                Conversion::Allowed
            } else {
                Conversion::Unsupported
            }
        }
        (Type::Function { .. }, Type::Pointer { pointee }) if types.same_type(from, *pointee) => {
            Conversion::Allowed
        }
        (
            Type::LValueReference { pointee: from_p } | Type::RValueReference { pointee: from_p },
            Type::LValueReference { pointee: to_p } | Type::RValueReference { pointee: to_p },
        ) if derives(tu, types.canonical(*from_p), types.canonical(*to_p)) => Conversion::Allowed,
        (Type::Record { .. }, Type::Record { .. }) if derives(tu, from, to) => Conversion::Allowed,
        _ => match (arithmetic(tu, from), arithmetic(tu, to)) {
            (Some(s), Some(d)) => classify_arithmetic(tu, s, d),
            _ => Conversion::Unsupported,
        },
    }
}

/// `T *` to `const T *`, `T **` to `const T *const *` and so on, level by level.
fn adds_qualifiers(tu: &TranslationUnit, from: QualType, to: QualType) -> bool {
    let types = &tu.types;
    let (from, to) = (types.canonical(from), types.canonical(to));
    match (types.get(from.ty), types.get(to.ty)) {
        (Type::Pointer { pointee: f }, Type::Pointer { pointee: t })
        | (Type::LValueReference { pointee: f }, Type::LValueReference { pointee: t })
        | (Type::RValueReference { pointee: f }, Type::RValueReference { pointee: t }) => {
            let (f, t) = (types.canonical(*f), types.canonical(*t));
            t.has_quals_of(f) && (types.same_unqualified(f, t) || adds_qualifiers(tu, f, t))
        }
        _ => false,
    }
}

fn derives(tu: &TranslationUnit, from: QualType, to: QualType) -> bool {
    match (tu.types.as_record(from), tu.types.as_record(to)) {
        (Some(derived), Some(base)) => tu.is_derived_from(derived, base),
        _ => false,
    }
}

fn is_null_literal(tu: &TranslationUnit, operand: ExprId) -> bool {
    matches!(
        tu.expr(strip_parens(tu, operand)).kind,
        ExprKind::IntegerLiteral { value: 0 } | ExprKind::NullPtrLiteral
    )
}

/// The arithmetic type behind `qt`; unscoped enumerations count as their
/// underlying type.
fn arithmetic(tu: &TranslationUnit, qt: QualType) -> Option<BuiltinKind> {
    match tu.types.get(qt.ty) {
        Type::Builtin { builtin } if builtin.is_integer() || builtin.is_floating() => {
            Some(*builtin)
        }
        Type::Enum { decl } => match &tu.decls.try_get(*decl)?.kind {
            DeclKind::Enum(e) if !e.scoped => e.underlying.and_then(|u| tu.types.builtin(u)),
            _ => None,
        },
        _ => None,
    }
}

fn classify_arithmetic(tu: &TranslationUnit, from: BuiltinKind, to: BuiltinKind) -> Conversion {
    let target = &tu.target;
    match (from.is_floating(), to.is_floating()) {
        (true, false) => Conversion::LossyRounding,
        (true, true) => match (from.mantissa_digits(target), to.mantissa_digits(target)) {
            (Some(f), Some(t)) if t >= f => Conversion::Allowed,
            _ => Conversion::LossyNumeric,
        },
        (false, true) => match (from.value_bits(target), to.mantissa_digits(target)) {
            (Some(bits), Some(digits)) if bits <= digits => Conversion::Allowed,
            _ => Conversion::LossyNumeric,
        },
        (false, false) => {
            let (Some(fw), Some(tw)) = (from.bit_width(target), to.bit_width(target)) else {
                return Conversion::Unsupported;
            };
            let fits = match (from.is_signed(target), to.is_signed(target)) {
                (false, true) => tw > fw,
                (true, true) | (false, false) => tw >= fw,
                (true, false) => false,
            };
            if fits {
                Conversion::Allowed
            } else {
                Conversion::LossyNumeric
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{messages, run_check};
    use ccguard_ast::{AccessSpecifier, TagKind, TuBuilder};

    /// Wraps a literal of type `from` in a cast of `kind` to `to`.
    fn convert(b: &mut TuBuilder, kind: CastKind, from: QualType, to: QualType) -> ExprId {
        let operand = b.expr(ExprKind::IntegerLiteral { value: 7 }, from);
        let cast = b.expr(
            ExprKind::Cast {
                cast_kind: kind,
                operand,
            },
            to,
        );
        let v = b.var(None, "v", to);
        b.edit_var(v, |var| var.init = Some(cast));
        cast
    }

    fn verdicts(pairs: &[(BuiltinKind, BuiltinKind)]) -> Vec<String> {
        let mut b = TuBuilder::new("main.cc");
        for &(from, to) in pairs {
            let from = b.builtin(from);
            let to = b.builtin(to);
            convert(&mut b, CastKind::Implicit, from, to);
        }
        let tu = b.finish();
        run_check(&TypeConversions, &tu)
            .into_iter()
            .map(|d| d.message)
            .collect()
    }

    #[test]
    fn integral_widening_grid() {
        use BuiltinKind::*;
        let allowed = [
            (Short, Int),
            (Int, Long),
            (UnsignedInt, UnsignedLong),
            (UnsignedShort, Int),
            (UnsignedInt, Long),
            (Bool, Int),
            (Int, Double),
            (Float, Double),
            (Int, Int),
        ];
        assert!(verdicts(&allowed).is_empty());

        assert_eq!(
            verdicts(&[
                (UnsignedInt, Int),
                (Int, UnsignedInt),
                (Long, Int),
                (Double, Float),
                (Long, Double),
            ]),
            vec![
                "Implicit conversion from 'unsigned int' to 'int' must be explicit",
                "Implicit conversion from 'int' to 'unsigned int' must be explicit",
                "Implicit conversion from 'long' to 'int' must be explicit",
                "Implicit conversion from 'double' to 'float' must be explicit",
                "Implicit conversion from 'long' to 'double' must be explicit",
            ]
        );
    }

    #[test]
    fn implicit_narrowing_points_at_the_utility() {
        let mut b = TuBuilder::new("main.cc");
        let double = b.builtin(BuiltinKind::Double);
        let long = b.builtin(BuiltinKind::Long);
        let int = b.builtin(BuiltinKind::Int);
        convert(&mut b, CastKind::Implicit, double, int);
        convert(&mut b, CastKind::Implicit, long, int);
        let tu = b.finish();

        let diags = run_check(&TypeConversions, &tu);
        assert_eq!(
            messages(&diags),
            vec![
                "Implicit conversion from 'double' to 'int' must be explicit",
                "Implicit conversion from 'long' to 'int' must be explicit",
            ]
        );
        assert_eq!(diags[0].help, vec!["use floor<int> or ceil<int> or round<int>"]);
        assert_eq!(diags[1].help, vec!["use clipToFit<int>"]);
    }

    #[test]
    fn explicit_narrowing_names_the_utility() {
        let mut b = TuBuilder::new("main.cc");
        let long = b.builtin(BuiltinKind::Long);
        let int = b.builtin(BuiltinKind::Int);
        let float = b.builtin(BuiltinKind::Float);
        let double = b.builtin(BuiltinKind::Double);
        convert(&mut b, CastKind::Static, long, int);
        convert(&mut b, CastKind::Functional, double, float);
        convert(&mut b, CastKind::Implicit, long, int);
        let tu = b.finish();

        assert_eq!(
            messages(&run_check(&TypeConversions, &tu)),
            vec![
                "Conversion from 'long' to 'int' may lose data; use clipToFit<int>",
                "Conversion from 'double' to 'float' may lose data; use clipToFit<float>",
                "Implicit conversion from 'long' to 'int' must be explicit",
            ]
        );
    }

    #[test]
    fn data_model_changes_widths() {
        let mut b = TuBuilder::new("main.cc");
        let long = b.builtin(BuiltinKind::Long);
        let int = b.builtin(BuiltinKind::Int);
        convert(&mut b, CastKind::Implicit, long, int);
        let mut tu = b.finish();
        tu.target.long_width = 32;
        assert!(run_check(&TypeConversions, &tu).is_empty());
    }

    #[test]
    fn static_cast_reports_only_lossy() {
        let mut b = TuBuilder::new("main.cc");
        let double = b.builtin(BuiltinKind::Double);
        let int = b.builtin(BuiltinKind::Int);
        let void = b.builtin(BuiltinKind::Void);
        let void_ptr = b.pointer(void);
        let int_ptr = b.pointer(int);
        convert(&mut b, CastKind::Static, double, int);
        convert(&mut b, CastKind::Static, void_ptr, int_ptr);
        convert(&mut b, CastKind::Functional, int, double);
        let tu = b.finish();

        assert_eq!(
            messages(&run_check(&TypeConversions, &tu)),
            vec!["Conversion from 'double' to 'int' may lose data; use floor<int> or ceil<int> or round<int>"]
        );
    }

    #[test]
    fn pointer_conversions() {
        let mut b = TuBuilder::new("main.cc");
        let base = b.record(None, TagKind::Class, "Base");
        let derived = b.record(None, TagKind::Class, "Derived");
        b.base(derived, base, AccessSpecifier::Public, false);
        let base_ptr = {
            let t = b.record_type(base);
            b.pointer(t)
        };
        let derived_ptr = {
            let t = b.record_type(derived);
            b.pointer(t)
        };
        let int = b.builtin(BuiltinKind::Int);
        let int_ptr = b.pointer(int);
        let const_int_ptr = b.pointer(int.with_const());
        let void = b.builtin(BuiltinKind::Void);
        let void_ptr = b.pointer(void);
        let nullptr_ty = b.builtin(BuiltinKind::NullPtr);
        let bool_ty = b.builtin(BuiltinKind::Bool);

        convert(&mut b, CastKind::Implicit, derived_ptr, base_ptr);
        convert(&mut b, CastKind::Implicit, int_ptr, const_int_ptr);
        convert(&mut b, CastKind::Implicit, int_ptr, void_ptr);
        convert(&mut b, CastKind::Implicit, nullptr_ty, int_ptr);
        convert(&mut b, CastKind::Implicit, base_ptr, derived_ptr);
        convert(&mut b, CastKind::Implicit, const_int_ptr, int_ptr);
        convert(&mut b, CastKind::Implicit, int_ptr, bool_ty);
        let tu = b.finish();

        assert_eq!(
            messages(&run_check(&TypeConversions, &tu)),
            vec![
                "Implicit conversion from 'Base *' to 'Derived *' must be explicit",
                "Implicit conversion from 'const int *' to 'int *' must be explicit",
                "Implicit conversion from 'int *' to 'bool' must be explicit",
            ]
        );
    }

    #[test]
    fn banned_cast_spellings() {
        let mut b = TuBuilder::new("main.cc");
        let int = b.builtin(BuiltinKind::Int);
        let int_ptr = b.pointer(int);
        for kind in [CastKind::Reinterpret, CastKind::Const, CastKind::Dynamic, CastKind::CStyle] {
            convert(&mut b, kind, int_ptr, int_ptr);
        }
        let tu = b.finish();

        assert_eq!(
            messages(&run_check(&TypeConversions, &tu)),
            vec![
                "reinterpret_cast MUST not be used",
                "const_cast MUST not be used",
                "dynamic_cast MUST not be used",
                "C-style cast MUST not be used",
            ]
        );
    }

    #[test]
    fn dependent_types_are_skipped() {
        let mut b = TuBuilder::new("main.cc");
        let t = b.intern(Type::TemplateTypeParm {
            name: String::from("T"),
        });
        let int = b.builtin(BuiltinKind::Int);
        convert(&mut b, CastKind::Implicit, t, int);
        let tu = b.finish();
        assert!(run_check(&TypeConversions, &tu).is_empty());
    }
}
