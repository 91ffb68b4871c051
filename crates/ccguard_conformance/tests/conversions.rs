//! Numeric and pointer conversion legality through the engine.

use ccguard_ast::{BuiltinKind, CastKind, ExprKind, QualType, TranslationUnit, TuBuilder};
use ccguard_config::load_config_from_str;
use ccguard_conformance::{check_only, run_pipeline};

fn convert(b: &mut TuBuilder, kind: CastKind, from: QualType, to: QualType) {
    let operand = b.expr(ExprKind::IntegerLiteral { value: 1 }, from);
    let cast = b.expr(
        ExprKind::Cast {
            cast_kind: kind,
            operand,
        },
        to,
    );
    let v = b.var(None, "v", to);
    b.edit_var(v, |var| var.init = Some(cast));
}

fn unit_converting(kind: CastKind, from: BuiltinKind, to: BuiltinKind) -> TranslationUnit {
    let mut b = TuBuilder::new("/p/src/main.cc");
    let from = b.builtin(from);
    let to = b.builtin(to);
    convert(&mut b, kind, from, to);
    b.finish()
}

#[test]
fn implicit_conversion_grid() {
    use BuiltinKind::*;
    // (from, to, lossy)
    let grid = [
        (Char, Short, false),
        (Short, Int, false),
        (Int, Long, false),
        (Int, LongLong, false),
        (UnsignedChar, Int, false),
        (UnsignedShort, UnsignedInt, false),
        (UnsignedInt, Long, false),
        (UnsignedInt, UnsignedLong, false),
        (Bool, Int, false),
        (Float, Double, false),
        (Double, LongDouble, false),
        (Short, Float, false),
        (Int, Double, false),
        (Int, Short, true),
        (Long, Int, true),
        (UnsignedInt, Int, true),
        (UnsignedLong, Long, true),
        (Int, UnsignedInt, true),
        (Short, UnsignedLong, true),
        (Double, Float, true),
        (Int, Float, true),
        (Long, Double, true),
        (Float, Int, true),
    ];
    for (from, to, lossy) in grid {
        for kind in [CastKind::Implicit, CastKind::Static] {
            let tu = unit_converting(kind, from, to);
            let result = check_only(&tu, "type-conversions").unwrap();
            let messages = result.messages_of("T401");
            if !lossy {
                assert!(messages.is_empty(), "{kind:?} {from:?} -> {to:?}: {messages:?}");
                continue;
            }
            assert_eq!(messages.len(), 1, "{kind:?} {from:?} -> {to:?}: {messages:?}");
            let expected = if kind == CastKind::Implicit {
                "must be explicit"
            } else {
                "may lose data"
            };
            assert!(
                messages[0].contains(expected),
                "{kind:?} {from:?} -> {to:?}: {}",
                messages[0]
            );
        }
    }
}

#[test]
fn widening_in_explicit_casts_is_clean() {
    let tu = unit_converting(CastKind::Static, BuiltinKind::Int, BuiltinKind::Long);
    assert!(check_only(&tu, "T401").unwrap().diagnostics.is_empty());
    let tu = unit_converting(CastKind::Static, BuiltinKind::Long, BuiltinKind::Int);
    assert_eq!(check_only(&tu, "T401").unwrap().diagnostics.len(), 1);
}

#[test]
fn configured_helper_names_and_deny() {
    let config = load_config_from_str(
        r#"
[checks]
deny = ["type-conversions"]
allow = []

[type-conversions]
clip-function = "saturate"
rounding-functions = ["truncate"]
"#,
    )
    .unwrap();

    let narrowing = unit_converting(CastKind::Static, BuiltinKind::Long, BuiltinKind::Int);
    let result = run_pipeline(&narrowing, &config).unwrap();
    let finding = result.with_code("T401");
    assert_eq!(finding.len(), 1);
    assert_eq!(
        finding[0].message,
        "Conversion from 'long' to 'int' may lose data; use saturate<int>"
    );
    assert!(result.has_errors);

    let rounding = unit_converting(CastKind::Static, BuiltinKind::Double, BuiltinKind::Int);
    let result = run_pipeline(&rounding, &config).unwrap();
    assert_eq!(
        result.messages_of("T401"),
        vec!["Conversion from 'double' to 'int' may lose data; use truncate<int>"]
    );

    let implicit = unit_converting(CastKind::Implicit, BuiltinKind::Double, BuiltinKind::Int);
    let result = run_pipeline(&implicit, &config).unwrap();
    let finding = result.with_code("T401");
    assert_eq!(
        finding[0].message,
        "Implicit conversion from 'double' to 'int' must be explicit"
    );
    assert_eq!(finding[0].help, vec!["use truncate<int>"]);
}

#[test]
fn ilp32_target_makes_long_to_int_safe() {
    let mut tu = unit_converting(CastKind::Implicit, BuiltinKind::Long, BuiltinKind::Int);
    tu.target.long_width = 32;
    assert!(check_only(&tu, "T401").unwrap().diagnostics.is_empty());
}
