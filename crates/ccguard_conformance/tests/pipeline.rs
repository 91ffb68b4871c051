//! Whole-pipeline properties: determinism, JSON transport, file filtering.

use ccguard_ast::{
    AccessSpecifier, BinaryOp, BuiltinKind, ExprKind, FileKind, TagKind, TranslationUnit,
    TuBuilder,
};
use ccguard_conformance::{full_pipeline, load_json_unit, make_config, run_pipeline};

/// A unit that trips checks across every category.
fn busy_unit() -> TranslationUnit {
    let mut b = TuBuilder::new("/p/src/main.cc");
    let int = b.builtin(BuiltinKind::Int);
    let long = b.builtin(BuiltinKind::Long);
    let double = b.builtin(BuiltinKind::Double);

    let base = b.record(None, TagKind::Struct, "Base");
    let rec = b.record(None, TagKind::Class, "Widget");
    b.base(rec, base, AccessSpecifier::Public, false);
    b.access_spec(rec, AccessSpecifier::Protected);
    b.field(rec, "size_", int);
    b.enumeration(None, "Mode", false);

    let f = b.function(None, "compute", int, &[]);
    let lhs = b.expr(ExprKind::FloatingLiteral { value: 1.0 }, double);
    let rhs = b.expr(ExprKind::FloatingLiteral { value: 2.0 }, double);
    let op_span = b.span();
    let eq = b.expr(
        ExprKind::Binary {
            op: BinaryOp::Eq,
            lhs,
            rhs,
            op_span,
        },
        int,
    );
    let stmt = b.expr_stmt(eq);
    let body = b.compound(vec![stmt]);
    b.set_body(f, body);

    let wide = b.expr(ExprKind::IntegerLiteral { value: 1 }, long);
    let narrow = b.expr(
        ExprKind::Cast {
            cast_kind: ccguard_ast::CastKind::Implicit,
            operand: wide,
        },
        int,
    );
    let v = b.var(None, "v", int);
    b.edit_var(v, |var| var.init = Some(narrow));
    b.finish()
}

#[test]
fn repeated_runs_are_identical() {
    let tu = busy_unit();
    let first = full_pipeline(&tu).unwrap().rendered();
    let second = full_pipeline(&tu).unwrap().rendered();
    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn output_is_sorted_and_unique() {
    let result = full_pipeline(&busy_unit()).unwrap();
    let keys: Vec<_> = result
        .diagnostics
        .iter()
        .map(|d| (d.primary_span, d.code, d.message.clone()))
        .collect();
    let mut sorted = keys.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(keys, sorted);
    for code in ["C106", "D202", "E303", "T401"] {
        assert!(
            !result.with_code(code).is_empty(),
            "expected {code} in {:?}",
            result.rendered()
        );
    }
}

#[test]
fn json_dump_checks_like_the_original() {
    let tu = busy_unit();
    let json = serde_json::to_string_pretty(&tu).unwrap();
    let loaded = load_json_unit(&json).unwrap();
    assert_eq!(
        full_pipeline(&tu).unwrap().rendered(),
        full_pipeline(&loaded).unwrap().rendered()
    );
}

#[test]
fn json_dump_from_disk() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("unit.json");
    std::fs::write(&path, serde_json::to_vec(&busy_unit()).unwrap()).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    let loaded = load_json_unit(&text).unwrap();
    assert!(full_pipeline(&loaded).unwrap().warning_count > 0);
}

#[test]
fn findings_in_system_headers_are_dropped() {
    let mut b = TuBuilder::new("/p/src/main.cc");
    let sys = b.add_file("/usr/include/c++/bits/mode.h", FileKind::System, None);
    b.enumeration(None, "Local", false);
    b.in_file(sys);
    b.enumeration(None, "SystemMode", false);
    let tu = b.finish();

    let result = full_pipeline(&tu).unwrap();
    let enums = result.with_code("D202");
    assert_eq!(enums.len(), 1);
    assert_eq!(enums[0].primary_span.file, tu.main_file);
}

#[test]
fn allow_and_deny_shape_the_output() {
    let tu = busy_unit();
    let all = full_pipeline(&tu).unwrap();
    let config = make_config(&["E303"], &["enum-class", "T401"]).unwrap();
    let shaped = run_pipeline(&tu, &config).unwrap();
    assert!(shaped.with_code("D202").is_empty());
    assert!(shaped.with_code("T401").is_empty());
    assert_eq!(shaped.error_count, shaped.with_code("E303").len());
    assert!(shaped.error_count > 0);
    assert_eq!(
        shaped.diagnostics.len(),
        all.diagnostics.len() - all.with_code("D202").len() - all.with_code("T401").len()
    );
}

#[test]
fn malformed_unit_is_rejected_before_checking() {
    let mut tu = busy_unit();
    tu.top_level.push(ccguard_ast::DeclId::from_raw(9_999));
    assert!(full_pipeline(&tu).is_err());
}
