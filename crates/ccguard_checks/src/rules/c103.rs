//! C103: DerivedClasses — interface-only inheritance, `final` implementations,
//! virtual diamonds.
//!
//! Every class definition is classified as an interface (abstract, no data,
//! only pure virtual methods besides the destructor) or an implementation.
//!
//! - Interfaces need a virtual defaulted destructor.
//! - Implementations must be `final`, and so must every virtual method they
//!   implement.
//! - A method overriding declarations from two unrelated bases means the bases
//!   lack a common interface.
//! - Only interfaces may be inherited from, and only publicly.
//! - An interface reached through more than one path of the base graph must
//!   be inherited virtually on every such path.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use ccguard_ast::{
    AccessSpecifier, AttrKind, BaseResolution, DeclId, FunctionKind, TranslationUnit,
};
use ccguard_diagnostics::{
    Category, Diagnostic, DiagnosticCode, Label, Replacement, Severity, SuggestedFix,
};
use ccguard_source::Span;

use crate::{is_interface, Check, CheckContext, DeclPattern, MatchResult, Matcher, Pattern};

/// Enforces the interface/implementation split of class hierarchies.
pub struct DerivedClasses;

/// One base specifier through which an ancestor is reached.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct BaseRef<'a> {
    derived: &'a str,
    span: Span,
    is_virtual: bool,
}

impl Check for DerivedClasses {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Class, 103)
    }

    fn name(&self) -> &str {
        "derived-classes"
    }

    fn description(&self) -> &str {
        "classes are interfaces or final implementations; diamonds are virtual"
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
        if record.is_lambda {
            return;
        }
        let empty = tu.methods(id).next().is_none()
            && tu.fields(id).next().is_none()
            && record.bases.is_empty();
        if empty {
            return;
        }

        if is_interface(tu, id) {
            self.check_interface(id, cx);
        } else {
            self.check_implementation(id, cx);
        }
        self.check_overrides(id, cx);
        self.check_bases(id, cx);
        self.check_diamonds(id, cx);
    }
}

impl DerivedClasses {
    fn check_interface(&self, id: DeclId, cx: &CheckContext<'_>) {
        let tu = cx.tu;
        let decl = tu.decl(id);
        let dtor = tu
            .destructor(id)
            .and_then(|d| Some((tu.decl(d), tu.function(d)?)))
            .filter(|(d, f)| !d.is_implicit || f.is_virtual);

        let Some((dtor_decl, dtor)) = dtor else {
            let anchor = tu
                .record(id)
                .and_then(|r| r.brace_range)
                .map_or(decl.span, |brace| brace.start_point());
            cx.sink.emit(
                Diagnostic::warning(
                    self.code(),
                    format!(
                        "Interface '{}' must have virtual defaulted destructor",
                        tu.display_name(id)
                    ),
                    anchor,
                )
                .with_help(format!("add `virtual ~{}() = default;`", decl.name)),
            );
            return;
        };

        if !dtor.is_virtual {
            cx.sink.emit(
                Diagnostic::warning(self.code(), "Interface destructor must be virtual", dtor_decl.span)
                    .with_fix(SuggestedFix::single(
                        "make destructor virtual",
                        Replacement::insert(dtor_decl.range, "virtual "),
                    )),
            );
        }
        if !dtor.is_defaulted {
            let mut diag = Diagnostic::warning(
                self.code(),
                "Interface destructor must be defaulted",
                dtor_decl.span,
            );
            if let Some(body) = dtor.body {
                diag = diag.with_fix(SuggestedFix::single(
                    "make destructor default",
                    Replacement::replace(tu.stmt(body).span, "= default;"),
                ));
            }
            cx.sink.emit(diag);
        }
    }

    fn check_implementation(&self, id: DeclId, cx: &CheckContext<'_>) {
        let tu = cx.tu;
        let decl = tu.decl(id);
        let def = tu.definition(id).unwrap_or(id);
        if !tu.decl(def).has_attr(AttrKind::Final) {
            cx.sink.emit(
                Diagnostic::warning(
                    self.code(),
                    format!("Non-interface class '{}' must be final", tu.display_name(id)),
                    decl.span,
                )
                .with_fix(SuggestedFix::single(
                    "make class final",
                    Replacement::insert(decl.span.end_point(), " final"),
                )),
            );
        }

        for (_, method, function) in tu.methods(id) {
            if method.is_implicit || !function.is_virtual || function.is_pure {
                continue;
            }
            if function.function_kind == FunctionKind::Destructor && function.is_defaulted {
                continue;
            }
            if method.has_attr(AttrKind::Final) {
                continue;
            }
            let edit = match method.attr(AttrKind::Override) {
                Some(attr) => Replacement::replace(attr.span, "final"),
                None => Replacement::insert(function.params_range.end_point(), " final"),
            };
            cx.sink.emit(
                Diagnostic::warning(
                    self.code(),
                    "Implemented virtual methods must be final",
                    method.span,
                )
                .with_fix(SuggestedFix::single("make method final", edit)),
            );
        }
    }

    fn check_overrides(&self, id: DeclId, cx: &CheckContext<'_>) {
        let tu = cx.tu;
        for (_, method, function) in tu.methods(id) {
            if method.is_implicit
                || !function.is_virtual
                || function.function_kind == FunctionKind::Destructor
                || function.overridden.len() < 2
            {
                continue;
            }
            let origins: Vec<String> = function
                .overridden
                .iter()
                .filter_map(|&o| tu.parent_record(o))
                .map(|r| tu.qualified_name(r))
                .collect();
            cx.sink.emit(
                Diagnostic::warning(
                    self.code(),
                    format!(
                        "Method {} is declared in {}. Common interface must be introduced.",
                        method.name,
                        origins.join(", ")
                    ),
                    method.span,
                )
                .with_help("extract the shared declaration into a base interface"),
            );
        }
    }

    fn check_bases(&self, id: DeclId, cx: &CheckContext<'_>) {
        let tu = cx.tu;
        let Some(record) = tu.record(id) else { return };
        for base in &record.bases {
            let resolved = match tu.resolve_base(base) {
                BaseResolution::Record(r) => r,
                BaseResolution::UnresolvedTemplate(name) => {
                    cx.sink.emit(Diagnostic::warning(
                        self.code(),
                        format!("Unable to get base template spec '{name}' as record"),
                        base.span,
                    ));
                    continue;
                }
                BaseResolution::Unresolved(ty) => {
                    cx.sink.emit(Diagnostic::warning(
                        self.code(),
                        format!("Unable to get base of type '{ty}' as record or template"),
                        base.span,
                    ));
                    continue;
                }
            };
            if !is_interface(tu, resolved) {
                cx.sink.emit(
                    Diagnostic::warning(
                        self.code(),
                        "Inheritance from non-interface type is forbidden",
                        base.span,
                    )
                    .with_label(Label::secondary(
                        tu.decl(resolved).span,
                        format!("'{}' is not an interface", tu.display_name(resolved)),
                    )),
                );
            } else if base.access != AccessSpecifier::Public {
                cx.sink.emit(
                    Diagnostic::warning(
                        self.code(),
                        "Interfaces must be implemented using public inheritance",
                        base.span,
                    )
                    .with_help("inherit with `public`"),
                );
            }
        }
    }

    fn check_diamonds(&self, id: DeclId, cx: &CheckContext<'_>) {
        let tu = cx.tu;
        let names = QualifiedNames::new(tu);
        let mut reached: BTreeMap<String, BTreeSet<BaseRef<'_>>> = BTreeMap::new();
        let mut visited = HashSet::new();
        walk_bases(tu, &names, id, &mut reached, &mut visited);

        let root = tu.qualified_name(id);
        for (ancestor, refs) in &reached {
            let derived: BTreeSet<&str> = refs.iter().map(|r| r.derived).collect();
            if derived.len() < 2 {
                continue;
            }
            let listed = derived.into_iter().collect::<Vec<_>>().join(", ");
            let mut seen = HashSet::new();
            for r in refs.iter().filter(|r| !r.is_virtual) {
                if !seen.insert(r.span) {
                    continue;
                }
                cx.sink.emit(
                    Diagnostic::warning(
                        self.code(),
                        format!(
                            "Interface {ancestor} must be implemented virtually because it's \
                             extended by multiple interfaces ({listed}) with root type {root}"
                        ),
                        r.span,
                    )
                    .with_fix(SuggestedFix::single(
                        "make inheritance virtual",
                        Replacement::insert(r.span, "virtual "),
                    )),
                );
            }
        }
    }
}

/// Qualified names of every record, computed once per walk.
struct QualifiedNames {
    names: BTreeMap<DeclId, String>,
}

impl QualifiedNames {
    fn new(tu: &TranslationUnit) -> Self {
        let names = tu
            .decls
            .iter()
            .filter(|(_, d)| d.as_record().is_some())
            .map(|(id, _)| (id, tu.qualified_name(id)))
            .collect();
        Self { names }
    }

    fn get(&self, id: DeclId) -> &str {
        self.names.get(&id).map_or("<invalid>", String::as_str)
    }
}

/// Records, for every ancestor of `record`, each base specifier reaching it.
///
/// The specifiers collected below a record do not depend on the path that
/// reached it, so each record is expanded once. Unresolvable bases end the
/// walk along that path; they are reported for direct bases only.
fn walk_bases<'n>(
    tu: &TranslationUnit,
    names: &'n QualifiedNames,
    record: DeclId,
    reached: &mut BTreeMap<String, BTreeSet<BaseRef<'n>>>,
    visited: &mut HashSet<DeclId>,
) {
    if !visited.insert(record) {
        return;
    }
    if let Some(data) = tu.record(record) {
        for base in &data.bases {
            let BaseResolution::Record(resolved) = tu.resolve_base(base) else {
                continue;
            };
            reached
                .entry(names.get(resolved).to_string())
                .or_default()
                .insert(BaseRef {
                    derived: names.get(record),
                    span: base.span,
                    is_virtual: base.is_virtual,
                });
            walk_bases(tu, names, resolved, reached, visited);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{messages, run_check};
    use ccguard_ast::{BuiltinKind, TagKind, TuBuilder, Type};

    fn interface(b: &mut TuBuilder, name: &str, method: &str) -> DeclId {
        let void = b.builtin(BuiltinKind::Void);
        let rec = b.record(None, TagKind::Class, name);
        b.access_spec(rec, AccessSpecifier::Public);
        b.virtual_default_destructor(rec);
        b.pure_method(rec, method, void, &[]);
        rec
    }

    fn final_class(b: &mut TuBuilder, name: &str) -> DeclId {
        let rec = b.record(None, TagKind::Class, name);
        b.attr(rec, AttrKind::Final);
        rec
    }

    fn final_override(b: &mut TuBuilder, rec: DeclId, name: &str, overridden: &[DeclId]) -> DeclId {
        let void = b.builtin(BuiltinKind::Void);
        let m = b.method(rec, name, void, &[]);
        b.edit_function(m, |f| {
            f.is_virtual = true;
            f.overridden = overridden.to_vec();
        });
        b.attr(m, AttrKind::Final);
        m
    }

    fn method_named(tu: &TranslationUnit, rec: DeclId, name: &str) -> DeclId {
        tu.methods(rec)
            .find(|(_, d, _)| d.name == name)
            .map(|(id, _, _)| id)
            .unwrap()
    }

    #[test]
    fn well_formed_interface_and_implementation() {
        let mut b = TuBuilder::new("main.cc");
        let i1 = interface(&mut b, "I1", "foo");
        let d4 = final_class(&mut b, "D4");
        b.base(d4, i1, AccessSpecifier::Public, false);
        let foo = method_named(b.unit(), i1, "foo");
        final_override(&mut b, d4, "foo", &[foo]);
        let tu = b.finish();
        assert!(run_check(&DerivedClasses, &tu).is_empty());
    }

    #[test]
    fn interface_destructor_forms() {
        let mut b = TuBuilder::new("main.cc");
        let void = b.builtin(BuiltinKind::Void);

        let i2 = b.record(None, TagKind::Class, "I2");
        b.pure_method(i2, "foo", void, &[]);

        let i3 = b.record(None, TagKind::Class, "I3");
        let dtor3 = b.destructor(i3);
        b.edit_function(dtor3, |f| f.is_virtual = true);
        let body = b.compound(vec![]);
        b.set_body(dtor3, body);
        b.pure_method(i3, "foo", void, &[]);

        let i4 = b.record(None, TagKind::Class, "I4");
        let dtor4 = b.destructor(i4);
        b.edit_function(dtor4, |f| f.is_defaulted = true);
        b.pure_method(i4, "foo", void, &[]);
        let tu = b.finish();

        let diags = run_check(&DerivedClasses, &tu);
        assert_eq!(
            messages(&diags),
            vec![
                "Interface 'I2' must have virtual defaulted destructor",
                "Interface destructor must be defaulted",
                "Interface destructor must be virtual",
            ]
        );
        let brace = tu.record(i2).unwrap().brace_range.unwrap();
        assert_eq!(diags[0].primary_span, brace.start_point());
        let fix = diags[1].fix.as_ref().unwrap();
        assert_eq!(fix.replacements[0].new_text, "= default;");
        assert_eq!(fix.replacements[0].span, tu.stmt(body).span);
        let fix = diags[2].fix.as_ref().unwrap();
        assert_eq!(fix.replacements[0].new_text, "virtual ");
    }

    #[test]
    fn implementations_must_be_final() {
        let mut b = TuBuilder::new("main.cc");
        let int = b.builtin(BuiltinKind::Int);
        let void = b.builtin(BuiltinKind::Void);
        let b1 = b.record(None, TagKind::Class, "B1");
        b.field(b1, "a", int);
        let s1 = b.record(None, TagKind::Class, "S1");
        let foo = b.method(s1, "foo", void, &[]);
        b.edit_function(foo, |f| f.is_virtual = true);
        let tu = b.finish();

        let diags = run_check(&DerivedClasses, &tu);
        assert_eq!(
            messages(&diags),
            vec![
                "Non-interface class 'B1' must be final",
                "Non-interface class 'S1' must be final",
                "Implemented virtual methods must be final",
            ]
        );
        let fix = diags[0].fix.as_ref().unwrap();
        assert_eq!(fix.replacements[0].new_text, " final");
        assert_eq!(fix.replacements[0].span, tu.decl(b1).span.end_point());
    }

    #[test]
    fn override_specifier_is_replaced_by_final() {
        let mut b = TuBuilder::new("main.cc");
        let void = b.builtin(BuiltinKind::Void);
        let i1 = interface(&mut b, "I1", "foo");
        let d5 = final_class(&mut b, "D5");
        b.base(d5, i1, AccessSpecifier::Public, false);
        let foo = b.method(d5, "foo", void, &[]);
        b.edit_function(foo, |f| f.is_virtual = true);
        let override_span = b.attr(foo, AttrKind::Override);
        let tu = b.finish();

        let diags = run_check(&DerivedClasses, &tu);
        assert_eq!(messages(&diags), vec!["Implemented virtual methods must be final"]);
        let edit = &diags[0].fix.as_ref().unwrap().replacements[0];
        assert_eq!(edit.span, override_span);
        assert_eq!(edit.new_text, "final");
    }

    #[test]
    fn base_access_and_kind() {
        let mut b = TuBuilder::new("main.cc");
        let void = b.builtin(BuiltinKind::Void);
        let i1 = interface(&mut b, "I1", "foo");
        let b2 = b.record(None, TagKind::Class, "B2");
        b.attr(b2, AttrKind::Final);
        b.method(b2, "foo", void, &[]);
        let d2 = final_class(&mut b, "D2");
        b.base(d2, b2, AccessSpecifier::Public, false);
        let d3 = final_class(&mut b, "D3");
        b.base(d3, i1, AccessSpecifier::Private, false);
        let tu = b.finish();

        let diags = run_check(&DerivedClasses, &tu);
        assert_eq!(
            messages(&diags),
            vec![
                "Inheritance from non-interface type is forbidden",
                "Interfaces must be implemented using public inheritance",
            ]
        );
        assert_eq!(diags[0].primary_span, tu.record(d2).unwrap().bases[0].span);
    }

    #[test]
    fn method_from_two_interfaces_needs_common_base() {
        let mut b = TuBuilder::new("main.cc");
        let i1 = interface(&mut b, "I1", "foo");
        let i2 = interface(&mut b, "I2", "foo");
        let d7 = final_class(&mut b, "D7");
        b.base(d7, i1, AccessSpecifier::Public, false);
        b.base(d7, i2, AccessSpecifier::Public, false);
        let foo1 = method_named(b.unit(), i1, "foo");
        let foo2 = method_named(b.unit(), i2, "foo");
        final_override(&mut b, d7, "foo", &[foo1, foo2]);
        let tu = b.finish();

        let diags = run_check(&DerivedClasses, &tu);
        assert_eq!(
            messages(&diags),
            vec!["Method foo is declared in I1, I2. Common interface must be introduced."]
        );
    }

    #[test]
    fn diamond_reports_each_reaching_specifier() {
        let mut b = TuBuilder::new("main.cc");
        let i1 = interface(&mut b, "I1", "foo");
        let i5 = interface(&mut b, "I5", "bar");
        let i6 = interface(&mut b, "I6", "baz");
        b.base(i5, i1, AccessSpecifier::Public, false);
        b.base(i6, i1, AccessSpecifier::Public, false);
        let d8 = final_class(&mut b, "D8");
        b.base(d8, i5, AccessSpecifier::Public, false);
        b.base(d8, i6, AccessSpecifier::Public, false);
        let foo = method_named(b.unit(), i1, "foo");
        let bar = method_named(b.unit(), i5, "bar");
        let baz = method_named(b.unit(), i6, "baz");
        final_override(&mut b, d8, "foo", &[foo]);
        final_override(&mut b, d8, "bar", &[bar]);
        final_override(&mut b, d8, "baz", &[baz]);
        let tu = b.finish();

        let diags = run_check(&DerivedClasses, &tu);
        let expected = "Interface I1 must be implemented virtually because it's extended by \
                        multiple interfaces (I5, I6) with root type D8";
        assert_eq!(messages(&diags), vec![expected, expected]);
        let mut spans: Vec<Span> = diags.iter().map(|d| d.primary_span).collect();
        spans.sort();
        let mut expected_spans = vec![
            tu.record(i5).unwrap().bases[0].span,
            tu.record(i6).unwrap().bases[0].span,
        ];
        expected_spans.sort();
        assert_eq!(spans, expected_spans);
        assert!(diags
            .iter()
            .all(|d| d.fix.as_ref().unwrap().replacements[0].new_text == "virtual "));
    }

    #[test]
    fn virtual_diamond_is_clean() {
        let mut b = TuBuilder::new("main.cc");
        let i1 = interface(&mut b, "I1", "foo");
        let i5 = interface(&mut b, "I5", "bar");
        let i6 = interface(&mut b, "I6", "baz");
        b.base(i5, i1, AccessSpecifier::Public, true);
        b.base(i6, i1, AccessSpecifier::Public, true);
        let j = interface(&mut b, "J", "qux");
        b.base(j, i5, AccessSpecifier::Public, false);
        b.base(j, i6, AccessSpecifier::Public, false);
        let tu = b.finish();
        assert!(run_check(&DerivedClasses, &tu).is_empty());
    }

    #[test]
    fn stacked_diamonds_are_walked_once_per_record() {
        let mut b = TuBuilder::new("main.cc");
        let mut level = interface(&mut b, "L0", "m0");
        for k in 1..=40 {
            let left = interface(&mut b, &format!("A{k}"), &format!("a{k}"));
            let right = interface(&mut b, &format!("B{k}"), &format!("b{k}"));
            b.base(left, level, AccessSpecifier::Public, true);
            b.base(right, level, AccessSpecifier::Public, true);
            level = interface(&mut b, &format!("L{k}"), &format!("m{k}"));
            b.base(level, left, AccessSpecifier::Public, false);
            b.base(level, right, AccessSpecifier::Public, false);
        }
        let bottom = interface(&mut b, "Top", "top");
        let shared = interface(&mut b, "Shared", "shared");
        b.base(bottom, level, AccessSpecifier::Public, false);
        b.base(bottom, shared, AccessSpecifier::Public, false);
        b.base(level, shared, AccessSpecifier::Public, false);
        let tu = b.finish();

        let diags = run_check(&DerivedClasses, &tu);
        let expected = "Interface Shared must be implemented virtually because it's extended \
                        by multiple interfaces (L40, Top) with root type Top";
        assert_eq!(messages(&diags), vec![expected, expected]);
    }

    #[test]
    fn unresolved_bases_are_reported() {
        let mut b = TuBuilder::new("main.cc");
        let template_base = b.intern(Type::TemplateSpecialization {
            name: String::from("Base<T>"),
            template: None,
            canonical: None,
            dependent: true,
        });
        let int = b.builtin(BuiltinKind::Int);
        let d = final_class(&mut b, "D");
        b.base_type(d, template_base, AccessSpecifier::Public, false);
        b.base_type(d, int, AccessSpecifier::Public, false);
        let tu = b.finish();

        let diags = run_check(&DerivedClasses, &tu);
        assert_eq!(
            messages(&diags),
            vec![
                "Unable to get base template spec 'Base<T>' as record",
                "Unable to get base of type 'int' as record or template",
            ]
        );
    }

    #[test]
    fn empty_classes_and_lambdas_are_skipped() {
        let mut b = TuBuilder::new("main.cc");
        b.record(None, TagKind::Class, "Empty");
        let tu = b.finish();
        assert!(run_check(&DerivedClasses, &tu).is_empty());
    }
}
