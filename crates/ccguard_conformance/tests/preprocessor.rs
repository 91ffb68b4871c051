//! Include ordering and directive rules through the engine.

use ccguard_ast::{
    FileChangeReason, FileKind, InclusionDirective, PpEvent, TranslationUnit, TuBuilder,
};
use ccguard_conformance::check_only;
use ccguard_source::Span;

const MAIN: &str = "/p/src/app/widget.cc";

/// Builds a unit whose main file is `source`, recording one inclusion event
/// per `#include <name>` line, resolved to `/p/src/<name>` unless it is a
/// system header from `system`.
fn unit(source: &str, system: &[&str]) -> TranslationUnit {
    let mut b = TuBuilder::with_source(MAIN, source);
    let main = b.main_file();
    let mut offset = 0u32;
    for line in source.split_inclusive('\n') {
        if let Some(rest) = line.strip_prefix("#include <") {
            let name = rest.trim_end().trim_end_matches('>').to_string();
            let path = if system.contains(&name.as_str()) {
                format!("/usr/include/{name}")
            } else {
                format!("/p/src/{name}")
            };
            let resolved = b.add_file(path, FileKind::User, Some("#pragma once\n".into()));
            let name_start = offset + "#include ".len() as u32;
            b.pp(PpEvent::InclusionDirective(InclusionDirective {
                hash: Span::new(main, offset, offset + 1),
                file_name_range: Span::new(main, name_start, name_start + name.len() as u32 + 2),
                file_name: name,
                angled: true,
                resolved: Some(resolved),
            }));
        }
        offset += line.len() as u32;
    }
    b.pp(PpEvent::EndOfMainFile);
    b.finish()
}

#[test]
fn inversion_names_first_greater_entry() {
    let tu = unit(
        "#include <app/widget.hh>\n\n#include <app/c.hh>\n#include <app/d.hh>\n#include <app/a.hh>\n",
        &[],
    );
    let result = check_only(&tu, "include-order").unwrap();
    assert_eq!(
        result.messages_of("P501"),
        vec!["<app/a.hh> should be included before <app/c.hh>"]
    );
}

#[test]
fn groups_must_be_contiguous_and_separated() {
    let tu = unit(
        "#include <app/widget.hh>\n#include <app/a.hh>\n\n#include <app/b.hh>\n\n#include <vector.hh>\n",
        &["vector.hh"],
    );
    let result = check_only(&tu, "P501").unwrap();
    assert_eq!(
        result.messages_of("P501"),
        vec![
            "<app/widget.hh> and <app/a.hh> should be in different include groups",
            "<app/a.hh> and <app/b.hh> should be in the same include group",
        ]
    );
}

#[test]
fn well_formed_includes_are_clean() {
    let tu = unit(
        "#include <app/widget.hh>\n\n#include <app/a.hh>\n#include <app/b.hh>\n\n#include <app/detail/log.hh>\n\n#include <vector.hh>\n",
        &["vector.hh"],
    );
    assert!(check_only(&tu, "include-order").unwrap().diagnostics.is_empty());
}

#[test]
fn headers_need_exactly_one_pragma_once() {
    let mut b = TuBuilder::with_source("/p/src/main.cc", "#include <a.hh>\n#include <b.hh>\n");
    let main = b.main_file();
    let guarded = b.add_file("/p/src/a.hh", FileKind::User, Some("#pragma once\n".into()));
    let bare = b.add_file("/p/src/b.hh", FileKind::User, Some("#define B 1\n".into()));
    for file in [guarded, bare] {
        b.pp(PpEvent::FileChanged {
            file,
            reason: FileChangeReason::EnterFile,
            loc: Span::point(main, 0),
        });
    }
    b.pp(PpEvent::Pragma {
        span: Span::new(guarded, 0, 12),
    });
    b.pp(PpEvent::MacroDefined {
        name: "B".into(),
        span: Span::new(bare, 0, 11),
    });
    b.pp(PpEvent::EndOfMainFile);
    let tu = b.finish();

    let result = check_only(&tu, "preprocessing-directives").unwrap();
    assert_eq!(
        result.messages_of("P502"),
        vec![
            "#pragma once must be used as include guard",
            "Preprocessor directives must not be used",
        ]
    );
    assert!(result.diagnostics.iter().all(|d| d.primary_span.file == bare));
}
