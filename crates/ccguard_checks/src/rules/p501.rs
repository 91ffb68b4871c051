//! P501: IncludeOrder — `#include` directives are grouped and sorted.
//!
//! Groups, in order: the related header of a source file, headers from the
//! same directory, headers from the same project, everything else. Within a
//! group directives are sorted by spelled name and written on consecutive
//! lines; groups are separated by a blank line.

use std::collections::BTreeMap;
use std::path::Path;

use ccguard_ast::InclusionDirective;
use ccguard_common::{canonical_dir, file_stem, has_extension};
use ccguard_config::IncludeOrderOptions;
use ccguard_diagnostics::{
    Category, Diagnostic, DiagnosticCode, Replacement, Severity, SuggestedFix,
};
use ccguard_source::{FileId, Span};

use crate::{Check, CheckContext, PpCallbacks};

/// Checks the grouping and order of `#include` directives per file.
pub struct IncludeOrder;

impl Check for IncludeOrder {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Preprocessor, 501)
    }

    fn name(&self) -> &str {
        "include-order"
    }

    fn description(&self) -> &str {
        "includes must use angle brackets and be grouped and sorted"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn preprocessor_callbacks(&self) -> Option<Box<dyn PpCallbacks>> {
        Some(Box::new(IncludeOrderCallbacks {
            code: self.code(),
            directives: BTreeMap::new(),
        }))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Group {
    RelatedHeader,
    SameDirectory,
    SameProject,
    External,
}

#[derive(Debug)]
struct Directive {
    hash: Span,
    range: Span,
    name: String,
    group: Group,
}

impl Directive {
    fn sort_key(&self) -> (Group, &str) {
        (self.group, &self.name)
    }
}

struct IncludeOrderCallbacks {
    code: DiagnosticCode,
    /// Directives bucketed by the file they are written in.
    directives: BTreeMap<FileId, Vec<Directive>>,
}

impl IncludeOrderCallbacks {
    fn check_file(&self, directives: &[Directive], cx: &CheckContext<'_>) {
        for pair in directives.windows(2) {
            let (prev, cur) = (&pair[0], &pair[1]);
            if cur.sort_key() < prev.sort_key() {
                if let Some(anchor) = directives
                    .iter()
                    .find(|d| d.sort_key() >= cur.sort_key())
                {
                    cx.sink.emit(
                        Diagnostic::warning(
                            self.code,
                            format!(
                                "<{}> should be included before <{}>",
                                cur.name, anchor.name
                            ),
                            cur.range,
                        ),
                    );
                }
            }

            let (Some(prev_line), Some(cur_line)) =
                (cx.sources.line_of(prev.hash), cx.sources.line_of(cur.hash))
            else {
                continue;
            };
            let adjacent = cur_line == prev_line + 1;
            if prev.group != cur.group && adjacent {
                cx.sink.emit(
                    Diagnostic::warning(
                        self.code,
                        format!(
                            "<{}> and <{}> should be in different include groups",
                            prev.name, cur.name
                        ),
                        prev.range,
                    )
                    .with_fix(SuggestedFix::single(
                        "separate the groups with a blank line",
                        Replacement::insert(cur.hash.start_point(), "\n"),
                    )),
                );
            } else if prev.group == cur.group && !adjacent {
                cx.sink.emit(
                    Diagnostic::warning(
                        self.code,
                        format!(
                            "<{}> and <{}> should be in the same include group",
                            prev.name, cur.name
                        ),
                        prev.range,
                    ),
                );
            }
        }
    }
}

impl PpCallbacks for IncludeOrderCallbacks {
    fn inclusion_directive(&mut self, directive: &InclusionDirective, cx: &CheckContext<'_>) {
        let options = &cx.config.include_order;
        let name = &directive.file_name;
        let range = directive.file_name_range;

        let included = directive.resolved.and_then(|f| cx.tu.file_path(f));
        let (Some(included), Some(current)) = (included, cx.tu.file_path(directive.hash.file))
        else {
            cx.sink.emit(
                Diagnostic::warning(self.code, format!("Include <{name}> not resolved"), range),
            );
            return;
        };

        if !directive.angled {
            cx.sink.emit(
                Diagnostic::warning(self.code, "Use #include<> instead of include \"\"", range)
                    .with_fix(SuggestedFix::single(
                        "use angle brackets",
                        Replacement::replace(range, format!("<{name}>")),
                    )),
            );
        }
        if !has_extension(Path::new(name), &options.header_extensions) {
            cx.sink.emit(
                Diagnostic::warning(
                    self.code,
                    format!(
                        "Only header files ({}) should be included",
                        options.header_extensions.join(", ")
                    ),
                    range,
                ),
            );
        }

        let group = classify(current, included, options);
        tracing::trace!(include = %name, ?group, "classified include");
        self.directives
            .entry(directive.hash.file)
            .or_default()
            .push(Directive {
                hash: directive.hash,
                range,
                name: name.clone(),
                group,
            });
    }

    fn end_of_main_file(&mut self, cx: &CheckContext<'_>) {
        let buckets = std::mem::take(&mut self.directives);
        for directives in buckets.values() {
            self.check_file(directives, cx);
        }
    }
}

fn classify(current: &Path, included: &Path, options: &IncludeOrderOptions) -> Group {
    let current_dir = canonical_dir(current);
    let included_dir = canonical_dir(included);
    if current_dir == included_dir {
        let related = has_extension(current, &options.source_extensions)
            && file_stem(current) == file_stem(included);
        return if related {
            Group::RelatedHeader
        } else {
            Group::SameDirectory
        };
    }
    match (
        project_of(&current_dir, &options.project_root_markers),
        project_of(&included_dir, &options.project_root_markers),
    ) {
        (Some(a), Some(b)) if a == b => Group::SameProject,
        _ => Group::External,
    }
}

/// The first path segment after the last project-root marker.
fn project_of(dir: &Path, markers: &[String]) -> Option<String> {
    let segments: Vec<&str> = dir.iter().filter_map(|s| s.to_str()).collect();
    let marker = segments
        .iter()
        .rposition(|s| markers.iter().any(|m| m == s))?;
    segments.get(marker + 1).map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{messages, run_check};
    use ccguard_ast::{FileKind, PpEvent, TuBuilder};

    const MAIN: &str = "/p/src/app/widget.cc";

    /// Records `#include <name>` (or `"name"`) at its position in `source`.
    fn include(b: &mut TuBuilder, source: &str, name: &str, resolved: Option<FileId>) {
        let angled = source.contains(&format!("<{name}>"));
        let spelled = if angled {
            format!("#include <{name}>")
        } else {
            format!("#include \"{name}\"")
        };
        let at = source.find(&spelled).expect("directive in source") as u32;
        let file = b.main_file();
        let name_start = at + "#include ".len() as u32;
        b.pp(PpEvent::InclusionDirective(InclusionDirective {
            hash: Span::new(file, at, at + 1),
            file_name: name.to_string(),
            file_name_range: Span::new(file, name_start, name_start + name.len() as u32 + 2),
            angled,
            resolved,
        }));
    }

    fn unit(source: &str, includes: &[(&str, Option<&str>)]) -> ccguard_ast::TranslationUnit {
        let mut b = TuBuilder::with_source(MAIN, source);
        for (name, path) in includes {
            let resolved = path.map(|p| b.add_file(p, FileKind::User, None));
            include(&mut b, source, name, resolved);
        }
        b.pp(PpEvent::EndOfMainFile);
        b.finish()
    }

    #[test]
    fn well_ordered_groups() {
        let source = "#include <app/widget.hh>\n\n#include <app/a.hh>\n#include <app/b.hh>\n\n#include <lib/util.hh>\n\n#include <vector.hh>\n";
        let tu = unit(
            source,
            &[
                ("app/widget.hh", Some("/p/src/app/widget.hh")),
                ("app/a.hh", Some("/p/src/app/a.hh")),
                ("app/b.hh", Some("/p/src/app/b.hh")),
                ("lib/util.hh", Some("/p/src/app/detail/util.hh")),
                ("vector.hh", Some("/usr/include/c++/vector.hh")),
            ],
        );
        assert!(run_check(&IncludeOrder, &tu).is_empty());
    }

    #[test]
    fn inversion_is_reported_at_the_later_directive() {
        let source = "#include <app/b.hh>\n#include <app/a.hh>\n";
        let tu = unit(
            source,
            &[
                ("app/b.hh", Some("/p/src/app/b.hh")),
                ("app/a.hh", Some("/p/src/app/a.hh")),
            ],
        );
        let diags = run_check(&IncludeOrder, &tu);
        assert_eq!(
            messages(&diags),
            vec!["<app/a.hh> should be included before <app/b.hh>"]
        );
        assert_eq!(diags[0].primary_span.start, 29);
    }

    #[test]
    fn group_separation() {
        let source = "#include <app/a.hh>\n#include <vector.hh>\n#include <zlib.hh>\n\n#include <zz.hh>\n";
        let tu = unit(
            source,
            &[
                ("app/a.hh", Some("/p/src/app/a.hh")),
                ("vector.hh", Some("/usr/include/vector.hh")),
                ("zlib.hh", Some("/usr/include/zlib.hh")),
                ("zz.hh", Some("/usr/include/zz.hh")),
            ],
        );
        assert_eq!(
            messages(&run_check(&IncludeOrder, &tu)),
            vec![
                "<app/a.hh> and <vector.hh> should be in different include groups",
                "<zlib.hh> and <zz.hh> should be in the same include group",
            ]
        );
    }

    #[test]
    fn quotes_extensions_and_unresolved() {
        let source = "#include \"app/a.hh\"\n#include <app/impl.inc>\n#include <missing.hh>\n";
        let tu = unit(
            source,
            &[
                ("app/a.hh", Some("/p/src/app/a.hh")),
                ("app/impl.inc", Some("/p/src/app/impl.inc")),
                ("missing.hh", None),
            ],
        );
        let diags = run_check(&IncludeOrder, &tu);
        assert_eq!(
            messages(&diags),
            vec![
                "Use #include<> instead of include \"\"",
                "Only header files (.h, .hh) should be included",
                "Include <missing.hh> not resolved",
            ]
        );
        let edit = &diags[0].fix.as_ref().unwrap().replacements[0];
        assert_eq!(edit.new_text, "<app/a.hh>");
    }

    #[test]
    fn project_is_segment_after_last_marker() {
        let markers = vec!["src".to_string(), "include".to_string()];
        assert_eq!(
            project_of(Path::new("/p/src/app/detail"), &markers).as_deref(),
            Some("app")
        );
        assert_eq!(
            project_of(Path::new("/p/include/src/core"), &markers).as_deref(),
            Some("core")
        );
        assert_eq!(project_of(Path::new("/usr/include"), &markers), None);
    }
}
