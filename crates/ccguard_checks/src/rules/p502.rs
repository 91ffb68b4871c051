//! P502: PreprocessingDirectives — only `#include` and `#pragma once` are allowed.

use std::collections::BTreeMap;

use ccguard_ast::{ConditionalDirective, FileChangeReason, FileKind};
use ccguard_diagnostics::{Category, Diagnostic, DiagnosticCode, Severity};
use ccguard_source::{FileId, Span};

use crate::helpers::is_header;
use crate::{Check, CheckContext, PpCallbacks};

const DIRECTIVE_MESSAGE: &str = "Preprocessor directives must not be used";

/// Bans macros, conditional compilation and pragmas other than a single
/// `#pragma once`, which every project header must carry.
pub struct PreprocessingDirectives;

impl Check for PreprocessingDirectives {
    fn code(&self) -> DiagnosticCode {
        DiagnosticCode::new(Category::Preprocessor, 502)
    }

    fn name(&self) -> &str {
        "preprocessing-directives"
    }

    fn description(&self) -> &str {
        "preprocessor directives other than #include and #pragma once must not be used"
    }

    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    fn preprocessor_callbacks(&self) -> Option<Box<dyn PpCallbacks>> {
        Some(Box::new(DirectiveCallbacks {
            code: self.code(),
            pragma_once: BTreeMap::new(),
        }))
    }
}

struct DirectiveCallbacks {
    code: DiagnosticCode,
    /// Project headers seen so far and whether they carried `#pragma once`.
    pragma_once: BTreeMap<FileId, bool>,
}

impl DirectiveCallbacks {
    fn directive(&self, span: Span, cx: &CheckContext<'_>) {
        cx.sink.emit(Diagnostic::warning(self.code, DIRECTIVE_MESSAGE, span));
    }

    fn is_project_header(&self, file: FileId, cx: &CheckContext<'_>) -> bool {
        cx.tu.file_kind(file) == FileKind::User
            && is_header(cx.tu, file, &cx.config.preprocessing_directives.header_extensions)
    }
}

impl PpCallbacks for DirectiveCallbacks {
    fn file_changed(
        &mut self,
        file: FileId,
        reason: FileChangeReason,
        _loc: Span,
        cx: &CheckContext<'_>,
    ) {
        if reason == FileChangeReason::EnterFile && self.is_project_header(file, cx) {
            self.pragma_once.entry(file).or_insert(false);
        }
    }

    fn macro_defined(&mut self, name: &str, span: Span, cx: &CheckContext<'_>) {
        // Predefined and command-line macros.
        if cx.tu.file_kind(span.file) == FileKind::Builtin {
            return;
        }
        tracing::trace!(name, "macro definition");
        self.directive(span, cx);
    }

    fn macro_undefined(&mut self, _name: &str, span: Span, cx: &CheckContext<'_>) {
        self.directive(span, cx);
    }

    fn conditional(
        &mut self,
        _directive: ConditionalDirective,
        span: Span,
        cx: &CheckContext<'_>,
    ) {
        self.directive(span, cx);
    }

    fn pragma(&mut self, span: Span, cx: &CheckContext<'_>) {
        let is_once = cx.sources.line_text(span).trim() == "#pragma once";
        let headers = &cx.config.preprocessing_directives.header_extensions;
        if !is_once || !is_header(cx.tu, span.file, headers) {
            self.directive(span, cx);
            return;
        }
        let seen = self.pragma_once.entry(span.file).or_insert(false);
        if *seen {
            cx.sink.emit(Diagnostic::warning(
                self.code,
                "Pragma once must be specified only once",
                span,
            ));
        }
        *seen = true;
    }

    fn end_of_main_file(&mut self, cx: &CheckContext<'_>) {
        for (&file, &has_once) in &self.pragma_once {
            if !has_once {
                cx.sink.emit(
                    Diagnostic::warning(
                        self.code,
                        "#pragma once must be used as include guard",
                        Span::point(file, 0),
                    )
                    .with_help("add `#pragma once` as the first line of the header"),
                );
            }
        }
        self.pragma_once.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{messages, run_check};
    use ccguard_ast::{PpEvent, TuBuilder};

    fn enter(b: &mut TuBuilder, file: FileId) {
        let loc = Span::point(b.main_file(), 0);
        b.pp(PpEvent::FileChanged {
            file,
            reason: FileChangeReason::EnterFile,
            loc,
        });
    }

    #[test]
    fn macros_and_conditionals_are_reported() {
        let mut b = TuBuilder::with_source("/p/src/main.cc", "#define N 1\n#ifdef N\n#endif\n#undef N\n");
        let main = b.main_file();
        let builtin = b.add_file("<built-in>", FileKind::Builtin, None);
        b.pp(PpEvent::MacroDefined {
            name: "__cplusplus".to_string(),
            span: Span::point(builtin, 0),
        });
        b.pp(PpEvent::MacroDefined {
            name: "N".to_string(),
            span: Span::new(main, 0, 11),
        });
        b.pp(PpEvent::Conditional {
            directive: ConditionalDirective::Ifdef,
            span: Span::new(main, 12, 20),
        });
        b.pp(PpEvent::Conditional {
            directive: ConditionalDirective::Endif,
            span: Span::new(main, 21, 27),
        });
        b.pp(PpEvent::MacroUndefined {
            name: "N".to_string(),
            span: Span::new(main, 28, 36),
        });
        let tu = b.finish();
        let diags = run_check(&PreprocessingDirectives, &tu);
        assert_eq!(messages(&diags), vec![DIRECTIVE_MESSAGE; 4]);
    }

    #[test]
    fn header_pragma_once() {
        let mut b = TuBuilder::new("/p/src/main.cc");
        let good = b.add_file(
            "/p/src/good.hh",
            FileKind::User,
            Some("#pragma once\n".to_string()),
        );
        let twice = b.add_file(
            "/p/src/twice.hh",
            FileKind::User,
            Some("#pragma once\n#pragma once\n".to_string()),
        );
        let missing = b.add_file("/p/src/missing.hh", FileKind::User, Some(String::new()));
        let system = b.add_file("/usr/include/stdio.h", FileKind::System, Some(String::new()));
        for file in [good, twice, missing, system] {
            enter(&mut b, file);
        }
        b.pp(PpEvent::Pragma { span: Span::new(good, 0, 12) });
        b.pp(PpEvent::Pragma { span: Span::new(twice, 0, 12) });
        b.pp(PpEvent::Pragma { span: Span::new(twice, 13, 25) });
        b.pp(PpEvent::EndOfMainFile);
        let tu = b.finish();

        let diags = run_check(&PreprocessingDirectives, &tu);
        assert_eq!(
            messages(&diags),
            vec![
                "Pragma once must be specified only once",
                "#pragma once must be used as include guard",
            ]
        );
        assert_eq!(diags[0].primary_span.start, 13);
        assert_eq!(diags[1].primary_span, Span::point(missing, 0));
    }

    #[test]
    fn other_pragmas_are_directives() {
        let mut b = TuBuilder::with_source("/p/src/main.cc", "#pragma once\n#pragma pack(1)\n");
        let main = b.main_file();
        b.pp(PpEvent::Pragma { span: Span::new(main, 0, 12) });
        b.pp(PpEvent::Pragma { span: Span::new(main, 13, 28) });
        let tu = b.finish();
        assert_eq!(
            messages(&run_check(&PreprocessingDirectives, &tu)),
            vec![DIRECTIVE_MESSAGE, DIRECTIVE_MESSAGE]
        );
    }
}
