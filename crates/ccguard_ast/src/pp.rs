//! Preprocessor events recorded by the host, in source order.

use ccguard_source::{FileId, Span};
use serde::{Deserialize, Serialize};

/// Why the preprocessor moved to another file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileChangeReason {
    /// Started reading a file (the main file or an `#include`).
    EnterFile,
    /// Returned to the includer.
    ExitFile,
    /// `#pragma GCC system_header`
    SystemHeaderPragma,
    /// `#line` renamed the file.
    RenameFile,
}

/// Conditional compilation directives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionalDirective {
    /// `#if`
    If,
    /// `#ifdef`
    Ifdef,
    /// `#ifndef`
    Ifndef,
    /// `#elif`
    Elif,
    /// `#elifdef`
    Elifdef,
    /// `#elifndef`
    Elifndef,
    /// `#else`
    Else,
    /// `#endif`
    Endif,
}

impl ConditionalDirective {
    /// Returns the directive name without `#`.
    pub fn name(self) -> &'static str {
        match self {
            ConditionalDirective::If => "if",
            ConditionalDirective::Ifdef => "ifdef",
            ConditionalDirective::Ifndef => "ifndef",
            ConditionalDirective::Elif => "elif",
            ConditionalDirective::Elifdef => "elifdef",
            ConditionalDirective::Elifndef => "elifndef",
            ConditionalDirective::Else => "else",
            ConditionalDirective::Endif => "endif",
        }
    }
}

/// An `#include` directive.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionDirective {
    /// Location of the `#`.
    pub hash: Span,
    /// The spelled file name without delimiters.
    pub file_name: String,
    /// The file name including its `<>` or `""` delimiters.
    pub file_name_range: Span,
    /// Whether the name is written in angle brackets.
    #[serde(default)]
    pub angled: bool,
    /// The file the directive resolved to.
    #[serde(default)]
    pub resolved: Option<FileId>,
}

/// A preprocessor event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PpEvent {
    /// The preprocessor entered or left a file.
    FileChanged {
        /// The file now being read.
        file: FileId,
        /// Why.
        reason: FileChangeReason,
        /// Where in the new file reading resumes.
        loc: Span,
    },
    /// `#include`
    InclusionDirective(InclusionDirective),
    /// `#define NAME`
    MacroDefined {
        /// The macro name.
        name: String,
        /// Location of the name.
        span: Span,
    },
    /// `#undef NAME`
    MacroUndefined {
        /// The macro name.
        name: String,
        /// Location of the name.
        span: Span,
    },
    /// A macro use was expanded.
    MacroExpands {
        /// The macro name.
        name: String,
        /// Location of the use.
        span: Span,
    },
    /// `#if`, `#ifdef`, ..., `#endif`
    Conditional {
        /// Which directive.
        directive: ConditionalDirective,
        /// Location of the directive keyword.
        span: Span,
    },
    /// `#pragma ...`
    Pragma {
        /// Location of the `#pragma` introducer.
        span: Span,
    },
    /// The main file has been fully read.
    EndOfMainFile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn include_event_from_json() {
        let json = r#"{"event": "inclusion_directive",
                       "hash": {"file": 0, "start": 0, "end": 1},
                       "file_name": "a/b.hh",
                       "file_name_range": {"file": 0, "start": 9, "end": 17},
                       "angled": true, "resolved": 2}"#;
        let event: PpEvent = serde_json::from_str(json).unwrap();
        match event {
            PpEvent::InclusionDirective(inc) => {
                assert_eq!(inc.file_name, "a/b.hh");
                assert!(inc.angled);
                assert_eq!(inc.resolved, Some(FileId::from_raw(2)));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn end_of_main_file_is_a_bare_tag() {
        let json = serde_json::to_string(&PpEvent::EndOfMainFile).unwrap();
        assert_eq!(json, r#"{"event":"end_of_main_file"}"#);
    }
}
