//! Structured diagnostic messages with severity, codes, labels, and fixes.

use crate::code::DiagnosticCode;
use crate::label::Label;
use crate::severity::Severity;
use crate::suggested_fix::SuggestedFix;
use ccguard_common::ContentHash;
use ccguard_source::{SourceDb, Span};
use serde::{Deserialize, Serialize};

/// A structured diagnostic message with source locations, labels, and optional fixes.
///
/// Each diagnostic includes:
/// - A severity level and the code of the rule that produced it
/// - A primary message and source span
/// - Optional secondary labels, notes, help text, and a fix-it
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// The code of the rule that produced this diagnostic.
    pub code: DiagnosticCode,
    /// The main diagnostic message.
    pub message: String,
    /// The primary source span where the violation was detected.
    pub primary_span: Span,
    /// Additional annotated source spans providing context.
    pub labels: Vec<Label>,
    /// Explanatory footnotes (e.g., "note: ...").
    pub notes: Vec<String>,
    /// Actionable suggestions (e.g., "help: ...").
    pub help: Vec<String>,
    /// A fix-it, if available.
    pub fix: Option<SuggestedFix>,
}

impl Diagnostic {
    /// Creates a new error diagnostic with the given code, message, and span.
    pub fn error(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::with_severity(Severity::Error, code, message, span)
    }

    /// Creates a new warning diagnostic with the given code, message, and span.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>, span: Span) -> Self {
        Self::with_severity(Severity::Warning, code, message, span)
    }

    /// Creates a new diagnostic with an explicit severity.
    pub fn with_severity(
        severity: Severity,
        code: DiagnosticCode,
        message: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            primary_span: span,
            labels: Vec::new(),
            notes: Vec::new(),
            help: Vec::new(),
            fix: None,
        }
    }

    /// Adds a label to this diagnostic.
    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    /// Adds a note to this diagnostic.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Adds a help message to this diagnostic.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }

    /// Sets the fix-it for this diagnostic.
    pub fn with_fix(mut self, fix: SuggestedFix) -> Self {
        self.fix = Some(fix);
        self
    }

    /// Returns a key identifying this finding independently of file ids.
    ///
    /// Two diagnostics from different translation units that point at the
    /// same line and column of the same file with the same code and message
    /// share a fingerprint.
    pub fn fingerprint(&self, source_db: &SourceDb) -> ContentHash {
        let location = match source_db.resolve_span(self.primary_span) {
            Some(resolved) => resolved.to_string(),
            None => String::from("<unknown>"),
        };
        let key = format!("{location}\u{0}{}\u{0}{}", self.code, self.message);
        ContentHash::from_bytes(key.as_bytes())
    }
}
