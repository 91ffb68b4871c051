//! Fix-its: textual edits attached to a diagnostic.

use ccguard_source::Span;
use serde::{Deserialize, Serialize};

/// A text edit over a byte range.
///
/// An empty span inserts `new_text`; an empty `new_text` deletes the span.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    /// The source span to replace.
    pub span: Span,
    /// The new text to put in place of the span.
    pub new_text: String,
}

impl Replacement {
    /// Inserts `text` at `at`'s start offset.
    pub fn insert(at: Span, text: impl Into<String>) -> Self {
        Self {
            span: at.start_point(),
            new_text: text.into(),
        }
    }

    /// Replaces the text covered by `span`.
    pub fn replace(span: Span, text: impl Into<String>) -> Self {
        Self {
            span,
            new_text: text.into(),
        }
    }

    /// Deletes the text covered by `span`.
    pub fn remove(span: Span) -> Self {
        Self {
            span,
            new_text: String::new(),
        }
    }

    /// Returns `true` if this edit only inserts text.
    pub fn is_insertion(&self) -> bool {
        self.span.is_empty()
    }
}

/// A suggested fix that can be applied to source code.
///
/// A fix consists of a human-readable message describing the change and
/// one or more [`Replacement`]s that together implement it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SuggestedFix {
    /// A description of what this fix does.
    pub message: String,
    /// The set of text replacements that implement this fix.
    pub replacements: Vec<Replacement>,
}

impl SuggestedFix {
    /// Creates a fix made of a single edit.
    pub fn single(message: impl Into<String>, replacement: Replacement) -> Self {
        Self {
            message: message.into(),
            replacements: vec![replacement],
        }
    }
}
