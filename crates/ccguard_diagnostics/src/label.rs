//! Labels that annotate source spans within a diagnostic.

use ccguard_source::Span;
use serde::{Deserialize, Serialize};

/// The visual style of a diagnostic label.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum LabelStyle {
    /// The primary label highlighting the main location (e.g., `^^^^`).
    Primary,
    /// A secondary label pointing at a related entity, such as a primary template.
    Secondary,
}

/// An annotated source span within a diagnostic.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Label {
    /// The source span this label annotates.
    pub span: Span,
    /// The message displayed next to the underline.
    pub message: String,
    /// Whether this is a primary or secondary label.
    pub style: LabelStyle,
}

impl Label {
    /// Creates a primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            style: LabelStyle::Primary,
        }
    }

    /// Creates a secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            style: LabelStyle::Secondary,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_styles() {
        assert_eq!(Label::primary(Span::DUMMY, "here").style, LabelStyle::Primary);
        let secondary = Label::secondary(Span::DUMMY, "primary template defined here");
        assert_eq!(secondary.style, LabelStyle::Secondary);
        assert_eq!(secondary.message, "primary template defined here");
    }
}
