//! Diagnostic rendering for human-readable output.

use crate::diagnostic::Diagnostic;
use crate::label::LabelStyle;
use ccguard_source::{SourceDb, Span};

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String;
}

/// Renders diagnostics in a rustc-style terminal format.
///
/// Produces output like:
/// ```text
/// warning[E301]: Comma operator must not be used
///   --> src/net/socket.cc:10:9
///    |
/// 10 |   a = 1, b = 2;
///    |        ^
///    |
///    = help: split the expression into separate statements
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
    /// The terminal width for line wrapping.
    pub width: u16,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool, width: u16) -> Self {
        Self { color, width }
    }

    fn header(&self, diag: &Diagnostic) -> String {
        let severity = diag.severity.to_string();
        let severity = if self.color {
            let color = if diag.severity.is_error() { "31" } else { "33" };
            format!("\x1b[1;{color}m{severity}\x1b[0m")
        } else {
            severity
        };
        format!("{}[{}]: {}\n", severity, diag.code, diag.message)
    }

    fn excerpt(&self, out: &mut String, span: Span, message: &str, marker: char, db: &SourceDb) {
        let Some(file) = db.try_get_file(span.file) else {
            return;
        };
        let (line, col) = file.line_col(span.start);
        let line_num = line.to_string();
        let padding = " ".repeat(line_num.len());
        let line_content = file.line_text(line);

        let max_len = (self.width as usize).saturating_sub(col as usize + line_num.len() + 4);
        let span_len = (span.len() as usize).clamp(1, max_len.max(1));
        let marks = marker.to_string().repeat(span_len);
        let col_padding = " ".repeat((col as usize).saturating_sub(1));
        let message = if message.is_empty() {
            String::new()
        } else {
            format!(" {message}")
        };

        out.push_str(&format!("{padding} |\n"));
        out.push_str(&format!("{line_num} | {line_content}\n"));
        out.push_str(&format!("{padding} | {col_padding}{marks}{message}\n"));
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic, source_db: &SourceDb) -> String {
        let mut out = self.header(diag);

        if let Some(resolved) = source_db.resolve_span(diag.primary_span) {
            out.push_str(&format!("  --> {resolved}\n"));

            let primary_msg = diag
                .labels
                .iter()
                .find(|l| l.style == LabelStyle::Primary)
                .map(|l| l.message.as_str())
                .unwrap_or_default();
            self.excerpt(&mut out, diag.primary_span, primary_msg, '^', source_db);
        }

        for label in diag
            .labels
            .iter()
            .filter(|l| l.style == LabelStyle::Secondary)
        {
            if let Some(resolved) = source_db.resolve_span(label.span) {
                out.push_str(&format!("  ::: {resolved}\n"));
                self.excerpt(&mut out, label.span, &label.message, '-', source_db);
            }
        }

        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }

        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }

        if let Some(fix) = &diag.fix {
            out.push_str(&format!("   = fix: {}\n", fix.message));
        }

        out
    }
}
