//! Source excerpts for error and warning reports, rendered with ariadne.
//!
//! Positions arrive as the 1‑based `(line, column)` pairs tokens carry, with
//! columns counted in characters; ariadne wants character offsets, so the
//! pair is converted first.

use std::io::Write;
use std::ops::Range;

use ariadne::{Color, Config, Label, Report, ReportKind, Source};

/// Name shown in the report header for the script being run.
const SOURCE_ID: &str = "<input>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// Print a report to stderr with colour.
pub fn emit(source: &str, severity: Severity, position: (usize, usize), message: &str) {
    render_to_writer(source, severity, position, message, &mut std::io::stderr(), true).ok();
}

/// Render a report to a String without colour codes (tests, logs).
pub fn render_plain(
    source: &str,
    severity: Severity,
    position: (usize, usize),
    message: &str,
) -> String {
    let mut buf = Vec::new();
    render_to_writer(source, severity, position, message, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).into_owned()
}

fn render_to_writer(
    source: &str,
    severity: Severity,
    (line, column): (usize, usize),
    message: &str,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    let Some(span) = span_at(source, line, column) else {
        // Nothing to point at (EOF of an empty file, synthetic tokens).
        return writeln!(writer, "{}", message);
    };

    let (kind, color) = match severity {
        Severity::Error => (ReportKind::Error, Color::Red),
        Severity::Warning => (ReportKind::Warning, Color::Yellow),
    };

    Report::build(kind, (SOURCE_ID, span.clone()))
        .with_message(message)
        .with_config(Config::default().with_color(use_color))
        .with_label(
            Label::new((SOURCE_ID, span))
                .with_message(message)
                .with_color(color),
        )
        .finish()
        .write((SOURCE_ID, Source::from(source)), &mut *writer)
}

/// One‑character span under `(line, column)`, clamped to the end of the line.
fn span_at(source: &str, line: usize, column: usize) -> Option<Range<usize>> {
    let offset = char_offset(source, line, column)?;
    let total = source.chars().count();

    Some(if offset < total {
        offset..offset + 1
    } else {
        total..total
    })
}

/// Character offset of a 1‑based `(line, column)` position.
fn char_offset(source: &str, line: usize, column: usize) -> Option<usize> {
    if source.is_empty() || line == 0 {
        return None;
    }

    let mut offset = 0;
    let mut lines = 0;

    for text in source.split_inclusive('\n') {
        lines += 1;

        if lines == line {
            let width = text
                .trim_end_matches(|c| c == '\n' || c == '\r')
                .chars()
                .count();
            return Some(offset + column.saturating_sub(1).min(width));
        }

        offset += text.chars().count();
    }

    // The EOF token sits on the line after a trailing newline.
    (line == lines + 1 && source.ends_with('\n')).then_some(offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_shows_the_offending_line_and_message() {
        let source = "var a = 1;\nprint a + \"x\";\nprint a;";
        let rendered = render_plain(source, Severity::Error, (2, 9), "Operands must match.");

        assert!(rendered.contains("Error"));
        assert!(rendered.contains("print a + \"x\";"));
        assert!(rendered.contains("Operands must match."));
    }

    #[test]
    fn warnings_are_labelled_as_such() {
        let rendered = render_plain("{ var a = 1; }", Severity::Warning, (1, 7), "unused");

        assert!(rendered.contains("Warning"));
        assert!(rendered.contains("unused"));
    }

    #[test]
    fn unknown_line_yields_message_only() {
        assert_eq!(render_plain("x", Severity::Error, (9, 1), "late"), "late\n");
        assert_eq!(render_plain("", Severity::Error, (1, 1), "empty"), "empty\n");
    }

    #[test]
    fn offsets_count_characters() {
        let source = "var s = \"éé\";\nprint s + 1;";

        assert_eq!(char_offset(source, 1, 1), Some(0));
        assert_eq!(char_offset(source, 2, 1), Some(14));
        assert_eq!(char_offset(source, 2, 9), Some(22));
    }

    #[test]
    fn columns_past_the_line_end_are_clamped() {
        assert_eq!(char_offset("ab\ncd", 1, 40), Some(2));
        assert_eq!(char_offset("ab\n", 2, 1), Some(3));
        assert_eq!(char_offset("ab", 3, 1), None);
    }
}
