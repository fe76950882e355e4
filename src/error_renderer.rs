//! Error rendering using ariadne
//!
//! Evaluation errors carry a byte span into the expression text. These
//! helpers print the error with that span underlined.

use crate::Error;
use ariadne::{Color, Label, Report, ReportKind, Source};
use std::io::Write;

const SOURCE_ID: &str = "<expression>";

/// Render an error against its expression text to stderr
pub fn render_error(error: &Error, source: &str) {
    render_error_to_writer(error, source, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer
pub fn render_error_to(error: &Error, source: &str, writer: &mut dyn Write) -> std::io::Result<()> {
    render_error_to_writer(error, source, writer, true)
}

/// Render an error to a String
///
/// # Example
/// ```
/// use vigil::{evaluate, render_error_to_string, values::Value};
///
/// let source = "missing + 1";
/// let err = evaluate(source, &Value::Null, &Value::Null).unwrap_err();
/// let formatted = render_error_to_string(&err, source);
/// assert!(formatted.contains("missing"));
/// ```
pub fn render_error_to_string(error: &Error, source: &str) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, source, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render an error to a String without color codes (useful for tests)
pub fn render_error_to_string_no_color(error: &Error, source: &str) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, source, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_error_to_writer(
    error: &Error,
    source: &str,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    let message = error.kind.to_string();

    // Errors raised after evaluation (or without a node) point at the whole text.
    let range = match &error.span {
        Some(span) if span.0.end <= source.len() => span.0.clone(),
        _ => 0..source.len(),
    };

    let report = Report::build(ReportKind::Error, (SOURCE_ID, range.clone()))
        .with_code(error.category())
        .with_message(&message)
        .with_config(ariadne::Config::default().with_color(use_color))
        .with_label(
            Label::new((SOURCE_ID, range))
                .with_message(&message)
                .with_color(Color::Red),
        );

    report
        .finish()
        .write((SOURCE_ID, Source::from(source)), &mut *writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{evaluate, values::Value};
    use indoc::indoc;
    use pretty_assertions::assert_eq;

    fn render(source: &str) -> String {
        let err = evaluate(source, &Value::Null, &Value::Null).expect_err("should fail");
        render_error_to_string_no_color(&err, source)
    }

    #[test]
    fn test_render_parse_error() {
        let output = render("1 + + ");
        assert!(output.contains("ParseError"), "{}", output);
        assert!(output.contains("1 + +"), "{}", output);
    }

    #[test]
    fn test_render_prohibited_access() {
        let output = render("Math.constructor");
        assert!(output.contains("AccessProhibited"), "{}", output);
        assert!(
            output.contains("Access to property constructor is prohibited"),
            "{}",
            output
        );
    }

    #[test]
    fn test_render_is_multi_line() {
        let output = render(indoc! {"
            1 +
              unknown"});
        assert!(output.lines().count() > 1);
        assert!(output.contains("Unknown identifier: unknown"));
    }

    #[test]
    fn test_render_without_span_covers_source() {
        let err = Error::new(
            vigil_core::ErrorKind::InvalidResultType { found: "object" },
            None,
        );
        let output = render_error_to_string_no_color(&err, "container");
        assert!(output.contains("container"));
        assert_eq!(output.is_empty(), false);
    }
}
