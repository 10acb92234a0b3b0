// src/errors/report.rs
//! Rendering of compiler diagnostics through miette.

use std::io::{IsTerminal, Write};

use miette::{
    Diagnostic, GraphicalReportHandler, GraphicalTheme, NamedSource, ThemeCharacters,
    ThemeStyles,
};

/// How diagnostics are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStyle {
    /// Unicode frames and ANSI colors
    Color,
    /// ASCII frames, no escape codes
    Ascii,
}

impl ReportStyle {
    /// Colors only when stderr is a terminal
    pub fn detect() -> Self {
        if std::io::stderr().is_terminal() {
            Self::Color
        } else {
            Self::Ascii
        }
    }

    fn handler(self) -> GraphicalReportHandler {
        let theme = match self {
            Self::Color => GraphicalTheme {
                characters: ThemeCharacters::unicode(),
                styles: ThemeStyles::ansi(),
            },
            Self::Ascii => GraphicalTheme {
                characters: ThemeCharacters::ascii(),
                styles: ThemeStyles::none(),
            },
        };
        GraphicalReportHandler::new_themed(theme)
    }
}

/// Render one diagnostic against the source it points into.
pub fn render_diagnostic<D>(diag: D, file_path: &str, source: &str, style: ReportStyle) -> String
where
    D: Diagnostic + Send + Sync + 'static,
{
    let report =
        miette::Report::new(diag).with_source_code(NamedSource::new(file_path, source.to_string()));
    let mut out = String::new();
    if style.handler().render_report(&mut out, report.as_ref()).is_err() {
        // Fall back to the bare message when the source cannot be framed
        out = format!("error: {}\n", report);
    }
    out
}

/// Render one diagnostic into a writer.
pub fn write_diagnostic<D>(
    diag: D,
    file_path: &str,
    source: &str,
    style: ReportStyle,
    w: &mut dyn Write,
) -> std::io::Result<()>
where
    D: Diagnostic + Send + Sync + 'static,
{
    w.write_all(render_diagnostic(diag, file_path, source, style).as_bytes())
}

/// One diagnostic in the `<line>: <message>` form; line 0 means unknown.
pub fn plain_line(line: u32, message: &str) -> String {
    if line == 0 {
        message.to_string()
    } else {
        format!("{}: {}", line, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{LexerError, SemanticError, SemanticWarning};

    #[test]
    fn lexer_error_shows_code_and_label() {
        let err = LexerError::UnexpectedCharacter {
            ch: '@',
            span: (0, 1).into(),
        };
        let output = render_diagnostic(err, "test.cb", "@", ReportStyle::Ascii);
        assert!(output.contains("E0001"));
        assert!(output.contains("unexpected character '@'"));
        assert!(output.contains("test.cb"));
    }

    #[test]
    fn semantic_error_points_at_identifier() {
        let err = SemanticError::UndeclaredIdentifier {
            name: "y".to_string(),
            span: (4, 1).into(),
        };
        let output = render_diagnostic(err, "test.cb", "x = y;", ReportStyle::Ascii);
        assert!(output.contains("E2003"));
        assert!(output.contains("undeclared identifier 'y'"));
        assert!(output.contains("not found in scope"));
    }

    #[test]
    fn plain_lines_omit_unknown_line() {
        assert_eq!(plain_line(7, "bad"), "7: bad");
        assert_eq!(plain_line(0, "missing Main"), "missing Main");
    }

    #[test]
    fn ascii_style_has_no_escape_codes() {
        let warning = SemanticWarning::UnreachableCode {
            span: (0, 6).into(),
        };
        let mut out = Vec::new();
        write_diagnostic(warning, "w.cb", "return;", ReportStyle::Ascii, &mut out).unwrap();
        let out = String::from_utf8(out).unwrap();
        assert!(!out.contains('\u{1b}'));
        assert!(out.contains("W2"));
    }
}
