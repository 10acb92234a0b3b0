// src/commands/common.rs
//! Shared compilation pipeline for the CLI commands.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use miette::Diagnostic;

use crate::codegen::{self, Assembly};
use crate::errors::{CodegenError, LexerError, ReportStyle, plain_line, write_diagnostic};
use crate::frontend::{Interner, ParseError, Parser, Program};
use crate::sema::{AnalysisOutput, Analyzer, TypeError, TypeWarning};

/// Errors that can stop the compilation pipeline.
///
/// Each variant carries the structured errors of the phase that failed so
/// callers can inspect them or render them via [`render_pipeline_error`].
#[derive(Debug)]
pub enum PipelineError {
    /// Lexer encountered invalid tokens
    Lex(Vec<LexerError>),
    /// Parser encountered a syntax error
    Parse(ParseError),
    /// Type checking failed
    Sema(Vec<TypeError>),
    /// Code generation failed
    Codegen(CodegenError),
    /// Reading or writing a file failed
    Io { path: PathBuf, source: io::Error },
}

/// Options for one run of the pipeline.
pub struct PipelineOptions<'a> {
    pub source: &'a str,
    pub file_path: &'a str,
    /// Render diagnostics as `<line>: <message>` instead of miette reports
    pub plain: bool,
}

/// A program that parsed and type-checked cleanly.
pub struct CheckedProgram {
    pub program: Program,
    pub interner: Interner,
    pub analysis: AnalysisOutput,
}

pub fn read_source(path: &Path) -> Result<String, PipelineError> {
    fs::read_to_string(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Lex and parse. Lexer errors take precedence over the parse error they
/// usually cause.
pub fn parse_source(source: &str) -> Result<(Program, Interner), PipelineError> {
    let _span = tracing::info_span!("parse").entered();
    let mut parser = Parser::new(source);
    let parsed = parser.parse_program();

    let lexer_errors = parser.take_lexer_errors();
    if !lexer_errors.is_empty() {
        return Err(PipelineError::Lex(lexer_errors));
    }
    let program = parsed.map_err(PipelineError::Parse)?;
    tracing::debug!(
        declarations = program.declarations.len(),
        "parsed program"
    );
    Ok((program, parser.into_interner()))
}

/// Parse and type-check.
///
/// Warnings are rendered to `warnings` whether or not checking succeeds;
/// errors are returned for the caller to render.
pub fn check_source(
    opts: &PipelineOptions<'_>,
    warnings: &mut dyn Write,
) -> Result<CheckedProgram, PipelineError> {
    let (program, interner) = parse_source(opts.source)?;

    let _span = tracing::info_span!("sema").entered();
    let mut analyzer = Analyzer::new();
    let result = analyzer.analyze(&program, &interner);
    for warning in analyzer.warnings() {
        render_sema_warning(warning, opts, warnings);
    }
    result.map_err(PipelineError::Sema)?;

    Ok(CheckedProgram {
        program,
        interner,
        analysis: analyzer.into_output(),
    })
}

/// Run the full pipeline: parse, check, generate.
pub fn compile_source(
    opts: &PipelineOptions<'_>,
    warnings: &mut dyn Write,
) -> Result<Assembly, PipelineError> {
    let checked = check_source(opts, warnings)?;
    let _span = tracing::info_span!("codegen").entered();
    codegen::generate(&checked.program, &checked.analysis, &checked.interner)
        .map_err(PipelineError::Codegen)
}

/// Source line of a diagnostic's first label, 0 when it has none
fn diagnostic_line(diag: &dyn Diagnostic, source: &str) -> u32 {
    let offset = diag
        .labels()
        .and_then(|mut labels| labels.next())
        .map(|label| label.offset());
    match offset {
        Some(offset) => {
            let end = offset.min(source.len());
            source.as_bytes()[..end]
                .iter()
                .filter(|&&b| b == b'\n')
                .count() as u32
                + 1
        }
        None => 0,
    }
}

/// Render a miette diagnostic with source context.
fn render_report<D>(diag: D, opts: &PipelineOptions<'_>, w: &mut dyn Write)
where
    D: Diagnostic + Send + Sync + 'static,
{
    let _ = write_diagnostic(
        diag,
        opts.file_path,
        opts.source,
        ReportStyle::detect(),
        w,
    );
}

fn render_sema_warning(warning: &TypeWarning, opts: &PipelineOptions<'_>, w: &mut dyn Write) {
    if opts.plain {
        let _ = writeln!(w, "{}", warning.plain());
    } else {
        render_report(warning.warning.clone(), opts, w);
    }
}

/// Render a pipeline error to a writer.
///
/// This is the single rendering entry point for compilation failures.
pub fn render_pipeline_error(err: &PipelineError, opts: &PipelineOptions<'_>, w: &mut dyn Write) {
    match err {
        PipelineError::Lex(errors) => {
            for e in errors {
                if opts.plain {
                    let line = diagnostic_line(e, opts.source);
                    let _ = writeln!(w, "{}", plain_line(line, &e.to_string()));
                } else {
                    render_report(e.clone(), opts, w);
                }
            }
        }
        PipelineError::Parse(e) => {
            if opts.plain {
                let _ = writeln!(w, "{}", plain_line(e.span.line, &e.error.to_string()));
            } else {
                render_report(e.error.clone(), opts, w);
            }
        }
        PipelineError::Sema(errors) => {
            for e in errors {
                if opts.plain {
                    let _ = writeln!(w, "{}", e.plain());
                } else {
                    render_report(e.error.clone(), opts, w);
                }
            }
        }
        PipelineError::Codegen(e) => {
            let _ = writeln!(w, "error: {}", e);
        }
        PipelineError::Io { path, source } => {
            let _ = writeln!(w, "error: could not access '{}': {}", path.display(), source);
        }
    }
}
