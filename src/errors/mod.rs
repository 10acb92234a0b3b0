// src/errors/mod.rs
//! Structured error reporting for the CFlat compiler.
//!
//! Front-end and semantic errors derive miette diagnostics so they can be
//! rendered with source context. Code generation failures are plain
//! thiserror values: they indicate a compiler fault, not a user mistake.

pub mod codegen;
pub mod lexer;
pub mod parser;
pub mod report;
pub mod sema;

pub use codegen::CodegenError;
pub use lexer::LexerError;
pub use parser::ParserError;
pub use report::{ReportStyle, plain_line, render_diagnostic, write_diagnostic};
pub use sema::{SemanticError, SemanticWarning};
