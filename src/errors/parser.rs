// src/errors/parser.rs
//! Parser errors (E1xxx).

#![allow(unused_assignments)] // False positives from thiserror derive

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone)]
pub enum ParserError {
    #[error("expected expression, found '{found}'")]
    #[diagnostic(code(E1001))]
    ExpectedExpression {
        found: String,
        #[label("expected expression")]
        span: SourceSpan,
    },

    #[error("expected '{expected}', found '{found}'")]
    #[diagnostic(code(E1002))]
    ExpectedToken {
        expected: String,
        found: String,
        #[label("unexpected token")]
        span: SourceSpan,
    },

    #[error("unexpected token '{token}'")]
    #[diagnostic(code(E1003))]
    UnexpectedToken {
        token: String,
        #[label("unexpected")]
        span: SourceSpan,
    },

    #[error("expected type, found '{found}'")]
    #[diagnostic(code(E1004))]
    ExpectedType {
        found: String,
        #[label("expected type")]
        span: SourceSpan,
    },

    #[error("expected identifier, found '{found}'")]
    #[diagnostic(code(E1006))]
    ExpectedIdentifier {
        found: String,
        #[label("expected identifier")]
        span: SourceSpan,
    },

    #[error("expected block")]
    #[diagnostic(code(E1007), help("blocks start with '{{'"))]
    ExpectedBlock {
        #[label("expected block here")]
        span: SourceSpan,
    },

    #[error("expected declaration, found '{found}'")]
    #[diagnostic(
        code(E1008),
        help("class members are const, struct, or static method declarations")
    )]
    ExpectedDeclaration {
        found: String,
        #[label("expected declaration")]
        span: SourceSpan,
    },

    #[error("constant initializer must be a literal")]
    #[diagnostic(code(E1009))]
    ExpectedLiteral {
        #[label("not a literal")]
        span: SourceSpan,
    },

    #[error("only calls, assignments, '++' and '--' can be used as statements")]
    #[diagnostic(code(E1010))]
    InvalidStatement {
        #[label("not a statement")]
        span: SourceSpan,
    },

    #[error("integer literal {value} does not fit in 32 bits")]
    #[diagnostic(code(E1011))]
    IntegerOutOfRange {
        value: String,
        #[label("out of range")]
        span: SourceSpan,
    },

    #[error("lexer error: {message}")]
    #[diagnostic(code(E1099))]
    LexerError {
        message: String,
        #[label("{message}")]
        span: SourceSpan,
    },
}
