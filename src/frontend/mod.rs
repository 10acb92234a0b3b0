// src/frontend/mod.rs
pub mod ast;
pub mod ast_display;
pub mod intern;
pub mod lexer;
mod parse_decl;
mod parse_expr;
mod parse_stmt;
mod parse_type;
pub mod parser;
pub mod token;

pub use ast::*;
pub use ast_display::AstPrinter;
pub use intern::Interner;
pub use lexer::Lexer;
pub use parser::{ParseError, Parser};
pub use token::{Span, Token, TokenType};
