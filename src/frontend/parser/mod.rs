// src/frontend/parser/mod.rs

use crate::errors::{LexerError, ParserError};
use crate::frontend::{Interner, Lexer, Span, Token, TokenType, ast::*};

pub struct Parser<'src> {
    pub(super) lexer: Lexer<'src>,
    pub(super) current: Token,
    pub(super) previous: Token,
    pub(super) interner: Interner,
    next_node_id: u32,
}

/// A parse error wrapping a miette-enabled ParserError
#[derive(Debug)]
pub struct ParseError {
    pub error: ParserError,
    pub span: Span,
}

impl ParseError {
    pub fn new(error: ParserError, span: Span) -> Self {
        Self { error, span }
    }
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        Self {
            lexer,
            current,
            previous: Token::new(TokenType::Eof, "", Span::default()),
            interner: Interner::new(),
            next_node_id: 0,
        }
    }

    /// Generate a unique node ID
    pub(super) fn next_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.expression(0)
    }

    /// Parse a whole compilation unit:
    /// `using X; ... class Name { members }`
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let start_span = self.current.span;

        let mut usings = Vec::new();
        while self.match_token(TokenType::KwUsing) {
            let span = self.current.span;
            let name = self.identifier()?;
            self.consume(TokenType::Semicolon, ";")?;
            usings.push(UsingClause { name, span });
        }

        self.skip_modifiers();
        self.consume(TokenType::KwClass, "class")?;
        let class_name = self.identifier()?;
        self.consume(TokenType::LBrace, "{")?;

        let mut declarations = Vec::new();
        while !self.check(TokenType::RBrace) && !self.check(TokenType::Eof) {
            declarations.push(self.declaration()?);
        }
        self.consume(TokenType::RBrace, "}")?;

        if !self.check(TokenType::Eof) {
            return Err(self.unexpected_token_error());
        }

        let span = start_span.merge(self.previous.span);
        Ok(Program {
            usings,
            class_name,
            declarations,
            span,
        })
    }

    /// Get a reference to the interner
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Consume the parser and return the interner
    pub fn into_interner(self) -> Interner {
        self.interner
    }

    /// Take lexer errors (for diagnostic rendering)
    pub fn take_lexer_errors(&mut self) -> Vec<LexerError> {
        self.lexer.take_errors()
    }

    /// Advance to the next token
    pub(super) fn advance(&mut self) {
        self.previous = std::mem::replace(&mut self.current, self.lexer.next_token());
    }

    /// Check if the current token matches the given type
    pub(super) fn check(&self, ty: TokenType) -> bool {
        self.current.ty == ty
    }

    /// Token types after the current one, without consuming anything
    pub(super) fn peek_types(&self, count: usize) -> Vec<TokenType> {
        let mut lookahead = self.lexer.clone();
        (0..count).map(|_| lookahead.next_token().ty).collect()
    }

    /// Consume the current token if it matches, otherwise return false
    pub(super) fn match_token(&mut self, ty: TokenType) -> bool {
        if self.check(ty) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Require a token of the given type, or return an error
    pub(super) fn consume(&mut self, ty: TokenType, expected: &str) -> Result<(), ParseError> {
        if self.check(ty) {
            self.advance();
            Ok(())
        } else {
            Err(self.error_here(ParserError::ExpectedToken {
                expected: expected.to_string(),
                found: self.found(),
                span: self.current.span.into(),
            }))
        }
    }

    /// Require an identifier and intern it
    pub(super) fn identifier(&mut self) -> Result<Symbol, ParseError> {
        if !self.check(TokenType::Identifier) {
            return Err(self.error_here(ParserError::ExpectedIdentifier {
                found: self.found(),
                span: self.current.span.into(),
            }));
        }
        let sym = self.interner.intern(&self.current.lexeme);
        self.advance();
        Ok(sym)
    }

    /// Text of the current token for error messages
    pub(super) fn found(&self) -> String {
        if self.current.lexeme.is_empty() {
            self.current.ty.as_str().to_string()
        } else {
            self.current.lexeme.clone()
        }
    }

    /// Skip `public` / `static` modifiers; they carry no meaning in CFlat
    pub(super) fn skip_modifiers(&mut self) {
        while self.match_token(TokenType::KwPublic) || self.match_token(TokenType::KwStatic) {}
    }

    /// Build an error at the current token. An error token from the lexer
    /// takes precedence so the lexer's message is not masked.
    pub(super) fn error_here(&self, error: ParserError) -> ParseError {
        if self.current.ty == TokenType::Error {
            return ParseError::new(
                ParserError::LexerError {
                    message: self.current.lexeme.clone(),
                    span: self.current.span.into(),
                },
                self.current.span,
            );
        }
        ParseError::new(error, self.current.span)
    }

    /// Create an unexpected token error at the current position
    pub(super) fn unexpected_token_error(&self) -> ParseError {
        self.error_here(ParserError::UnexpectedToken {
            token: self.found(),
            span: self.current.span.into(),
        })
    }
}

#[cfg(test)]
mod tests;
