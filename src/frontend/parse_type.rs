// src/frontend/parse_type.rs
//
// Type expressions and formal parameter lists.

use super::TokenType;
use super::ast::{Param, PrimitiveType, TypeExpr};
use super::parser::{ParseError, Parser};
use crate::errors::ParserError;

impl<'src> Parser<'src> {
    /// Whether the current token can start a type
    pub(super) fn at_type_start(&self) -> bool {
        matches!(
            self.current.ty,
            TokenType::KwInt | TokenType::KwBool | TokenType::KwString | TokenType::Identifier
        )
    }

    /// Parse a type: `int`, `bool`, `string`, a struct name, each optionally
    /// followed by one or more `[]`
    pub(super) fn parse_type(&mut self) -> Result<TypeExpr, ParseError> {
        let mut ty = self.parse_base_type()?;
        while self.check(TokenType::LBracket) && self.peek_types(1)[0] == TokenType::RBracket {
            self.advance();
            self.advance();
            ty = TypeExpr::Array(Box::new(ty));
        }
        Ok(ty)
    }

    /// Parse a type name without array suffixes
    pub(super) fn parse_base_type(&mut self) -> Result<TypeExpr, ParseError> {
        let ty = match self.current.ty {
            TokenType::KwInt => TypeExpr::Primitive(PrimitiveType::Int),
            TokenType::KwBool => TypeExpr::Primitive(PrimitiveType::Bool),
            TokenType::KwString => TypeExpr::Primitive(PrimitiveType::String),
            TokenType::Identifier => {
                let span = self.current.span;
                let sym = self.interner.intern(&self.current.lexeme);
                TypeExpr::Named(sym, span)
            }
            _ => {
                return Err(self.error_here(ParserError::ExpectedType {
                    found: self.found(),
                    span: self.current.span.into(),
                }));
            }
        };
        self.advance();
        Ok(ty)
    }

    /// Parse a formal parameter: `Type name`
    pub(super) fn parse_param(&mut self) -> Result<Param, ParseError> {
        let start_span = self.current.span;
        let ty = self.parse_type()?;
        let name = self.identifier()?;
        Ok(Param {
            name,
            ty,
            span: start_span.merge(self.previous.span),
        })
    }

    /// Parse `( [param {, param}] )`
    pub(super) fn parse_params(&mut self) -> Result<Vec<Param>, ParseError> {
        self.consume(TokenType::LParen, "(")?;
        let mut params = Vec::new();
        if !self.check(TokenType::RParen) {
            loop {
                params.push(self.parse_param()?);
                if !self.match_token(TokenType::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenType::RParen, ")")?;
        Ok(params)
    }
}
