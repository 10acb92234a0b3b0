// src/frontend/parse_decl.rs
//
// Class member declarations: constants, structs and methods.

use super::ast::*;
use super::parser::{ParseError, Parser};
use super::token::TokenType;
use crate::errors::ParserError;

impl<'src> Parser<'src> {
    /// Parse one class member, after any modifiers
    pub(super) fn declaration(&mut self) -> Result<Decl, ParseError> {
        self.skip_modifiers();
        let start_span = self.current.span;

        match self.current.ty {
            TokenType::KwConst => self.const_decl().map(Decl::Const),
            TokenType::KwStruct => self.struct_decl().map(Decl::Struct),
            TokenType::KwVoid => {
                self.advance();
                self.method_decl(None, start_span).map(Decl::Method)
            }
            _ if self.at_type_start() => {
                let return_type = self.parse_type()?;
                self.method_decl(Some(return_type), start_span)
                    .map(Decl::Method)
            }
            _ => Err(self.error_here(ParserError::ExpectedDeclaration {
                found: self.found(),
                span: self.current.span.into(),
            })),
        }
    }

    /// `const Type name = literal;`
    fn const_decl(&mut self) -> Result<ConstDecl, ParseError> {
        let start_span = self.current.span;
        self.consume(TokenType::KwConst, "const")?;
        let ty = self.parse_type()?;
        let name = self.identifier()?;
        self.consume(TokenType::Eq, "=")?;

        let value = self.expression(0)?;
        if !matches!(
            value.kind,
            ExprKind::IntLiteral(_) | ExprKind::StringLiteral(_) | ExprKind::BoolLiteral(_)
        ) {
            return Err(ParseError::new(
                ParserError::ExpectedLiteral {
                    span: value.span.into(),
                },
                value.span,
            ));
        }

        self.consume(TokenType::Semicolon, ";")?;
        Ok(ConstDecl {
            ty,
            name,
            value,
            span: start_span.merge(self.previous.span),
        })
    }

    /// `struct Name { [modifiers] Type a, b; ... }`
    fn struct_decl(&mut self) -> Result<StructDecl, ParseError> {
        let start_span = self.current.span;
        self.consume(TokenType::KwStruct, "struct")?;
        let name = self.identifier()?;
        self.consume(TokenType::LBrace, "{")?;

        let mut fields = Vec::new();
        while !self.check(TokenType::RBrace) && !self.check(TokenType::Eof) {
            self.skip_modifiers();
            let field_start = self.current.span;
            let ty = self.parse_type()?;
            let names = self.name_list()?;
            self.consume(TokenType::Semicolon, ";")?;
            fields.push(FieldDecl {
                ty,
                names,
                span: field_start.merge(self.previous.span),
            });
        }
        self.consume(TokenType::RBrace, "}")?;

        Ok(StructDecl {
            name,
            fields,
            span: start_span.merge(self.previous.span),
        })
    }

    /// Method header after the result type, then its body
    fn method_decl(
        &mut self,
        return_type: Option<TypeExpr>,
        start_span: super::Span,
    ) -> Result<MethodDecl, ParseError> {
        let id = self.next_id();
        let name = self.identifier()?;
        let params = self.parse_params()?;
        let header_span = start_span.merge(self.previous.span);
        let body = self.block()?;

        Ok(MethodDecl {
            id,
            name,
            params,
            return_type,
            body,
            span: header_span,
        })
    }

    /// `a, b, c` with spans for each name
    pub(super) fn name_list(&mut self) -> Result<Vec<(Symbol, super::Span)>, ParseError> {
        let mut names = Vec::new();
        loop {
            let span = self.current.span;
            let name = self.identifier()?;
            names.push((name, span));
            if !self.match_token(TokenType::Comma) {
                break;
            }
        }
        Ok(names)
    }
}
