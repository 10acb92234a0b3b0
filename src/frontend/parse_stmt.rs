// src/frontend/parse_stmt.rs
//
// Statement parsing.

use super::ast::*;
use super::parser::{ParseError, Parser};
use super::token::TokenType;
use crate::errors::ParserError;

impl<'src> Parser<'src> {
    /// Parse a block: `{ statements }`
    pub(super) fn block(&mut self) -> Result<Block, ParseError> {
        let start_span = self.current.span;
        if !self.check(TokenType::LBrace) {
            return Err(self.error_here(ParserError::ExpectedBlock {
                span: self.current.span.into(),
            }));
        }
        self.advance();

        let mut stmts = Vec::new();
        while !self.check(TokenType::RBrace) && !self.check(TokenType::Eof) {
            stmts.push(self.statement()?);
        }

        self.consume(TokenType::RBrace, "}")?;
        let span = start_span.merge(self.previous.span);

        Ok(Block { stmts, span })
    }

    /// Parse a statement
    pub(super) fn statement(&mut self) -> Result<Stmt, ParseError> {
        match self.current.ty {
            TokenType::LBrace => Ok(Stmt::Block(self.block()?)),
            TokenType::Semicolon => {
                let span = self.current.span;
                self.advance();
                Ok(Stmt::Empty(span))
            }
            TokenType::KwIf => self.if_stmt(),
            TokenType::KwWhile => self.while_stmt(),
            TokenType::KwBreak => {
                let span = self.current.span;
                self.advance();
                self.consume(TokenType::Semicolon, ";")?;
                Ok(Stmt::Break(span))
            }
            TokenType::KwReturn => self.return_stmt(),
            _ if self.at_local_decl() => self.local_decl(),
            _ => self.simple_stmt(),
        }
    }

    /// A local declaration starts with a primitive type keyword, or with a
    /// struct name followed by another name or by `[]`.
    fn at_local_decl(&self) -> bool {
        match self.current.ty {
            TokenType::KwInt | TokenType::KwBool | TokenType::KwString => true,
            TokenType::Identifier => {
                let ahead = self.peek_types(2);
                ahead[0] == TokenType::Identifier
                    || (ahead[0] == TokenType::LBracket && ahead[1] == TokenType::RBracket)
            }
            _ => false,
        }
    }

    /// `Type a, b;`
    fn local_decl(&mut self) -> Result<Stmt, ParseError> {
        let start_span = self.current.span;
        let ty = self.parse_type()?;
        let names = self.name_list()?;
        self.consume(TokenType::Semicolon, ";")?;
        Ok(Stmt::LocalDecl(LocalDecl {
            ty,
            names,
            span: start_span.merge(self.previous.span),
        }))
    }

    /// Assignment, call, `++` or `--`
    fn simple_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start_span = self.current.span;
        let target = self.expression(0)?;

        let stmt = if self.match_token(TokenType::Eq) {
            let value = self.expression(0)?;
            self.consume(TokenType::Semicolon, ";")?;
            Stmt::Assign(AssignStmt {
                target,
                value,
                span: start_span.merge(self.previous.span),
            })
        } else if self.match_token(TokenType::PlusPlus) {
            self.consume(TokenType::Semicolon, ";")?;
            Stmt::Increment(IncDecStmt {
                target,
                span: start_span.merge(self.previous.span),
            })
        } else if self.match_token(TokenType::MinusMinus) {
            self.consume(TokenType::Semicolon, ";")?;
            Stmt::Decrement(IncDecStmt {
                target,
                span: start_span.merge(self.previous.span),
            })
        } else if matches!(target.kind, ExprKind::Call(_)) {
            self.consume(TokenType::Semicolon, ";")?;
            Stmt::Call(CallStmt {
                call: target,
                span: start_span.merge(self.previous.span),
            })
        } else {
            return Err(ParseError::new(
                ParserError::InvalidStatement {
                    span: target.span.into(),
                },
                target.span,
            ));
        };

        Ok(stmt)
    }

    /// `if (cond) stmt [else stmt]`
    fn if_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start_span = self.current.span;
        self.consume(TokenType::KwIf, "if")?;
        self.consume(TokenType::LParen, "(")?;
        let condition = self.expression(0)?;
        self.consume(TokenType::RParen, ")")?;

        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.match_token(TokenType::KwElse) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };

        Ok(Stmt::If(IfStmt {
            condition,
            then_branch,
            else_branch,
            span: start_span.merge(self.previous.span),
        }))
    }

    /// `while (cond) stmt`
    fn while_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start_span = self.current.span;
        self.consume(TokenType::KwWhile, "while")?;
        self.consume(TokenType::LParen, "(")?;
        let condition = self.expression(0)?;
        self.consume(TokenType::RParen, ")")?;
        let body = Box::new(self.statement()?);

        Ok(Stmt::While(WhileStmt {
            condition,
            body,
            span: start_span.merge(self.previous.span),
        }))
    }

    /// `return [expr];`
    fn return_stmt(&mut self) -> Result<Stmt, ParseError> {
        let start_span = self.current.span;
        self.consume(TokenType::KwReturn, "return")?;

        let value = if self.check(TokenType::Semicolon) {
            None
        } else {
            Some(self.expression(0)?)
        };
        self.consume(TokenType::Semicolon, ";")?;

        Ok(Stmt::Return(ReturnStmt {
            value,
            span: start_span.merge(self.previous.span),
        }))
    }
}
