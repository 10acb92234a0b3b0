// src/frontend/parse_expr.rs
//
// Expression parsing: precedence climbing over binary operators, then unary
// minus, postfix chains and primaries.

use super::ast::*;
use super::lexer::unescape;
use super::parser::{ParseError, Parser};
use super::token::TokenType;
use super::Span;
use crate::errors::ParserError;

impl<'src> Parser<'src> {
    /// Parse an expression with Pratt parsing
    pub(super) fn expression(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let mut left = self.unary()?;

        while self.current.ty.precedence() > min_prec {
            let op_token = self.current.clone();
            let op = match op_token.ty {
                TokenType::Plus => BinaryOp::Add,
                TokenType::Minus => BinaryOp::Sub,
                TokenType::Star => BinaryOp::Mul,
                TokenType::Slash => BinaryOp::Div,
                TokenType::Percent => BinaryOp::Mod,
                TokenType::AmpAmp => BinaryOp::And,
                TokenType::PipePipe => BinaryOp::Or,
                TokenType::EqEq => BinaryOp::Eq,
                TokenType::BangEq => BinaryOp::Ne,
                TokenType::Lt => BinaryOp::Lt,
                TokenType::Gt => BinaryOp::Gt,
                TokenType::LtEq => BinaryOp::Le,
                TokenType::GtEq => BinaryOp::Ge,
                _ => break,
            };

            let prec = op_token.ty.precedence();
            self.advance();
            let right = self.expression(prec)?;
            let span = left.span.merge(right.span);

            left = Expr {
                id: self.next_id(),
                kind: ExprKind::Binary(Box::new(BinaryExpr { left, op, right })),
                span,
            };
        }

        Ok(left)
    }

    /// Unary minus. A minus directly applied to an integer literal folds into
    /// a negative literal, which is how `-2147483648` stays representable.
    fn unary(&mut self) -> Result<Expr, ParseError> {
        if self.check(TokenType::Minus) {
            let op_span = self.current.span;
            self.advance();

            if self.check(TokenType::IntLiteral) {
                let token = self.current.clone();
                self.advance();
                let span = op_span.merge(token.span);
                let value = Self::int_value(&token.lexeme, true, span)?;
                let literal = Expr {
                    id: self.next_id(),
                    kind: ExprKind::IntLiteral(value),
                    span,
                };
                return self.postfix(literal);
            }

            let operand = self.unary()?;
            let span = op_span.merge(operand.span);
            return Ok(Expr {
                id: self.next_id(),
                kind: ExprKind::Unary(Box::new(UnaryExpr {
                    op: UnaryOp::Neg,
                    operand,
                })),
                span,
            });
        }

        let primary = self.primary()?;
        self.postfix(primary)
    }

    /// Calls, member access and indexing, applied left to right
    fn postfix(&mut self, mut expr: Expr) -> Result<Expr, ParseError> {
        loop {
            if self.match_token(TokenType::LParen) {
                let args = self.arguments()?;
                let span = expr.span.merge(self.previous.span);
                expr = Expr {
                    id: self.next_id(),
                    kind: ExprKind::Call(Box::new(CallExpr { callee: expr, args })),
                    span,
                };
            } else if self.match_token(TokenType::Dot) {
                let field_span = self.current.span;
                let field = self.identifier()?;
                let span = expr.span.merge(field_span);
                expr = Expr {
                    id: self.next_id(),
                    kind: ExprKind::Field(Box::new(FieldExpr {
                        object: expr,
                        field,
                        field_span,
                    })),
                    span,
                };
            } else if self.match_token(TokenType::LBracket) {
                let index = self.expression(0)?;
                self.consume(TokenType::RBracket, "]")?;
                let span = expr.span.merge(self.previous.span);
                expr = Expr {
                    id: self.next_id(),
                    kind: ExprKind::Index(Box::new(IndexExpr {
                        object: expr,
                        index,
                    })),
                    span,
                };
            } else {
                break;
            }
        }
        Ok(expr)
    }

    /// Argument list after the opening paren: `[out] expr, ...)`
    fn arguments(&mut self) -> Result<Vec<Argument>, ParseError> {
        let mut args = Vec::new();
        if !self.check(TokenType::RParen) {
            loop {
                let out = self.match_token(TokenType::KwOut);
                let value = self.expression(0)?;
                args.push(Argument { out, value });
                if !self.match_token(TokenType::Comma) {
                    break;
                }
            }
        }
        self.consume(TokenType::RParen, ")")?;
        Ok(args)
    }

    /// Parse a primary expression (literals, identifiers, grouping, `new`)
    fn primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.current.clone();

        let kind = match token.ty {
            TokenType::IntLiteral => {
                self.advance();
                ExprKind::IntLiteral(Self::int_value(&token.lexeme, false, token.span)?)
            }
            TokenType::StringLiteral => {
                self.advance();
                ExprKind::StringLiteral(unescape(&token.lexeme))
            }
            TokenType::KwTrue => {
                self.advance();
                ExprKind::BoolLiteral(true)
            }
            TokenType::KwFalse => {
                self.advance();
                ExprKind::BoolLiteral(false)
            }
            TokenType::Identifier => {
                self.advance();
                ExprKind::Identifier(self.interner.intern(&token.lexeme))
            }
            TokenType::LParen => {
                self.advance();
                let expr = self.expression(0)?;
                self.consume(TokenType::RParen, ")")?;
                return Ok(expr);
            }
            TokenType::KwNew => return self.new_expr(),
            _ => {
                return Err(self.error_here(ParserError::ExpectedExpression {
                    found: self.found(),
                    span: token.span.into(),
                }));
            }
        };

        Ok(Expr {
            id: self.next_id(),
            kind,
            span: token.span,
        })
    }

    /// `new T[length]` or `new S()`
    fn new_expr(&mut self) -> Result<Expr, ParseError> {
        let start_span = self.current.span;
        self.consume(TokenType::KwNew, "new")?;

        let name_span = self.current.span;
        let element = self.parse_base_type()?;

        let kind = if self.match_token(TokenType::LBracket) {
            let length = self.expression(0)?;
            self.consume(TokenType::RBracket, "]")?;
            ExprKind::NewArray(Box::new(NewArrayExpr { element, length }))
        } else {
            let TypeExpr::Named(name, _) = element else {
                return Err(self.error_here(ParserError::ExpectedToken {
                    expected: "[".to_string(),
                    found: self.found(),
                    span: self.current.span.into(),
                }));
            };
            self.consume(TokenType::LParen, "(")?;
            self.consume(TokenType::RParen, ")")?;
            ExprKind::NewStruct(NewStructExpr { name, name_span })
        };

        Ok(Expr {
            id: self.next_id(),
            kind,
            span: start_span.merge(self.previous.span),
        })
    }

    /// Convert a decimal lexeme to a 32-bit value, applying a folded sign
    fn int_value(lexeme: &str, negative: bool, span: Span) -> Result<i32, ParseError> {
        let out_of_range = || {
            let value = if negative {
                format!("-{}", lexeme)
            } else {
                lexeme.to_string()
            };
            ParseError::new(
                ParserError::IntegerOutOfRange {
                    value,
                    span: span.into(),
                },
                span,
            )
        };

        let magnitude: i64 = lexeme.parse().map_err(|_| out_of_range())?;
        let value = if negative { -magnitude } else { magnitude };
        i32::try_from(value).map_err(|_| out_of_range())
    }
}
