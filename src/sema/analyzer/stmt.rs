// src/sema/analyzer/stmt.rs

use super::Analyzer;
use crate::errors::{SemanticError, SemanticWarning};
use crate::frontend::*;
use crate::sema::TypeId;

impl Analyzer {
    /// Check a block in its own scope
    pub(super) fn check_block(&mut self, block: &Block, interner: &Interner) {
        self.symbols.enter_scope();

        let mut terminated = false;
        let mut warned = false;
        for stmt in &block.stmts {
            if terminated && !warned && !matches!(stmt, Stmt::Empty(_)) {
                let span = stmt.span();
                self.add_warning(
                    SemanticWarning::UnreachableCode { span: span.into() },
                    span,
                );
                warned = true;
            }
            self.check_stmt(stmt, interner);
            if matches!(stmt, Stmt::Return(_) | Stmt::Break(_)) {
                terminated = true;
            }
        }

        if let Err(e) = self.symbols.exit_scope() {
            tracing::error!(error = %e, "symbol table out of step with block nesting");
        }
    }

    fn check_stmt(&mut self, stmt: &Stmt, interner: &Interner) {
        match stmt {
            Stmt::LocalDecl(decl) => self.check_local_decl(decl, interner),
            Stmt::Assign(assign) => {
                let target = self.check_expr(&assign.target, interner);
                let value = self.check_expr(&assign.value, interner);
                if !self.is_assignable(&assign.target) {
                    self.add_error(
                        SemanticError::NotAssignable {
                            span: assign.target.span.into(),
                        },
                        assign.target.span,
                    );
                } else if !target.is_error() && !value.is_error() && target != value {
                    self.add_error(
                        SemanticError::AssignmentTypeMismatch {
                            target: self.type_name(target),
                            value: self.type_name(value),
                            span: assign.span.into(),
                        },
                        assign.span,
                    );
                }
            }
            Stmt::Call(call) => {
                self.check_expr(&call.call, interner);
            }
            Stmt::Increment(inc) => self.check_inc_dec("++", inc, interner),
            Stmt::Decrement(dec) => self.check_inc_dec("--", dec, interner),
            Stmt::If(if_stmt) => {
                self.check_condition(&if_stmt.condition, interner);
                self.check_branch(&if_stmt.then_branch, interner);
                if let Some(else_branch) = &if_stmt.else_branch {
                    self.check_branch(else_branch, interner);
                }
            }
            Stmt::While(while_stmt) => {
                self.check_condition(&while_stmt.condition, interner);
                self.loop_depth += 1;
                self.check_branch(&while_stmt.body, interner);
                self.loop_depth -= 1;
            }
            Stmt::Break(span) => {
                if self.loop_depth == 0 {
                    self.add_error(SemanticError::BreakOutsideLoop { span: (*span).into() }, *span);
                }
            }
            Stmt::Return(ret) => self.check_return(ret, interner),
            Stmt::Block(block) => self.check_block(block, interner),
            Stmt::Empty(_) => {}
        }
    }

    /// A branch that is a single statement still gets its own scope, so a
    /// declaration there does not leak into the enclosing block.
    fn check_branch(&mut self, stmt: &Stmt, interner: &Interner) {
        if let Stmt::Block(block) = stmt {
            self.check_block(block, interner);
        } else {
            self.symbols.enter_scope();
            self.check_stmt(stmt, interner);
            if let Err(e) = self.symbols.exit_scope() {
                tracing::error!(error = %e, "symbol table out of step with branch nesting");
            }
        }
    }

    fn check_local_decl(&mut self, decl: &LocalDecl, interner: &Interner) {
        let ty = self.resolve_type(&decl.ty, interner);
        let words = self.registry.words_of(ty);
        for (name, span) in &decl.names {
            match self.symbols.bind(*name, span.line, ty) {
                Ok(_) => self.local_slots += words,
                Err(_) => self.add_error(
                    SemanticError::DuplicateLocal {
                        name: interner.resolve(*name).to_string(),
                        span: (*span).into(),
                    },
                    *span,
                ),
            }
        }
    }

    fn check_inc_dec(&mut self, op: &'static str, stmt: &IncDecStmt, interner: &Interner) {
        let target = self.check_expr(&stmt.target, interner);
        if !self.is_assignable(&stmt.target) {
            self.add_error(
                SemanticError::NotAssignable {
                    span: stmt.target.span.into(),
                },
                stmt.target.span,
            );
            return;
        }
        self.basic_type_check(op, &[target], TypeId::INT, TypeId::INT, stmt.span);
    }

    fn check_condition(&mut self, condition: &Expr, interner: &Interner) {
        let ty = self.check_expr(condition, interner);
        if !ty.is_error() && ty != TypeId::BOOL {
            self.add_error(
                SemanticError::InvalidCondition {
                    found: self.type_name(ty),
                    span: condition.span.into(),
                },
                condition.span,
            );
        }
    }

    fn check_return(&mut self, ret: &ReturnStmt, interner: &Interner) {
        let found = match &ret.value {
            Some(value) => self.check_expr(value, interner),
            None => TypeId::VOID,
        };
        let expected = self.current_return;
        if !found.is_error() && !expected.is_error() && found != expected {
            self.add_error(
                SemanticError::ReturnTypeMismatch {
                    expected: self.type_name(expected),
                    found: self.type_name(found),
                    span: ret.span.into(),
                },
                ret.span,
            );
        }
    }

    /// Locals, formals, array elements and struct fields reached through
    /// them. Constants and `Length` are read-only. Runs after the target has
    /// been checked, so its node types are recorded.
    pub(super) fn is_assignable(&self, target: &Expr) -> bool {
        match &target.kind {
            ExprKind::Identifier(sym) => self.symbols.lookup(*sym).is_some(),
            ExprKind::Index(_) => true,
            ExprKind::Field(field) => {
                let object_ty = self.expr_data.get_type(field.object.id);
                let is_struct_field = object_ty
                    .map(|ty| ty.is_error() || self.registry.is_struct(ty))
                    .unwrap_or(false);
                is_struct_field && self.is_assignable(&field.object)
            }
            _ => false,
        }
    }
}
