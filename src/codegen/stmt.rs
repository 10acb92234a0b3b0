// src/codegen/stmt.rs

use super::{CodeGenerator, FrameSlot};
use crate::codegen::asm::{Instruction, Operand};
use crate::codegen::expr::Address;
use crate::codegen::location::Reg;
use crate::errors::CodegenError;
use crate::frontend::*;
use crate::sema::WORD_SIZE;

impl CodeGenerator<'_> {
    pub(super) fn gen_block(&mut self, block: &Block) -> Result<(), CodegenError> {
        self.push_scope();
        for stmt in &block.stmts {
            self.gen_stmt(stmt)?;
        }
        self.pop_scope();
        Ok(())
    }

    /// Branch bodies get a scope even when they are a single statement
    fn gen_branch(&mut self, stmt: &Stmt) -> Result<(), CodegenError> {
        match stmt {
            Stmt::Block(block) => self.gen_block(block),
            other => {
                self.push_scope();
                self.gen_stmt(other)?;
                self.pop_scope();
                Ok(())
            }
        }
    }

    fn gen_stmt(&mut self, stmt: &Stmt) -> Result<(), CodegenError> {
        self.line = stmt.span().line;
        match stmt {
            Stmt::LocalDecl(decl) => {
                let words = self.local_words(&decl.ty)?;
                for (name, _) in &decl.names {
                    self.local_bytes += (words * WORD_SIZE) as i32;
                    let offset = -self.local_bytes;
                    self.bind_local(*name, FrameSlot { offset });
                }
                Ok(())
            }
            Stmt::Assign(assign) => self.gen_assign(assign),
            Stmt::Call(stmt) => {
                let ExprKind::Call(call) = &stmt.call.kind else {
                    return Err(CodegenError::internal("call statement without a call"));
                };
                if let Some(r) = self.gen_call(&stmt.call, call)? {
                    self.release(r);
                }
                Ok(())
            }
            Stmt::Increment(inc) => self.gen_step(&inc.target, true),
            Stmt::Decrement(dec) => self.gen_step(&dec.target, false),
            Stmt::If(if_stmt) => {
                let then_label = self.new_label();
                let end_label = self.new_label();
                let else_label = if if_stmt.else_branch.is_some() {
                    self.new_label()
                } else {
                    end_label.clone()
                };

                self.gen_conditional(&if_stmt.condition, &then_label, &else_label)?;
                self.asm.label(then_label);
                self.gen_branch(&if_stmt.then_branch)?;
                if let Some(else_branch) = &if_stmt.else_branch {
                    self.jump(&end_label);
                    self.asm.label(else_label);
                    self.gen_branch(else_branch)?;
                }
                self.asm.label(end_label);
                Ok(())
            }
            Stmt::While(while_stmt) => {
                let test_label = self.new_label();
                let body_label = self.new_label();
                let end_label = self.new_label();

                self.asm.label(test_label.clone());
                self.gen_conditional(&while_stmt.condition, &body_label, &end_label)?;
                self.asm.label(body_label);
                self.loop_exits.push(end_label.clone());
                let body = self.gen_branch(&while_stmt.body);
                self.loop_exits.pop();
                body?;
                self.jump(&test_label);
                self.asm.label(end_label);
                Ok(())
            }
            Stmt::Break(_) => {
                let exit = self.loop_exits.last().cloned().ok_or_else(|| {
                    CodegenError::internal(format!("break outside a loop at line {}", self.line))
                })?;
                self.jump(&exit);
                Ok(())
            }
            Stmt::Return(ret) => self.gen_return(ret),
            Stmt::Block(block) => self.gen_block(block),
            Stmt::Empty(_) => Ok(()),
        }
    }

    fn gen_assign(&mut self, assign: &AssignStmt) -> Result<(), CodegenError> {
        let ty = self.type_of(&assign.target)?;
        if self.is_struct(ty) {
            let words = self.analysis.registry.words_of(ty);
            let from = self.gen_struct_address(&assign.value)?;
            let to = self.gen_struct_address(&assign.target)?;
            self.copy_words(from, to, words)?;
            self.release_address(to);
            self.release_address(from);
            return Ok(());
        }

        let value = self.gen_expr(&assign.value)?;
        let place = self.gen_place(&assign.target)?;
        self.emit(Instruction::Store {
            rs: value,
            loc: place.loc.clone(),
        });
        self.release_place(place);
        self.release(value);
        Ok(())
    }

    /// `++` and `--`
    fn gen_step(&mut self, target: &Expr, increment: bool) -> Result<(), CodegenError> {
        let place = self.gen_place(target)?;
        let t = self.acquire()?;
        self.emit(Instruction::Load {
            rd: t,
            loc: place.loc.clone(),
        });
        let op = Operand::Imm(1);
        self.emit(if increment {
            Instruction::Add { rd: t, rn: t, op }
        } else {
            Instruction::Sub { rd: t, rn: t, op }
        });
        self.emit(Instruction::Store {
            rs: t,
            loc: place.loc.clone(),
        });
        self.release(t);
        self.release_place(place);
        Ok(())
    }

    fn gen_return(&mut self, ret: &ReturnStmt) -> Result<(), CodegenError> {
        if let Some(value) = &ret.value {
            let ty = self.type_of(value)?;
            if self.is_struct(ty) {
                // The frame is gone after return, so the caller gets a heap copy
                let size = self.size_of(ty);
                let from = self.gen_struct_address(value)?;
                self.load_imm(Reg::R0, size as i32);
                self.emit(Instruction::Bl {
                    label: "malloc".to_string(),
                });
                let to = Address {
                    base: Reg::R0,
                    offset: 0,
                    owned: false,
                };
                self.copy_words(from, to, size.div_ceil(WORD_SIZE))?;
                self.release_address(from);
            } else {
                let r = self.gen_expr(value)?;
                self.emit(Instruction::Mov {
                    rd: Reg::R0,
                    src: Operand::Reg(r),
                });
                self.release(r);
            }
        }
        let label = self.return_label.clone();
        self.jump(&label);
        Ok(())
    }
}
