// src/codegen/cond.rs
//
// Jump code for boolean expressions: a condition never lands in a register,
// it only transfers control to one of two labels.

use super::CodeGenerator;
use crate::codegen::asm::{Cond, Instruction, Operand};
use crate::errors::CodegenError;
use crate::frontend::*;

fn branch_condition(op: BinaryOp) -> Option<Cond> {
    match op {
        BinaryOp::Eq => Some(Cond::Eq),
        BinaryOp::Ne => Some(Cond::Ne),
        BinaryOp::Lt => Some(Cond::Lt),
        BinaryOp::Le => Some(Cond::Le),
        BinaryOp::Gt => Some(Cond::Gt),
        BinaryOp::Ge => Some(Cond::Ge),
        _ => None,
    }
}

impl CodeGenerator<'_> {
    /// Branch to `on_true` when `expr` holds, otherwise to `on_false`
    pub(super) fn gen_conditional(
        &mut self,
        expr: &Expr,
        on_true: &str,
        on_false: &str,
    ) -> Result<(), CodegenError> {
        match &expr.kind {
            ExprKind::Binary(bin) if bin.op == BinaryOp::And => {
                let both = self.new_label();
                self.gen_conditional(&bin.left, &both, on_false)?;
                self.asm.label(both);
                self.gen_conditional(&bin.right, on_true, on_false)
            }
            ExprKind::Binary(bin) if bin.op == BinaryOp::Or => {
                let neither = self.new_label();
                self.gen_conditional(&bin.left, on_true, &neither)?;
                self.asm.label(neither);
                self.gen_conditional(&bin.right, on_true, on_false)
            }
            ExprKind::Binary(bin) if bin.op.is_relational() => {
                let l = self.gen_expr(&bin.left)?;
                let r = self.gen_expr(&bin.right)?;
                self.emit(Instruction::Cmp {
                    rn: l,
                    op: Operand::Reg(r),
                });
                self.release(r);
                self.release(l);
                let cond = branch_condition(bin.op).ok_or_else(|| {
                    CodegenError::internal("relational operator without a condition code")
                })?;
                self.emit(Instruction::BCond {
                    cond,
                    label: on_true.to_string(),
                });
                self.jump(on_false);
                Ok(())
            }
            ExprKind::BoolLiteral(true) => {
                self.jump(on_true);
                Ok(())
            }
            ExprKind::BoolLiteral(false) => {
                self.jump(on_false);
                Ok(())
            }
            _ => {
                let r = self.gen_expr(expr)?;
                self.emit(Instruction::Cmp {
                    rn: r,
                    op: Operand::Imm(0),
                });
                self.release(r);
                self.emit(Instruction::BCond {
                    cond: Cond::Ne,
                    label: on_true.to_string(),
                });
                self.jump(on_false);
                Ok(())
            }
        }
    }

    pub(super) fn jump(&mut self, label: &str) {
        self.emit(Instruction::B {
            label: label.to_string(),
        });
    }
}
