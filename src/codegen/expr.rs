// src/codegen/expr.rs
//
// Expression lowering. Scalars evaluate into a scratch register; struct
// values evaluate to the address of their storage.

use smallvec::SmallVec;

use super::CodeGenerator;
use crate::codegen::asm::{Instruction, Operand};
use crate::codegen::location::{Loc, MemWidth, Reg};
use crate::errors::CodegenError;
use crate::frontend::*;
use crate::sema::{Builtin, TypeId, WORD_SIZE};

/// Base register plus constant offset of a struct's storage
#[derive(Debug, Clone, Copy)]
pub(super) struct Address {
    pub base: Reg,
    pub offset: i32,
    /// Whether `base` is a scratch register to release after use
    pub owned: bool,
}

impl Address {
    fn word(&self, index: u32) -> Loc {
        Loc::word(self.base, self.offset + (index * WORD_SIZE) as i32)
    }
}

/// A scalar storage location and the registers holding its address
pub(super) struct Place {
    pub loc: Loc,
    pub owned: SmallVec<[Reg; 2]>,
}

impl CodeGenerator<'_> {
    pub(super) fn gen_expr(&mut self, expr: &Expr) -> Result<Reg, CodegenError> {
        let ty = self.type_of(expr)?;
        if self.is_struct(ty) {
            return self.gen_struct_pointer(expr);
        }

        match &expr.kind {
            ExprKind::IntLiteral(v) => {
                let r = self.acquire()?;
                self.load_imm(r, *v);
                Ok(r)
            }
            ExprKind::BoolLiteral(b) => {
                let r = self.acquire()?;
                self.load_imm(r, i32::from(*b));
                Ok(r)
            }
            ExprKind::StringLiteral(s) => {
                let label = self.strings.intern(s);
                let r = self.acquire()?;
                self.emit(Instruction::LoadAddr { rd: r, label });
                Ok(r)
            }
            ExprKind::Identifier(sym) => self.gen_identifier(*sym),
            ExprKind::Binary(bin) => self.gen_binary(expr, bin),
            ExprKind::Unary(un) => {
                let r = self.gen_expr(&un.operand)?;
                self.emit(Instruction::Rsb {
                    rd: r,
                    rn: r,
                    op: Operand::Imm(0),
                });
                Ok(r)
            }
            ExprKind::Field(field) => {
                let object_ty = self.type_of(&field.object)?;
                if object_ty == TypeId::STRING {
                    let s = self.gen_expr(&field.object)?;
                    self.emit(Instruction::Mov {
                        rd: Reg::R0,
                        src: Operand::Reg(s),
                    });
                    self.emit(Instruction::Bl {
                        label: "strlen".to_string(),
                    });
                    self.emit(Instruction::Mov {
                        rd: s,
                        src: Operand::Reg(Reg::R0),
                    });
                    Ok(s)
                } else if self.analysis.registry.element_type(object_ty).is_some() {
                    let a = self.gen_expr(&field.object)?;
                    self.emit(Instruction::Load {
                        rd: a,
                        loc: Loc::word(a, -(WORD_SIZE as i32)),
                    });
                    Ok(a)
                } else {
                    self.load_place(expr)
                }
            }
            ExprKind::Index(_) => self.load_place(expr),
            ExprKind::Call(call) => self.gen_call(expr, call)?.ok_or_else(|| {
                CodegenError::internal(format!(
                    "void call used as a value at line {}",
                    expr.span.line
                ))
            }),
            ExprKind::NewArray(new) => self.gen_new_array(ty, new),
            ExprKind::NewStruct(_) => Err(CodegenError::internal(
                "struct allocation with a non-struct type",
            )),
        }
    }

    fn gen_identifier(&mut self, sym: Symbol) -> Result<Reg, CodegenError> {
        if let Some(slot) = self.lookup_local(sym) {
            let r = self.acquire()?;
            self.emit(Instruction::Load {
                rd: r,
                loc: Loc::word(Reg::FP, slot.offset),
            });
            return Ok(r);
        }

        let info = self.analysis.consts.get(&sym).copied().ok_or_else(|| {
            CodegenError::internal(format!(
                "unresolved identifier {}",
                self.interner.resolve(sym)
            ))
        })?;
        let label = self.const_label(sym);
        let r = self.acquire()?;
        if info.ty == TypeId::STRING {
            self.emit(Instruction::LoadAddr { rd: r, label });
        } else {
            self.emit(Instruction::Load {
                rd: r,
                loc: Loc::Label {
                    name: label,
                    width: MemWidth::Word,
                },
            });
        }
        Ok(r)
    }

    fn gen_binary(&mut self, expr: &Expr, bin: &BinaryExpr) -> Result<Reg, CodegenError> {
        if bin.op.is_relational() || bin.op.is_logical() {
            return self.gen_bool_value(expr);
        }

        let l = self.gen_expr(&bin.left)?;
        let r = self.gen_expr(&bin.right)?;
        match bin.op {
            BinaryOp::Add => self.emit(Instruction::Add {
                rd: l,
                rn: l,
                op: Operand::Reg(r),
            }),
            BinaryOp::Sub => self.emit(Instruction::Sub {
                rd: l,
                rn: l,
                op: Operand::Reg(r),
            }),
            BinaryOp::Mul => self.emit(Instruction::Mul { rd: l, rm: r, rs: l }),
            BinaryOp::Div | BinaryOp::Mod => {
                self.emit(Instruction::Mov {
                    rd: Reg::R0,
                    src: Operand::Reg(l),
                });
                self.emit(Instruction::Mov {
                    rd: Reg::R1,
                    src: Operand::Reg(r),
                });
                self.emit(Instruction::Bl {
                    label: "div_mod".to_string(),
                });
                let result = if bin.op == BinaryOp::Div { Reg::R0 } else { Reg::R1 };
                self.emit(Instruction::Mov {
                    rd: l,
                    src: Operand::Reg(result),
                });
            }
            op => {
                return Err(CodegenError::internal(format!(
                    "operator {} reached arithmetic lowering",
                    op.as_str()
                )));
            }
        }
        self.release(r);
        Ok(l)
    }

    /// Materialise a condition as 0 or 1
    fn gen_bool_value(&mut self, expr: &Expr) -> Result<Reg, CodegenError> {
        let r = self.acquire()?;
        let on_true = self.new_label();
        let on_false = self.new_label();
        let done = self.new_label();

        self.gen_conditional(expr, &on_true, &on_false)?;
        self.asm.label(on_true);
        self.load_imm(r, 1);
        self.emit(Instruction::B {
            label: done.clone(),
        });
        self.asm.label(on_false);
        self.load_imm(r, 0);
        self.asm.label(done);
        Ok(r)
    }

    fn load_place(&mut self, expr: &Expr) -> Result<Reg, CodegenError> {
        let place = self.gen_place(expr)?;
        let (rd, rest) = match place.owned.split_first() {
            Some((first, rest)) => (*first, rest.to_vec()),
            None => (self.acquire()?, Vec::new()),
        };
        self.emit(Instruction::Load { rd, loc: place.loc });
        for reg in rest {
            self.release(reg);
        }
        Ok(rd)
    }

    /// Storage location of a scalar lvalue
    pub(super) fn gen_place(&mut self, expr: &Expr) -> Result<Place, CodegenError> {
        match &expr.kind {
            ExprKind::Identifier(sym) => {
                let slot = self.lookup_local(*sym).ok_or_else(|| {
                    CodegenError::internal(format!(
                        "'{}' has no frame slot",
                        self.interner.resolve(*sym)
                    ))
                })?;
                Ok(Place {
                    loc: Loc::word(Reg::FP, slot.offset),
                    owned: SmallVec::new(),
                })
            }
            ExprKind::Field(field) => {
                let addr = self.gen_field_address(field)?;
                let mut owned = SmallVec::new();
                if addr.owned {
                    owned.push(addr.base);
                }
                Ok(Place {
                    loc: addr.word(0),
                    owned,
                })
            }
            ExprKind::Index(index) => {
                let elem = self.type_of(expr)?;
                let width = MemWidth::from_size(self.size_of(elem));
                let base = self.gen_expr(&index.object)?;
                let idx = self.gen_expr(&index.index)?;
                let mut owned = SmallVec::new();
                owned.push(base);
                owned.push(idx);
                Ok(Place {
                    loc: Loc::RegIndex {
                        base,
                        index: idx,
                        width,
                    },
                    owned,
                })
            }
            _ => Err(CodegenError::internal(format!(
                "expression at line {} is not assignable",
                expr.span.line
            ))),
        }
    }

    pub(super) fn release_place(&mut self, place: Place) {
        for reg in place.owned {
            self.release(reg);
        }
    }

    /// Address of a struct field, with nested field offsets folded together
    fn gen_field_address(&mut self, field: &FieldExpr) -> Result<Address, CodegenError> {
        let object_ty = self.type_of(&field.object)?;
        let name = self.interner.resolve(field.field);
        let (_, offset) = self
            .analysis
            .registry
            .field_layout(object_ty, name)
            .ok_or_else(|| CodegenError::internal(format!("no field layout for {}", name)))?;
        let object = self.gen_struct_address(&field.object)?;
        Ok(Address {
            offset: object.offset + offset as i32,
            ..object
        })
    }

    /// Address of the storage of a struct-typed expression
    pub(super) fn gen_struct_address(&mut self, expr: &Expr) -> Result<Address, CodegenError> {
        match &expr.kind {
            ExprKind::Identifier(_) => {
                let place = self.gen_place(expr)?;
                match place.loc {
                    Loc::RegOffset { base, offset, .. } => Ok(Address {
                        base,
                        offset,
                        owned: false,
                    }),
                    _ => Err(CodegenError::internal("struct variable outside the frame")),
                }
            }
            ExprKind::Field(field) => self.gen_field_address(field),
            ExprKind::Index(index) => {
                let elem = self.type_of(expr)?;
                let size = self.size_of(elem) as i32;
                let base = self.gen_expr(&index.object)?;
                let idx = self.gen_expr(&index.index)?;
                let scale = self.acquire()?;
                self.load_imm(scale, size);
                self.emit(Instruction::Mul {
                    rd: scale,
                    rm: idx,
                    rs: scale,
                });
                self.emit(Instruction::Add {
                    rd: base,
                    rn: base,
                    op: Operand::Reg(scale),
                });
                self.release(scale);
                self.release(idx);
                Ok(Address {
                    base,
                    offset: 0,
                    owned: true,
                })
            }
            ExprKind::Call(call) => {
                let base = self.gen_call(expr, call)?.ok_or_else(|| {
                    CodegenError::internal("struct-typed call produced no value")
                })?;
                Ok(Address {
                    base,
                    offset: 0,
                    owned: true,
                })
            }
            ExprKind::NewStruct(_) => {
                let ty = self.type_of(expr)?;
                let size = self.size_of(ty) as i32;
                self.load_imm(Reg::R0, size);
                self.emit(Instruction::Bl {
                    label: "malloc".to_string(),
                });
                let base = self.acquire()?;
                self.emit(Instruction::Mov {
                    rd: base,
                    src: Operand::Reg(Reg::R0),
                });
                Ok(Address {
                    base,
                    offset: 0,
                    owned: true,
                })
            }
            _ => Err(CodegenError::internal(format!(
                "expression at line {} has no struct storage",
                expr.span.line
            ))),
        }
    }

    pub(super) fn release_address(&mut self, addr: Address) {
        if addr.owned {
            self.release(addr.base);
        }
    }

    /// A struct value as a plain pointer in a scratch register
    fn gen_struct_pointer(&mut self, expr: &Expr) -> Result<Reg, CodegenError> {
        let addr = self.gen_struct_address(expr)?;
        let rd = if addr.owned { addr.base } else { self.acquire()? };
        if addr.offset != 0 || rd != addr.base {
            self.emit(Instruction::Add {
                rd,
                rn: addr.base,
                op: Operand::Imm(addr.offset),
            });
        }
        Ok(rd)
    }

    /// Copy `words` words between two struct storages
    pub(super) fn copy_words(
        &mut self,
        from: Address,
        to: Address,
        words: u32,
    ) -> Result<(), CodegenError> {
        let t = self.acquire()?;
        for k in 0..words {
            self.emit(Instruction::Load {
                rd: t,
                loc: from.word(k),
            });
            self.emit(Instruction::Store {
                rs: t,
                loc: to.word(k),
            });
        }
        self.release(t);
        Ok(())
    }

    fn gen_new_array(&mut self, ty: TypeId, new: &NewArrayExpr) -> Result<Reg, CodegenError> {
        let elem = self
            .analysis
            .registry
            .element_type(ty)
            .ok_or_else(|| CodegenError::internal("array allocation with a non-array type"))?;
        let size = self.size_of(elem) as i32;

        let length = self.gen_expr(&new.length)?;
        let bytes = self.acquire()?;
        self.load_imm(bytes, size);
        self.emit(Instruction::Mul {
            rd: bytes,
            rm: length,
            rs: bytes,
        });
        self.emit(Instruction::Add {
            rd: bytes,
            rn: bytes,
            op: Operand::Imm(WORD_SIZE as i32),
        });
        self.emit(Instruction::Mov {
            rd: Reg::R0,
            src: Operand::Reg(bytes),
        });
        self.release(bytes);
        self.emit(Instruction::Bl {
            label: "malloc".to_string(),
        });
        // Length header, then hand out the address just past it
        self.emit(Instruction::Store {
            rs: length,
            loc: Loc::word(Reg::R0, 0),
        });
        self.emit(Instruction::Add {
            rd: length,
            rn: Reg::R0,
            op: Operand::Imm(WORD_SIZE as i32),
        });
        Ok(length)
    }

    /// Lower a call. Returns the register holding the result, if any.
    pub(super) fn gen_call(
        &mut self,
        expr: &Expr,
        call: &CallExpr,
    ) -> Result<Option<Reg>, CodegenError> {
        let analysis = self.analysis;
        let id = analysis.expr_data.get_call(expr.id).ok_or_else(|| {
            CodegenError::internal(format!("unresolved call at line {}", expr.span.line))
        })?;
        let desc = analysis.methods.get(id);
        if let Some(builtin) = desc.builtin {
            self.gen_builtin(builtin, call)?;
            return Ok(None);
        }

        let mut bytes = 0;
        for arg in call.args.iter().rev() {
            let ty = self.type_of(&arg.value)?;
            if self.is_struct(ty) {
                let words = analysis.registry.words_of(ty);
                let addr = self.gen_struct_address(&arg.value)?;
                let t = self.acquire()?;
                for k in (0..words).rev() {
                    self.emit(Instruction::Load {
                        rd: t,
                        loc: addr.word(k),
                    });
                    self.emit(Instruction::Push { rs: t });
                }
                self.release(t);
                self.release_address(addr);
                bytes += words * WORD_SIZE;
            } else {
                let r = self.gen_expr(&arg.value)?;
                self.emit(Instruction::Push { rs: r });
                self.release(r);
                bytes += WORD_SIZE;
            }
        }

        self.emit(Instruction::Bl {
            label: analysis.methods.label(id),
        });
        if bytes > 0 {
            self.emit(Instruction::Add {
                rd: Reg::SP,
                rn: Reg::SP,
                op: Operand::Imm(bytes as i32),
            });
        }

        if desc.result.is_void() {
            return Ok(None);
        }
        let r = self.acquire()?;
        self.emit(Instruction::Mov {
            rd: r,
            src: Operand::Reg(Reg::R0),
        });
        Ok(Some(r))
    }

    fn gen_builtin(&mut self, builtin: Builtin, call: &CallExpr) -> Result<(), CodegenError> {
        let arg = call
            .args
            .first()
            .ok_or_else(|| CodegenError::internal("runtime call without an argument"))?;
        match builtin {
            Builtin::ReadInt => {
                self.emit(Instruction::Bl {
                    label: "read_int".to_string(),
                });
                let value = self.acquire()?;
                self.emit(Instruction::Mov {
                    rd: value,
                    src: Operand::Reg(Reg::R0),
                });
                let place = self.gen_place(&arg.value)?;
                self.emit(Instruction::Store {
                    rs: value,
                    loc: place.loc.clone(),
                });
                self.release_place(place);
                self.release(value);
            }
            Builtin::WriteInt | Builtin::WriteString => {
                let r = self.gen_expr(&arg.value)?;
                self.emit(Instruction::Mov {
                    rd: Reg::R0,
                    src: Operand::Reg(r),
                });
                self.release(r);
                let label = if builtin == Builtin::WriteInt {
                    "write_int"
                } else {
                    "write_string"
                };
                self.emit(Instruction::Bl {
                    label: label.to_string(),
                });
            }
        }
        Ok(())
    }
}
