// src/codegen/mod.rs
//
// ARM assembly generation from a type-checked program.
//
// A CodeGenerator is built fresh for every compilation and owns all mutable
// state: the listing, the scratch register pool, label counters, the string
// pool and the frame map of the method being generated.

pub mod asm;
mod cond;
mod expr;
pub mod location;
pub mod registers;
mod stmt;

#[cfg(test)]
mod tests;

pub use asm::{AsmLine, Assembly, Cond, Instruction, Operand, is_encodable_imm};
pub use location::{Loc, MemWidth, Reg};
pub use registers::RegisterPool;

use rustc_hash::FxHashMap;

use crate::errors::CodegenError;
use crate::frontend::*;
use crate::sema::{AnalysisOutput, TypeId, WORD_SIZE};

/// Method the program entry branches to
const ENTRY_METHOD: &str = "Main";

/// Offset from fp of the first parameter: nine saved registers sit between
/// the caller's pushed arguments and the frame pointer.
const PARAM_BASE: i32 = 36;

/// Frame-pointer offset of a local or parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FrameSlot {
    offset: i32,
}

/// Distinct string literals, labelled `_S.n` in first-use order
#[derive(Debug, Default)]
struct StringPool {
    labels: FxHashMap<String, String>,
    entries: Vec<(String, String)>,
}

impl StringPool {
    fn intern(&mut self, value: &str) -> String {
        if let Some(label) = self.labels.get(value) {
            return label.clone();
        }
        let label = format!("_S.{}", self.entries.len());
        self.labels.insert(value.to_string(), label.clone());
        self.entries.push((label.clone(), value.to_string()));
        label
    }
}

/// Generate the assembly listing for a program that passed type checking
pub fn generate(
    program: &Program,
    analysis: &AnalysisOutput,
    interner: &Interner,
) -> Result<Assembly, CodegenError> {
    CodeGenerator::new(analysis, interner).generate(program)
}

pub struct CodeGenerator<'a> {
    analysis: &'a AnalysisOutput,
    interner: &'a Interner,
    asm: Assembly,
    regs: RegisterPool,
    next_label: u32,
    strings: StringPool,
    /// One map per open block, innermost last
    frame: Vec<FxHashMap<Symbol, FrameSlot>>,
    /// Bytes of locals allocated so far in the current method
    local_bytes: i32,
    return_label: String,
    loop_exits: Vec<String>,
    /// Source line of the statement being generated
    line: u32,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(analysis: &'a AnalysisOutput, interner: &'a Interner) -> Self {
        Self {
            analysis,
            interner,
            asm: Assembly::new(),
            regs: RegisterPool::new(),
            next_label: 0,
            strings: StringPool::default(),
            frame: Vec::new(),
            local_bytes: 0,
            return_label: String::new(),
            loop_exits: Vec::new(),
            line: 0,
        }
    }

    #[tracing::instrument(skip_all)]
    pub fn generate(mut self, program: &Program) -> Result<Assembly, CodegenError> {
        let entry = self.entry_label()?;

        self.asm.comment(format!(
            "class {}, generated by cflat",
            self.interner.resolve(program.class_name)
        ));
        self.asm.directive(".text");
        self.asm.directive(".global _start");
        self.asm.label("_start");
        self.emit(Instruction::Bl { label: entry });
        self.emit(Instruction::Mov {
            rd: Reg::R0,
            src: Operand::Imm(0),
        });
        self.emit(Instruction::Mov {
            rd: Reg::R7,
            src: Operand::Imm(1),
        });
        self.emit(Instruction::Swi { number: 0 });

        let mut string_consts = Vec::new();
        for decl in &program.declarations {
            match decl {
                Decl::Method(method) => self.gen_method(method)?,
                Decl::Const(c) => {
                    let label = self.const_label(c.name);
                    match &c.value.kind {
                        ExprKind::IntLiteral(v) => self.gen_word(&label, *v),
                        ExprKind::BoolLiteral(b) => self.gen_word(&label, i32::from(*b)),
                        ExprKind::StringLiteral(s) => string_consts.push((label, s.clone())),
                        _ => {
                            return Err(CodegenError::internal(format!(
                                "constant {} has a non-literal value",
                                label
                            )));
                        }
                    }
                }
                Decl::Struct(_) => {}
            }
        }

        self.asm.blank();
        self.asm.directive(".data");
        let pool = std::mem::take(&mut self.strings.entries);
        for (label, value) in string_consts.into_iter().chain(pool) {
            self.asm.label(label);
            self.asm
                .directive(format!(".asciz {}", asm::asciz_literal(&value)));
        }
        self.asm.directive(".end");

        tracing::debug!(lines = self.asm.lines().len(), "assembly generated");
        Ok(self.asm)
    }

    fn entry_label(&self) -> Result<String, CodegenError> {
        let methods = &self.analysis.methods;
        methods
            .overloads(ENTRY_METHOD)
            .iter()
            .find(|&&id| methods.get(id).params.is_empty())
            .map(|&id| methods.label(id))
            .ok_or_else(|| CodegenError::internal("no entry method"))
    }

    fn gen_word(&mut self, label: &str, value: i32) {
        self.asm.blank();
        self.asm.directive(".align 2");
        self.asm.label(label);
        self.asm.directive(format!(".word {}", value));
    }

    fn gen_method(&mut self, method: &MethodDecl) -> Result<(), CodegenError> {
        let analysis = self.analysis;
        let id = analysis
            .expr_data
            .get_method(method.id)
            .ok_or_else(|| CodegenError::internal("method declaration was not registered"))?;
        let desc = analysis.methods.get(id);
        let label = analysis.methods.label(id);
        let slots = analysis.expr_data.frame_slots(method.id).unwrap_or(0);
        let _span = tracing::debug_span!("method", %label, slots).entered();

        self.line = method.span.line;
        self.frame.clear();
        self.frame.push(FxHashMap::default());
        self.local_bytes = 0;
        self.loop_exits.clear();

        let mut offset = PARAM_BASE;
        for (param, ty) in method.params.iter().zip(desc.params.iter()) {
            self.bind_local(param.name, FrameSlot { offset });
            offset += self.size_of(ty.ty) as i32;
        }
        self.return_label = self.new_label();

        self.asm.blank();
        self.asm.comment(format!("{} (line {})", desc.name, method.span.line));
        self.asm.directive(".align 2");
        self.asm.label(label);
        self.emit(Instruction::SaveFrame);
        self.emit(Instruction::Mov {
            rd: Reg::FP,
            src: Operand::Reg(Reg::SP),
        });
        if slots > 0 {
            self.emit(Instruction::Sub {
                rd: Reg::SP,
                rn: Reg::SP,
                op: Operand::Imm((slots * WORD_SIZE) as i32),
            });
        }

        self.gen_block(&method.body)?;

        let return_label = self.return_label.clone();
        self.asm.label(return_label);
        self.emit(Instruction::Mov {
            rd: Reg::SP,
            src: Operand::Reg(Reg::FP),
        });
        self.emit(Instruction::RestoreFrame);
        self.asm.directive(".ltorg");

        if self.regs.in_use() != 0 {
            tracing::warn!(in_use = self.regs.in_use(), "registers still held after method");
        }
        Ok(())
    }

    /// Append an instruction. Immediates and memory offsets the encoding
    /// cannot hold are first materialized in ip.
    fn emit(&mut self, instr: Instruction) {
        let instr = match instr {
            Instruction::Add { rd, rn, op } => Instruction::Add {
                rd,
                rn,
                op: self.arith_operand(op, true),
            },
            Instruction::Sub { rd, rn, op } => Instruction::Sub {
                rd,
                rn,
                op: self.arith_operand(op, true),
            },
            Instruction::Cmp { rn, op } => Instruction::Cmp {
                rn,
                op: self.arith_operand(op, true),
            },
            Instruction::Rsb { rd, rn, op } => Instruction::Rsb {
                rd,
                rn,
                op: self.arith_operand(op, false),
            },
            Instruction::Load { rd, loc } => Instruction::Load {
                rd,
                loc: self.reachable(loc),
            },
            Instruction::Store { rs, loc } => Instruction::Store {
                rs,
                loc: self.reachable(loc),
            },
            other => other,
        };
        self.asm.emit(instr);
    }

    /// The assembler swaps add/sub and cmp/cmn for a negated immediate, so
    /// those accept either sign.
    fn arith_operand(&mut self, op: Operand, negatable: bool) -> Operand {
        match op {
            Operand::Imm(v)
                if !is_encodable_imm(v) && !(negatable && is_encodable_imm(v.wrapping_neg())) =>
            {
                self.load_imm(Reg::IP, v);
                Operand::Reg(Reg::IP)
            }
            op => op,
        }
    }

    fn reachable(&mut self, loc: Loc) -> Loc {
        match loc {
            Loc::RegOffset {
                base,
                offset,
                width,
            } if offset.unsigned_abs() > width.offset_limit() as u32 => {
                self.load_imm(Reg::IP, offset);
                self.asm.emit(Instruction::Add {
                    rd: Reg::IP,
                    rn: base,
                    op: Operand::Reg(Reg::IP),
                });
                Loc::RegOffset {
                    base: Reg::IP,
                    offset: 0,
                    width,
                }
            }
            loc => loc,
        }
    }

    fn new_label(&mut self) -> String {
        let label = format!("_L.{}", self.next_label);
        self.next_label += 1;
        label
    }

    fn const_label(&self, name: Symbol) -> String {
        format!("_C.{}", self.interner.resolve(name))
    }

    fn acquire(&mut self) -> Result<Reg, CodegenError> {
        self.regs.acquire(self.line)
    }

    fn release(&mut self, reg: Reg) {
        self.regs.release(reg);
    }

    /// Load an integer constant, preferring immediate forms
    fn load_imm(&mut self, rd: Reg, value: i32) {
        let instr = if (0..=255).contains(&value) {
            Instruction::Mov {
                rd,
                src: Operand::Imm(value),
            }
        } else if (-255..=-1).contains(&value) {
            Instruction::Mvn {
                rd,
                src: Operand::Imm(-value - 1),
            }
        } else {
            Instruction::LoadConst { rd, value }
        };
        self.emit(instr);
    }

    fn type_of(&self, expr: &Expr) -> Result<TypeId, CodegenError> {
        self.analysis.expr_data.get_type(expr.id).ok_or_else(|| {
            CodegenError::internal(format!(
                "expression at line {} has no type",
                expr.span.line
            ))
        })
    }

    fn size_of(&self, ty: TypeId) -> u32 {
        self.analysis.registry.size_of(ty)
    }

    fn is_struct(&self, ty: TypeId) -> bool {
        self.analysis.registry.is_struct(ty)
    }

    /// Words of frame storage for a declared local type
    fn local_words(&self, ty: &TypeExpr) -> Result<u32, CodegenError> {
        match ty {
            TypeExpr::Primitive(_) | TypeExpr::Array(_) => Ok(1),
            TypeExpr::Named(name, _) => {
                let name = self.interner.resolve(*name);
                self.analysis
                    .registry
                    .lookup_struct(name)
                    .map(|id| self.analysis.registry.words_of(id))
                    .ok_or_else(|| CodegenError::internal(format!("unknown struct {}", name)))
            }
        }
    }

    fn push_scope(&mut self) {
        self.frame.push(FxHashMap::default());
    }

    fn pop_scope(&mut self) {
        self.frame.pop();
    }

    fn bind_local(&mut self, name: Symbol, slot: FrameSlot) {
        if let Some(scope) = self.frame.last_mut() {
            scope.insert(name, slot);
        }
    }

    fn lookup_local(&self, name: Symbol) -> Option<FrameSlot> {
        self.frame
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name).copied())
    }
}
