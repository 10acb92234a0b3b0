// src/codegen/asm.rs
//
// ARM instructions and the assembly listing they are collected into.

use std::fmt;
use std::io;

use crate::codegen::location::{Loc, Reg};

/// Second operand of data-processing instructions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Reg(Reg),
    Imm(i32),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Reg(r) => write!(f, "{}", r),
            Operand::Imm(v) => write!(f, "#{}", v),
        }
    }
}

/// Whether `value` fits a data-processing immediate: an 8-bit value rotated
/// right by an even amount
pub fn is_encodable_imm(value: i32) -> bool {
    let bits = value as u32;
    (0..16).any(|r| bits.rotate_left(2 * r) <= 0xff)
}

/// Signed comparison outcomes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cond {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Cond {
    pub fn suffix(self) -> &'static str {
        match self {
            Cond::Eq => "eq",
            Cond::Ne => "ne",
            Cond::Lt => "lt",
            Cond::Le => "le",
            Cond::Gt => "gt",
            Cond::Ge => "ge",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    Mov { rd: Reg, src: Operand },
    /// Move the bitwise complement: `mvn rd, #v` loads `-(v + 1)`
    Mvn { rd: Reg, src: Operand },
    /// Literal-pool load of a constant: `ldr rd, =value`
    LoadConst { rd: Reg, value: i32 },
    /// Literal-pool load of a label's address: `ldr rd, =label`
    LoadAddr { rd: Reg, label: String },
    Load { rd: Reg, loc: Loc },
    Store { rs: Reg, loc: Loc },
    /// `str rs, [sp, #-4]!`
    Push { rs: Reg },
    Add { rd: Reg, rn: Reg, op: Operand },
    Sub { rd: Reg, rn: Reg, op: Operand },
    /// Reverse subtract: `rd = op - rn`
    Rsb { rd: Reg, rn: Reg, op: Operand },
    /// `rd = rm * rs`
    Mul { rd: Reg, rm: Reg, rs: Reg },
    Cmp { rn: Reg, op: Operand },
    B { label: String },
    BCond { cond: Cond, label: String },
    Bl { label: String },
    /// Prologue register save
    SaveFrame,
    /// Epilogue register restore, returning through pc
    RestoreFrame,
    Swi { number: u32 },
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Mov { rd, src } => write!(f, "\tmov\t{}, {}", rd, src),
            Instruction::Mvn { rd, src } => write!(f, "\tmvn\t{}, {}", rd, src),
            Instruction::LoadConst { rd, value } => write!(f, "\tldr\t{}, ={}", rd, value),
            Instruction::LoadAddr { rd, label } => write!(f, "\tldr\t{}, ={}", rd, label),
            Instruction::Load { rd, loc } => write!(f, "\t{}\t{}, {}", loc.load_mnemonic(), rd, loc),
            Instruction::Store { rs, loc } => {
                write!(f, "\t{}\t{}, {}", loc.store_mnemonic(), rs, loc)
            }
            Instruction::Push { rs } => write!(f, "\tstr\t{}, [sp, #-4]!", rs),
            Instruction::Add { rd, rn, op } => write!(f, "\tadd\t{}, {}, {}", rd, rn, op),
            Instruction::Sub { rd, rn, op } => write!(f, "\tsub\t{}, {}, {}", rd, rn, op),
            Instruction::Rsb { rd, rn, op } => write!(f, "\trsb\t{}, {}, {}", rd, rn, op),
            Instruction::Mul { rd, rm, rs } => write!(f, "\tmul\t{}, {}, {}", rd, rm, rs),
            Instruction::Cmp { rn, op } => write!(f, "\tcmp\t{}, {}", rn, op),
            Instruction::B { label } => write!(f, "\tb\t{}", label),
            Instruction::BCond { cond, label } => write!(f, "\tb{}\t{}", cond.suffix(), label),
            Instruction::Bl { label } => write!(f, "\tbl\t{}", label),
            Instruction::SaveFrame => write!(f, "\tstmfd\tsp!, {{r4-r11, lr}}"),
            Instruction::RestoreFrame => write!(f, "\tldmfd\tsp!, {{r4-r11, pc}}"),
            Instruction::Swi { number } => write!(f, "\tswi\t#{}", number),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AsmLine {
    Label(String),
    Instr(Instruction),
    /// Assembler directive such as `.align 2`
    Directive(String),
    Comment(String),
    Blank,
}

impl fmt::Display for AsmLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsmLine::Label(name) => write!(f, "{}:", name),
            AsmLine::Instr(instr) => write!(f, "{}", instr),
            AsmLine::Directive(text) => write!(f, "\t{}", text),
            AsmLine::Comment(text) => write!(f, "@ {}", text),
            AsmLine::Blank => Ok(()),
        }
    }
}

/// An ordered assembly listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assembly {
    lines: Vec<AsmLine>,
}

impl Assembly {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, instr: Instruction) {
        self.lines.push(AsmLine::Instr(instr));
    }

    pub fn label(&mut self, name: impl Into<String>) {
        self.lines.push(AsmLine::Label(name.into()));
    }

    pub fn directive(&mut self, text: impl Into<String>) {
        self.lines.push(AsmLine::Directive(text.into()));
    }

    pub fn comment(&mut self, text: impl Into<String>) {
        self.lines.push(AsmLine::Comment(text.into()));
    }

    pub fn blank(&mut self) {
        self.lines.push(AsmLine::Blank);
    }

    pub fn lines(&self) -> &[AsmLine] {
        &self.lines
    }

    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.lines.iter().filter_map(|line| match line {
            AsmLine::Instr(instr) => Some(instr),
            _ => None,
        })
    }

    /// Number of `bl target` instructions
    pub fn calls_to(&self, target: &str) -> usize {
        self.instructions()
            .filter(|i| matches!(i, Instruction::Bl { label } if label == target))
            .count()
    }

    pub fn write_to<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        for line in &self.lines {
            writeln!(out, "{}", line)?;
        }
        Ok(())
    }
}

impl fmt::Display for Assembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Quote a string for an `.asciz` directive
pub fn asciz_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\{:03o}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
