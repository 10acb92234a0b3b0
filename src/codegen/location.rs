// src/codegen/location.rs
//
// Registers and memory locations, rendered in ARM addressing-mode syntax.

use std::fmt;

/// A 32-bit ARM core register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reg(pub u8);

impl Reg {
    pub const R0: Reg = Reg(0);
    pub const R1: Reg = Reg(1);
    pub const R7: Reg = Reg(7);
    pub const FP: Reg = Reg(11);
    /// Intra-procedure scratch, outside the allocation pool
    pub const IP: Reg = Reg(12);
    pub const SP: Reg = Reg(13);
    pub const LR: Reg = Reg(14);
    pub const PC: Reg = Reg(15);
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Reg::FP => write!(f, "fp"),
            Reg::IP => write!(f, "ip"),
            Reg::SP => write!(f, "sp"),
            Reg::LR => write!(f, "lr"),
            Reg::PC => write!(f, "pc"),
            Reg(n) => write!(f, "r{}", n),
        }
    }
}

/// Access width of a load or store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemWidth {
    Byte,
    Half,
    Word,
    Double,
}

impl MemWidth {
    /// Width for a value of `bytes` bytes; anything else is a word
    pub fn from_size(bytes: u32) -> Self {
        match bytes {
            1 => MemWidth::Byte,
            2 => MemWidth::Half,
            8 => MemWidth::Double,
            _ => MemWidth::Word,
        }
    }

    /// Largest constant offset the addressing mode encodes for this width
    pub fn offset_limit(self) -> i32 {
        match self {
            MemWidth::Byte | MemWidth::Word => 4095,
            MemWidth::Half | MemWidth::Double => 255,
        }
    }

    /// log2 of the width, used to scale an index register
    pub fn shift(self) -> u32 {
        match self {
            MemWidth::Byte => 0,
            MemWidth::Half => 1,
            MemWidth::Word => 2,
            MemWidth::Double => 3,
        }
    }

    /// Mnemonic suffix: `ldrb`, `ldrh`, `ldr`, `ldrd`
    pub fn suffix(self) -> &'static str {
        match self {
            MemWidth::Byte => "b",
            MemWidth::Half => "h",
            MemWidth::Word => "",
            MemWidth::Double => "d",
        }
    }
}

/// Where a value lives in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Loc {
    /// Static data addressed by label
    Label { name: String, width: MemWidth },
    /// Frame slots, outgoing stack slots and struct fields
    RegOffset { base: Reg, offset: i32, width: MemWidth },
    /// Array elements, index scaled by the element width
    RegIndex { base: Reg, index: Reg, width: MemWidth },
}

impl Loc {
    pub fn word(base: Reg, offset: i32) -> Self {
        Loc::RegOffset {
            base,
            offset,
            width: MemWidth::Word,
        }
    }

    pub fn width(&self) -> MemWidth {
        match self {
            Loc::Label { width, .. }
            | Loc::RegOffset { width, .. }
            | Loc::RegIndex { width, .. } => *width,
        }
    }

    pub fn load_mnemonic(&self) -> String {
        format!("ldr{}", self.width().suffix())
    }

    pub fn store_mnemonic(&self) -> String {
        format!("str{}", self.width().suffix())
    }
}

impl fmt::Display for Loc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Loc::Label { name, .. } => write!(f, "{}", name),
            Loc::RegOffset { base, offset: 0, .. } => write!(f, "[{}]", base),
            Loc::RegOffset { base, offset, .. } => write!(f, "[{}, #{}]", base, offset),
            Loc::RegIndex { base, index, width } => match width.shift() {
                0 => write!(f, "[{}, {}]", base, index),
                shift => write!(f, "[{}, {}, lsl #{}]", base, index, shift),
            },
        }
    }
}
