// src/errors/codegen.rs
//! Code generation failures.
//!
//! These never describe a problem in the user's program: code generation only
//! runs after a clean type check. They abort the compilation.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodegenError {
    #[error("line {line}: ran out of registers while evaluating expression")]
    OutOfRegisters { line: u32 },

    #[error("internal compiler error: {0}")]
    Internal(String),
}

impl CodegenError {
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
