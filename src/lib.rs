// src/lib.rs
pub mod cli;
pub mod codegen;
pub mod commands;
pub mod errors;
pub mod frontend;
pub mod sema;
