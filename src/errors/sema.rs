// src/errors/sema.rs
//! Semantic analysis errors (E2xxx) and warnings (W2xxx).

#![allow(unused_assignments)] // False positives from thiserror derive

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum SemanticError {
    #[error("duplicate declaration of {kind} '{name}'")]
    #[diagnostic(code(E2001))]
    DuplicateDeclaration {
        kind: &'static str,
        name: String,
        #[label("already declared")]
        span: SourceSpan,
    },

    #[error("duplicate field '{field}' in struct '{struct_name}'")]
    #[diagnostic(code(E2002), help("the first declaration of the field is kept"))]
    DuplicateField {
        struct_name: String,
        field: String,
        #[label("field already declared")]
        span: SourceSpan,
    },

    #[error("undeclared identifier '{name}'")]
    #[diagnostic(code(E2003))]
    UndeclaredIdentifier {
        name: String,
        #[label("not found in scope")]
        span: SourceSpan,
    },

    #[error("unknown type '{name}'")]
    #[diagnostic(code(E2004))]
    UnknownType {
        name: String,
        #[label("no such type")]
        span: SourceSpan,
    },

    #[error("constants can only be of type int or string, found {ty}")]
    #[diagnostic(code(E2005))]
    InvalidConstType {
        ty: String,
        #[label("invalid constant type")]
        span: SourceSpan,
    },

    #[error("constant declared as {declared} but initialized with {found}")]
    #[diagnostic(code(E2006))]
    ConstTypeMismatch {
        declared: String,
        found: String,
        #[label("type mismatch")]
        span: SourceSpan,
    },

    #[error("cannot perform {op} operation on {types}")]
    #[diagnostic(code(E2007))]
    InvalidOperands {
        op: &'static str,
        types: String,
        #[label("invalid operand types")]
        span: SourceSpan,
    },

    #[error("struct '{struct_name}' has no field '{field}'")]
    #[diagnostic(code(E2008))]
    UnknownField {
        struct_name: String,
        field: String,
        #[label("unknown field")]
        span: SourceSpan,
    },

    #[error("type {ty} has no member '{member}'")]
    #[diagnostic(code(E2009), help("only struct fields and 'Length' can be accessed"))]
    InvalidMemberAccess {
        ty: String,
        member: String,
        #[label("invalid member access")]
        span: SourceSpan,
    },

    #[error("undeclared method '{name}'")]
    #[diagnostic(code(E2010))]
    UndeclaredMethod {
        name: String,
        #[label("no such method")]
        span: SourceSpan,
    },

    #[error("no overload of '{name}' accepts ({args})")]
    #[diagnostic(code(E2011))]
    NoMatchingOverload {
        name: String,
        args: String,
        #[label("no matching overload")]
        span: SourceSpan,
    },

    #[error("expression cannot be called")]
    #[diagnostic(code(E2012), help("call a method by name, or a runtime method as 'cbio.name'"))]
    InvalidCallTarget {
        #[label("not a method name")]
        span: SourceSpan,
    },

    #[error("cannot index into a value of type {ty}")]
    #[diagnostic(code(E2013))]
    InvalidIndexTarget {
        ty: String,
        #[label("not an array")]
        span: SourceSpan,
    },

    #[error("array index must be int, found {ty}")]
    #[diagnostic(code(E2014))]
    InvalidIndexType {
        ty: String,
        #[label("expected int")]
        span: SourceSpan,
    },

    #[error("condition must be bool, found {found}")]
    #[diagnostic(code(E2015))]
    InvalidCondition {
        found: String,
        #[label("expected bool")]
        span: SourceSpan,
    },

    #[error("return type mismatch: expected {expected}, found {found}")]
    #[diagnostic(code(E2016))]
    ReturnTypeMismatch {
        expected: String,
        found: String,
        #[label("wrong return type")]
        span: SourceSpan,
    },

    #[error("cannot assign {value} to {target}")]
    #[diagnostic(code(E2017))]
    AssignmentTypeMismatch {
        target: String,
        value: String,
        #[label("type mismatch")]
        span: SourceSpan,
    },

    #[error("local variable '{name}' is already declared in this scope")]
    #[diagnostic(code(E2018))]
    DuplicateLocal {
        name: String,
        #[label("already declared")]
        span: SourceSpan,
    },

    #[error("expression is not assignable")]
    #[diagnostic(code(E2019), help("only variables, fields and array elements can be assigned"))]
    NotAssignable {
        #[label("cannot assign")]
        span: SourceSpan,
    },

    #[error("break outside of loop")]
    #[diagnostic(code(E2020))]
    BreakOutsideLoop {
        #[label("not inside a loop")]
        span: SourceSpan,
    },

    #[error("struct '{name}' contains itself")]
    #[diagnostic(code(E2021), help("use an array field to hold nested values"))]
    RecursiveStruct {
        name: String,
        #[label("recursive struct")]
        span: SourceSpan,
    },

    #[error("program has no 'Main()' method")]
    #[diagnostic(code(E2022))]
    MissingEntryPoint,

    #[error("array length must be int, found {found}")]
    #[diagnostic(code(E2023))]
    InvalidArrayLength {
        found: String,
        #[label("expected int")]
        span: SourceSpan,
    },

    #[error("array length cannot be negative, found {value}")]
    #[diagnostic(code(E2028))]
    NegativeArrayLength {
        value: i32,
        #[label("negative length")]
        span: SourceSpan,
    },

    #[error("cannot allocate '{name}' with 'new', it is not a struct")]
    #[diagnostic(code(E2024))]
    InvalidNewTarget {
        name: String,
        #[label("not a struct")]
        span: SourceSpan,
    },

    #[error("'out' argument must be assignable")]
    #[diagnostic(code(E2025))]
    InvalidOutArgument {
        #[label("not assignable")]
        span: SourceSpan,
    },

    #[error("the only using identifier allowed is CbRuntime, found '{name}'")]
    #[diagnostic(code(E2026))]
    InvalidUsing {
        name: String,
        #[label("unknown namespace")]
        span: SourceSpan,
    },

    #[error("method name '{name}' is reserved for the runtime")]
    #[diagnostic(code(E2027), help("rename the method"))]
    ReservedMethodName {
        name: String,
        #[label("reserved name")]
        span: SourceSpan,
    },
}

#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum SemanticWarning {
    #[error("unreachable statement")]
    #[diagnostic(code(W2001), severity(Warning))]
    UnreachableCode {
        #[label("this statement is never executed")]
        span: SourceSpan,
    },
}
