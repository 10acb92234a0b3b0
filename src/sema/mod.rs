// src/sema/mod.rs
pub mod analyzer;
pub mod expression_data;
pub mod globals;
pub mod symtab;
pub mod type_registry;
pub mod types;

pub use analyzer::{AnalysisOutput, Analyzer, TypeError, TypeWarning};
pub use expression_data::ExpressionData;
pub use globals::{
    Builtin, ConstInfo, ConstTable, MethodDescriptor, MethodId, MethodTable, RESERVED_LABELS,
    is_reserved_label,
};
pub use symtab::{SymbolEntry, SymbolTable, SymbolTableError};
pub use type_registry::{TypeRegistry, WORD_SIZE};
pub use types::{MethodSig, ParamType, ParamVec, PrimitiveKind, StructType, TypeId, TypeKind};
