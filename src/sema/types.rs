// src/sema/types.rs
//
// Type representation for CFlat's semantic analysis.
//
// Types are interned in a TypeRegistry and referred to by TypeId handles,
// so type equality is a u32 comparison.

use smallvec::SmallVec;

/// Handle to an interned type.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct TypeId(pub(super) u32);

impl TypeId {
    // Reserved ids, interned in this order by TypeRegistry::new()
    pub const VOID: TypeId = TypeId(0);
    pub const INT: TypeId = TypeId(1);
    pub const BOOL: TypeId = TypeId(2);
    pub const STRING: TypeId = TypeId(3);
    /// Sentinel for an expression whose error has already been reported
    pub const ERROR: TypeId = TypeId(4);

    /// First non-reserved index
    pub const FIRST_DYNAMIC: u32 = 5;

    #[inline]
    pub fn is_error(self) -> bool {
        self == Self::ERROR
    }

    #[inline]
    pub fn is_void(self) -> bool {
        self == Self::VOID
    }

    #[inline]
    pub fn is_reserved(self) -> bool {
        self.0 < Self::FIRST_DYNAMIC
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Void,
    Int,
    Bool,
    String,
}

impl PrimitiveKind {
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Void => "void",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Bool => "bool",
            PrimitiveKind::String => "string",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    pub name: String,
    pub ty: TypeId,
}

/// A struct type: identity is its name, fields keep declaration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructType {
    pub name: String,
    pub fields: Vec<StructField>,
}

impl StructType {
    pub fn field(&self, name: &str) -> Option<&StructField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// One parameter of a method signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParamType {
    pub ty: TypeId,
    /// Passed by reference with `out`
    pub out: bool,
}

impl ParamType {
    pub fn value(ty: TypeId) -> Self {
        Self { ty, out: false }
    }

    pub fn out(ty: TypeId) -> Self {
        Self { ty, out: true }
    }
}

/// Most CFlat methods take at most four parameters
pub type ParamVec = SmallVec<[ParamType; 4]>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSig {
    pub params: ParamVec,
    pub result: TypeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Primitive(PrimitiveKind),
    Error,
    Array(TypeId),
    Struct(StructType),
    Method(MethodSig),
}
