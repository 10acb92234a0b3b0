// src/sema/type_registry.rs
//
// Per-compilation type storage with deduplication.
//
// - primitives and the error sentinel live at reserved indices
// - array types are memoized by element type
// - struct types are registered by name and filled in field by field
// - method signatures are interned by value

use rustc_hash::FxHashMap;

use crate::sema::types::{
    MethodSig, PrimitiveKind, StructField, StructType, TypeId, TypeKind,
};

/// Size in bytes of every scalar value (int, bool, string and array references)
pub const WORD_SIZE: u32 = 4;

#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: Vec<TypeKind>,
    arrays: FxHashMap<TypeId, TypeId>,
    structs: FxHashMap<String, TypeId>,
    methods: FxHashMap<MethodSig, TypeId>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        let types = vec![
            TypeKind::Primitive(PrimitiveKind::Void),
            TypeKind::Primitive(PrimitiveKind::Int),
            TypeKind::Primitive(PrimitiveKind::Bool),
            TypeKind::Primitive(PrimitiveKind::String),
            TypeKind::Error,
        ];
        debug_assert_eq!(types.len() as u32, TypeId::FIRST_DYNAMIC);
        Self {
            types,
            arrays: FxHashMap::default(),
            structs: FxHashMap::default(),
            methods: FxHashMap::default(),
        }
    }

    fn push(&mut self, kind: TypeKind) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.types.push(kind);
        id
    }

    pub fn kind(&self, id: TypeId) -> &TypeKind {
        &self.types[id.0 as usize]
    }

    pub fn primitive(&self, kind: PrimitiveKind) -> TypeId {
        match kind {
            PrimitiveKind::Void => TypeId::VOID,
            PrimitiveKind::Int => TypeId::INT,
            PrimitiveKind::Bool => TypeId::BOOL,
            PrimitiveKind::String => TypeId::STRING,
        }
    }

    pub fn error(&self) -> TypeId {
        TypeId::ERROR
    }

    /// The array type with the given element type; one handle per element type
    pub fn array_of(&mut self, elem: TypeId) -> TypeId {
        if let Some(&id) = self.arrays.get(&elem) {
            return id;
        }
        let id = self.push(TypeKind::Array(elem));
        self.arrays.insert(elem, id);
        id
    }

    pub fn element_type(&self, id: TypeId) -> Option<TypeId> {
        match self.kind(id) {
            TypeKind::Array(elem) => Some(*elem),
            _ => None,
        }
    }

    /// Register a struct with no fields yet. A repeated name yields the
    /// existing handle as the error.
    pub fn declare_struct(&mut self, name: &str) -> Result<TypeId, TypeId> {
        if let Some(&existing) = self.structs.get(name) {
            return Err(existing);
        }
        let id = self.push(TypeKind::Struct(StructType {
            name: name.to_string(),
            fields: Vec::new(),
        }));
        self.structs.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn lookup_struct(&self, name: &str) -> Option<TypeId> {
        self.structs.get(name).copied()
    }

    pub fn struct_type(&self, id: TypeId) -> Option<&StructType> {
        match self.kind(id) {
            TypeKind::Struct(st) => Some(st),
            _ => None,
        }
    }

    pub fn is_struct(&self, id: TypeId) -> bool {
        matches!(self.kind(id), TypeKind::Struct(_))
    }

    /// Append a field; false if the struct already has a field of that name,
    /// in which case the first declaration wins.
    pub fn add_field(&mut self, struct_id: TypeId, name: &str, ty: TypeId) -> bool {
        let TypeKind::Struct(st) = &mut self.types[struct_id.0 as usize] else {
            return false;
        };
        if st.field(name).is_some() {
            return false;
        }
        st.fields.push(StructField {
            name: name.to_string(),
            ty,
        });
        true
    }

    pub fn method_type(&mut self, sig: MethodSig) -> TypeId {
        if let Some(&id) = self.methods.get(&sig) {
            return id;
        }
        let id = self.push(TypeKind::Method(sig.clone()));
        self.methods.insert(sig, id);
        id
    }

    pub fn method_sig(&self, id: TypeId) -> Option<&MethodSig> {
        match self.kind(id) {
            TypeKind::Method(sig) => Some(sig),
            _ => None,
        }
    }

    /// Storage size in bytes. Structs are laid out flat, so their size is
    /// the sum of their field sizes.
    pub fn size_of(&self, id: TypeId) -> u32 {
        let mut visiting = Vec::new();
        self.size_of_guarded(id, &mut visiting)
    }

    fn size_of_guarded(&self, id: TypeId, visiting: &mut Vec<TypeId>) -> u32 {
        match self.kind(id) {
            TypeKind::Struct(st) => {
                // A recursive struct has already been reported; give it a word
                if visiting.contains(&id) {
                    return WORD_SIZE;
                }
                visiting.push(id);
                let size = st
                    .fields
                    .iter()
                    .map(|f| self.size_of_guarded(f.ty, visiting))
                    .sum();
                visiting.pop();
                size
            }
            TypeKind::Primitive(PrimitiveKind::Void) => 0,
            _ => WORD_SIZE,
        }
    }

    /// Number of 4-byte words needed to store a value of this type
    pub fn words_of(&self, id: TypeId) -> u32 {
        self.size_of(id).div_ceil(WORD_SIZE).max(1)
    }

    /// Field type and byte offset within its struct
    pub fn field_layout(&self, struct_id: TypeId, name: &str) -> Option<(TypeId, u32)> {
        let st = self.struct_type(struct_id)?;
        let mut offset = 0;
        for field in &st.fields {
            if field.name == name {
                return Some((field.ty, offset));
            }
            offset += self.size_of(field.ty);
        }
        None
    }

    /// Whether a struct contains itself by value, directly or through other
    /// struct fields. Arrays break the cycle since they are references.
    pub fn is_recursive_struct(&self, id: TypeId) -> bool {
        let mut stack: Vec<TypeId> = self
            .struct_type(id)
            .map(|st| st.fields.iter().map(|f| f.ty).collect())
            .unwrap_or_default();
        let mut seen = Vec::new();
        while let Some(ty) = stack.pop() {
            if ty == id {
                return true;
            }
            if seen.contains(&ty) {
                continue;
            }
            seen.push(ty);
            if let Some(st) = self.struct_type(ty) {
                stack.extend(st.fields.iter().map(|f| f.ty));
            }
        }
        false
    }

    /// Human-readable type name for diagnostics
    pub fn display(&self, id: TypeId) -> String {
        match self.kind(id) {
            TypeKind::Primitive(p) => p.name().to_string(),
            TypeKind::Error => "<error>".to_string(),
            TypeKind::Array(elem) => format!("{}[]", self.display(*elem)),
            TypeKind::Struct(st) => st.name.clone(),
            TypeKind::Method(sig) => {
                let params: Vec<String> = sig
                    .params
                    .iter()
                    .map(|p| {
                        if p.out {
                            format!("out {}", self.display(p.ty))
                        } else {
                            self.display(p.ty)
                        }
                    })
                    .collect();
                format!("({}) -> {}", params.join(", "), self.display(sig.result))
            }
        }
    }
}
