// src/sema/globals.rs
//
// Class-level tables filled by the declaration pre-pass: constants and the
// overloaded method table.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::frontend::Symbol;
use crate::sema::types::{ParamVec, TypeId};

/// Index into the method table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MethodId(u32);

/// Runtime-provided methods reachable as `cbio.*`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    ReadInt,
    WriteInt,
    WriteString,
}

#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    pub name: String,
    pub params: ParamVec,
    pub result: TypeId,
    /// Interned method-signature type
    pub sig: TypeId,
    pub builtin: Option<Builtin>,
    pub line: u32,
}

impl MethodDescriptor {
    /// Exact match on arity, parameter modes and parameter types
    pub fn accepts(&self, args: &[(TypeId, bool)]) -> bool {
        self.params.len() == args.len()
            && self
                .params
                .iter()
                .zip(args)
                .all(|(p, &(ty, out))| p.ty == ty && p.out == out)
    }
}

/// Labels the generated listing defines or calls itself. A user method
/// labelled with one of these would shadow or clash with it; `_L`, `_S` and
/// `_C` collide once overloading appends `.k`.
pub const RESERVED_LABELS: &[&str] = &[
    "_start",
    "read_int",
    "write_int",
    "write_string",
    "div_mod",
    "malloc",
    "strlen",
    "_L",
    "_S",
    "_C",
];

pub fn is_reserved_label(name: &str) -> bool {
    RESERVED_LABELS.contains(&name)
}

#[derive(Debug, Clone, Default)]
pub struct MethodTable {
    methods: Vec<MethodDescriptor>,
    by_name: FxHashMap<String, SmallVec<[MethodId; 2]>>,
}

impl MethodTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an overload. Rejected when an overload with the identical
    /// parameter list already exists; the existing one is returned.
    pub fn add(&mut self, desc: MethodDescriptor) -> Result<MethodId, MethodId> {
        if let Some(existing) = self
            .overloads(&desc.name)
            .iter()
            .copied()
            .find(|&id| self.get(id).params == desc.params)
        {
            return Err(existing);
        }
        let id = MethodId(self.methods.len() as u32);
        self.by_name.entry(desc.name.clone()).or_default().push(id);
        self.methods.push(desc);
        Ok(id)
    }

    pub fn get(&self, id: MethodId) -> &MethodDescriptor {
        &self.methods[id.0 as usize]
    }

    /// All overloads of `name`, in declaration order
    pub fn overloads(&self, name: &str) -> &[MethodId] {
        self.by_name.get(name).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn resolve(&self, name: &str, args: &[(TypeId, bool)]) -> Option<MethodId> {
        self.overloads(name)
            .iter()
            .copied()
            .find(|&id| self.get(id).accepts(args))
    }

    /// Assembly label: the plain name unless the method is overloaded, then
    /// `name.k` with k counting overloads from 1 in declaration order.
    pub fn label(&self, id: MethodId) -> String {
        let desc = self.get(id);
        let overloads = self.overloads(&desc.name);
        if overloads.len() <= 1 {
            return desc.name.clone();
        }
        let position = overloads.iter().position(|&o| o == id).unwrap_or(0);
        format!("{}.{}", desc.name, position + 1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MethodId, &MethodDescriptor)> {
        self.methods
            .iter()
            .enumerate()
            .map(|(i, m)| (MethodId(i as u32), m))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstInfo {
    pub ty: TypeId,
    pub line: u32,
}

pub type ConstTable = FxHashMap<Symbol, ConstInfo>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sema::types::ParamType;
    use smallvec::smallvec;

    fn method(name: &str, params: ParamVec) -> MethodDescriptor {
        MethodDescriptor {
            name: name.to_string(),
            params,
            result: TypeId::VOID,
            sig: TypeId::ERROR,
            builtin: None,
            line: 1,
        }
    }

    #[test]
    fn overloads_resolve_by_exact_parameter_types() {
        let mut table = MethodTable::new();
        let f_int = table
            .add(method("f", smallvec![ParamType::value(TypeId::INT)]))
            .unwrap();
        let f_str = table
            .add(method("f", smallvec![ParamType::value(TypeId::STRING)]))
            .unwrap();

        assert_eq!(table.resolve("f", &[(TypeId::INT, false)]), Some(f_int));
        assert_eq!(table.resolve("f", &[(TypeId::STRING, false)]), Some(f_str));
        assert_eq!(table.resolve("f", &[(TypeId::BOOL, false)]), None);
        assert_eq!(table.resolve("f", &[(TypeId::INT, true)]), None);
        assert_eq!(table.label(f_int), "f.1");
        assert_eq!(table.label(f_str), "f.2");
    }

    #[test]
    fn identical_overload_is_rejected() {
        let mut table = MethodTable::new();
        let first = table.add(method("g", smallvec![])).unwrap();
        assert_eq!(table.add(method("g", smallvec![])), Err(first));
        assert_eq!(table.overloads("g").len(), 1);
        assert_eq!(table.label(first), "g");
    }
}
