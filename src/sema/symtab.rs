// src/sema/symtab.rs
//
// Block-scoped symbol table for formals and locals.
//
// Scopes are delimited by markers on a single stack, so entering a scope is
// a push and leaving one pops back to the most recent marker.

use thiserror::Error;

use crate::frontend::Symbol;
use crate::sema::TypeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolEntry {
    pub name: Symbol,
    /// Line of the declaration
    pub line: u32,
    pub ty: TypeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolTableError {
    #[error("name already declared in this scope on line {previous_line}")]
    Duplicate { name: Symbol, previous_line: u32 },

    #[error("scope exit without a matching scope entry")]
    ImbalancedScope,
}

#[derive(Debug, Clone)]
enum Slot {
    Marker,
    Entry(SymbolEntry),
}

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    slots: Vec<Slot>,
    depth: usize,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to a single empty global scope
    pub fn reset(&mut self) {
        self.slots.clear();
        self.depth = 0;
    }

    pub fn enter_scope(&mut self) {
        self.slots.push(Slot::Marker);
        self.depth += 1;
    }

    /// Discard every entry bound since the matching `enter_scope`
    pub fn exit_scope(&mut self) -> Result<(), SymbolTableError> {
        if self.depth == 0 {
            return Err(SymbolTableError::ImbalancedScope);
        }
        while let Some(slot) = self.slots.pop() {
            if matches!(slot, Slot::Marker) {
                break;
            }
        }
        self.depth -= 1;
        Ok(())
    }

    /// Number of open scopes above the global one
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Bind in the innermost scope. Shadowing an outer binding is fine; a
    /// second binding in the same scope is not.
    pub fn bind(
        &mut self,
        name: Symbol,
        line: u32,
        ty: TypeId,
    ) -> Result<SymbolEntry, SymbolTableError> {
        if let Some(previous) = self.lookup_innermost(name) {
            return Err(SymbolTableError::Duplicate {
                name,
                previous_line: previous.line,
            });
        }
        let entry = SymbolEntry { name, line, ty };
        self.slots.push(Slot::Entry(entry));
        Ok(entry)
    }

    /// Most recent binding of `name` in any open scope
    pub fn lookup(&self, name: Symbol) -> Option<&SymbolEntry> {
        self.slots.iter().rev().find_map(|slot| match slot {
            Slot::Entry(entry) if entry.name == name => Some(entry),
            _ => None,
        })
    }

    fn lookup_innermost(&self, name: Symbol) -> Option<&SymbolEntry> {
        for slot in self.slots.iter().rev() {
            match slot {
                Slot::Marker => return None,
                Slot::Entry(entry) if entry.name == name => return Some(entry),
                Slot::Entry(_) => {}
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const X: Symbol = Symbol(0);
    const Y: Symbol = Symbol(1);

    #[test]
    fn inner_binding_disappears_after_exit() {
        let mut table = SymbolTable::new();
        table.enter_scope();
        table.bind(X, 3, TypeId::INT).unwrap();
        assert!(table.lookup(X).is_some());
        table.exit_scope().unwrap();
        assert!(table.lookup(X).is_none());
    }

    #[test]
    fn duplicate_in_same_scope_is_rejected() {
        let mut table = SymbolTable::new();
        table.bind(X, 1, TypeId::INT).unwrap();
        let err = table.bind(X, 2, TypeId::BOOL).unwrap_err();
        assert_eq!(
            err,
            SymbolTableError::Duplicate {
                name: X,
                previous_line: 1
            }
        );
        assert_eq!(
            err.to_string(),
            "name already declared in this scope on line 1"
        );
        assert_eq!(table.lookup(X).unwrap().ty, TypeId::INT);
    }

    #[test]
    fn shadowing_returns_latest_binding() {
        let mut table = SymbolTable::new();
        table.bind(X, 1, TypeId::INT).unwrap();
        table.enter_scope();
        table.bind(X, 2, TypeId::STRING).unwrap();
        assert_eq!(table.lookup(X).unwrap().ty, TypeId::STRING);
        table.exit_scope().unwrap();
        assert_eq!(table.lookup(X).unwrap().ty, TypeId::INT);
    }

    #[test]
    fn sibling_blocks_may_reuse_names() {
        let mut table = SymbolTable::new();
        table.enter_scope();
        table.bind(Y, 1, TypeId::INT).unwrap();
        table.exit_scope().unwrap();
        table.enter_scope();
        assert!(table.bind(Y, 2, TypeId::BOOL).is_ok());
    }

    #[test]
    fn exit_without_enter_is_imbalanced() {
        let mut table = SymbolTable::new();
        assert_eq!(table.exit_scope(), Err(SymbolTableError::ImbalancedScope));
        table.enter_scope();
        table.reset();
        assert_eq!(table.depth(), 0);
        assert_eq!(table.exit_scope(), Err(SymbolTableError::ImbalancedScope));
    }
}
