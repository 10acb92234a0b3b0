// src/frontend/intern.rs

use crate::frontend::ast::Symbol;
use rustc_hash::FxHashMap;

/// Interns identifier text to compact Symbol handles
#[derive(Debug, Default, Clone)]
pub struct Interner {
    map: FxHashMap<String, Symbol>,
    strings: Vec<String>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&mut self, s: &str) -> Symbol {
        if let Some(&sym) = self.map.get(s) {
            return sym;
        }

        let sym = Symbol(self.strings.len() as u32);
        self.strings.push(s.to_string());
        self.map.insert(s.to_string(), sym);
        sym
    }

    /// Find the symbol for already-interned text without adding it
    pub fn lookup(&self, s: &str) -> Option<Symbol> {
        self.map.get(s).copied()
    }

    pub fn resolve(&self, sym: Symbol) -> &str {
        &self.strings[sym.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_returns_same_symbol() {
        let mut interner = Interner::new();
        let s1 = interner.intern("Main");
        let s2 = interner.intern("Main");
        let s3 = interner.intern("cbio");

        assert_eq!(s1, s2);
        assert_ne!(s1, s3);
        assert_eq!(interner.lookup("cbio"), Some(s3));
        assert_eq!(interner.lookup("missing"), None);
    }

    #[test]
    fn resolve_returns_original_string() {
        let mut interner = Interner::new();
        let sym = interner.intern("total");
        assert_eq!(interner.resolve(sym), "total");
    }
}
