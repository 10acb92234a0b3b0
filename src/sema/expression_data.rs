// src/sema/expression_data.rs
//! Node-level metadata produced by semantic analysis.
//!
//! The AST stays immutable; everything the checker learns about a node is
//! recorded here, keyed by NodeId, for the code generator to read.

use rustc_hash::FxHashMap;

use crate::frontend::NodeId;
use crate::sema::{MethodId, TypeId};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExpressionData {
    /// Type of each expression node
    types: FxHashMap<NodeId, TypeId>,
    /// Overload chosen for each call expression
    calls: FxHashMap<NodeId, MethodId>,
    /// Method table entry for each method declaration
    methods: FxHashMap<NodeId, MethodId>,
    /// Number of 4-byte local slots for each method declaration
    frame_slots: FxHashMap<NodeId, u32>,
}

impl ExpressionData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_type(&self, node: NodeId) -> Option<TypeId> {
        self.types.get(&node).copied()
    }

    pub fn set_type(&mut self, node: NodeId, ty: TypeId) {
        self.types.insert(node, ty);
    }

    pub fn get_call(&self, node: NodeId) -> Option<MethodId> {
        self.calls.get(&node).copied()
    }

    pub fn set_call(&mut self, node: NodeId, method: MethodId) {
        self.calls.insert(node, method);
    }

    pub fn get_method(&self, decl: NodeId) -> Option<MethodId> {
        self.methods.get(&decl).copied()
    }

    pub fn set_method(&mut self, decl: NodeId, method: MethodId) {
        self.methods.insert(decl, method);
    }

    pub fn frame_slots(&self, decl: NodeId) -> Option<u32> {
        self.frame_slots.get(&decl).copied()
    }

    pub fn set_frame_slots(&mut self, decl: NodeId, slots: u32) {
        self.frame_slots.insert(decl, slots);
    }

    /// All expression types
    pub fn types(&self) -> &FxHashMap<NodeId, TypeId> {
        &self.types
    }
}
