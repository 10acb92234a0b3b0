// src/sema/analyzer/mod.rs
//
// Type checker and AST annotator.
//
// Analysis runs a declaration pre-pass over the class members, then checks
// every method body. Errors are collected rather than propagated: the
// checker always finishes its traversal so one run reports everything.

mod declarations;
mod expr;
mod stmt;

use rustc_hash::FxHashMap;

use crate::errors::{SemanticError, SemanticWarning, plain_line};
use crate::frontend::*;
use crate::sema::{
    ConstTable, ExpressionData, MethodTable, SymbolTable, TypeId, TypeRegistry,
};

/// A type error wrapping a miette-enabled SemanticError
#[derive(Debug, Clone, PartialEq)]
pub struct TypeError {
    pub error: SemanticError,
    pub span: Span,
}

impl TypeError {
    pub fn new(error: SemanticError, span: Span) -> Self {
        Self { error, span }
    }

    /// `<line>: <message>`, without the prefix for errors not tied to a line
    pub fn plain(&self) -> String {
        plain_line(self.span.line, &self.error.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeWarning {
    pub warning: SemanticWarning,
    pub span: Span,
}

impl TypeWarning {
    pub fn new(warning: SemanticWarning, span: Span) -> Self {
        Self { warning, span }
    }

    pub fn plain(&self) -> String {
        plain_line(self.span.line, &format!("warning: {}", self.warning))
    }
}

/// Everything code generation needs from a successful analysis
#[derive(Debug, Clone)]
pub struct AnalysisOutput {
    pub registry: TypeRegistry,
    pub methods: MethodTable,
    pub consts: ConstTable,
    pub expr_data: ExpressionData,
}

pub struct Analyzer {
    registry: TypeRegistry,
    methods: MethodTable,
    consts: ConstTable,
    symbols: SymbolTable,
    expr_data: ExpressionData,
    /// Resolved signature type of every method declaration, accepted or not
    method_sigs: FxHashMap<NodeId, TypeId>,
    errors: Vec<TypeError>,
    warnings: Vec<TypeWarning>,
    /// Declared result type of the method being checked
    current_return: TypeId,
    /// Number of enclosing `while` loops
    loop_depth: u32,
    /// Local slots declared so far in the current method
    local_slots: u32,
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            registry: TypeRegistry::new(),
            methods: MethodTable::new(),
            consts: ConstTable::default(),
            symbols: SymbolTable::new(),
            expr_data: ExpressionData::new(),
            method_sigs: FxHashMap::default(),
            errors: Vec::new(),
            warnings: Vec::new(),
            current_return: TypeId::VOID,
            loop_depth: 0,
            local_slots: 0,
        }
    }

    /// Helper to add a type error
    fn add_error(&mut self, error: SemanticError, span: Span) {
        tracing::trace!(line = span.line, %error, "semantic error");
        self.errors.push(TypeError::new(error, span));
    }

    fn add_warning(&mut self, warning: SemanticWarning, span: Span) {
        self.warnings.push(TypeWarning::new(warning, span));
    }

    /// Record and return the type of an expression node
    fn set_type(&mut self, expr: &Expr, ty: TypeId) -> TypeId {
        self.expr_data.set_type(expr.id, ty);
        ty
    }

    fn type_name(&self, ty: TypeId) -> String {
        self.registry.display(ty)
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    pub fn errors(&self) -> &[TypeError] {
        &self.errors
    }

    pub fn warnings(&self) -> &[TypeWarning] {
        &self.warnings
    }

    pub fn expression_data(&self) -> &ExpressionData {
        &self.expr_data
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Check a whole program. Returns the collected errors when there is at
    /// least one; warnings are available either way.
    #[tracing::instrument(skip_all)]
    pub fn analyze(
        &mut self,
        program: &Program,
        interner: &Interner,
    ) -> Result<(), Vec<TypeError>> {
        self.check_usings(program, interner);
        self.collect_declarations(program, interner);

        for decl in &program.declarations {
            if let Decl::Method(method) = decl {
                self.check_method(method, interner);
            }
        }

        tracing::debug!(
            errors = self.errors.len(),
            warnings = self.warnings.len(),
            "analysis finished"
        );

        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors.clone())
        }
    }

    /// Hand the tables over to code generation
    pub fn into_output(self) -> AnalysisOutput {
        AnalysisOutput {
            registry: self.registry,
            methods: self.methods,
            consts: self.consts,
            expr_data: self.expr_data,
        }
    }

    fn check_usings(&mut self, program: &Program, interner: &Interner) {
        for using in &program.usings {
            let name = interner.resolve(using.name);
            if name != "CbRuntime" {
                self.add_error(
                    SemanticError::InvalidUsing {
                        name: name.to_string(),
                        span: using.span.into(),
                    },
                    using.span,
                );
            }
        }
    }

    /// Resolve a written type, reporting unknown struct names
    fn resolve_type(&mut self, ty: &TypeExpr, interner: &Interner) -> TypeId {
        match ty {
            TypeExpr::Primitive(PrimitiveType::Int) => TypeId::INT,
            TypeExpr::Primitive(PrimitiveType::Bool) => TypeId::BOOL,
            TypeExpr::Primitive(PrimitiveType::String) => TypeId::STRING,
            TypeExpr::Named(sym, span) => {
                let name = interner.resolve(*sym);
                match self.registry.lookup_struct(name) {
                    Some(id) => id,
                    None => {
                        self.add_error(
                            SemanticError::UnknownType {
                                name: name.to_string(),
                                span: (*span).into(),
                            },
                            *span,
                        );
                        TypeId::ERROR
                    }
                }
            }
            TypeExpr::Array(elem) => {
                let elem = self.resolve_type(elem, interner);
                if elem.is_error() {
                    TypeId::ERROR
                } else {
                    self.registry.array_of(elem)
                }
            }
        }
    }

    /// Check one method body with a fresh symbol table
    fn check_method(&mut self, method: &MethodDecl, interner: &Interner) {
        let _span = tracing::debug_span!("method", name = interner.resolve(method.name)).entered();

        self.symbols.reset();
        self.loop_depth = 0;
        self.local_slots = 0;

        let sig = self.method_signature(method);
        self.current_return = sig.result;

        for (param, param_ty) in method.params.iter().zip(sig.params.iter()) {
            if self
                .symbols
                .bind(param.name, param.span.line, param_ty.ty)
                .is_err()
            {
                self.add_error(
                    SemanticError::DuplicateLocal {
                        name: interner.resolve(param.name).to_string(),
                        span: param.span.into(),
                    },
                    param.span,
                );
            }
        }

        self.check_block(&method.body, interner);
        self.expr_data
            .set_frame_slots(method.id, self.local_slots);
        tracing::trace!(slots = self.local_slots, "method checked");
    }
}

#[cfg(test)]
mod tests;
