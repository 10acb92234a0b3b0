// src/sema/analyzer/declarations.rs
//
// Declaration pre-pass: fills the struct, constant and method tables before
// any method body is checked, so bodies may refer to members declared later.

use smallvec::smallvec;

use super::Analyzer;
use crate::errors::SemanticError;
use crate::frontend::*;
use crate::sema::types::{MethodSig, ParamType, ParamVec};
use crate::sema::{Builtin, ConstInfo, MethodDescriptor, TypeId, is_reserved_label};

/// Name of the method `_start` branches to
pub const ENTRY_METHOD: &str = "Main";

impl Analyzer {
    pub(super) fn collect_declarations(&mut self, program: &Program, interner: &Interner) {
        self.inject_runtime_methods();

        // Pass 1: struct names, so field and parameter types may refer to
        // any struct regardless of declaration order
        let mut registered = Vec::with_capacity(program.declarations.len());
        for decl in &program.declarations {
            let accepted = match decl {
                Decl::Struct(s) => self.declare_struct(s, interner),
                _ => true,
            };
            registered.push(accepted);
        }

        // Pass 2: struct fields, constants and method signatures
        for (decl, accepted) in program.declarations.iter().zip(registered) {
            match decl {
                Decl::Struct(s) if accepted => self.collect_fields(s, interner),
                Decl::Struct(_) => {}
                Decl::Const(c) => self.collect_const(c, interner),
                Decl::Method(m) => self.collect_method(m, interner),
            }
        }

        for decl in &program.declarations {
            if let Decl::Struct(s) = decl {
                self.check_struct_recursion(s, interner);
            }
        }

        self.check_entry_point();

        tracing::debug!(
            declarations = program.declarations.len(),
            methods = self.methods.iter().count(),
            consts = self.consts.len(),
            "declarations collected"
        );
    }

    /// `cbio.read(out int)`, `cbio.write(int)` and `cbio.write(string)`
    fn inject_runtime_methods(&mut self) {
        let runtime: [(&str, ParamType, Builtin); 3] = [
            ("cbio.read", ParamType::out(TypeId::INT), Builtin::ReadInt),
            ("cbio.write", ParamType::value(TypeId::INT), Builtin::WriteInt),
            (
                "cbio.write",
                ParamType::value(TypeId::STRING),
                Builtin::WriteString,
            ),
        ];
        for (name, param, builtin) in runtime {
            let params: ParamVec = smallvec![param];
            let sig = self.registry.method_type(MethodSig {
                params: params.clone(),
                result: TypeId::VOID,
            });
            let added = self.methods.add(MethodDescriptor {
                name: name.to_string(),
                params,
                result: TypeId::VOID,
                sig,
                builtin: Some(builtin),
                line: 0,
            });
            debug_assert!(added.is_ok());
        }
    }

    fn declare_struct(&mut self, decl: &StructDecl, interner: &Interner) -> bool {
        let name = interner.resolve(decl.name);
        if self.registry.declare_struct(name).is_ok() {
            return true;
        }
        self.add_error(
            SemanticError::DuplicateDeclaration {
                kind: "struct",
                name: name.to_string(),
                span: decl.span.into(),
            },
            decl.span,
        );
        false
    }

    fn collect_fields(&mut self, decl: &StructDecl, interner: &Interner) {
        let struct_name = interner.resolve(decl.name);
        let Some(struct_id) = self.registry.lookup_struct(struct_name) else {
            return;
        };

        for field in &decl.fields {
            let ty = self.resolve_type(&field.ty, interner);
            for (name, span) in &field.names {
                let field_name = interner.resolve(*name);
                if !self.registry.add_field(struct_id, field_name, ty) {
                    self.add_error(
                        SemanticError::DuplicateField {
                            struct_name: struct_name.to_string(),
                            field: field_name.to_string(),
                            span: (*span).into(),
                        },
                        *span,
                    );
                }
            }
        }
    }

    fn collect_const(&mut self, decl: &ConstDecl, interner: &Interner) {
        let declared = self.resolve_type(&decl.ty, interner);
        let literal = match decl.value.kind {
            ExprKind::IntLiteral(_) => TypeId::INT,
            ExprKind::StringLiteral(_) => TypeId::STRING,
            ExprKind::BoolLiteral(_) => TypeId::BOOL,
            // the parser only accepts literal initializers
            _ => TypeId::ERROR,
        };
        self.set_type(&decl.value, literal);

        if !declared.is_error() && declared != TypeId::INT && declared != TypeId::STRING {
            self.add_error(
                SemanticError::InvalidConstType {
                    ty: self.type_name(declared),
                    span: decl.span.into(),
                },
                decl.span,
            );
        } else if !declared.is_error() && !literal.is_error() && literal != declared {
            self.add_error(
                SemanticError::ConstTypeMismatch {
                    declared: self.type_name(declared),
                    found: self.type_name(literal),
                    span: decl.value.span.into(),
                },
                decl.value.span,
            );
        }

        if self.consts.contains_key(&decl.name) {
            self.add_error(
                SemanticError::DuplicateDeclaration {
                    kind: "constant",
                    name: interner.resolve(decl.name).to_string(),
                    span: decl.span.into(),
                },
                decl.span,
            );
            return;
        }
        self.consts.insert(
            decl.name,
            ConstInfo {
                ty: declared,
                line: decl.span.line,
            },
        );
    }

    fn collect_method(&mut self, decl: &MethodDecl, interner: &Interner) {
        let result = match &decl.return_type {
            Some(ty) => self.resolve_type(ty, interner),
            None => TypeId::VOID,
        };
        let params: ParamVec = decl
            .params
            .iter()
            .map(|p| ParamType::value(self.resolve_type(&p.ty, interner)))
            .collect();

        let sig = self.registry.method_type(MethodSig {
            params: params.clone(),
            result,
        });
        self.method_sigs.insert(decl.id, sig);

        let name = interner.resolve(decl.name).to_string();
        if is_reserved_label(&name) {
            self.add_error(
                SemanticError::ReservedMethodName {
                    name,
                    span: decl.span.into(),
                },
                decl.span,
            );
            return;
        }

        let added = self.methods.add(MethodDescriptor {
            name: name.clone(),
            params,
            result,
            sig,
            builtin: None,
            line: decl.span.line,
        });
        match added {
            Ok(id) => self.expr_data.set_method(decl.id, id),
            Err(_) => self.add_error(
                SemanticError::DuplicateDeclaration {
                    kind: "method",
                    name,
                    span: decl.span.into(),
                },
                decl.span,
            ),
        }
    }

    fn check_struct_recursion(&mut self, decl: &StructDecl, interner: &Interner) {
        let name = interner.resolve(decl.name);
        let Some(id) = self.registry.lookup_struct(name) else {
            return;
        };
        if self.registry.is_recursive_struct(id) {
            self.add_error(
                SemanticError::RecursiveStruct {
                    name: name.to_string(),
                    span: decl.span.into(),
                },
                decl.span,
            );
        }
    }

    fn check_entry_point(&mut self) {
        let has_entry = self
            .methods
            .overloads(ENTRY_METHOD)
            .iter()
            .any(|&id| self.methods.get(id).params.is_empty());
        if !has_entry {
            self.add_error(SemanticError::MissingEntryPoint, Span::default());
        }
    }

    /// Signature recorded for a method declaration by the pre-pass
    pub(super) fn method_signature(&self, decl: &MethodDecl) -> MethodSig {
        self.method_sigs
            .get(&decl.id)
            .and_then(|&sig| self.registry.method_sig(sig))
            .cloned()
            .unwrap_or(MethodSig {
                params: ParamVec::new(),
                result: TypeId::ERROR,
            })
    }
}
