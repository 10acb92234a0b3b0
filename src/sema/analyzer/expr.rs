// src/sema/analyzer/expr.rs

use super::Analyzer;
use crate::errors::SemanticError;
use crate::frontend::*;
use crate::sema::{TypeId, TypeKind};

/// Pseudo-field available on strings and arrays
pub const LENGTH_FIELD: &str = "Length";

/// Operand and result types for every binary operator
fn binary_rule(op: BinaryOp) -> (TypeId, TypeId) {
    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            (TypeId::INT, TypeId::INT)
        }
        BinaryOp::Eq
        | BinaryOp::Ne
        | BinaryOp::Lt
        | BinaryOp::Gt
        | BinaryOp::Le
        | BinaryOp::Ge => (TypeId::INT, TypeId::BOOL),
        BinaryOp::And | BinaryOp::Or => (TypeId::BOOL, TypeId::BOOL),
    }
}

impl Analyzer {
    /// Check an expression, record its type and return it
    pub(super) fn check_expr(&mut self, expr: &Expr, interner: &Interner) -> TypeId {
        let ty = match &expr.kind {
            ExprKind::IntLiteral(_) => TypeId::INT,
            ExprKind::BoolLiteral(_) => TypeId::BOOL,
            ExprKind::StringLiteral(_) => TypeId::STRING,
            ExprKind::Identifier(sym) => self.check_identifier(*sym, expr.span, interner),
            ExprKind::Binary(bin) => {
                let left = self.check_expr(&bin.left, interner);
                let right = self.check_expr(&bin.right, interner);
                let (required, result) = binary_rule(bin.op);
                self.basic_type_check(bin.op.as_str(), &[left, right], required, result, expr.span)
            }
            ExprKind::Unary(un) => {
                let operand = self.check_expr(&un.operand, interner);
                self.basic_type_check("-", &[operand], TypeId::INT, TypeId::INT, expr.span)
            }
            ExprKind::Field(field) => self.check_field(field, interner),
            ExprKind::Index(index) => self.check_index(index, interner),
            ExprKind::Call(call) => self.check_call(expr, call, interner),
            ExprKind::NewArray(new) => {
                let length = self.check_expr(&new.length, interner);
                if !length.is_error() && length != TypeId::INT {
                    self.add_error(
                        SemanticError::InvalidArrayLength {
                            found: self.type_name(length),
                            span: new.length.span.into(),
                        },
                        new.length.span,
                    );
                } else if let ExprKind::IntLiteral(value) = new.length.kind
                    && value < 0
                {
                    self.add_error(
                        SemanticError::NegativeArrayLength {
                            value,
                            span: new.length.span.into(),
                        },
                        new.length.span,
                    );
                }
                let element = self.resolve_type(&new.element, interner);
                if element.is_error() {
                    TypeId::ERROR
                } else {
                    self.registry.array_of(element)
                }
            }
            ExprKind::NewStruct(new) => {
                let name = interner.resolve(new.name);
                match self.registry.lookup_struct(name) {
                    Some(id) => id,
                    None => {
                        self.add_error(
                            SemanticError::InvalidNewTarget {
                                name: name.to_string(),
                                span: new.name_span.into(),
                            },
                            new.name_span,
                        );
                        TypeId::ERROR
                    }
                }
            }
        };
        self.set_type(expr, ty)
    }

    /// Every operand must have the required type. Operands already typed
    /// `error` are accepted silently.
    pub(super) fn basic_type_check(
        &mut self,
        op: &'static str,
        operands: &[TypeId],
        required: TypeId,
        result: TypeId,
        span: Span,
    ) -> TypeId {
        if operands.iter().any(|ty| ty.is_error()) {
            return TypeId::ERROR;
        }
        if operands.iter().all(|&ty| ty == required) {
            return result;
        }
        let types = operands
            .iter()
            .map(|&ty| self.type_name(ty))
            .collect::<Vec<_>>()
            .join(" and ");
        self.add_error(
            SemanticError::InvalidOperands {
                op,
                types,
                span: span.into(),
            },
            span,
        );
        TypeId::ERROR
    }

    fn check_identifier(&mut self, sym: Symbol, span: Span, interner: &Interner) -> TypeId {
        if let Some(entry) = self.symbols.lookup(sym) {
            return entry.ty;
        }
        if let Some(info) = self.consts.get(&sym) {
            return info.ty;
        }
        self.add_error(
            SemanticError::UndeclaredIdentifier {
                name: interner.resolve(sym).to_string(),
                span: span.into(),
            },
            span,
        );
        // Later uses in this scope resolve to the error type without reporting
        let _ = self.symbols.bind(sym, span.line, TypeId::ERROR);
        TypeId::ERROR
    }

    fn check_field(&mut self, field: &FieldExpr, interner: &Interner) -> TypeId {
        let object = self.check_expr(&field.object, interner);
        if object.is_error() {
            return TypeId::ERROR;
        }
        let member = interner.resolve(field.field);
        // Err carries the struct name when the struct lacks the field
        let found = match self.registry.kind(object) {
            TypeKind::Primitive(_) if object == TypeId::STRING && member == LENGTH_FIELD => {
                Ok(TypeId::INT)
            }
            TypeKind::Array(_) if member == LENGTH_FIELD => Ok(TypeId::INT),
            TypeKind::Struct(st) => st
                .field(member)
                .map(|f| f.ty)
                .ok_or_else(|| Some(st.name.clone())),
            _ => Err(None),
        };
        match found {
            Ok(ty) => ty,
            Err(Some(struct_name)) => {
                self.add_error(
                    SemanticError::UnknownField {
                        struct_name,
                        field: member.to_string(),
                        span: field.field_span.into(),
                    },
                    field.field_span,
                );
                TypeId::ERROR
            }
            Err(None) => {
                self.add_error(
                    SemanticError::InvalidMemberAccess {
                        ty: self.type_name(object),
                        member: member.to_string(),
                        span: field.field_span.into(),
                    },
                    field.field_span,
                );
                TypeId::ERROR
            }
        }
    }

    fn check_index(&mut self, index: &IndexExpr, interner: &Interner) -> TypeId {
        let object = self.check_expr(&index.object, interner);
        let subscript = self.check_expr(&index.index, interner);

        if !subscript.is_error() && subscript != TypeId::INT {
            self.add_error(
                SemanticError::InvalidIndexType {
                    ty: self.type_name(subscript),
                    span: index.index.span.into(),
                },
                index.index.span,
            );
        }
        if object.is_error() {
            return TypeId::ERROR;
        }
        match self.registry.element_type(object) {
            Some(elem) => elem,
            None => {
                self.add_error(
                    SemanticError::InvalidIndexTarget {
                        ty: self.type_name(object),
                        span: index.object.span.into(),
                    },
                    index.object.span,
                );
                TypeId::ERROR
            }
        }
    }

    /// `name` or `receiver.name`; None for any other callee shape
    pub(super) fn call_target_name(callee: &Expr, interner: &Interner) -> Option<String> {
        match &callee.kind {
            ExprKind::Identifier(sym) => Some(interner.resolve(*sym).to_string()),
            ExprKind::Field(field) => match &field.object.kind {
                ExprKind::Identifier(receiver) => Some(format!(
                    "{}.{}",
                    interner.resolve(*receiver),
                    interner.resolve(field.field)
                )),
                _ => None,
            },
            _ => None,
        }
    }

    fn check_call(&mut self, expr: &Expr, call: &CallExpr, interner: &Interner) -> TypeId {
        let span = expr.span;
        let mut args = Vec::with_capacity(call.args.len());
        for arg in &call.args {
            let ty = self.check_expr(&arg.value, interner);
            if arg.out && !self.is_assignable(&arg.value) {
                self.add_error(
                    SemanticError::InvalidOutArgument {
                        span: arg.value.span.into(),
                    },
                    arg.value.span,
                );
            }
            args.push((ty, arg.out));
        }

        let Some(name) = Self::call_target_name(&call.callee, interner) else {
            self.add_error(
                SemanticError::InvalidCallTarget {
                    span: call.callee.span.into(),
                },
                call.callee.span,
            );
            return TypeId::ERROR;
        };

        if self.methods.overloads(&name).is_empty() {
            self.add_error(
                SemanticError::UndeclaredMethod {
                    name,
                    span: call.callee.span.into(),
                },
                call.callee.span,
            );
            return TypeId::ERROR;
        }
        if args.iter().any(|(ty, _)| ty.is_error()) {
            return TypeId::ERROR;
        }

        let Some(id) = self.methods.resolve(&name, &args) else {
            let described = args
                .iter()
                .map(|&(ty, out)| {
                    if out {
                        format!("out {}", self.type_name(ty))
                    } else {
                        self.type_name(ty)
                    }
                })
                .collect::<Vec<_>>()
                .join(", ");
            self.add_error(
                SemanticError::NoMatchingOverload {
                    name,
                    args: described,
                    span: span.into(),
                },
                span,
            );
            return TypeId::ERROR;
        };

        let method = self.methods.get(id);
        let (sig, result) = (method.sig, method.result);
        tracing::trace!(method = %name, label = %self.methods.label(id), "call resolved");
        self.expr_data.set_call(expr.id, id);
        self.expr_data.set_type(call.callee.id, sig);
        result
    }
}
