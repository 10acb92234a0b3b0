// src/frontend/ast_display.rs
//! Pretty-printing for AST nodes with symbol resolution.

use std::fmt::Write;

use crate::frontend::{
    Argument, Block, Decl, Expr, ExprKind, Interner, MethodDecl, NodeId, PrimitiveType, Program,
    Stmt, TypeExpr,
};

/// Pretty-printer for AST nodes that resolves symbols via an Interner.
///
/// When a type lookup is attached, every expression line is suffixed with
/// `: <type>` so the annotated tree can be inspected after checking.
pub struct AstPrinter<'a> {
    interner: &'a Interner,
    types: Option<&'a dyn Fn(NodeId) -> Option<String>>,
    indent: usize,
}

impl<'a> AstPrinter<'a> {
    pub fn new(interner: &'a Interner) -> Self {
        Self {
            interner,
            types: None,
            indent: 0,
        }
    }

    /// Attach a per-node type lookup
    pub fn with_types(mut self, types: &'a dyn Fn(NodeId) -> Option<String>) -> Self {
        self.types = Some(types);
        self
    }

    /// Print an entire program to a String.
    pub fn print_program(&self, program: &Program) -> String {
        let mut out = String::new();
        self.write_program(&mut out, program);
        out
    }

    fn write_indent(&self, out: &mut String) {
        for _ in 0..self.indent {
            out.push_str("  ");
        }
    }

    fn indented(&self) -> Self {
        Self {
            interner: self.interner,
            types: self.types,
            indent: self.indent + 1,
        }
    }

    fn line(&self, out: &mut String, text: impl AsRef<str>) {
        self.write_indent(out);
        out.push_str(text.as_ref());
        out.push('\n');
    }

    fn write_program(&self, out: &mut String, program: &Program) {
        self.line(
            out,
            format!("Program \"{}\"", self.interner.resolve(program.class_name)),
        );
        let inner = self.indented();
        for using in &program.usings {
            inner.line(out, format!("Using {}", self.interner.resolve(using.name)));
        }
        for decl in &program.declarations {
            inner.write_decl(out, decl);
        }
    }

    fn write_decl(&self, out: &mut String, decl: &Decl) {
        match decl {
            Decl::Const(c) => {
                self.line(
                    out,
                    format!(
                        "Const \"{}\": {} (line {})",
                        self.interner.resolve(c.name),
                        self.type_text(&c.ty),
                        c.span.line
                    ),
                );
                self.indented().write_expr(out, &c.value);
            }
            Decl::Struct(s) => {
                self.line(
                    out,
                    format!(
                        "Struct \"{}\" (line {})",
                        self.interner.resolve(s.name),
                        s.span.line
                    ),
                );
                let inner = self.indented();
                for field in &s.fields {
                    for (name, _) in &field.names {
                        inner.line(
                            out,
                            format!(
                                "Field {}: {}",
                                self.interner.resolve(*name),
                                self.type_text(&field.ty)
                            ),
                        );
                    }
                }
            }
            Decl::Method(m) => self.write_method(out, m),
        }
    }

    fn write_method(&self, out: &mut String, method: &MethodDecl) {
        self.line(
            out,
            format!(
                "Method \"{}\" (line {})",
                self.interner.resolve(method.name),
                method.span.line
            ),
        );

        let inner = self.indented();
        if !method.params.is_empty() {
            let params: Vec<String> = method
                .params
                .iter()
                .map(|p| format!("{} {}", self.type_text(&p.ty), self.interner.resolve(p.name)))
                .collect();
            inner.line(out, format!("params: [{}]", params.join(", ")));
        }
        let result = method
            .return_type
            .as_ref()
            .map(|t| self.type_text(t))
            .unwrap_or_else(|| "void".to_string());
        inner.line(out, format!("returns: {}", result));
        inner.line(out, "body:");
        inner.indented().write_block(out, &method.body);
    }

    fn write_block(&self, out: &mut String, block: &Block) {
        self.line(out, "Block");
        let inner = self.indented();
        for stmt in &block.stmts {
            inner.write_stmt(out, stmt);
        }
    }

    fn write_stmt(&self, out: &mut String, stmt: &Stmt) {
        let inner = self.indented();
        match stmt {
            Stmt::LocalDecl(decl) => {
                let names: Vec<&str> = decl
                    .names
                    .iter()
                    .map(|(n, _)| self.interner.resolve(*n))
                    .collect();
                self.line(
                    out,
                    format!("LocalDecl {}: {}", self.type_text(&decl.ty), names.join(", ")),
                );
            }
            Stmt::Assign(assign) => {
                self.line(out, "Assign");
                inner.write_expr(out, &assign.target);
                inner.write_expr(out, &assign.value);
            }
            Stmt::Call(call) => {
                self.line(out, "CallStmt");
                inner.write_expr(out, &call.call);
            }
            Stmt::Increment(s) => {
                self.line(out, "PlusPlus");
                inner.write_expr(out, &s.target);
            }
            Stmt::Decrement(s) => {
                self.line(out, "MinusMinus");
                inner.write_expr(out, &s.target);
            }
            Stmt::If(s) => {
                self.line(out, "If");
                inner.write_expr(out, &s.condition);
                inner.write_stmt(out, &s.then_branch);
                if let Some(else_branch) = &s.else_branch {
                    inner.line(out, "Else");
                    inner.indented().write_stmt(out, else_branch);
                }
            }
            Stmt::While(s) => {
                self.line(out, "While");
                inner.write_expr(out, &s.condition);
                inner.write_stmt(out, &s.body);
            }
            Stmt::Break(_) => self.line(out, "Break"),
            Stmt::Return(s) => {
                self.line(out, "Return");
                if let Some(value) = &s.value {
                    inner.write_expr(out, value);
                }
            }
            Stmt::Block(block) => self.write_block(out, block),
            Stmt::Empty(_) => self.line(out, "Empty"),
        }
    }

    fn write_expr(&self, out: &mut String, expr: &Expr) {
        let inner = self.indented();
        let label = match &expr.kind {
            ExprKind::IntLiteral(n) => format!("IntConst {}", n),
            ExprKind::BoolLiteral(b) => format!("BoolConst {}", b),
            ExprKind::StringLiteral(s) => format!("StringConst {:?}", s),
            ExprKind::Identifier(sym) => format!("Ident {}", self.interner.resolve(*sym)),
            ExprKind::Binary(bin) => bin.op.name().to_string(),
            ExprKind::Unary(_) => "UnaryMinus".to_string(),
            ExprKind::Field(field) => format!("Dot .{}", self.interner.resolve(field.field)),
            ExprKind::Index(_) => "Index".to_string(),
            ExprKind::Call(_) => "Call".to_string(),
            ExprKind::NewArray(new) => format!("NewArray {}", self.type_text(&new.element)),
            ExprKind::NewStruct(new) => format!("NewStruct {}", self.interner.resolve(new.name)),
        };
        self.write_indent(out);
        out.push_str(&label);
        if let Some(types) = self.types {
            let ty = types(expr.id).unwrap_or_else(|| "?".to_string());
            let _ = write!(out, " : {}", ty);
        }
        out.push('\n');

        match &expr.kind {
            ExprKind::Binary(bin) => {
                inner.write_expr(out, &bin.left);
                inner.write_expr(out, &bin.right);
            }
            ExprKind::Unary(un) => inner.write_expr(out, &un.operand),
            ExprKind::Field(field) => inner.write_expr(out, &field.object),
            ExprKind::Index(index) => {
                inner.write_expr(out, &index.object);
                inner.write_expr(out, &index.index);
            }
            ExprKind::Call(call) => {
                inner.write_expr(out, &call.callee);
                for Argument { out: is_out, value } in &call.args {
                    if *is_out {
                        inner.line(out, "out");
                        inner.indented().write_expr(out, value);
                    } else {
                        inner.write_expr(out, value);
                    }
                }
            }
            ExprKind::NewArray(new) => inner.write_expr(out, &new.length),
            _ => {}
        }
    }

    fn type_text(&self, ty: &TypeExpr) -> String {
        match ty {
            TypeExpr::Primitive(PrimitiveType::Int) => "int".to_string(),
            TypeExpr::Primitive(PrimitiveType::Bool) => "bool".to_string(),
            TypeExpr::Primitive(PrimitiveType::String) => "string".to_string(),
            TypeExpr::Named(sym, _) => self.interner.resolve(*sym).to_string(),
            TypeExpr::Array(elem) => format!("{}[]", self.type_text(elem)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::Parser;

    #[test]
    fn prints_nested_structure() {
        let source = "class P { static int f(int a) { return a + 1; } }";
        let mut parser = Parser::new(source);
        let program = parser.parse_program().unwrap();
        let interner = parser.into_interner();

        let text = AstPrinter::new(&interner).print_program(&program);
        assert!(text.starts_with("Program \"P\"\n"));
        assert!(text.contains("Method \"f\" (line 1)"));
        assert!(text.contains("params: [int a]"));
        assert!(text.contains("Return\n"));
        assert!(text.contains("Add\n"));
        assert!(text.contains("IntConst 1\n"));
    }

    #[test]
    fn prints_type_annotations_when_attached() {
        let source = "class P { static void Main() { cbio.write(1); } }";
        let mut parser = Parser::new(source);
        let program = parser.parse_program().unwrap();
        let interner = parser.into_interner();

        let lookup = |_: NodeId| Some("int".to_string());
        let text = AstPrinter::new(&interner)
            .with_types(&lookup)
            .print_program(&program);
        assert!(text.contains("IntConst 1 : int"));
    }
}
