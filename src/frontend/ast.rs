// src/frontend/ast.rs

use crate::frontend::Span;

/// Unique identifier for symbols (interned strings)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol(pub u32);

/// Unique identifier for AST nodes that carry semantic annotations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// A complete compilation unit: `using` clauses plus one class body
#[derive(Debug, Clone)]
pub struct Program {
    pub usings: Vec<UsingClause>,
    pub class_name: Symbol,
    pub declarations: Vec<Decl>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct UsingClause {
    pub name: Symbol,
    pub span: Span,
}

/// Class-level declarations
#[derive(Debug, Clone)]
pub enum Decl {
    Const(ConstDecl),
    Struct(StructDecl),
    Method(MethodDecl),
}

impl Decl {
    pub fn span(&self) -> Span {
        match self {
            Decl::Const(c) => c.span,
            Decl::Struct(s) => s.span,
            Decl::Method(m) => m.span,
        }
    }
}

/// `const int size = 10;`
#[derive(Debug, Clone)]
pub struct ConstDecl {
    pub ty: TypeExpr,
    pub name: Symbol,
    pub value: Expr,
    pub span: Span,
}

/// `struct Pair { int a; int b; }`
#[derive(Debug, Clone)]
pub struct StructDecl {
    pub name: Symbol,
    pub fields: Vec<FieldDecl>,
    pub span: Span,
}

/// One field line: `int a, b;`
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub ty: TypeExpr,
    pub names: Vec<(Symbol, Span)>,
    pub span: Span,
}

/// `static int sum(Pair p) { ... }`
#[derive(Debug, Clone)]
pub struct MethodDecl {
    pub id: NodeId,
    pub name: Symbol,
    pub params: Vec<Param>,
    /// `None` for `void`
    pub return_type: Option<TypeExpr>,
    pub body: Block,
    pub span: Span,
}

/// Formal parameter
#[derive(Debug, Clone)]
pub struct Param {
    pub name: Symbol,
    pub ty: TypeExpr,
    pub span: Span,
}

/// Type expression
#[derive(Debug, Clone)]
pub enum TypeExpr {
    Primitive(PrimitiveType),
    Named(Symbol, Span),
    Array(Box<TypeExpr>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    Int,
    Bool,
    String,
}

/// Block of statements
#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub span: Span,
}

/// Statements
#[derive(Debug, Clone)]
pub enum Stmt {
    LocalDecl(LocalDecl),
    Assign(AssignStmt),
    Call(CallStmt),
    Increment(IncDecStmt),
    Decrement(IncDecStmt),
    If(IfStmt),
    While(WhileStmt),
    Break(Span),
    Return(ReturnStmt),
    Block(Block),
    Empty(Span),
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::LocalDecl(s) => s.span,
            Stmt::Assign(s) => s.span,
            Stmt::Call(s) => s.span,
            Stmt::Increment(s) | Stmt::Decrement(s) => s.span,
            Stmt::If(s) => s.span,
            Stmt::While(s) => s.span,
            Stmt::Break(span) | Stmt::Empty(span) => *span,
            Stmt::Return(s) => s.span,
            Stmt::Block(b) => b.span,
        }
    }
}

/// `int x, y;`
#[derive(Debug, Clone)]
pub struct LocalDecl {
    pub ty: TypeExpr,
    pub names: Vec<(Symbol, Span)>,
    pub span: Span,
}

/// `target = value;`
#[derive(Debug, Clone)]
pub struct AssignStmt {
    pub target: Expr,
    pub value: Expr,
    pub span: Span,
}

/// A call used as a statement; `call.kind` is always `ExprKind::Call`
#[derive(Debug, Clone)]
pub struct CallStmt {
    pub call: Expr,
    pub span: Span,
}

/// `target++;` or `target--;`
#[derive(Debug, Clone)]
pub struct IncDecStmt {
    pub target: Expr,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub condition: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub condition: Expr,
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub span: Span,
}

/// Expression node
#[derive(Debug, Clone)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ExprKind {
    IntLiteral(i32),
    BoolLiteral(bool),
    StringLiteral(String),
    Identifier(Symbol),
    Binary(Box<BinaryExpr>),
    Unary(Box<UnaryExpr>),
    Field(Box<FieldExpr>),
    Index(Box<IndexExpr>),
    Call(Box<CallExpr>),
    NewArray(Box<NewArrayExpr>),
    NewStruct(NewStructExpr),
}

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub left: Expr,
    pub op: BinaryOp,
    pub right: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
        }
    }

    /// Node-kind name used in diagnostics and AST dumps
    pub fn name(&self) -> &'static str {
        match self {
            BinaryOp::Add => "Add",
            BinaryOp::Sub => "Sub",
            BinaryOp::Mul => "Mul",
            BinaryOp::Div => "Div",
            BinaryOp::Mod => "Mod",
            BinaryOp::And => "And",
            BinaryOp::Or => "Or",
            BinaryOp::Eq => "Equals",
            BinaryOp::Ne => "NotEquals",
            BinaryOp::Lt => "LessThan",
            BinaryOp::Gt => "GreaterThan",
            BinaryOp::Le => "LessOrEqual",
            BinaryOp::Ge => "GreaterOrEqual",
        }
    }

    pub fn is_relational(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Expr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
}

/// `object.field`
#[derive(Debug, Clone)]
pub struct FieldExpr {
    pub object: Expr,
    pub field: Symbol,
    pub field_span: Span,
}

/// `object[index]`
#[derive(Debug, Clone)]
pub struct IndexExpr {
    pub object: Expr,
    pub index: Expr,
}

/// `callee(args)` where callee is `name` or `receiver.name`
#[derive(Debug, Clone)]
pub struct CallExpr {
    pub callee: Expr,
    pub args: Vec<Argument>,
}

#[derive(Debug, Clone)]
pub struct Argument {
    pub out: bool,
    pub value: Expr,
}

/// `new T[length]`
#[derive(Debug, Clone)]
pub struct NewArrayExpr {
    pub element: TypeExpr,
    pub length: Expr,
}

/// `new S()`
#[derive(Debug, Clone)]
pub struct NewStructExpr {
    pub name: Symbol,
    pub name_span: Span,
}
