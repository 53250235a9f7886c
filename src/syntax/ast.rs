//! Typed Go syntax model.
//!
//! Tree-sitter trees are lowered into this closed set of node variants so
//! detectors can match exhaustively instead of switching on raw node
//! kinds. Adding a variant breaks every non-exhaustive consumer at
//! compile time.
//!
//! Only the constructs the detectors reason about are modeled. Anything
//! else lowers to `Stmt::Other` / `Expr::Other`, which keeps source
//! positions (for line accounting) but drops children.

use std::fmt;

/// 1-based source position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// One fully lowered Go source file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// File path as handed to the parser.
    pub path: String,
    /// Package name from the package clause (empty if missing).
    pub package: String,
    pub imports: Vec<ImportSpec>,
    /// Top-level functions and methods, in source order.
    pub funcs: Vec<FuncDecl>,
}

/// A single import path, with optional alias.
#[derive(Debug, Clone)]
pub struct ImportSpec {
    pub path: String,
    pub alias: Option<String>,
    pub pos: Position,
}

/// A function or method declaration.
#[derive(Debug, Clone)]
pub struct FuncDecl {
    pub name: String,
    /// Receiver type name for methods (e.g. `Config` for `func (c *Config) ...`).
    pub receiver: Option<String>,
    pub pos: Position,
    /// Last line of the declaration, for span reporting.
    pub end_line: usize,
    /// Absent for bodyless declarations (e.g. assembly stubs).
    pub body: Option<Block>,
}

#[derive(Debug, Clone)]
pub struct Block {
    pub pos: Position,
    pub stmts: Vec<Stmt>,
}

/// Statement variants.
#[derive(Debug, Clone)]
pub enum Stmt {
    If(IfStmt),
    /// Counted or conditional `for` loop.
    For(ForStmt),
    /// `for ... range` iterate-over-collection loop.
    Range(RangeStmt),
    /// Expression or type switch.
    Switch(SwitchStmt),
    Select(SelectStmt),
    Assign(AssignStmt),
    VarDecl(VarDecl),
    Return(ReturnStmt),
    Branch(BranchStmt),
    Expr(ExprStmt),
    Block(Block),
    /// Unmodeled statement; position kept, children dropped.
    Other(Position),
}

impl Stmt {
    pub fn pos(&self) -> Position {
        match self {
            Stmt::If(s) => s.pos,
            Stmt::For(s) => s.pos,
            Stmt::Range(s) => s.pos,
            Stmt::Switch(s) => s.pos,
            Stmt::Select(s) => s.pos,
            Stmt::Assign(s) => s.pos,
            Stmt::VarDecl(s) => s.pos,
            Stmt::Return(s) => s.pos,
            Stmt::Branch(s) => s.pos,
            Stmt::Expr(s) => s.pos,
            Stmt::Block(b) => b.pos,
            Stmt::Other(pos) => *pos,
        }
    }

    /// Whether this statement is a loop of either flavor.
    pub fn is_loop(&self) -> bool {
        matches!(self, Stmt::For(_) | Stmt::Range(_))
    }
}

#[derive(Debug, Clone)]
pub struct IfStmt {
    pub pos: Position,
    /// Init statement of `if x := f(); cond` form.
    pub init: Option<Box<Stmt>>,
    pub cond: Expr,
    pub then_block: Block,
    /// Either `Stmt::If` (else-if) or `Stmt::Block` (plain else).
    pub else_branch: Option<Box<Stmt>>,
}

#[derive(Debug, Clone)]
pub struct ForStmt {
    pub pos: Position,
    pub init: Option<Box<Stmt>>,
    /// Continuation condition; `None` for `for {}`.
    pub cond: Option<Expr>,
    pub post: Option<Box<Stmt>>,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct RangeStmt {
    pub pos: Position,
    /// The collection being ranged over.
    pub subject: Expr,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct SwitchStmt {
    pub pos: Position,
    pub cases: Vec<CaseArm>,
}

#[derive(Debug, Clone)]
pub struct CaseArm {
    pub pos: Position,
    pub is_default: bool,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub struct SelectStmt {
    pub pos: Position,
    pub arms: Vec<CommArm>,
}

#[derive(Debug, Clone)]
pub struct CommArm {
    pub pos: Position,
    pub is_default: bool,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    /// `=`
    Assign,
    /// `:=`
    Define,
    /// `+=`
    AddAssign,
    /// Any other compound operator (`-=`, `*=`, ...).
    OtherCompound,
}

#[derive(Debug, Clone)]
pub struct AssignStmt {
    pub pos: Position,
    pub op: AssignOp,
    pub lhs: Vec<Expr>,
    pub rhs: Vec<Expr>,
}

/// `var` declaration, specs flattened in source order.
///
/// Names and values pair up by index for the common one-name-one-value
/// spec; mismatched arities simply leave trailing names unpaired.
#[derive(Debug, Clone)]
pub struct VarDecl {
    pub pos: Position,
    pub names: Vec<String>,
    pub values: Vec<Expr>,
}

#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub pos: Position,
    pub values: Vec<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchKind {
    Break,
    Continue,
    Goto,
    Fallthrough,
}

#[derive(Debug, Clone)]
pub struct BranchStmt {
    pub pos: Position,
    pub kind: BranchKind,
}

#[derive(Debug, Clone)]
pub struct ExprStmt {
    pub pos: Position,
    pub expr: Expr,
}

/// Expression variants.
#[derive(Debug, Clone)]
pub enum Expr {
    Ident(Ident),
    IntLit(IntLit),
    Call(CallExpr),
    Binary(BinaryExpr),
    Unary(UnaryExpr),
    Selector(SelectorExpr),
    Index(IndexExpr),
    Composite(CompositeLit),
    FuncLit(FuncLit),
    /// Unmodeled expression; position kept, children dropped.
    Other(Position),
}

impl Expr {
    pub fn pos(&self) -> Position {
        match self {
            Expr::Ident(e) => e.pos,
            Expr::IntLit(e) => e.pos,
            Expr::Call(e) => e.pos,
            Expr::Binary(e) => e.pos,
            Expr::Unary(e) => e.pos,
            Expr::Selector(e) => e.pos,
            Expr::Index(e) => e.pos,
            Expr::Composite(e) => e.pos,
            Expr::FuncLit(e) => e.pos,
            Expr::Other(pos) => *pos,
        }
    }

    /// The identifier name if this expression is a bare identifier.
    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Expr::Ident(id) => Some(&id.name),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Ident {
    pub pos: Position,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct IntLit {
    pub pos: Position,
    pub value: i64,
}

/// Type argument of an allocation call (`make`, `new`) or composite literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Slice,
    Map,
    Array,
    Chan,
    Named(String),
    Other,
}

#[derive(Debug, Clone)]
pub struct CallExpr {
    pub pos: Position,
    pub callee: Box<Expr>,
    /// First argument when it is a type (as in `make([]T, n)`); separated
    /// from `args` so sizing arguments keep stable indices.
    pub type_arg: Option<TypeRef>,
    pub args: Vec<Expr>,
}

impl CallExpr {
    /// Callee name when the callee is a plain identifier.
    pub fn callee_name(&self) -> Option<&str> {
        self.callee.as_ident()
    }

    pub fn is_make(&self) -> bool {
        self.callee_name() == Some("make")
    }

    pub fn is_new(&self) -> bool {
        self.callee_name() == Some("new")
    }

    pub fn is_append(&self) -> bool {
        self.callee_name() == Some("append")
    }

    pub fn is_len(&self) -> bool {
        self.callee_name() == Some("len")
    }

    /// `make([]T, len, cap)` carries a capacity; `make([]T, len)` does not.
    pub fn slice_make_has_capacity(&self) -> bool {
        self.is_make() && self.type_arg == Some(TypeRef::Slice) && self.args.len() >= 2
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Eq,
    LogicalAnd,
    LogicalOr,
    Other,
}

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    pub pos: Position,
    pub op: BinaryOp,
    pub lhs: Box<Expr>,
    pub rhs: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct UnaryExpr {
    pub pos: Position,
    pub operand: Box<Expr>,
}

#[derive(Debug, Clone)]
pub struct SelectorExpr {
    pub pos: Position,
    pub operand: Box<Expr>,
    pub field: String,
}

#[derive(Debug, Clone)]
pub struct IndexExpr {
    pub pos: Position,
    pub operand: Box<Expr>,
    pub index: Box<Expr>,
}

/// Composite literal; only the element count matters for size tracking.
#[derive(Debug, Clone)]
pub struct CompositeLit {
    pub pos: Position,
    pub type_ref: TypeRef,
    pub elem_count: usize,
}

#[derive(Debug, Clone)]
pub struct FuncLit {
    pub pos: Position,
    pub body: Block,
}
