//! Typed Go syntax layer.
//!
//! tree-sitter produces the concrete trees; [`parser::GoParser`] lowers
//! them into the closed node model in [`ast`], and [`walk`] provides the
//! traversal detectors build on.

pub mod ast;
mod parser;
pub mod walk;

pub use ast::{
    AssignOp, AssignStmt, BinaryOp, Block, BranchKind, CallExpr, CaseArm, CommArm, CompositeLit,
    Expr, ForStmt, FuncDecl, IfStmt, ImportSpec, Position, RangeStmt, SelectStmt, SourceFile,
    Stmt, SwitchStmt, TypeRef, VarDecl,
};
pub use parser::GoParser;
pub use walk::{walk_block, walk_expr, walk_file, walk_stmt, Visitor};
