//! Generic traversal over the typed syntax model.
//!
//! Detectors implement [`Visitor`] with whatever traversal-local state they
//! need (depth counters, current function, per-variable maps) and call
//! [`walk_file`]. State lives in the visitor struct, never in globals, so
//! detectors cannot interfere with each other.

use super::ast::{Block, Expr, FuncDecl, SourceFile, Stmt};

/// Traversal callbacks. `enter_*` hooks return `false` to skip the node's
/// subtree; `leave_*` fires only for nodes that were entered.
pub trait Visitor {
    fn enter_func(&mut self, _func: &FuncDecl) {}
    fn leave_func(&mut self, _func: &FuncDecl) {}
    fn enter_stmt(&mut self, _stmt: &Stmt) -> bool {
        true
    }
    fn leave_stmt(&mut self, _stmt: &Stmt) {}
    fn enter_expr(&mut self, _expr: &Expr) -> bool {
        true
    }
    fn leave_expr(&mut self, _expr: &Expr) {}
}

/// Walk every function in the file, bodies included.
pub fn walk_file<V: Visitor>(v: &mut V, file: &SourceFile) {
    for func in &file.funcs {
        v.enter_func(func);
        if let Some(body) = &func.body {
            walk_block(v, body);
        }
        v.leave_func(func);
    }
}

pub fn walk_block<V: Visitor>(v: &mut V, block: &Block) {
    for stmt in &block.stmts {
        walk_stmt(v, stmt);
    }
}

pub fn walk_stmt<V: Visitor>(v: &mut V, stmt: &Stmt) {
    if !v.enter_stmt(stmt) {
        return;
    }

    match stmt {
        Stmt::If(s) => {
            if let Some(init) = &s.init {
                walk_stmt(v, init);
            }
            walk_expr(v, &s.cond);
            walk_block(v, &s.then_block);
            if let Some(else_branch) = &s.else_branch {
                walk_stmt(v, else_branch);
            }
        }
        Stmt::For(s) => {
            if let Some(init) = &s.init {
                walk_stmt(v, init);
            }
            if let Some(cond) = &s.cond {
                walk_expr(v, cond);
            }
            if let Some(post) = &s.post {
                walk_stmt(v, post);
            }
            walk_block(v, &s.body);
        }
        Stmt::Range(s) => {
            walk_expr(v, &s.subject);
            walk_block(v, &s.body);
        }
        Stmt::Switch(s) => {
            for arm in &s.cases {
                for stmt in &arm.body {
                    walk_stmt(v, stmt);
                }
            }
        }
        Stmt::Select(s) => {
            for arm in &s.arms {
                for stmt in &arm.body {
                    walk_stmt(v, stmt);
                }
            }
        }
        Stmt::Assign(s) => {
            for e in &s.lhs {
                walk_expr(v, e);
            }
            for e in &s.rhs {
                walk_expr(v, e);
            }
        }
        Stmt::VarDecl(s) => {
            for e in &s.values {
                walk_expr(v, e);
            }
        }
        Stmt::Return(s) => {
            for e in &s.values {
                walk_expr(v, e);
            }
        }
        Stmt::Expr(s) => walk_expr(v, &s.expr),
        Stmt::Block(b) => walk_block(v, b),
        Stmt::Branch(_) | Stmt::Other(_) => {}
    }

    v.leave_stmt(stmt);
}

pub fn walk_expr<V: Visitor>(v: &mut V, expr: &Expr) {
    if !v.enter_expr(expr) {
        return;
    }

    match expr {
        Expr::Call(e) => {
            walk_expr(v, &e.callee);
            for arg in &e.args {
                walk_expr(v, arg);
            }
        }
        Expr::Binary(e) => {
            walk_expr(v, &e.lhs);
            walk_expr(v, &e.rhs);
        }
        Expr::Unary(e) => walk_expr(v, &e.operand),
        Expr::Selector(e) => walk_expr(v, &e.operand),
        Expr::Index(e) => {
            walk_expr(v, &e.operand);
            walk_expr(v, &e.index);
        }
        Expr::FuncLit(e) => walk_block(v, &e.body),
        Expr::Ident(_) | Expr::IntLit(_) | Expr::Composite(_) | Expr::Other(_) => {}
    }

    v.leave_expr(expr);
}
