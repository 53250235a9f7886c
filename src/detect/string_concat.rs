//! Detection of string concatenation inside loops.
//!
//! `x += y` and `x = x + y` both copy the whole string every iteration.
//! Without type information the target is identified by name: the
//! configured vocabulary plus the `str` prefix / `Str` suffix convention.

use crate::analysis::AnalysisContext;
use crate::config::StringConcatRule;
use crate::syntax::ast::{AssignOp, AssignStmt, BinaryOp, Expr, FuncDecl, SourceFile, Stmt};
use crate::syntax::walk::{walk_file, Visitor};

use super::{Detector, Issue, IssueKind, Severity};

pub struct StringConcatDetector {
    vocabulary: Vec<String>,
}

impl StringConcatDetector {
    pub fn new(rule: &StringConcatRule) -> Self {
        Self {
            vocabulary: rule.string_var_names.clone(),
        }
    }
}

impl Detector for StringConcatDetector {
    fn name(&self) -> &'static str {
        "string-concat"
    }

    fn detect(&mut self, file: &SourceFile, _ctx: &AnalysisContext) -> Vec<Issue> {
        let mut visitor = ConcatVisitor {
            vocabulary: &self.vocabulary,
            file: &file.path,
            loop_depth: 0,
            current_func: String::new(),
            issues: Vec::new(),
        };
        walk_file(&mut visitor, file);
        visitor.issues
    }
}

struct ConcatVisitor<'a> {
    vocabulary: &'a [String],
    file: &'a str,
    loop_depth: usize,
    current_func: String,
    issues: Vec<Issue>,
}

impl Visitor for ConcatVisitor<'_> {
    fn enter_func(&mut self, func: &FuncDecl) {
        self.current_func = func.name.clone();
    }

    fn enter_stmt(&mut self, stmt: &Stmt) -> bool {
        match stmt {
            s if s.is_loop() => self.loop_depth += 1,
            Stmt::Assign(assign) if self.loop_depth > 0 => self.check_assign(assign),
            _ => {}
        }
        true
    }

    fn leave_stmt(&mut self, stmt: &Stmt) {
        if stmt.is_loop() {
            self.loop_depth -= 1;
        }
    }
}

impl ConcatVisitor<'_> {
    fn check_assign(&mut self, assign: &AssignStmt) {
        if assign.lhs.len() != 1 || assign.rhs.len() != 1 {
            return;
        }
        let Some(target) = assign.lhs[0].as_ident() else {
            return;
        };
        if !self.is_string_name(target) {
            return;
        }

        match assign.op {
            AssignOp::AddAssign => {
                self.report(assign, "string concatenation with += in loop");
            }
            AssignOp::Assign => {
                // `x = x + y` with the target reappearing on the left of
                // the addition.
                if let Expr::Binary(bin) = &assign.rhs[0] {
                    if bin.op == BinaryOp::Add && bin.lhs.as_ident() == Some(target) {
                        self.report(assign, "string concatenation with + in loop");
                    }
                }
            }
            _ => {}
        }
    }

    fn is_string_name(&self, name: &str) -> bool {
        self.vocabulary.iter().any(|v| v == name)
            || name.starts_with("str")
            || name.ends_with("Str")
    }

    fn report(&mut self, assign: &AssignStmt, what: &str) {
        let pos = assign.pos;
        self.issues.push(Issue {
            kind: IssueKind::StringConcatenation,
            severity: Severity::Medium,
            file: self.file.to_string(),
            line: pos.line,
            column: pos.column,
            function: Some(self.current_func.clone()),
            message: format!("{} - copies the whole string each iteration", what),
            suggestion: "Accumulate into a strings.Builder and call String() once after \
                         the loop; that is O(n) instead of O(n²)."
                .to_string(),
            complexity: "O(n²) due to repeated copying".to_string(),
            code_snippet: format!("{}:{}:{}", self.file, pos.line, pos.column),
        });
    }
}
