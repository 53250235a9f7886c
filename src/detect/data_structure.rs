//! Detection of linear searches that want an associative container.
//!
//! A range loop nested at least `min_search_depth` deep whose body tests
//! equality is usually a scan that a map lookup would replace. Shallow
//! single loops are left alone; one linear pass is often the right tool.

use crate::analysis::AnalysisContext;
use crate::config::DataStructureRule;
use crate::syntax::ast::{BinaryOp, Block, Expr, FuncDecl, RangeStmt, SourceFile, Stmt};
use crate::syntax::walk::{walk_block, walk_file, Visitor};

use super::{Detector, Issue, IssueKind, Severity};

pub struct DataStructureDetector {
    min_search_depth: usize,
}

impl DataStructureDetector {
    pub fn new(rule: &DataStructureRule) -> Self {
        Self {
            min_search_depth: rule.min_search_depth,
        }
    }
}

impl Detector for DataStructureDetector {
    fn name(&self) -> &'static str {
        "data-structure"
    }

    fn detect(&mut self, file: &SourceFile, _ctx: &AnalysisContext) -> Vec<Issue> {
        let mut visitor = SearchVisitor {
            min_depth: self.min_search_depth,
            file: &file.path,
            loop_depth: 0,
            current_func: String::new(),
            issues: Vec::new(),
        };
        walk_file(&mut visitor, file);
        visitor.issues
    }
}

struct SearchVisitor<'a> {
    min_depth: usize,
    file: &'a str,
    loop_depth: usize,
    current_func: String,
    issues: Vec<Issue>,
}

impl Visitor for SearchVisitor<'_> {
    fn enter_func(&mut self, func: &FuncDecl) {
        self.current_func = func.name.clone();
    }

    fn enter_stmt(&mut self, stmt: &Stmt) -> bool {
        match stmt {
            Stmt::Range(range) => {
                self.loop_depth += 1;
                if self.loop_depth >= self.min_depth && body_has_equality(&range.body) {
                    self.report(range);
                }
            }
            Stmt::For(_) => self.loop_depth += 1,
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

impl SearchVisitor<'_> {
    fn report(&mut self, range: &RangeStmt) {
        let pos = range.pos;
        let subject = range.subject.as_ident().unwrap_or("collection");
        self.issues.push(Issue {
            kind: IssueKind::InefficientDataStructure,
            severity: Severity::Medium,
            file: self.file.to_string(),
            line: pos.line,
            column: pos.column,
            function: Some(self.current_func.clone()),
            message: format!(
                "linear search in range loop over '{}' - every lookup scans the whole collection",
                subject
            ),
            suggestion: format!(
                "Build a map keyed by the compared value once (map[K]V, pre-sized with \
                 len({})), then look entries up in O(1) instead of scanning.",
                subject
            ),
            complexity: "O(n) per lookup - O(1) with a map".to_string(),
            code_snippet: format!("{}:{}:{}", self.file, pos.line, pos.column),
        });
    }
}

/// First equality comparison anywhere in the body ends the scan.
fn body_has_equality(body: &Block) -> bool {
    struct EqScanner {
        found: bool,
    }
    impl Visitor for EqScanner {
        fn enter_stmt(&mut self, _stmt: &Stmt) -> bool {
            !self.found
        }
        fn enter_expr(&mut self, expr: &Expr) -> bool {
            if self.found {
                return false;
            }
            if let Expr::Binary(bin) = expr {
                if bin.op == BinaryOp::Eq {
                    self.found = true;
                    return false;
                }
            }
            true
        }
    }

    let mut scanner = EqScanner { found: false };
    walk_block(&mut scanner, body);
    scanner.found
}
