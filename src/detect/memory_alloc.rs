//! Memory allocation hotspots.
//!
//! Three independent checks share one traversal:
//! - any `make`/`new` inside a loop (the repetition is the problem, not
//!   the sizing)
//! - `make` without a capacity or size hint
//! - appends in nested loops where preallocation cannot be confirmed

use crate::analysis::{AnalysisContext, SizeSource};
use crate::config::AllocationRule;
use crate::syntax::ast::{
    AssignStmt, CallExpr, Expr, FuncDecl, Position, SourceFile, Stmt, TypeRef,
};
use crate::syntax::walk::{walk_file, Visitor};

use super::{Detector, Issue, IssueKind, Severity};

pub struct MemoryAllocDetector {
    detect_in_loops: bool,
    require_capacity_hints: bool,
    min_loop_depth: usize,
}

impl MemoryAllocDetector {
    pub fn new(rule: &AllocationRule) -> Self {
        Self {
            detect_in_loops: rule.detect_in_loops,
            require_capacity_hints: rule.require_capacity_hints,
            min_loop_depth: rule.min_loop_depth,
        }
    }
}

impl Detector for MemoryAllocDetector {
    fn name(&self) -> &'static str {
        "memory-alloc"
    }

    fn detect(&mut self, file: &SourceFile, ctx: &AnalysisContext) -> Vec<Issue> {
        let mut visitor = AllocVisitor {
            detector: self,
            ctx,
            file: &file.path,
            loop_depth: 0,
            current_func: String::new(),
            issues: Vec::new(),
        };
        walk_file(&mut visitor, file);
        visitor.issues
    }
}

struct AllocVisitor<'a> {
    detector: &'a MemoryAllocDetector,
    ctx: &'a AnalysisContext,
    file: &'a str,
    loop_depth: usize,
    current_func: String,
    issues: Vec<Issue>,
}

impl Visitor for AllocVisitor<'_> {
    fn enter_func(&mut self, func: &FuncDecl) {
        self.current_func = func.name.clone();
    }

    fn enter_stmt(&mut self, stmt: &Stmt) -> bool {
        match stmt {
            s if s.is_loop() => self.loop_depth += 1,
            Stmt::Assign(assign)
                if self.loop_depth > 0 && self.loop_depth >= self.detector.min_loop_depth =>
            {
                self.check_append(assign);
            }
            _ => {}
        }
        true
    }

    fn leave_stmt(&mut self, stmt: &Stmt) {
        if stmt.is_loop() {
            self.loop_depth -= 1;
        }
    }

    fn enter_expr(&mut self, expr: &Expr) -> bool {
        if let Expr::Call(call) = expr {
            if self.loop_depth > 0 {
                self.check_allocation_in_loop(call);
            }
            self.check_missing_hints(call);
        }
        true
    }
}

impl AllocVisitor<'_> {
    fn check_allocation_in_loop(&mut self, call: &CallExpr) {
        if !self.detector.detect_in_loops {
            return;
        }
        if !call.is_make() && !call.is_new() {
            return;
        }

        let label = alloc_label(call);
        self.push(
            call.pos,
            Severity::High,
            format!("memory allocation ({}) inside loop", label),
            "Hoist the allocation above the loop and reuse it each iteration \
             (reslice to [:0] to keep capacity), or pool it with sync.Pool."
                .to_string(),
            "O(n) allocations in loop".to_string(),
        );
    }

    fn check_missing_hints(&mut self, call: &CallExpr) {
        if !self.detector.require_capacity_hints || !call.is_make() {
            return;
        }

        match call.type_arg {
            // make([]T, n) has a length but no capacity
            Some(TypeRef::Slice) if call.args.len() == 1 => {
                self.push(
                    call.pos,
                    Severity::Medium,
                    "slice created without capacity hint - growth will reallocate".to_string(),
                    "Pass the expected capacity: make([]T, len, cap). Growth then never \
                     copies the backing array."
                        .to_string(),
                    "potential O(n) growth cost".to_string(),
                );
            }
            // make(map[K]V) with no size hint
            Some(TypeRef::Map) if call.args.is_empty() => {
                self.push(
                    call.pos,
                    Severity::Low,
                    "map created without size hint - may rehash as it fills".to_string(),
                    "Pass the expected entry count: make(map[K]V, n). Buckets are then \
                     allocated once."
                        .to_string(),
                    "constant factor improvement".to_string(),
                );
            }
            _ => {}
        }
    }

    /// An append this deep in a loop nest grows the slice on every pass of
    /// every enclosing loop; unless the context proves a pre-sized backing
    /// allocation, flag it.
    fn check_append(&mut self, assign: &AssignStmt) {
        if assign.rhs.len() != 1 {
            return;
        }
        let Expr::Call(call) = &assign.rhs[0] else {
            return;
        };
        if !call.is_append() {
            return;
        }

        if let Some(target) = assign.lhs.first().and_then(|e| e.as_ident()) {
            let preallocated = self
                .ctx
                .size_of(target)
                .map(|s| s.source == SizeSource::SizedAlloc)
                .unwrap_or(false);
            if preallocated {
                return;
            }
        }

        self.push(
            assign.pos,
            Severity::Medium,
            format!(
                "append at loop depth {} without confirmed preallocation",
                self.loop_depth
            ),
            "Allocate the destination once with make([]T, 0, n) before the outer \
             loop; appends then never reallocate."
                .to_string(),
            "amortized O(n) growth per level".to_string(),
        );
    }

    fn push(
        &mut self,
        pos: Position,
        severity: Severity,
        message: String,
        suggestion: String,
        complexity: String,
    ) {
        self.issues.push(Issue {
            kind: IssueKind::MemoryAllocation,
            severity,
            file: self.file.to_string(),
            line: pos.line,
            column: pos.column,
            function: Some(self.current_func.clone()),
            message,
            suggestion,
            complexity,
            code_snippet: format!("{}:{}:{}", self.file, pos.line, pos.column),
        });
    }
}

fn alloc_label(call: &CallExpr) -> String {
    let callee = call.callee_name().unwrap_or("alloc");
    match &call.type_arg {
        Some(TypeRef::Slice) => format!("{}(slice)", callee),
        Some(TypeRef::Map) => format!("{}(map)", callee),
        Some(TypeRef::Chan) => format!("{}(chan)", callee),
        Some(TypeRef::Named(name)) => format!("{}({})", callee, name),
        _ => callee.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::GoParser;

    fn detect(src: &str) -> Vec<Issue> {
        let file = GoParser::new()
            .parse_source("test.go", src.as_bytes())
            .unwrap();
        let ctx = AnalysisContext::build(std::slice::from_ref(&file));
        let mut detector = MemoryAllocDetector::new(&AllocationRule::default());
        detector.detect(&file, &ctx)
    }

    #[test]
    fn test_allocation_in_loop_plus_missing_capacity() {
        let issues = detect(
            r#"
package main

func fill(n int) [][]int {
    out := make([][]int, 0, n)
    for i := 0; i < n; i++ {
        row := make([]int, n)
        out = append(out, row)
    }
    return out
}
"#,
        );
        // One statement, two independent findings: the in-loop allocation
        // and the missing capacity hint.
        assert_eq!(issues.len(), 2);
        let high: Vec<_> = issues.iter().filter(|i| i.severity == Severity::High).collect();
        let medium: Vec<_> = issues
            .iter()
            .filter(|i| i.severity == Severity::Medium)
            .collect();
        assert_eq!(high.len(), 1);
        assert!(high[0].message.contains("inside loop"));
        assert_eq!(medium.len(), 1);
        assert!(medium[0].message.contains("capacity hint"));
    }

    #[test]
    fn test_capacity_arg_never_flags_hint() {
        let issues = detect(
            r#"
package main

func sized(n int) []int {
    out := make([]int, 0, n)
    return out
}
"#,
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn test_map_without_size_is_low() {
        let issues = detect(
            r#"
package main

func index() map[string]int {
    m := make(map[string]int)
    return m
}
"#,
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Low);
    }

    #[test]
    fn test_map_with_size_not_flagged() {
        let issues = detect(
            r#"
package main

func index() map[string]int {
    m := make(map[string]int, 64)
    return m
}
"#,
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn test_append_in_nested_loop_flagged() {
        let issues = detect(
            r#"
package main

func flatten(groups [][]int) []int {
    var out []int
    for _, g := range groups {
        for _, v := range g {
            out = append(out, v)
        }
    }
    return out
}
"#,
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Medium);
        assert!(issues[0].message.contains("append at loop depth 2"));
    }

    #[test]
    fn test_preallocated_append_not_flagged() {
        let issues = detect(
            r#"
package main

func widen(groups [][]int) []int {
    out := make([]int, 0, 1024)
    for _, g := range groups {
        for _, v := range g {
            out = append(out, v)
        }
    }
    return out
}
"#,
        );
        // The pre-sized make is tracked, so the nested append passes; the
        // capacity hint is present, so nothing else fires.
        assert!(issues.is_empty());
    }

    #[test]
    fn test_shallow_append_not_flagged() {
        let issues = detect(
            r#"
package main

func copyAll(items []int) []int {
    out := make([]int, 0, len(items))
    for _, v := range items {
        out = append(out, v)
    }
    return out
}
"#,
        );
        assert!(issues.is_empty());
    }
}
