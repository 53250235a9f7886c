//! Slice growth tracking.
//!
//! Per function, every slice created via `make` is recorded with whether
//! it was given a capacity. Appends to tracked slices are counted; enough
//! appends inside a loop to an uncapacitated slice earn one High finding
//! citing the amortized regrowth cost. Creation-time capacity complaints
//! belong to the allocation detector, not here.

use std::collections::HashMap;

use crate::analysis::AnalysisContext;
use crate::config::SliceGrowthRule;
use crate::syntax::ast::{
    AssignOp, AssignStmt, Expr, FuncDecl, SourceFile, Stmt, TypeRef,
};
use crate::syntax::walk::{walk_file, Visitor};

use super::{Detector, Issue, IssueKind, Severity};

/// Function-scoped record of one slice variable.
struct SliceInfo {
    declared_line: usize,
    has_capacity: bool,
    /// Tracked for completeness; the append path carries the loop state.
    #[allow(dead_code)]
    used_in_loop: bool,
    append_count: usize,
    reported: bool,
}

pub struct SliceGrowthDetector {
    detect_append_in_loops: bool,
    min_append_count: usize,
}

impl SliceGrowthDetector {
    pub fn new(rule: &SliceGrowthRule) -> Self {
        Self {
            detect_append_in_loops: rule.detect_append_in_loops,
            min_append_count: rule.min_append_count,
        }
    }
}

impl Detector for SliceGrowthDetector {
    fn name(&self) -> &'static str {
        "slice-growth"
    }

    fn detect(&mut self, file: &SourceFile, _ctx: &AnalysisContext) -> Vec<Issue> {
        let mut visitor = GrowthVisitor {
            detector: self,
            file: &file.path,
            slices: HashMap::new(),
            loop_depth: 0,
            current_func: String::new(),
            issues: Vec::new(),
        };
        walk_file(&mut visitor, file);
        visitor.issues
    }
}

struct GrowthVisitor<'a> {
    detector: &'a SliceGrowthDetector,
    file: &'a str,
    slices: HashMap<String, SliceInfo>,
    loop_depth: usize,
    current_func: String,
    issues: Vec<Issue>,
}

impl Visitor for GrowthVisitor<'_> {
    fn enter_func(&mut self, func: &FuncDecl) {
        // SliceInfo is function-scoped; never shared across functions.
        self.slices.clear();
        self.current_func = func.name.clone();
    }

    fn enter_stmt(&mut self, stmt: &Stmt) -> bool {
        match stmt {
            s if s.is_loop() => {
                self.loop_depth += 1;
                for info in self.slices.values_mut() {
                    info.used_in_loop = true;
                }
            }
            Stmt::Assign(assign) => {
                self.track_creation(assign);
                self.track_append(assign);
            }
            Stmt::VarDecl(decl) => {
                for (name, value) in decl.names.iter().zip(decl.values.iter()) {
                    self.record_if_slice_make(name, value, decl.pos.line);
                }
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
}

impl GrowthVisitor<'_> {
    fn track_creation(&mut self, assign: &AssignStmt) {
        if assign.op != AssignOp::Define {
            return;
        }
        for (lhs, rhs) in assign.lhs.iter().zip(assign.rhs.iter()) {
            if let Some(name) = lhs.as_ident() {
                self.record_if_slice_make(name, rhs, assign.pos.line);
            }
        }
    }

    fn record_if_slice_make(&mut self, name: &str, value: &Expr, line: usize) {
        let Expr::Call(call) = value else {
            return;
        };
        if !call.is_make() || call.type_arg != Some(TypeRef::Slice) {
            return;
        }

        self.slices.insert(
            name.to_string(),
            SliceInfo {
                declared_line: line,
                has_capacity: call.slice_make_has_capacity(),
                used_in_loop: self.loop_depth > 0,
                append_count: 0,
                reported: false,
            },
        );
    }

    fn track_append(&mut self, assign: &AssignStmt) {
        if !self.detector.detect_append_in_loops {
            return;
        }
        if assign.rhs.len() != 1 {
            return;
        }
        let Expr::Call(call) = &assign.rhs[0] else {
            return;
        };
        if !call.is_append() {
            return;
        }
        let Some(name) = assign.lhs.first().and_then(|e| e.as_ident()) else {
            return;
        };
        let Some(info) = self.slices.get_mut(name) else {
            return;
        };

        info.append_count += 1;
        if self.loop_depth > 0
            && !info.has_capacity
            && info.append_count >= self.detector.min_append_count
            && !info.reported
        {
            info.reported = true;
            let count = info.append_count;
            let declared = info.declared_line;
            let pos = assign.pos;
            self.issues.push(Issue {
                kind: IssueKind::SliceGrowth,
                severity: Severity::High,
                file: self.file.to_string(),
                line: pos.line,
                column: pos.column,
                function: Some(self.current_func.clone()),
                message: format!(
                    "slice '{}' (declared line {}) grown by {} appends in loop without \
                     preallocated capacity",
                    name, declared, count
                ),
                suggestion: "Size the slice up front with make([]T, 0, expected) so the \
                             backing array is allocated once instead of doubling as it grows."
                    .to_string(),
                complexity: "amortized O(n) regrowth cost".to_string(),
                code_snippet: format!("{}:{}:{}", self.file, pos.line, pos.column),
            });
        }
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
        let mut detector = SliceGrowthDetector::new(&SliceGrowthRule::default());
        detector.detect(&file, &ctx)
    }

    #[test]
    fn test_three_appends_in_loop_flagged_once() {
        let issues = detect(
            r#"
package main

func build(items []string) []string {
    out := make([]string, 0)
    for _, it := range items {
        out = append(out, it)
        out = append(out, it)
        out = append(out, it)
    }
    return out
}
"#,
        );
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::High);
        assert!(issues[0].message.contains("'out'"));
        assert!(issues[0].message.contains("3 appends"));
    }

    #[test]
    fn test_capacity_suppresses_growth_finding() {
        let issues = detect(
            r#"
package main

func build(items []string) []string {
    out := make([]string, 0, 16)
    for _, it := range items {
        out = append(out, it)
        out = append(out, it)
        out = append(out, it)
    }
    return out
}
"#,
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn test_below_append_minimum_not_flagged() {
        let issues = detect(
            r#"
package main

func build(items []string) []string {
    out := make([]string, 0)
    for _, it := range items {
        out = append(out, it)
        out = append(out, it)
    }
    return out
}
"#,
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn test_appends_outside_loop_not_flagged() {
        let issues = detect(
            r#"
package main

func build() []int {
    out := make([]int, 0)
    out = append(out, 1)
    out = append(out, 2)
    out = append(out, 3)
    out = append(out, 4)
    return out
}
"#,
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn test_tracking_resets_per_function() {
        // Two appends in each function; combined they would pass the
        // minimum, separately they must not.
        let issues = detect(
            r#"
package main

func first(items []int) []int {
    out := make([]int, 0)
    for _, v := range items {
        out = append(out, v)
        out = append(out, v)
    }
    return out
}

func second(items []int) []int {
    out := make([]int, 0)
    for _, v := range items {
        out = append(out, v)
        out = append(out, v)
    }
    return out
}
"#,
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn test_var_declared_slice_tracked() {
        let issues = detect(
            r#"
package main

func build(items []int) []int {
    var out = make([]int, 0)
    for _, v := range items {
        out = append(out, v)
        out = append(out, v)
        out = append(out, v)
    }
    return out
}
"#,
        );
        assert_eq!(issues.len(), 1);
    }
}
