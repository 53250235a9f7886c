//! Cyclomatic complexity per function.
//!
//! Complexity starts at 1 and adds one per decision point: `if`, plain
//! `else`, each loop, each `switch`, each non-default case arm, each select
//! communication arm, and each `&&`/`||`. Function literals are separate
//! units and do not contribute to the enclosing function.

use crate::analysis::AnalysisContext;
use crate::config::TierThresholds;
use crate::syntax::ast::{BinaryOp, Block, Expr, SourceFile, Stmt};
use crate::syntax::walk::{walk_block, Visitor};

use super::{Detector, Issue, IssueKind, Severity};

pub struct ComplexityDetector {
    medium: i32,
    high: i32,
    critical: i32,
}

impl ComplexityDetector {
    pub fn new(tiers: &TierThresholds) -> Self {
        Self {
            medium: tiers.medium_threshold,
            high: tiers.high_threshold,
            critical: tiers.critical_threshold,
        }
    }

    fn severity(&self, complexity: i32) -> Severity {
        if complexity > self.critical {
            Severity::Critical
        } else if complexity > self.high {
            Severity::High
        } else {
            Severity::Medium
        }
    }

    fn suggestion(&self, complexity: i32) -> String {
        if complexity > self.critical {
            "Split this function along its major branches, replace long if-else \
             chains with lookup tables, and consider a state machine for the \
             remaining flow."
                .to_string()
        } else if complexity > self.high {
            "Extract the heaviest conditional blocks into named helper functions \
             and use early returns to flatten the nesting."
                .to_string()
        } else {
            "Break this function into smaller single-purpose helpers, using early \
             returns to reduce nesting."
                .to_string()
        }
    }
}

impl Detector for ComplexityDetector {
    fn name(&self) -> &'static str {
        "cyclomatic-complexity"
    }

    fn detect(&mut self, file: &SourceFile, _ctx: &AnalysisContext) -> Vec<Issue> {
        let mut issues = Vec::new();

        for func in &file.funcs {
            let Some(body) = &func.body else {
                continue;
            };
            let complexity = cyclomatic_complexity(body);
            if complexity <= self.medium {
                continue;
            }

            issues.push(Issue {
                kind: IssueKind::CyclomaticComplexity,
                severity: self.severity(complexity),
                file: file.path.clone(),
                line: func.pos.line,
                column: func.pos.column,
                function: Some(func.name.clone()),
                message: format!(
                    "function '{}' has cyclomatic complexity {} (threshold {})",
                    func.name, complexity, self.medium
                ),
                suggestion: self.suggestion(complexity),
                complexity: format!("complexity {}", complexity),
                code_snippet: format!("{}:{}:{}", file.path, func.pos.line, func.pos.column),
            });
        }

        issues
    }
}

/// Count decision points in a function body.
pub fn cyclomatic_complexity(body: &Block) -> i32 {
    struct Counter {
        count: i32,
    }
    impl Visitor for Counter {
        fn enter_stmt(&mut self, stmt: &Stmt) -> bool {
            match stmt {
                Stmt::If(s) => {
                    self.count += 1;
                    // A plain else adds a path; an else-if is counted when
                    // its own if is visited.
                    if let Some(else_branch) = &s.else_branch {
                        if matches!(**else_branch, Stmt::Block(_)) {
                            self.count += 1;
                        }
                    }
                }
                Stmt::For(_) | Stmt::Range(_) => self.count += 1,
                Stmt::Switch(s) => {
                    self.count += 1;
                    self.count += s.cases.iter().filter(|c| !c.is_default).count() as i32;
                }
                Stmt::Select(s) => {
                    self.count += s.arms.len() as i32;
                }
                _ => {}
            }
            true
        }

        fn enter_expr(&mut self, expr: &Expr) -> bool {
            match expr {
                Expr::FuncLit(_) => false,
                Expr::Binary(bin)
                    if bin.op == BinaryOp::LogicalAnd || bin.op == BinaryOp::LogicalOr =>
                {
                    self.count += 1;
                    true
                }
                _ => true,
            }
        }
    }

    let mut counter = Counter { count: 1 };
    walk_block(&mut counter, body);
    counter.count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisContext;
    use crate::syntax::GoParser;

    fn complexity_of(src: &str) -> i32 {
        let file = GoParser::new()
            .parse_source("test.go", src.as_bytes())
            .unwrap();
        cyclomatic_complexity(file.funcs[0].body.as_ref().unwrap())
    }

    fn detect_with(src: &str, tiers: &TierThresholds) -> Vec<Issue> {
        let file = GoParser::new()
            .parse_source("test.go", src.as_bytes())
            .unwrap();
        let ctx = AnalysisContext::build(std::slice::from_ref(&file));
        let mut detector = ComplexityDetector::new(tiers);
        detector.detect(&file, &ctx)
    }

    #[test]
    fn test_straight_line_is_one() {
        let c = complexity_of(
            r#"
package main

func simple() int {
    x := 1
    return x
}
"#,
        );
        assert_eq!(c, 1);
    }

    #[test]
    fn test_branches_loops_and_logic() {
        let c = complexity_of(
            r#"
package main

func complexFn(items []int) int {
    sum := 0
    for _, item := range items {
        if item > 0 && item < 100 {
            sum += item
        }
    }
    return sum
}
"#,
        );
        // 1 base + 1 range + 1 if + 1 && = 4
        assert_eq!(c, 4);
    }

    #[test]
    fn test_else_if_chain() {
        let c = complexity_of(
            r#"
package main

func classify(x int) int {
    if x > 10 {
        return 2
    } else if x > 0 {
        return 1
    } else {
        return 0
    }
}
"#,
        );
        // 1 base + if + else-if + plain else = 4
        assert_eq!(c, 4);
    }

    #[test]
    fn test_switch_counts_non_default_cases() {
        let c = complexity_of(
            r#"
package main

func pick(x int) int {
    switch x {
    case 1:
        return 1
    case 2:
        return 2
    default:
        return 0
    }
}
"#,
        );
        // 1 base + 1 switch + 2 non-default cases = 4
        assert_eq!(c, 4);
    }

    #[test]
    fn test_func_literal_not_counted() {
        let c = complexity_of(
            r#"
package main

func outer(items []int) func() int {
    return func() int {
        total := 0
        for _, item := range items {
            if item > 0 {
                total += item
            }
        }
        return total
    }
}
"#,
        );
        assert_eq!(c, 1);
    }

    #[test]
    fn test_no_finding_at_threshold_boundary() {
        // Nine ifs: complexity exactly 10 (the default medium threshold).
        let mut body = String::new();
        for i in 0..9 {
            body.push_str(&format!("    if x > {} {{\n        x++\n    }}\n", i));
        }
        let src = format!("package main\n\nfunc branchy(x int) int {{\n{}    return x\n}}\n", body);

        let tiers = TierThresholds {
            enabled: true,
            medium_threshold: 10,
            high_threshold: 15,
            critical_threshold: 25,
        };
        assert!(detect_with(&src, &tiers).is_empty());

        // One more if pushes it over.
        let mut body = String::new();
        for i in 0..10 {
            body.push_str(&format!("    if x > {} {{\n        x++\n    }}\n", i));
        }
        let src = format!("package main\n\nfunc branchy(x int) int {{\n{}    return x\n}}\n", body);
        let issues = detect_with(&src, &tiers);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Medium);
    }

    #[test]
    fn test_severity_escalation() {
        let tiers = TierThresholds {
            enabled: true,
            medium_threshold: 2,
            high_threshold: 4,
            critical_threshold: 6,
        };
        let src = r#"
package main

func branchy(x int) int {
    if x > 1 {
        x++
    }
    if x > 2 {
        x++
    }
    if x > 3 {
        x++
    }
    if x > 4 {
        x++
    }
    return x
}
"#;
        // complexity 5: in (4, 6] -> High
        let issues = detect_with(src, &tiers);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::High);
    }
}
