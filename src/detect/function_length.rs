//! Function length measured in distinct source lines.
//!
//! Counting lines touched by nodes (rather than the raw start-to-end span)
//! keeps blank lines, comments, and closing braces out of the total.

use std::collections::HashSet;

use crate::analysis::AnalysisContext;
use crate::config::TierThresholds;
use crate::syntax::ast::{Expr, SourceFile, Stmt};
use crate::syntax::walk::{walk_block, Visitor};

use super::{Detector, Issue, IssueKind, Severity};

pub struct FunctionLengthDetector {
    medium: i32,
    high: i32,
    critical: i32,
}

impl FunctionLengthDetector {
    pub fn new(tiers: &TierThresholds) -> Self {
        Self {
            medium: tiers.medium_threshold,
            high: tiers.high_threshold,
            critical: tiers.critical_threshold,
        }
    }

    fn severity(&self, lines: i32) -> Severity {
        if lines >= self.critical {
            Severity::Critical
        } else if lines >= self.high {
            Severity::High
        } else {
            Severity::Medium
        }
    }
}

impl Detector for FunctionLengthDetector {
    fn name(&self) -> &'static str {
        "function-length"
    }

    fn detect(&mut self, file: &SourceFile, _ctx: &AnalysisContext) -> Vec<Issue> {
        let mut issues = Vec::new();

        for func in &file.funcs {
            let Some(body) = &func.body else {
                continue;
            };

            let lines = distinct_lines(body) as i32;
            if lines < self.medium {
                continue;
            }

            let span = func.end_line.saturating_sub(func.pos.line) + 1;
            let severity = self.severity(lines);

            issues.push(Issue {
                kind: IssueKind::FunctionLength,
                severity,
                file: file.path.clone(),
                line: func.pos.line,
                column: func.pos.column,
                function: Some(func.name.clone()),
                message: format!(
                    "function '{}' is too long ({} lines of code, {} total lines)",
                    func.name, lines, span
                ),
                suggestion: suggestion(severity),
                complexity: format!("{} lines", lines),
                code_snippet: format!("{}:{}:{}", file.path, func.pos.line, func.pos.column),
            });
        }

        issues
    }
}

fn suggestion(severity: Severity) -> String {
    match severity {
        Severity::Critical => "This function is far past maintainable size. Extract its \
                               major sections into their own functions before touching it \
                               again; it likely wants to be several types."
            .to_string(),
        Severity::High => "Identify the function's logical sections and extract each into \
                           a named helper; aim for pieces of 15-25 lines."
            .to_string(),
        _ => "Extract logical blocks into separate functions so each does one thing; \
              early returns help flatten the remainder."
            .to_string(),
    }
}

/// Count of distinct source lines touched by any node in the body.
fn distinct_lines(body: &crate::syntax::ast::Block) -> usize {
    struct LineCollector {
        lines: HashSet<usize>,
    }
    impl Visitor for LineCollector {
        fn enter_stmt(&mut self, stmt: &Stmt) -> bool {
            self.lines.insert(stmt.pos().line);
            match stmt {
                Stmt::Switch(s) => {
                    for arm in &s.cases {
                        self.lines.insert(arm.pos.line);
                    }
                }
                Stmt::Select(s) => {
                    for arm in &s.arms {
                        self.lines.insert(arm.pos.line);
                    }
                }
                _ => {}
            }
            true
        }

        fn enter_expr(&mut self, expr: &Expr) -> bool {
            self.lines.insert(expr.pos().line);
            true
        }
    }

    let mut collector = LineCollector {
        lines: HashSet::new(),
    };
    walk_block(&mut collector, body);
    collector.lines.len()
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
        let mut detector =
            FunctionLengthDetector::new(&crate::config::ComplexityRules::default().function_length);
        detector.detect(&file, &ctx)
    }

    fn synthetic_function(statement_lines: usize) -> String {
        let mut src = String::from("package main\n\nfunc generated() int {\n    x := 0\n");
        for i in 0..statement_lines {
            src.push_str(&format!("    x = x + {}\n", i));
        }
        src.push_str("    return x\n}\n");
        src
    }

    #[test]
    fn test_short_function_not_flagged() {
        let issues = detect(
            r#"
package main

func short() int {
    x := 1
    return x + 1
}
"#,
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn test_blank_lines_do_not_count() {
        // 10 statements spread over many blank lines still count as 10.
        let mut src = String::from("package main\n\nfunc sparse() int {\n    x := 0\n");
        for i in 0..10 {
            src.push_str(&format!("\n\n\n    x = x + {}\n", i));
        }
        src.push_str("    return x\n}\n");
        let issues = detect(&src);
        assert!(issues.is_empty());
    }

    #[test]
    fn test_medium_length() {
        // 60 statements + define + return = 62 distinct lines
        let issues = detect(&synthetic_function(60));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Medium);
        assert_eq!(issues[0].function.as_deref(), Some("generated"));
    }

    #[test]
    fn test_high_length() {
        let issues = detect(&synthetic_function(120));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::High);
    }

    #[test]
    fn test_critical_length() {
        let issues = detect(&synthetic_function(220));
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Critical);
    }
}
