//! Detection of nested loop iteration.
//!
//! Flags loops nested deeper than the configured maximum, using loop facts
//! from the shared context to suppress cheap cases (small constant bounds,
//! early exits) and to weight confidence before reporting.

use crate::analysis::{AnalysisContext, LoopBound, LoopFacts};
use crate::config::NestedLoopRule;
use crate::syntax::ast::{FuncDecl, Position, SourceFile, Stmt};
use crate::syntax::walk::{walk_file, Visitor};

use super::{Detector, Issue, IssueKind, Severity};

/// Confidence floor below which a candidate is dropped.
const MIN_CONFIDENCE: f64 = 0.6;

pub struct NestedLoopDetector {
    max_depth: usize,
}

impl NestedLoopDetector {
    pub fn new(rule: &NestedLoopRule) -> Self {
        Self {
            max_depth: rule.max_depth,
        }
    }
}

impl Detector for NestedLoopDetector {
    fn name(&self) -> &'static str {
        "nested-loops"
    }

    fn detect(&mut self, file: &SourceFile, ctx: &AnalysisContext) -> Vec<Issue> {
        let mut visitor = NestedLoopVisitor {
            ctx,
            file: &file.path,
            max_depth: self.max_depth,
            depth: 0,
            current_func: String::new(),
            issues: Vec::new(),
        };
        walk_file(&mut visitor, file);
        visitor.issues
    }
}

struct NestedLoopVisitor<'a> {
    ctx: &'a AnalysisContext,
    file: &'a str,
    max_depth: usize,
    depth: usize,
    current_func: String,
    issues: Vec<Issue>,
}

impl Visitor for NestedLoopVisitor<'_> {
    fn enter_func(&mut self, func: &FuncDecl) {
        self.current_func = func.name.clone();
    }

    fn enter_stmt(&mut self, stmt: &Stmt) -> bool {
        if stmt.is_loop() {
            self.depth += 1;
            if self.depth > self.max_depth {
                self.check_loop(stmt.pos());
            }
        }
        true
    }

    fn leave_stmt(&mut self, stmt: &Stmt) {
        if stmt.is_loop() {
            self.depth -= 1;
        }
    }
}

impl NestedLoopVisitor<'_> {
    fn check_loop(&mut self, pos: Position) {
        let facts = self.ctx.loop_facts(self.file, pos);

        if let Some(facts) = facts {
            // Small bounded loops and search loops with an exit are cheap
            // enough to leave alone.
            if facts.bound == LoopBound::Constant
                && facts.estimated_max > 0
                && facts.estimated_max <= 10
            {
                return;
            }
            if facts.has_early_exit {
                return;
            }
        }

        if self.confidence(facts) < MIN_CONFIDENCE {
            return;
        }

        let severity = match self.depth {
            2 => Severity::Medium,
            3 => Severity::High,
            _ => Severity::Critical,
        };
        let message = self.message(facts);
        let suggestion = self.suggestion(facts);
        let complexity = self.complexity_note(facts);

        self.issues.push(Issue {
            kind: IssueKind::NestedLoops,
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

    fn confidence(&self, facts: Option<&LoopFacts>) -> f64 {
        let Some(facts) = facts else {
            return 0.5;
        };

        let mut confidence: f64 = 0.8;
        if facts.bound == LoopBound::Variable || facts.estimated_max > 100 {
            confidence += 0.2;
        }
        if facts.has_early_exit {
            confidence -= 0.3;
        }
        if self.depth >= 3 {
            confidence += 0.1;
        }
        confidence.min(1.0)
    }

    fn message(&self, facts: Option<&LoopFacts>) -> String {
        let base = format!(
            "nested loop at depth {} in function '{}'",
            self.depth, self.current_func
        );

        match facts {
            Some(f) if f.bound == LoopBound::Constant && f.estimated_max > 0 => {
                match known_ops(f.estimated_max, self.depth) {
                    Some(ops) => format!("{} (~{} operations)", base, ops),
                    None => base,
                }
            }
            Some(f) if f.bound == LoopBound::Linear => {
                format!("{} - cost scales with input size", base)
            }
            Some(f) if f.bound == LoopBound::Variable => {
                format!("{} - iteration count is unbounded", base)
            }
            _ => base,
        }
    }

    fn suggestion(&self, facts: Option<&LoopFacts>) -> String {
        if self.depth >= 3 {
            return "Triple-nested iteration usually means the algorithm needs restructuring, \
                    not tuning. Pre-index the data or change the approach entirely."
                .to_string();
        }
        match facts {
            Some(f) if f.bound == LoopBound::Linear => {
                "Pre-process the inner collection into a map before the outer loop, \
                 or merge the passes into one loop."
                    .to_string()
            }
            _ => "Replace the inner scan with a map lookup, or break out of the inner \
                  loop as soon as the answer is found."
                .to_string(),
        }
    }

    fn complexity_note(&self, facts: Option<&LoopFacts>) -> String {
        if let Some(f) = facts {
            if f.bound == LoopBound::Constant && f.estimated_max > 0 {
                if let Some(ops) = known_ops(f.estimated_max, self.depth) {
                    return format!("O({})", ops);
                }
            }
        }
        match self.depth {
            2 => "O(n²)".to_string(),
            3 => "O(n³)".to_string(),
            d => format!("O(n^{})", d),
        }
    }
}

/// Absolute operation count for a constant-bounded nest, when it fits.
fn known_ops(max: i64, depth: usize) -> Option<i64> {
    max.checked_pow(depth as u32)
}
