//! Shared analysis context built once per run.
//!
//! One pass over all lowered files produces three read-only fact maps that
//! every detector consults:
//!
//! - a call index (function name -> call sites + frequency estimate)
//! - per-loop facts (bound classification, estimated max, nesting, early exit)
//! - best-effort tracked collection sizes per variable
//!
//! Missing information degrades to unknown / zero confidence; context
//! building never fails a run.

use std::collections::HashMap;
use std::fmt;

use crate::syntax::ast::{AssignOp, Block, BranchKind, Expr, Position, SourceFile, Stmt, TypeRef};
use crate::syntax::walk::{walk_block, walk_file, Visitor};

/// Coarse how-often-does-this-run estimate from naming conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Unknown,
    Rare,
    Moderate,
    High,
}

/// A known function and where it is called from.
///
/// The frequency estimate is computed for every declared function but is
/// not yet consulted by any detector.
#[derive(Debug, Clone)]
pub struct CallInfo {
    pub frequency: Frequency,
    /// (file, position) of each call site resolved by name.
    pub sites: Vec<(String, Position)>,
}

/// Iteration-count category of a loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopBound {
    Unknown,
    /// `for i := 0; i < 10; i++`
    Constant,
    /// `for i := 0; i < len(items); i++` or any range loop
    Linear,
    /// `for i := 0; i < n; i++`
    Variable,
}

#[derive(Debug, Clone)]
pub struct LoopFacts {
    pub bound: LoopBound,
    /// Estimated maximum iteration count; -1 when unknown.
    pub estimated_max: i64,
    pub is_nested: bool,
    pub has_early_exit: bool,
}

/// Where a tracked size came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeSource {
    /// Composite literal with counted elements.
    Literal,
    /// `make` with a constant size argument.
    SizedAlloc,
}

impl fmt::Display for SizeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SizeSource::Literal => write!(f, "literal"),
            SizeSource::SizedAlloc => write!(f, "make"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SizeInfo {
    pub estimated_len: usize,
    pub confidence: f64,
    pub source: SizeSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct LoopKey {
    file: String,
    line: usize,
    column: usize,
}

/// Read-only facts shared by all detectors for one run.
pub struct AnalysisContext {
    calls: HashMap<String, CallInfo>,
    loops: HashMap<LoopKey, LoopFacts>,
    sizes: HashMap<String, SizeInfo>,
}

impl AnalysisContext {
    /// Build the context in one pass over all files.
    pub fn build(files: &[SourceFile]) -> Self {
        let mut ctx = Self {
            calls: HashMap::new(),
            loops: HashMap::new(),
            sizes: HashMap::new(),
        };

        // Register every declared function first so call sites resolve
        // regardless of file order.
        for file in files {
            for func in &file.funcs {
                ctx.calls.insert(
                    func.name.clone(),
                    CallInfo {
                        frequency: estimate_frequency(&func.name),
                        sites: Vec::new(),
                    },
                );
            }
        }

        for file in files {
            ctx.collect_call_sites(file);
            ctx.collect_sizes(file);
            ctx.collect_loop_facts(file);
        }

        ctx
    }

    pub fn loop_facts(&self, file: &str, pos: Position) -> Option<&LoopFacts> {
        self.loops.get(&LoopKey {
            file: file.to_string(),
            line: pos.line,
            column: pos.column,
        })
    }

    pub fn size_of(&self, var: &str) -> Option<&SizeInfo> {
        self.sizes.get(var)
    }

    pub fn call_info(&self, name: &str) -> Option<&CallInfo> {
        self.calls.get(name)
    }

    fn collect_call_sites(&mut self, file: &SourceFile) {
        struct SiteScanner<'a> {
            file: &'a str,
            calls: &'a mut HashMap<String, CallInfo>,
        }
        impl Visitor for SiteScanner<'_> {
            fn enter_expr(&mut self, expr: &Expr) -> bool {
                if let Expr::Call(call) = expr {
                    if let Some(name) = call.callee_name() {
                        if let Some(info) = self.calls.get_mut(name) {
                            info.sites.push((self.file.to_string(), call.pos));
                        }
                    }
                }
                true
            }
        }

        let mut scanner = SiteScanner {
            file: &file.path,
            calls: &mut self.calls,
        };
        walk_file(&mut scanner, file);
    }

    fn collect_sizes(&mut self, file: &SourceFile) {
        struct SizeScanner<'a> {
            sizes: &'a mut HashMap<String, SizeInfo>,
        }
        impl SizeScanner<'_> {
            fn record(&mut self, name: &str, value: &Expr) {
                match value {
                    Expr::Composite(lit) if lit.type_ref == TypeRef::Slice => {
                        self.sizes.insert(
                            name.to_string(),
                            SizeInfo {
                                estimated_len: lit.elem_count,
                                confidence: 1.0,
                                source: SizeSource::Literal,
                            },
                        );
                    }
                    Expr::Call(call) if call.is_make() => {
                        // Length or capacity, whichever constant is larger:
                        // make([]T, 0, 64) is pre-sized just like make([]T, 64).
                        let size = call
                            .args
                            .iter()
                            .filter_map(|arg| match arg {
                                Expr::IntLit(lit) if lit.value > 0 => Some(lit.value),
                                _ => None,
                            })
                            .max();
                        if let Some(size) = size {
                            self.sizes.insert(
                                name.to_string(),
                                SizeInfo {
                                    estimated_len: size as usize,
                                    confidence: 0.8,
                                    source: SizeSource::SizedAlloc,
                                },
                            );
                        }
                    }
                    _ => {}
                }
            }
        }
        impl Visitor for SizeScanner<'_> {
            fn enter_stmt(&mut self, stmt: &Stmt) -> bool {
                match stmt {
                    Stmt::Assign(assign) if assign.op == AssignOp::Define => {
                        for (lhs, rhs) in assign.lhs.iter().zip(assign.rhs.iter()) {
                            if let Some(name) = lhs.as_ident() {
                                self.record(name, rhs);
                            }
                        }
                    }
                    Stmt::VarDecl(decl) => {
                        for (name, value) in decl.names.iter().zip(decl.values.iter()) {
                            self.record(name, value);
                        }
                    }
                    _ => {}
                }
                true
            }
        }

        let mut scanner = SizeScanner {
            sizes: &mut self.sizes,
        };
        walk_file(&mut scanner, file);
    }

    fn collect_loop_facts(&mut self, file: &SourceFile) {
        struct LoopScanner<'a> {
            file: &'a str,
            depth: usize,
            loops: &'a mut HashMap<LoopKey, LoopFacts>,
            sizes: &'a HashMap<String, SizeInfo>,
        }
        impl Visitor for LoopScanner<'_> {
            fn enter_stmt(&mut self, stmt: &Stmt) -> bool {
                let facts = match stmt {
                    Stmt::For(f) => Some(LoopFacts {
                        bound: classify_for_bound(f.cond.as_ref()),
                        estimated_max: estimate_for_max(f.cond.as_ref()),
                        is_nested: self.depth > 0,
                        has_early_exit: block_has_early_exit(&f.body),
                    }),
                    Stmt::Range(r) => Some(LoopFacts {
                        bound: LoopBound::Linear,
                        estimated_max: r
                            .subject
                            .as_ident()
                            .and_then(|name| self.sizes.get(name))
                            .map(|s| s.estimated_len as i64)
                            .unwrap_or(-1),
                        is_nested: self.depth > 0,
                        has_early_exit: block_has_early_exit(&r.body),
                    }),
                    _ => None,
                };

                if let Some(facts) = facts {
                    let pos = stmt.pos();
                    self.loops.insert(
                        LoopKey {
                            file: self.file.to_string(),
                            line: pos.line,
                            column: pos.column,
                        },
                        facts,
                    );
                    self.depth += 1;
                }
                true
            }

            fn leave_stmt(&mut self, stmt: &Stmt) {
                if stmt.is_loop() {
                    self.depth -= 1;
                }
            }
        }

        // Sizes are collected before loops, so range loops over same-file
        // literals resolve their estimated max.
        let mut scanner = LoopScanner {
            file: &file.path,
            depth: 0,
            loops: &mut self.loops,
            sizes: &self.sizes,
        };
        walk_file(&mut scanner, file);
    }
}

/// Classify a counted loop's continuation condition.
fn classify_for_bound(cond: Option<&Expr>) -> LoopBound {
    let Some(cond) = cond else {
        return LoopBound::Unknown;
    };
    match cond {
        Expr::Binary(bin) => match bin.rhs.as_ref() {
            Expr::IntLit(_) => LoopBound::Constant,
            Expr::Call(call) if call.is_len() => LoopBound::Linear,
            _ => LoopBound::Variable,
        },
        _ => LoopBound::Variable,
    }
}

fn estimate_for_max(cond: Option<&Expr>) -> i64 {
    if let Some(Expr::Binary(bin)) = cond {
        if let Expr::IntLit(lit) = bin.rhs.as_ref() {
            if lit.value > 0 {
                return lit.value;
            }
        }
    }
    -1
}

/// Subtree scan for a `break` or `return`, stopping at the first match.
/// Function literal bodies are skipped: exits inside a closure do not
/// shorten the enclosing loop.
fn block_has_early_exit(body: &Block) -> bool {
    struct ExitScanner {
        found: bool,
    }
    impl Visitor for ExitScanner {
        fn enter_stmt(&mut self, stmt: &Stmt) -> bool {
            if self.found {
                return false;
            }
            match stmt {
                Stmt::Return(_) => {
                    self.found = true;
                    false
                }
                Stmt::Branch(b) if b.kind == BranchKind::Break => {
                    self.found = true;
                    false
                }
                _ => true,
            }
        }

        fn enter_expr(&mut self, expr: &Expr) -> bool {
            !self.found && !matches!(expr, Expr::FuncLit(_))
        }
    }

    let mut scanner = ExitScanner { found: false };
    walk_block(&mut scanner, body);
    scanner.found
}

/// Name-based frequency heuristic. Error and setup paths run rarely;
/// processing loops run hot.
fn estimate_frequency(name: &str) -> Frequency {
    let name = name.to_lowercase();

    if name.contains("error") || name.contains("panic") {
        return Frequency::Rare;
    }
    if name.starts_with("init") || name.starts_with("setup") {
        return Frequency::Rare;
    }
    if name.contains("process")
        || name.contains("handle")
        || name.contains("loop")
        || name.contains("iterate")
    {
        return Frequency::High;
    }

    Frequency::Moderate
}
