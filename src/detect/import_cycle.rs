//! Import cycle detection across the analyzed file set.
//!
//! Two phases. While files are visited, each file's non-stdlib imports are
//! recorded against its package directory. Once every file has been seen,
//! a three-color depth-first search over the resulting directed graph
//! extracts cycles: the first back-edge found in a branch yields that
//! branch's one reported cycle.
//!
//! Cycles at or below the configured maximum length are accepted as
//! normal; longer ones are reported once per participant package, at that
//! package's recorded import line.

use std::collections::{BTreeMap, HashMap};

use crate::analysis::AnalysisContext;
use crate::config::ImportCycleRule;
use crate::syntax::ast::SourceFile;

use super::stdlib::is_stdlib_import;
use super::{Detector, Issue, IssueKind, Severity};

/// Per-package import record, built incrementally as files are visited.
struct PackageInfo {
    #[allow(dead_code)]
    name: String,
    file: String,
    imports: Vec<String>,
    line: usize,
}

pub struct ImportCycleDetector {
    max_cycle_length: usize,
    ignore_test_packages: bool,
    ignore_vendor: bool,
    exclude_packages: Vec<String>,
    /// Sorted for deterministic DFS root order.
    packages: BTreeMap<String, PackageInfo>,
}

impl ImportCycleDetector {
    pub fn new(rule: &ImportCycleRule) -> Self {
        Self {
            max_cycle_length: rule.max_cycle_length,
            ignore_test_packages: rule.ignore_test_packages,
            ignore_vendor: rule.ignore_vendor,
            exclude_packages: rule.exclude_packages.clone(),
            packages: BTreeMap::new(),
        }
    }

    fn is_analyzable_import(&self, path: &str) -> bool {
        for excluded in &self.exclude_packages {
            if path == excluded || path.starts_with(&format!("{}/", excluded)) {
                return false;
            }
        }
        if self.ignore_vendor && (path.starts_with("vendor/") || path.contains("/vendor/")) {
            return false;
        }
        !is_stdlib_import(path)
    }

    /// Map an import path onto a known package key. Import paths are
    /// module paths while keys are source directories, so the two are
    /// bridged by suffix matching in either direction ("myapp/internal/b"
    /// onto key "internal/b", "ring/a" onto key "/abs/scan/ring/a").
    fn resolve_import(&self, import: &str) -> Option<String> {
        let trimmed = import.trim_start_matches("./");
        if self.packages.contains_key(trimmed) {
            return Some(trimmed.to_string());
        }
        let as_suffix = format!("/{}", trimmed);
        self.packages
            .keys()
            .find(|key| trimmed.ends_with(&format!("/{}", key)) || key.ends_with(&as_suffix))
            .cloned()
    }

    /// Three-color DFS with an explicit stack. One cycle per branch: the
    /// first back-edge ends that root's search.
    fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut color: HashMap<String, Color> = self
            .packages
            .keys()
            .map(|k| (k.clone(), Color::White))
            .collect();
        let mut cycles = Vec::new();

        for root in self.packages.keys() {
            if color[root] != Color::White {
                continue;
            }

            let mut stack = vec![self.frame_for(root)];
            color.insert(root.clone(), Color::Gray);
            let mut found = false;

            while let Some(frame) = stack.last_mut() {
                if frame.next >= frame.edges.len() {
                    color.insert(frame.node.clone(), Color::Black);
                    stack.pop();
                    continue;
                }

                let target = frame.edges[frame.next].clone();
                frame.next += 1;

                match color.get(&target).copied() {
                    Some(Color::White) => {
                        color.insert(target.clone(), Color::Gray);
                        let next_frame = self.frame_for(&target);
                        stack.push(next_frame);
                    }
                    Some(Color::Gray) => {
                        let start = stack
                            .iter()
                            .position(|f| f.node == target)
                            .unwrap_or(0);
                        cycles.push(stack[start..].iter().map(|f| f.node.clone()).collect());
                        found = true;
                        break;
                    }
                    // Black or unknown target: nothing new down there.
                    _ => {}
                }
            }

            if found {
                for frame in &stack {
                    color.insert(frame.node.clone(), Color::Black);
                }
            }
        }

        cycles
    }

    /// Start a DFS frame with the node's resolved outgoing edges.
    fn frame_for(&self, node: &str) -> Frame {
        let edges = self
            .packages
            .get(node)
            .map(|pkg| {
                pkg.imports
                    .iter()
                    .filter_map(|i| self.resolve_import(i))
                    .collect()
            })
            .unwrap_or_default();
        Frame {
            node: node.to_string(),
            edges,
            next: 0,
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Color {
    White,
    Gray,
    Black,
}

struct Frame {
    node: String,
    edges: Vec<String>,
    next: usize,
}

impl Detector for ImportCycleDetector {
    fn name(&self) -> &'static str {
        "import-cycle"
    }

    fn detect(&mut self, file: &SourceFile, _ctx: &AnalysisContext) -> Vec<Issue> {
        let imports: Vec<String> = file
            .imports
            .iter()
            .filter(|i| self.is_analyzable_import(&i.path))
            .map(|i| i.path.clone())
            .collect();

        if !imports.is_empty() {
            let line = file
                .imports
                .iter()
                .find(|i| self.is_analyzable_import(&i.path))
                .map(|i| i.pos.line)
                .unwrap_or(1);

            self.packages.insert(
                package_key(file),
                PackageInfo {
                    name: file.package.clone(),
                    file: file.path.clone(),
                    imports,
                    line,
                },
            );
        }

        Vec::new()
    }

    fn finish(&mut self) -> Vec<Issue> {
        let mut issues = Vec::new();

        for cycle in self.find_cycles() {
            let edge_count = cycle.len();
            if edge_count <= self.max_cycle_length {
                continue;
            }

            if self.ignore_test_packages
                && cycle
                    .iter()
                    .any(|p| p.contains("_test") || p.contains("/test"))
            {
                continue;
            }

            let severity = self.cycle_severity(edge_count);
            let chain = cycle_display(&cycle);

            for member in &cycle {
                let Some(pkg) = self.packages.get(member) else {
                    continue;
                };
                issues.push(Issue {
                    kind: IssueKind::ImportCycle,
                    severity,
                    file: pkg.file.clone(),
                    line: pkg.line,
                    column: 1,
                    function: None,
                    message: format!("import cycle detected: {}", chain),
                    suggestion: cycle_suggestion(edge_count),
                    complexity: format!("cycle length: {} packages", edge_count),
                    code_snippet: format!("{}:{}", pkg.file, pkg.line),
                });
            }
        }

        issues
    }
}

impl ImportCycleDetector {
    fn cycle_severity(&self, edge_count: usize) -> Severity {
        let ratio = edge_count as f64 / self.max_cycle_length as f64;
        if ratio >= 1.5 {
            Severity::Critical
        } else if ratio >= 1.2 {
            Severity::High
        } else {
            Severity::Medium
        }
    }
}

/// Graph key for a file: its directory, falling back to the package name
/// for files at the scan root.
fn package_key(file: &SourceFile) -> String {
    let path = std::path::Path::new(&file.path);
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            dir.to_string_lossy().replace('\\', "/")
        }
        _ if !file.package.is_empty() => file.package.clone(),
        _ => "main".to_string(),
    }
}

fn cycle_display(cycle: &[String]) -> String {
    let mut chain = cycle.join(" -> ");
    if let Some(first) = cycle.first() {
        chain.push_str(" -> ");
        chain.push_str(first);
    }
    chain
}

fn cycle_suggestion(edge_count: usize) -> String {
    match edge_count {
        2 => "Break the mutual dependency: move the shared contract into its own \
              package that both sides import, or invert one side behind an \
              interface wired up in main."
            .to_string(),
        3 => "Find the least essential edge of the triangle and remove it by \
              extracting shared interfaces into a common package."
            .to_string(),
        _ => format!(
            "A {}-package cycle needs an architectural pass: map the dependencies, \
             decide which packages form the core, and make everything else depend \
             inward only.",
            edge_count
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::GoParser;

    fn run_detector(rule: &ImportCycleRule, files: &[(&str, &str)]) -> Vec<Issue> {
        let parser = GoParser::new();
        let parsed: Vec<SourceFile> = files
            .iter()
            .map(|(path, src)| parser.parse_source(path, src.as_bytes()).unwrap())
            .collect();
        let ctx = AnalysisContext::build(&parsed);

        let mut detector = ImportCycleDetector::new(rule);
        let mut issues = Vec::new();
        for file in &parsed {
            issues.extend(detector.detect(file, &ctx));
        }
        issues.extend(detector.finish());
        issues
    }

    fn two_cycle_files() -> Vec<(&'static str, &'static str)> {
        vec![
            (
                "a/a.go",
                "package a\n\nimport \"myapp/b\"\n\nvar _ = b.Value\n",
            ),
            (
                "b/b.go",
                "package b\n\nimport \"myapp/a\"\n\nvar _ = a.Value\n",
            ),
        ]
    }

    #[test]
    fn test_short_cycle_accepted() {
        // Two-package cycle, default max of 5: accepted as normal.
        let issues = run_detector(&ImportCycleRule::default(), &two_cycle_files());
        assert!(issues.is_empty());
    }

    #[test]
    fn test_cycle_above_max_reported_per_member() {
        let rule = ImportCycleRule {
            max_cycle_length: 1,
            ..ImportCycleRule::default()
        };
        let issues = run_detector(&rule, &two_cycle_files());

        // One finding per participant package.
        assert_eq!(issues.len(), 2);
        for issue in &issues {
            assert_eq!(issue.kind, IssueKind::ImportCycle);
            // ratio 2/1 = 2.0 -> Critical
            assert_eq!(issue.severity, Severity::Critical);
            assert!(issue.message.contains("import cycle detected"));
        }
        let files: Vec<&str> = issues.iter().map(|i| i.file.as_str()).collect();
        assert!(files.contains(&"a/a.go"));
        assert!(files.contains(&"b/b.go"));
    }

    #[test]
    fn test_ratio_severity_bands() {
        // Six packages in a ring with max 5: ratio 1.2 -> High.
        let files: Vec<(String, String)> = (0..6)
            .map(|i| {
                let next = (i + 1) % 6;
                (
                    format!("p{}/p{}.go", i, i),
                    format!("package p{}\n\nimport \"myapp/p{}\"\n", i, next),
                )
            })
            .collect();
        let borrowed: Vec<(&str, &str)> = files
            .iter()
            .map(|(p, s)| (p.as_str(), s.as_str()))
            .collect();

        let issues = run_detector(&ImportCycleRule::default(), &borrowed);
        assert_eq!(issues.len(), 6);
        assert!(issues.iter().all(|i| i.severity == Severity::High));
    }

    #[test]
    fn test_medium_band_reachable() {
        // Seven packages in a ring with max 6: ratio ~1.17 -> Medium.
        let files: Vec<(String, String)> = (0..7)
            .map(|i| {
                let next = (i + 1) % 7;
                (
                    format!("p{}/p{}.go", i, i),
                    format!("package p{}\n\nimport \"myapp/p{}\"\n", i, next),
                )
            })
            .collect();
        let borrowed: Vec<(&str, &str)> = files
            .iter()
            .map(|(p, s)| (p.as_str(), s.as_str()))
            .collect();

        let rule = ImportCycleRule {
            max_cycle_length: 6,
            ..ImportCycleRule::default()
        };
        let issues = run_detector(&rule, &borrowed);
        assert_eq!(issues.len(), 7);
        assert!(issues.iter().all(|i| i.severity == Severity::Medium));
    }

    #[test]
    fn test_stdlib_imports_ignored() {
        let rule = ImportCycleRule {
            max_cycle_length: 1,
            ..ImportCycleRule::default()
        };
        let issues = run_detector(
            &rule,
            &[(
                "a/a.go",
                "package a\n\nimport (\n    \"fmt\"\n    \"net/http\"\n)\n",
            )],
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn test_acyclic_graph_clean() {
        let rule = ImportCycleRule {
            max_cycle_length: 1,
            ..ImportCycleRule::default()
        };
        let issues = run_detector(
            &rule,
            &[
                ("a/a.go", "package a\n\nimport \"myapp/b\"\n"),
                ("b/b.go", "package b\n\nimport \"myapp/c\"\n"),
                ("c/c.go", "package c\n"),
            ],
        );
        assert!(issues.is_empty());
    }

    #[test]
    fn test_excluded_package_breaks_cycle() {
        let rule = ImportCycleRule {
            max_cycle_length: 1,
            exclude_packages: vec!["myapp/b".to_string()],
            ..ImportCycleRule::default()
        };
        let issues = run_detector(&rule, &two_cycle_files());
        assert!(issues.is_empty());
    }

    #[test]
    fn test_test_packages_skipped() {
        let rule = ImportCycleRule {
            max_cycle_length: 1,
            ..ImportCycleRule::default()
        };
        let issues = run_detector(
            &rule,
            &[
                (
                    "a_test/a.go",
                    "package a_test\n\nimport \"myapp/b\"\n",
                ),
                (
                    "b/b.go",
                    "package b\n\nimport \"myapp/a_test\"\n",
                ),
            ],
        );
        assert!(issues.is_empty());
    }
}
