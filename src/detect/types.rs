//! Core types for analysis results.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity levels, ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "LOW",
            Severity::Medium => "MEDIUM",
            Severity::High => "HIGH",
            Severity::Critical => "CRITICAL",
        }
    }

    /// All severities, most severe first (display order).
    pub fn all_desc() -> [Severity; 4] {
        [
            Severity::Critical,
            Severity::High,
            Severity::Medium,
            Severity::Low,
        ]
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Issue categories, one per detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    NestedLoops,
    StringConcatenation,
    InefficientDataStructure,
    CyclomaticComplexity,
    MemoryAllocation,
    SliceGrowth,
    FunctionLength,
    ImportCycle,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::NestedLoops => "nested_loops",
            IssueKind::StringConcatenation => "string_concatenation",
            IssueKind::InefficientDataStructure => "inefficient_data_structure",
            IssueKind::CyclomaticComplexity => "cyclomatic_complexity",
            IssueKind::MemoryAllocation => "memory_allocation",
            IssueKind::SliceGrowth => "slice_growth",
            IssueKind::FunctionLength => "function_length",
            IssueKind::ImportCycle => "import_cycle",
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single reported problem. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub severity: Severity,
    pub file: String,
    pub line: usize,
    pub column: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    pub message: String,
    pub suggestion: String,
    /// Free-form complexity annotation, e.g. "O(n²)".
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub complexity: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub code_snippet: String,
}

/// Aggregate result of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(rename = "files_analyzed")]
    pub files: Vec<String>,
    /// Files excluded because they failed to parse.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped_files: Vec<String>,
    pub total_issues: usize,
    pub issues_by_severity: BTreeMap<String, usize>,
    pub issues: Vec<Issue>,
    /// 0-100, higher is healthier.
    pub performance_score: i32,
    pub analysis_duration: String,
}

impl AnalysisResult {
    pub fn new() -> Self {
        Self {
            files: Vec::new(),
            skipped_files: Vec::new(),
            total_issues: 0,
            issues_by_severity: BTreeMap::new(),
            issues: Vec::new(),
            performance_score: 100,
            analysis_duration: String::new(),
        }
    }

    /// Append an issue, maintaining `total == sum(counts) == issues.len()`.
    pub fn add_issue(&mut self, issue: Issue) {
        *self
            .issues_by_severity
            .entry(issue.severity.to_string())
            .or_insert(0) += 1;
        self.total_issues += 1;
        self.issues.push(issue);
    }

    /// Recompute the performance score from the full issue list.
    pub fn recompute_score(&mut self) {
        self.performance_score = crate::score::calculate(&self.issues);
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.issues_by_severity
            .get(severity.as_str())
            .copied()
            .unwrap_or(0)
    }
}

impl Default for AnalysisResult {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(kind: IssueKind, severity: Severity) -> Issue {
        Issue {
            kind,
            severity,
            file: "main.go".to_string(),
            line: 1,
            column: 1,
            function: Some("main".to_string()),
            message: "test".to_string(),
            suggestion: "test".to_string(),
            complexity: String::new(),
            code_snippet: String::new(),
        }
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn test_counts_invariant() {
        let mut result = AnalysisResult::new();
        result.add_issue(issue(IssueKind::NestedLoops, Severity::Medium));
        result.add_issue(issue(IssueKind::NestedLoops, Severity::High));
        result.add_issue(issue(IssueKind::SliceGrowth, Severity::High));

        assert_eq!(result.total_issues, 3);
        assert_eq!(result.issues.len(), 3);
        let sum: usize = result.issues_by_severity.values().sum();
        assert_eq!(sum, 3);
        assert_eq!(result.count(Severity::High), 2);
        assert_eq!(result.count(Severity::Medium), 1);
        assert_eq!(result.count(Severity::Critical), 0);
    }

    #[test]
    fn test_kind_wire_names() {
        assert_eq!(IssueKind::NestedLoops.as_str(), "nested_loops");
        assert_eq!(
            IssueKind::InefficientDataStructure.as_str(),
            "inefficient_data_structure"
        );
        assert_eq!(
            serde_json::to_string(&IssueKind::StringConcatenation).unwrap(),
            "\"string_concatenation\""
        );
        assert_eq!(
            serde_json::to_string(&Severity::Critical).unwrap(),
            "\"CRITICAL\""
        );
    }
}
