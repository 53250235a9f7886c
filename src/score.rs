//! Performance score calculation.
//!
//! Starts at 100 and subtracts a severity-weighted penalty per issue, with
//! category multipliers: maintainability issues weigh 20% more, performance
//! issues 50% more, architectural issues 80% more.

use crate::detect::{Issue, IssueKind, Severity};

/// Base penalty per severity.
pub mod penalties {
    pub const LOW: i32 = 5;
    pub const MEDIUM: i32 = 15;
    pub const HIGH: i32 = 30;
    pub const CRITICAL: i32 = 50;
}

/// Score rating bands, for display coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rating {
    Excellent,
    Good,
    Fair,
    Poor,
}

fn base_penalty(severity: Severity) -> i32 {
    match severity {
        Severity::Low => penalties::LOW,
        Severity::Medium => penalties::MEDIUM,
        Severity::High => penalties::HIGH,
        Severity::Critical => penalties::CRITICAL,
    }
}

fn category_multiplier(kind: IssueKind) -> f64 {
    match kind {
        IssueKind::CyclomaticComplexity | IssueKind::FunctionLength => 1.2,
        IssueKind::NestedLoops | IssueKind::MemoryAllocation => 1.5,
        IssueKind::ImportCycle => 1.8,
        IssueKind::StringConcatenation
        | IssueKind::InefficientDataStructure
        | IssueKind::SliceGrowth => 1.0,
    }
}

/// Penalty charged for one issue.
pub fn penalty(issue: &Issue) -> i32 {
    (base_penalty(issue.severity) as f64 * category_multiplier(issue.kind)).round() as i32
}

/// Fold all issues into a 0-100 score. Zero issues scores exactly 100.
pub fn calculate(issues: &[Issue]) -> i32 {
    if issues.is_empty() {
        return 100;
    }

    let total: i32 = issues.iter().map(penalty).sum();
    (100 - total).clamp(0, 100)
}

/// Map a score to its rating band against configured thresholds.
pub fn rating(score: i32, excellent: i32, good: i32, fair: i32) -> Rating {
    if score >= excellent {
        Rating::Excellent
    } else if score >= good {
        Rating::Good
    } else if score >= fair {
        Rating::Fair
    } else {
        Rating::Poor
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
            function: None,
            message: String::new(),
            suggestion: String::new(),
            complexity: String::new(),
            code_snippet: String::new(),
        }
    }

    #[test]
    fn test_empty_scores_100() {
        assert_eq!(calculate(&[]), 100);
    }

    #[test]
    fn test_critical_import_cycle_scores_10() {
        let issues = vec![issue(IssueKind::ImportCycle, Severity::Critical)];
        // 100 - round(50 * 1.8) = 10
        assert_eq!(calculate(&issues), 10);
    }

    #[test]
    fn test_category_multipliers() {
        // Medium complexity: round(15 * 1.2) = 18
        assert_eq!(
            calculate(&[issue(IssueKind::CyclomaticComplexity, Severity::Medium)]),
            82
        );
        // High nested loop: round(30 * 1.5) = 45
        assert_eq!(
            calculate(&[issue(IssueKind::NestedLoops, Severity::High)]),
            55
        );
        // Medium string concat: no multiplier
        assert_eq!(
            calculate(&[issue(IssueKind::StringConcatenation, Severity::Medium)]),
            85
        );
    }

    #[test]
    fn test_monotone_non_increasing() {
        let mut issues = Vec::new();
        let mut last = calculate(&issues);
        for _ in 0..10 {
            issues.push(issue(IssueKind::SliceGrowth, Severity::Low));
            let score = calculate(&issues);
            assert!(score <= last);
            last = score;
        }
    }

    #[test]
    fn test_clamped_to_zero() {
        let issues: Vec<Issue> = (0..20)
            .map(|_| issue(IssueKind::ImportCycle, Severity::Critical))
            .collect();
        assert_eq!(calculate(&issues), 0);
    }

    #[test]
    fn test_rating_bands() {
        assert_eq!(rating(95, 90, 75, 50), Rating::Excellent);
        assert_eq!(rating(90, 90, 75, 50), Rating::Excellent);
        assert_eq!(rating(80, 90, 75, 50), Rating::Good);
        assert_eq!(rating(60, 90, 75, 50), Rating::Fair);
        assert_eq!(rating(10, 90, 75, 50), Rating::Poor);
    }
}
