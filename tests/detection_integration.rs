//! Integration tests for the full analysis pipeline.
//!
//! These run the real runner against the Go fixtures in testdata/ and
//! check detector output, aggregation invariants, and scoring.

use std::path::PathBuf;

use slowcheck::config::Config;
use slowcheck::detect::{IssueKind, Runner, Severity};

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn collect_fixture_files() -> Vec<PathBuf> {
    slowcheck::cli::collect_go_files(&testdata_path(), &Config::default())
        .expect("should collect fixtures")
}

fn run_analysis() -> slowcheck::detect::AnalysisResult {
    let runner = Runner::new(Config::default());
    runner.analyze_files(&collect_fixture_files())
}

#[test]
fn test_fixture_set_is_analyzed() {
    let result = run_analysis();

    // clean.go, hotloops.go, longfunc.go, ring/a/a.go, ring/b/b.go parse;
    // broken.go is excluded and surfaced.
    assert_eq!(result.files.len(), 5);
    assert_eq!(result.skipped_files.len(), 1);
    assert!(result.skipped_files[0].ends_with("broken.go"));
}

#[test]
fn test_expected_findings_per_detector() {
    let result = run_analysis();

    let count = |kind: IssueKind| result.issues.iter().filter(|i| i.kind == kind).count();

    assert_eq!(count(IssueKind::NestedLoops), 1, "{:#?}", result.issues);
    assert_eq!(count(IssueKind::StringConcatenation), 1);
    assert_eq!(count(IssueKind::MemoryAllocation), 3);
    assert_eq!(count(IssueKind::SliceGrowth), 1);
    assert_eq!(count(IssueKind::CyclomaticComplexity), 1);
    assert_eq!(count(IssueKind::FunctionLength), 1);
    // The two-package ring is within the default cycle budget of five.
    assert_eq!(count(IssueKind::ImportCycle), 0);
    assert_eq!(count(IssueKind::InefficientDataStructure), 0);
}

#[test]
fn test_aggregation_invariant() {
    let result = run_analysis();

    assert_eq!(result.total_issues, result.issues.len());
    let by_severity: usize = result.issues_by_severity.values().sum();
    assert_eq!(result.total_issues, by_severity);
    assert!(!result.analysis_duration.is_empty());
}

#[test]
fn test_findings_carry_locations_and_functions() {
    let result = run_analysis();

    let nested = result
        .issues
        .iter()
        .find(|i| i.kind == IssueKind::NestedLoops)
        .expect("nested loop finding");
    assert!(nested.file.ends_with("hotloops.go"));
    assert_eq!(nested.function.as_deref(), Some("BuildReport"));
    assert!(nested.line > 0);
    assert!(nested.column > 0);
    assert!(!nested.suggestion.is_empty());

    let concat = result
        .issues
        .iter()
        .find(|i| i.kind == IssueKind::StringConcatenation)
        .expect("string concat finding");
    assert!(concat.complexity.contains("O(n²)"));

    let length = result
        .issues
        .iter()
        .find(|i| i.kind == IssueKind::FunctionLength)
        .expect("function length finding");
    assert_eq!(length.function.as_deref(), Some("Accumulate"));
    assert_eq!(length.severity, Severity::Medium);
}

#[test]
fn test_findings_follow_detector_order_not_severity() {
    let result = run_analysis();

    // hotloops.go runs nested-loops before string-concat before the
    // memory detectors; the High allocation finding must not jump ahead.
    let kinds: Vec<IssueKind> = result
        .issues
        .iter()
        .filter(|i| i.file.ends_with("hotloops.go"))
        .map(|i| i.kind)
        .collect();
    assert_eq!(kinds[0], IssueKind::NestedLoops);
    assert_eq!(kinds[1], IssueKind::StringConcatenation);
    assert!(kinds[2..].contains(&IssueKind::MemoryAllocation));
}

#[test]
fn test_score_drops_with_findings() {
    let result = run_analysis();
    assert!(result.total_issues > 0);
    assert!(result.performance_score < 50);

    // A clean file alone scores a perfect 100.
    let clean = testdata_path().join("clean.go");
    let runner = Runner::new(Config::default());
    let clean_result = runner.analyze_files(&[clean]);
    assert_eq!(clean_result.total_issues, 0);
    assert_eq!(clean_result.performance_score, 100);
}

#[test]
fn test_import_ring_reported_when_budget_tightened() {
    let mut config = Config::default();
    config.rules.quality.import_cycles.max_cycle_length = 1;

    let ring = testdata_path().join("ring");
    let files = slowcheck::cli::collect_go_files(&ring, &config).expect("ring fixtures");
    assert_eq!(files.len(), 2);

    let runner = Runner::new(config);
    let result = runner.analyze_files(&files);

    let cycle_issues: Vec<_> = result
        .issues
        .iter()
        .filter(|i| i.kind == IssueKind::ImportCycle)
        .collect();

    // One finding per participant package, severity from the ratio rule
    // (2 edges over a budget of 1).
    assert_eq!(cycle_issues.len(), 2);
    for issue in &cycle_issues {
        assert_eq!(issue.severity, Severity::Critical);
        assert!(issue.message.contains("import cycle detected"));
        assert!(issue.function.is_none());
    }
    let files_with_findings: Vec<&str> =
        cycle_issues.iter().map(|i| i.file.as_str()).collect();
    assert!(files_with_findings.iter().any(|f| f.ends_with("a.go")));
    assert!(files_with_findings.iter().any(|f| f.ends_with("b.go")));
}

#[test]
fn test_disabled_detectors_produce_nothing() {
    let mut config = Config::default();
    config.rules.performance.enabled = false;
    config.rules.memory.enabled = false;

    let runner = Runner::new(config);
    let result = runner.analyze_files(&collect_fixture_files());

    assert!(result
        .issues
        .iter()
        .all(|i| !matches!(
            i.kind,
            IssueKind::NestedLoops
                | IssueKind::StringConcatenation
                | IssueKind::InefficientDataStructure
                | IssueKind::MemoryAllocation
                | IssueKind::SliceGrowth
        )));
    // Complexity and length findings remain.
    assert!(result
        .issues
        .iter()
        .any(|i| i.kind == IssueKind::CyclomaticComplexity));
}
