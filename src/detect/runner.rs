//! The analysis run: parse, build context, detect, score.
//!
//! A run is a pure function of (file set, configuration): parse every
//! requested file (failures are excluded and recorded), build the shared
//! context in one pass, run each enabled detector over each file in
//! sequence, give accumulating detectors their finish pass, then compute
//! the score. No state survives between runs.

use std::path::PathBuf;
use std::time::Instant;

use rayon::prelude::*;

use crate::analysis::AnalysisContext;
use crate::config::Config;
use crate::syntax::{GoParser, SourceFile};

use super::{build_detectors, AnalysisResult};

pub struct Runner {
    config: Config,
}

impl Runner {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Analyze the given files and fold everything into one result.
    pub fn analyze_files(&self, paths: &[PathBuf]) -> AnalysisResult {
        let start = Instant::now();
        let mut result = AnalysisResult::new();

        let (files, skipped) = self.parse_all(paths);
        result.files = files.iter().map(|f| f.path.clone()).collect();
        result.skipped_files = skipped;

        let ctx = AnalysisContext::build(&files);
        let mut detectors = build_detectors(&self.config);

        for file in &files {
            for detector in detectors.iter_mut() {
                for issue in detector.detect(file, &ctx) {
                    result.add_issue(issue);
                }
            }
        }

        // Whole-set detectors (the import cycle grapher) report once all
        // files have been visited.
        for detector in detectors.iter_mut() {
            for issue in detector.finish() {
                result.add_issue(issue);
            }
        }

        result.analysis_duration = format!("{:?}", start.elapsed());
        result.recompute_score();
        result
    }

    /// Parse every path, splitting into lowered files and skipped paths.
    /// Parse order does not affect results, so the parse phase may fan out
    /// across workers; output keeps the input order either way.
    fn parse_all(&self, paths: &[PathBuf]) -> (Vec<SourceFile>, Vec<String>) {
        let parser = GoParser::new();

        let outcomes: Vec<(String, Option<SourceFile>)> = if self.config.analysis.max_workers > 1 {
            paths
                .par_iter()
                .map(|path| {
                    (
                        path.to_string_lossy().to_string(),
                        parser.parse_file(path).ok(),
                    )
                })
                .collect()
        } else {
            paths
                .iter()
                .map(|path| {
                    (
                        path.to_string_lossy().to_string(),
                        parser.parse_file(path).ok(),
                    )
                })
                .collect()
        };

        let mut files = Vec::new();
        let mut skipped = Vec::new();
        for (path, outcome) in outcomes {
            match outcome {
                Some(file) => files.push(file),
                None => skipped.push(path),
            }
        }
        (files, skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_clean_file_scores_100() {
        let temp = TempDir::new().unwrap();
        let path = write_file(
            &temp,
            "main.go",
            r#"
package main

func add(a int, b int) int {
    return a + b
}
"#,
        );

        let runner = Runner::new(Config::default());
        let result = runner.analyze_files(&[path]);

        assert_eq!(result.files.len(), 1);
        assert_eq!(result.total_issues, 0);
        assert_eq!(result.performance_score, 100);
        assert!(result.skipped_files.is_empty());
    }

    #[test]
    fn test_parse_failure_is_skipped_not_fatal() {
        let temp = TempDir::new().unwrap();
        let good = write_file(&temp, "good.go", "package main\n\nfunc ok() {}\n");
        let bad = write_file(&temp, "bad.go", "package main\n\nfunc broken( {\n");

        let runner = Runner::new(Config::default());
        let result = runner.analyze_files(&[good, bad.clone()]);

        assert_eq!(result.files.len(), 1);
        assert_eq!(result.skipped_files.len(), 1);
        assert!(result.skipped_files[0].ends_with("bad.go"));
    }

    #[test]
    fn test_result_invariant_holds() {
        let temp = TempDir::new().unwrap();
        let path = write_file(
            &temp,
            "slow.go",
            r#"
package main

func slow(items []string) string {
    result := ""
    for _, a := range items {
        for _, b := range items {
            result += a + b
        }
    }
    return result
}
"#,
        );

        let runner = Runner::new(Config::default());
        let result = runner.analyze_files(&[path]);

        assert!(result.total_issues > 0);
        assert_eq!(result.total_issues, result.issues.len());
        let by_severity: usize = result.issues_by_severity.values().sum();
        assert_eq!(result.total_issues, by_severity);
        assert!(result.performance_score < 100);
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let temp = TempDir::new().unwrap();
        let mut paths = Vec::new();
        for i in 0..4 {
            paths.push(write_file(
                &temp,
                &format!("f{}.go", i),
                &format!(
                    "package p{}\n\nfunc work{}(items []int) int {{\n    total := 0\n    for _, v := range items {{\n        total = total + v\n    }}\n    return total\n}}\n",
                    i, i
                ),
            ));
        }

        let mut sequential = Config::default();
        sequential.analysis.max_workers = 1;
        let seq = Runner::new(sequential).analyze_files(&paths);

        let parallel = Config::default();
        let par = Runner::new(parallel).analyze_files(&paths);

        assert_eq!(seq.files, par.files);
        assert_eq!(seq.total_issues, par.total_issues);
        assert_eq!(seq.performance_score, par.performance_score);
    }

    #[test]
    fn test_runs_are_independent() {
        let temp = TempDir::new().unwrap();
        let path = write_file(
            &temp,
            "main.go",
            r#"
package main

func join(items []string) string {
    result := ""
    for _, item := range items {
        result += item
    }
    return result
}
"#,
        );

        let runner = Runner::new(Config::default());
        let first = runner.analyze_files(std::slice::from_ref(&path));
        let second = runner.analyze_files(std::slice::from_ref(&path));

        assert_eq!(first.total_issues, second.total_issues);
        assert_eq!(first.performance_score, second.performance_score);
    }
}
