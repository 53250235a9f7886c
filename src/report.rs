//! Output rendering for analysis results.
//!
//! Two formats: human console output (minimal by default, detailed with
//! verbose) and JSON, which serializes the full AnalysisResult field for
//! field so nothing is lost between the engine and downstream tooling.

use colored::Colorize;

use crate::config::Config;
use crate::detect::{AnalysisResult, Issue, Severity};
use crate::score::{self, Rating};

/// Render a result in the configured output format.
pub fn render(result: &AnalysisResult, config: &Config) -> anyhow::Result<String> {
    match config.output.format.as_str() {
        "json" => render_json(result),
        _ => Ok(render_console(result, config)),
    }
}

/// Lossless JSON rendering of the full result.
pub fn render_json(result: &AnalysisResult) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Human-readable console report.
pub fn render_console(result: &AnalysisResult, config: &Config) -> String {
    if config.output.verbose {
        render_verbose(result, config)
    } else {
        render_minimal(result, config)
    }
}

fn render_minimal(result: &AnalysisResult, config: &Config) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{} v{}\n\n",
        "slowcheck".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    ));
    out.push_str(&format!("  Analyzed: {} Go files\n", result.files.len()));
    if !result.skipped_files.is_empty() {
        out.push_str(&format!(
            "  Skipped:  {} files failed to parse\n",
            result.skipped_files.len()
        ));
    }
    out.push_str(&format!("  Score:    {}\n\n", score_line(result, config)));

    out.push_str(&format!("  Issues: {} total\n", result.total_issues));
    out.push_str(&format!("    {}\n", severity_counts_line(result)));

    let high_priority: Vec<&Issue> = result
        .issues
        .iter()
        .filter(|i| i.severity >= Severity::High)
        .collect();
    if !high_priority.is_empty() {
        out.push_str("\n  Critical & high priority:\n");
        let mut sorted = high_priority;
        sorted.sort_by(|a, b| b.severity.cmp(&a.severity));
        for issue in sorted {
            out.push_str(&format!(
                "    {} {:<27} {} {}\n",
                severity_tag(issue.severity),
                issue.kind.as_str().dimmed(),
                location(issue).blue(),
                short_description(issue)
            ));
            out.push_str(&format!("           {}\n", issue.message));
        }
    }

    out.push_str(&format!(
        "\n  Completed in {} {}\n",
        result.analysis_duration,
        "(run with --verbose for details and suggestions)".dimmed()
    ));
    out
}

fn render_verbose(result: &AnalysisResult, config: &Config) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "{} v{} analysis report\n",
        "slowcheck".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    ));
    out.push_str(&format!("{}\n\n", "=".repeat(40).dimmed()));

    out.push_str(&format!(
        "  Enabled categories: {}\n",
        config.analysis.enabled_categories.join(", ")
    ));
    out.push_str(&format!("  Files analyzed:     {}\n", result.files.len()));
    for skipped in &result.skipped_files {
        out.push_str(&format!(
            "  {} {}\n",
            "Skipped (parse error):".yellow(),
            skipped
        ));
    }
    out.push_str(&format!("  Issues found:       {}\n", result.total_issues));
    out.push_str(&format!("  Score:              {}\n\n", score_line(result, config)));

    if result.issues.is_empty() {
        out.push_str(&format!("  {}\n", "No performance issues detected.".green()));
    } else {
        out.push_str(&format!("  Issues by severity: {}\n\n", severity_counts_line(result)));

        let mut sorted: Vec<&Issue> = result.issues.iter().collect();
        sorted.sort_by(|a, b| b.severity.cmp(&a.severity));

        for (index, issue) in sorted.iter().enumerate() {
            out.push_str(&format!(
                "  {}. {} {} {}\n",
                index + 1,
                severity_tag(issue.severity),
                issue.kind.as_str().bold(),
                location(issue).blue()
            ));
            if let Some(function) = &issue.function {
                if !function.is_empty() {
                    out.push_str(&format!("     in {}()\n", function));
                }
            }
            out.push_str(&format!("     {}\n", issue.message));
            if !issue.complexity.is_empty() {
                out.push_str(&format!("     {}\n", issue.complexity.dimmed()));
            }
            if config.output.show_suggestions {
                for line in issue.suggestion.lines() {
                    out.push_str(&format!("     {}\n", line.dimmed()));
                }
            }
            out.push('\n');
        }
    }

    out.push_str(&format!("  Completed in {}\n", result.analysis_duration));
    out
}

/// One-line summary for watch mode.
pub fn render_compact(result: &AnalysisResult, config: &Config) -> String {
    let mut out = format!(
        "score {} | issues {}",
        score_line(result, config),
        result.total_issues
    );

    let parts: Vec<String> = Severity::all_desc()
        .iter()
        .filter_map(|s| {
            let count = result.count(*s);
            (count > 0).then(|| format!("{} {}", count, s))
        })
        .collect();
    if !parts.is_empty() {
        out.push_str(&format!(" ({})", parts.join(", ")));
    }
    out.push('\n');
    out
}

fn score_line(result: &AnalysisResult, config: &Config) -> String {
    let thresholds = &config.analysis.score_thresholds;
    let rating = score::rating(
        result.performance_score,
        thresholds.excellent,
        thresholds.good,
        thresholds.fair,
    );
    let text = format!("{}/100", result.performance_score);
    match rating {
        Rating::Excellent => format!("{}", text.green().bold()),
        Rating::Good => format!("{}", text.green()),
        Rating::Fair => format!("{}", text.yellow()),
        Rating::Poor => format!("{}", text.red()),
    }
}

fn severity_counts_line(result: &AnalysisResult) -> String {
    Severity::all_desc()
        .iter()
        .map(|s| format!("{} {}", severity_tag(*s), result.count(*s)))
        .collect::<Vec<_>>()
        .join("   ")
}

fn severity_tag(severity: Severity) -> String {
    match severity {
        Severity::Critical => format!("{}", "CRITICAL".red().bold()),
        Severity::High => format!("{}", "HIGH".red()),
        Severity::Medium => format!("{}", "MEDIUM".yellow()),
        Severity::Low => format!("{}", "LOW".blue()),
    }
}

fn location(issue: &Issue) -> String {
    let file = std::path::Path::new(&issue.file)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| issue.file.clone());
    format!("{}:{}", file, issue.line)
}

fn short_description(issue: &Issue) -> String {
    match &issue.function {
        Some(function) if !function.is_empty() => {
            if issue.complexity.is_empty() {
                format!("{}()", function)
            } else {
                format!("{}() ({})", function, issue.complexity)
            }
        }
        _ => issue.complexity.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::IssueKind;

    fn sample_result() -> AnalysisResult {
        let mut result = AnalysisResult::new();
        result.files = vec!["main.go".to_string()];
        result.add_issue(Issue {
            kind: IssueKind::NestedLoops,
            severity: Severity::High,
            file: "main.go".to_string(),
            line: 12,
            column: 5,
            function: Some("process".to_string()),
            message: "nested loop at depth 3 in function 'process'".to_string(),
            suggestion: "restructure".to_string(),
            complexity: "O(n³)".to_string(),
            code_snippet: "main.go:12:5".to_string(),
        });
        result.analysis_duration = "1.2ms".to_string();
        result.recompute_score();
        result
    }

    #[test]
    fn test_json_round_trip() {
        colored::control::set_override(false);
        let result = sample_result();
        let json = render_json(&result).unwrap();

        let parsed: AnalysisResult = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.total_issues, result.total_issues);
        assert_eq!(parsed.performance_score, result.performance_score);
        assert_eq!(parsed.issues.len(), 1);
        assert_eq!(parsed.issues[0].kind, IssueKind::NestedLoops);
        assert_eq!(parsed.issues[0].complexity, "O(n³)");

        // Wire field names stay stable.
        assert!(json.contains("\"files_analyzed\""));
        assert!(json.contains("\"performance_score\""));
        assert!(json.contains("\"nested_loops\""));
        assert!(json.contains("\"HIGH\""));
    }

    #[test]
    fn test_minimal_console_mentions_high_priority() {
        colored::control::set_override(false);
        let result = sample_result();
        let out = render_console(&result, &Config::default());

        assert!(out.contains("1 Go files"));
        assert!(out.contains("HIGH"));
        assert!(out.contains("main.go:12"));
        assert!(out.contains("nested loop at depth 3"));
    }

    #[test]
    fn test_verbose_includes_suggestions_when_enabled() {
        colored::control::set_override(false);
        let result = sample_result();

        let mut config = Config::default();
        config.output.verbose = true;
        config.output.show_suggestions = true;

        let out = render_console(&result, &config);
        assert!(out.contains("restructure"));
        assert!(out.contains("in process()"));
    }

    #[test]
    fn test_clean_result_celebrates() {
        colored::control::set_override(false);
        let mut result = AnalysisResult::new();
        result.files = vec!["main.go".to_string()];
        result.analysis_duration = "0.4ms".to_string();

        let mut config = Config::default();
        config.output.verbose = true;

        let out = render_console(&result, &config);
        assert!(out.contains("No performance issues detected"));
        assert!(out.contains("100/100"));
    }

    #[test]
    fn test_compact_line() {
        colored::control::set_override(false);
        let result = sample_result();
        let out = render_compact(&result, &Config::default());
        assert!(out.contains("issues 1"));
        assert!(out.contains("1 HIGH"));
    }
}
