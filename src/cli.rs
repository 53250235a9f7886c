//! Command-line interface.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use colored::Colorize;
use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;

use crate::config::{self, Config};
use crate::detect::Runner;
use crate::report;
use crate::watch::FileWatcher;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Default file name for --generate-config.
const GENERATED_CONFIG_PATH: &str = ".slowcheck.yml";

/// Directories never worth descending into.
const SKIP_DIRS: &[&str] = &["vendor", ".git", "node_modules"];

/// Go performance analyzer - detects slow patterns, complexity hotspots,
/// and structural issues, with actionable suggestions and a 0-100 score.
#[derive(Parser)]
#[command(name = "slowcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Files or directories to analyze (default: current directory)
    pub paths: Vec<PathBuf>,

    /// Output format: console or json
    #[arg(short, long)]
    pub format: Option<String>,

    /// Path to configuration file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Watch mode: re-analyze when Go files change
    #[arg(short, long)]
    pub watch: bool,

    /// Detailed output with suggestions
    #[arg(short, long)]
    pub verbose: bool,

    /// Write a sample configuration file and exit
    #[arg(long)]
    pub generate_config: bool,
}

/// Entry point for the binary. Returns the process exit code.
pub fn run(cli: &Cli) -> anyhow::Result<i32> {
    if cli.generate_config {
        return generate_config_file();
    }

    let mut config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {}", err);
            return Ok(EXIT_ERROR);
        }
    };

    // Flag overrides, re-validated afterwards.
    if let Some(format) = &cli.format {
        config.output.format = format.clone();
    }
    if cli.verbose {
        config.output.verbose = true;
        config.output.show_suggestions = true;
    }
    if let Err(err) = config.validate() {
        eprintln!("Error: {}", err);
        return Ok(EXIT_ERROR);
    }

    if !config.output.colors {
        colored::control::set_override(false);
    }

    let default_paths = vec![PathBuf::from(".")];
    let requested = if cli.paths.is_empty() {
        &default_paths
    } else {
        &cli.paths
    };
    let roots = resolve_roots(requested);
    if roots.is_empty() {
        eprintln!("Error: no valid paths to analyze");
        return Ok(EXIT_ERROR);
    }

    if cli.watch {
        run_watch(config, roots)
    } else {
        run_once(&config, &roots)
    }
}

fn run_once(config: &Config, roots: &[PathBuf]) -> anyhow::Result<i32> {
    let files = collect_all(roots, config)?;
    if files.is_empty() {
        eprintln!("Warning: no Go files found to analyze");
        return Ok(EXIT_SUCCESS);
    }

    let runner = Runner::new(config.clone());
    let result = runner.analyze_files(&files);
    let rendered = report::render(&result, config)?;

    match &config.output.output_file {
        Some(path) => {
            let path = Path::new(path);
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(path, &rendered)?;
            eprintln!("report saved to {}", path.display());
        }
        None => print!("{}", rendered),
    }

    if result.performance_score < config.analysis.score_thresholds.fair {
        Ok(EXIT_FAILED)
    } else {
        Ok(EXIT_SUCCESS)
    }
}

fn run_watch(config: Config, roots: Vec<PathBuf>) -> anyhow::Result<i32> {
    println!(
        "{}",
        "watching for Go file changes (Ctrl-C to stop)".cyan()
    );

    // Full analysis up front, then incremental re-runs per change batch.
    let files = collect_all(&roots, &config)?;
    let runner = Runner::new(config.clone());
    if files.is_empty() {
        println!("{}", "no Go files found yet".yellow());
    } else {
        let result = runner.analyze_files(&files);
        print!("{}", report::render(&result, &config)?);
    }

    let handler_config = config.clone();
    let handler = move |changed: Vec<PathBuf>| -> anyhow::Result<()> {
        let existing: Vec<PathBuf> = changed.into_iter().filter(|p| p.is_file()).collect();
        if existing.is_empty() {
            return Ok(());
        }

        println!("{}", format!("{} file(s) changed", existing.len()).cyan());
        let result = runner.analyze_files(&existing);
        if handler_config.output.format == "json" {
            println!("{}", report::render_json(&result)?);
        } else {
            print!("{}", report::render_compact(&result, &handler_config));
        }
        Ok(())
    };

    let watcher = FileWatcher::watch(&roots, config.files.include_tests, handler)?;
    if config.output.verbose {
        for path in watcher.watched_paths() {
            println!("  watching {}", path.display());
        }
    }

    // Block until interrupted, then tear the watch down on the way out.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async {
        let _ = tokio::signal::ctrl_c().await;
    });

    println!("\n{}", "stopping watch mode".yellow());
    watcher.close();
    Ok(EXIT_SUCCESS)
}

fn generate_config_file() -> anyhow::Result<i32> {
    let path = Path::new(GENERATED_CONFIG_PATH);
    if path.exists() {
        eprintln!("Error: {} already exists", path.display());
        return Ok(EXIT_ERROR);
    }
    config::generate(path)?;
    println!("generated sample configuration: {}", path.display());
    println!("run 'slowcheck --config {} .' to use it", path.display());
    Ok(EXIT_SUCCESS)
}

/// Canonicalize roots, warning about (and dropping) invalid ones.
fn resolve_roots(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut roots = Vec::new();
    for path in paths {
        match path.canonicalize() {
            Ok(resolved) => roots.push(resolved),
            Err(err) => eprintln!("Warning: skipping {}: {}", path.display(), err),
        }
    }
    roots
}

fn collect_all(roots: &[PathBuf], config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for root in roots {
        files.extend(collect_go_files(root, config)?);
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Recursively collect analyzable Go files under `root`.
pub fn collect_go_files(root: &Path, config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(if is_analyzable_file(root, config) {
            vec![root.to_path_buf()]
        } else {
            Vec::new()
        });
    }

    let exclude = build_globset(&config.files.exclude)?;
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            !name.starts_with('.') && !SKIP_DIRS.contains(&name.as_ref())
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();

        let relative = path.strip_prefix(root).unwrap_or(path);
        if exclude.is_match(relative) {
            continue;
        }
        if is_analyzable_file(path, config) {
            files.push(path.to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

fn is_analyzable_file(path: &Path, config: &Config) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if !name.ends_with(".go") || name.starts_with('.') {
        return false;
    }
    if name.ends_with("_test.go") && !config.files.include_tests {
        return false;
    }
    if config.files.max_file_size_kb > 0 {
        if let Ok(meta) = path.metadata() {
            if meta.len() > config.files.max_file_size_kb * 1024 {
                return false;
            }
        }
    }
    true
}

fn build_globset(patterns: &[String]) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}
