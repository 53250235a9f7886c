//! Slowcheck - Go performance analyzer.
//!
//! Slowcheck statically analyzes Go source files and reports performance,
//! complexity, and structural-quality issues with actionable suggestions
//! and a 0-100 health score.
//!
//! # Architecture
//!
//! Analysis runs bottom-up over tree-sitter parse trees:
//!
//! - `syntax`: Go parsing and the typed node model detectors match on
//! - `analysis`: shared cross-file context (call index, loop facts, sizes)
//! - `detect`: the detector framework and the eight pattern detectors
//! - `score`: severity- and category-weighted 0-100 score
//! - `report`: console and JSON rendering
//! - `config`: YAML configuration with validation
//! - `watch`: debounced re-analysis on file changes
//! - `cli`: the command-line surface
//!
//! # Adding a Detector
//!
//! Implement `detect::Detector` over the typed syntax model and register
//! it in `detect::build_detectors`. Detectors are stateless across files
//! and read the shared `AnalysisContext` built once per run.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod detect;
pub mod report;
pub mod score;
pub mod syntax;
pub mod watch;

pub use analysis::{AnalysisContext, Frequency, LoopBound, LoopFacts, SizeInfo};
pub use config::{Config, ConfigError};
pub use detect::{AnalysisResult, Detector, Issue, IssueKind, Runner, Severity};
pub use syntax::{GoParser, SourceFile};
