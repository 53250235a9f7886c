//! Pattern detectors and the framework that runs them.

mod complexity;
mod data_structure;
mod function_length;
mod import_cycle;
mod memory_alloc;
mod nested_loops;
mod runner;
mod slice_growth;
mod stdlib;
mod string_concat;
mod types;

pub use complexity::{cyclomatic_complexity, ComplexityDetector};
pub use data_structure::DataStructureDetector;
pub use function_length::FunctionLengthDetector;
pub use import_cycle::ImportCycleDetector;
pub use memory_alloc::MemoryAllocDetector;
pub use nested_loops::NestedLoopDetector;
pub use runner::Runner;
pub use slice_growth::SliceGrowthDetector;
pub use stdlib::is_stdlib_import;
pub use string_concat::StringConcatDetector;
pub use types::{AnalysisResult, Issue, IssueKind, Severity};

use crate::analysis::AnalysisContext;
use crate::config::Config;
use crate::syntax::ast::SourceFile;

/// One pattern analysis.
///
/// `detect` runs once per file against the shared read-only context.
/// `finish` runs once after every file has been visited; detectors that
/// accumulate whole-set state (the import cycle grapher) report there.
///
/// Detectors must tolerate any tree shape: unmodeled constructs are
/// simply no match, never an error.
pub trait Detector {
    fn name(&self) -> &'static str;
    fn detect(&mut self, file: &SourceFile, ctx: &AnalysisContext) -> Vec<Issue>;
    fn finish(&mut self) -> Vec<Issue> {
        Vec::new()
    }
}

/// Construct the enabled detectors for this configuration.
///
/// Disabled detectors are not instantiated at all; their absence is
/// decided here, not re-checked on every file.
pub fn build_detectors(config: &Config) -> Vec<Box<dyn Detector>> {
    let mut detectors: Vec<Box<dyn Detector>> = Vec::new();

    if config.is_rule_enabled(IssueKind::NestedLoops) {
        detectors.push(Box::new(NestedLoopDetector::new(
            &config.rules.performance.nested_loops,
        )));
    }
    if config.is_rule_enabled(IssueKind::StringConcatenation) {
        detectors.push(Box::new(StringConcatDetector::new(
            &config.rules.performance.string_concat,
        )));
    }
    if config.is_rule_enabled(IssueKind::CyclomaticComplexity) {
        detectors.push(Box::new(ComplexityDetector::new(
            &config.rules.complexity.cyclomatic_complexity,
        )));
    }
    if config.is_rule_enabled(IssueKind::MemoryAllocation) {
        detectors.push(Box::new(MemoryAllocDetector::new(
            &config.rules.memory.allocation,
        )));
    }
    if config.is_rule_enabled(IssueKind::SliceGrowth) {
        detectors.push(Box::new(SliceGrowthDetector::new(
            &config.rules.memory.slice_growth,
        )));
    }
    if config.is_rule_enabled(IssueKind::InefficientDataStructure) {
        detectors.push(Box::new(DataStructureDetector::new(
            &config.rules.performance.data_structure,
        )));
    }
    if config.is_rule_enabled(IssueKind::FunctionLength) {
        detectors.push(Box::new(FunctionLengthDetector::new(
            &config.rules.complexity.function_length,
        )));
    }
    if config.is_rule_enabled(IssueKind::ImportCycle) {
        detectors.push(Box::new(ImportCycleDetector::new(
            &config.rules.quality.import_cycles,
        )));
    }

    detectors
}
