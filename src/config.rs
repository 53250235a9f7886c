//! Configuration loading, defaults, and validation.
//!
//! Configuration is YAML, discovered from conventional file names or passed
//! explicitly. Every option has a documented default; a config file only
//! needs to mention what it changes. Validation runs before any analysis
//! and rejects inconsistent settings (thresholds out of order, unknown
//! output formats) with a fatal error.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::detect::IssueKind;

/// File names searched, in order, when no config path is given.
const CONFIG_FILE_NAMES: &[&str] = &[
    ".slowcheck.yml",
    ".slowcheck.yaml",
    "slowcheck.yml",
    "slowcheck.yaml",
];

/// Fatal configuration problems. Analysis never starts when one of these
/// is returned.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    pub analysis: AnalysisSettings,
    pub output: OutputSettings,
    pub rules: Rules,
    pub files: FilesSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    pub score_thresholds: ScoreThresholds,
    /// Detector categories that may run at all.
    pub enabled_categories: Vec<String>,
    /// Worker count for the parallel parse phase. Tuning knob only.
    pub max_workers: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreThresholds {
    pub excellent: i32,
    pub good: i32,
    pub fair: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// "console" or "json".
    pub format: String,
    pub colors: bool,
    pub verbose: bool,
    pub show_suggestions: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Rules {
    pub complexity: ComplexityRules,
    pub performance: PerformanceRules,
    pub quality: QualityRules,
    pub memory: MemoryRules,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ComplexityRules {
    pub enabled: bool,
    pub cyclomatic_complexity: TierThresholds,
    pub function_length: TierThresholds,
}

/// Three-tier escalation thresholds shared by the complexity and
/// function-length rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TierThresholds {
    pub enabled: bool,
    pub medium_threshold: i32,
    pub high_threshold: i32,
    pub critical_threshold: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceRules {
    pub enabled: bool,
    pub nested_loops: NestedLoopRule,
    pub string_concat: StringConcatRule,
    pub data_structure: DataStructureRule,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NestedLoopRule {
    pub enabled: bool,
    /// Loops nested deeper than this are flagged.
    pub max_depth: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StringConcatRule {
    pub enabled: bool,
    /// Identifiers treated as strings, in addition to the `str`/`Str`
    /// prefix and suffix heuristics.
    pub string_var_names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataStructureRule {
    pub enabled: bool,
    /// Minimum loop nesting depth before a linear search is reported.
    pub min_search_depth: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityRules {
    pub enabled: bool,
    pub import_cycles: ImportCycleRule,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportCycleRule {
    pub enabled: bool,
    /// Cycles with at most this many edges are accepted as normal.
    pub max_cycle_length: usize,
    pub ignore_test_packages: bool,
    pub ignore_vendor: bool,
    pub exclude_packages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryRules {
    pub enabled: bool,
    pub allocation: AllocationRule,
    pub slice_growth: SliceGrowthRule,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationRule {
    pub enabled: bool,
    pub detect_in_loops: bool,
    pub require_capacity_hints: bool,
    /// Minimum loop nesting depth before an unpreallocated append is
    /// reported.
    pub min_loop_depth: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SliceGrowthRule {
    pub enabled: bool,
    pub detect_append_in_loops: bool,
    /// Append count at which a growing slice is reported.
    pub min_append_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesSettings {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub include_tests: bool,
    /// Files larger than this are skipped. Zero disables the limit.
    pub max_file_size_kb: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            project_name: None,
            analysis: AnalysisSettings::default(),
            output: OutputSettings::default(),
            rules: Rules::default(),
            files: FilesSettings::default(),
        }
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            score_thresholds: ScoreThresholds::default(),
            enabled_categories: vec![
                "performance".to_string(),
                "complexity".to_string(),
                "memory".to_string(),
                "quality".to_string(),
            ],
            max_workers: 4,
        }
    }
}

impl Default for ScoreThresholds {
    fn default() -> Self {
        Self {
            excellent: 90,
            good: 75,
            fair: 50,
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: "console".to_string(),
            colors: true,
            verbose: false,
            show_suggestions: false,
            output_file: None,
        }
    }
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            complexity: ComplexityRules::default(),
            performance: PerformanceRules::default(),
            quality: QualityRules::default(),
            memory: MemoryRules::default(),
        }
    }
}

impl Default for ComplexityRules {
    fn default() -> Self {
        Self {
            enabled: true,
            cyclomatic_complexity: TierThresholds {
                enabled: true,
                medium_threshold: 10,
                high_threshold: 15,
                critical_threshold: 25,
            },
            function_length: TierThresholds {
                enabled: true,
                medium_threshold: 50,
                high_threshold: 100,
                critical_threshold: 200,
            },
        }
    }
}

impl Default for TierThresholds {
    fn default() -> Self {
        Self {
            enabled: true,
            medium_threshold: 10,
            high_threshold: 15,
            critical_threshold: 25,
        }
    }
}

impl Default for PerformanceRules {
    fn default() -> Self {
        Self {
            enabled: true,
            nested_loops: NestedLoopRule::default(),
            string_concat: StringConcatRule::default(),
            data_structure: DataStructureRule::default(),
        }
    }
}

impl Default for NestedLoopRule {
    fn default() -> Self {
        Self {
            enabled: true,
            max_depth: 1,
        }
    }
}

impl Default for StringConcatRule {
    fn default() -> Self {
        Self {
            enabled: true,
            string_var_names: vec![
                "str".to_string(),
                "result".to_string(),
                "output".to_string(),
                "text".to_string(),
                "content".to_string(),
                "message".to_string(),
                "data".to_string(),
            ],
        }
    }
}

impl Default for DataStructureRule {
    fn default() -> Self {
        Self {
            enabled: true,
            min_search_depth: 2,
        }
    }
}

impl Default for QualityRules {
    fn default() -> Self {
        Self {
            enabled: true,
            import_cycles: ImportCycleRule::default(),
        }
    }
}

impl Default for ImportCycleRule {
    fn default() -> Self {
        Self {
            enabled: true,
            max_cycle_length: 5,
            ignore_test_packages: true,
            ignore_vendor: true,
            exclude_packages: Vec::new(),
        }
    }
}

impl Default for MemoryRules {
    fn default() -> Self {
        Self {
            enabled: true,
            allocation: AllocationRule::default(),
            slice_growth: SliceGrowthRule::default(),
        }
    }
}

impl Default for AllocationRule {
    fn default() -> Self {
        Self {
            enabled: true,
            detect_in_loops: true,
            require_capacity_hints: true,
            min_loop_depth: 2,
        }
    }
}

impl Default for SliceGrowthRule {
    fn default() -> Self {
        Self {
            enabled: true,
            detect_append_in_loops: true,
            min_append_count: 3,
        }
    }
}

impl Default for FilesSettings {
    fn default() -> Self {
        Self {
            include: vec!["**/*.go".to_string()],
            exclude: vec![
                "vendor/**".to_string(),
                ".git/**".to_string(),
                "node_modules/**".to_string(),
            ],
            include_tests: false,
            max_file_size_kb: 1024,
        }
    }
}

impl Config {
    /// Load from an explicit path, or discover a config file, or fall back
    /// to defaults. The result is always validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => find_config_file(),
        };

        let config = match path {
            None => Config::default(),
            Some(path) => {
                let display = path.display().to_string();
                let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
                    path: display.clone(),
                    source,
                })?;
                serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
                    path: display,
                    source,
                })?
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for internal consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output.format != "console" && self.output.format != "json" {
            return Err(ConfigError::Invalid(format!(
                "unknown output format {:?} (valid: console, json)",
                self.output.format
            )));
        }

        if self.analysis.max_workers < 1 {
            return Err(ConfigError::Invalid(
                "max_workers must be at least 1".to_string(),
            ));
        }

        let st = &self.analysis.score_thresholds;
        if st.excellent < st.good || st.good < st.fair {
            return Err(ConfigError::Invalid(
                "score thresholds must be in descending order".to_string(),
            ));
        }

        validate_tiers(
            "cyclomatic complexity",
            &self.rules.complexity.cyclomatic_complexity,
        )?;
        validate_tiers("function length", &self.rules.complexity.function_length)?;

        if self.rules.performance.nested_loops.max_depth < 1 {
            return Err(ConfigError::Invalid(
                "nested_loops.max_depth must be at least 1".to_string(),
            ));
        }
        if self.rules.memory.slice_growth.min_append_count < 1 {
            return Err(ConfigError::Invalid(
                "slice_growth.min_append_count must be at least 1".to_string(),
            ));
        }
        if self.rules.quality.import_cycles.max_cycle_length < 1 {
            return Err(ConfigError::Invalid(
                "import_cycles.max_cycle_length must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether the detector for `kind` should be constructed at all.
    pub fn is_rule_enabled(&self, kind: IssueKind) -> bool {
        match kind {
            IssueKind::NestedLoops => {
                self.category_enabled("performance")
                    && self.rules.performance.enabled
                    && self.rules.performance.nested_loops.enabled
            }
            IssueKind::StringConcatenation => {
                self.category_enabled("performance")
                    && self.rules.performance.enabled
                    && self.rules.performance.string_concat.enabled
            }
            IssueKind::InefficientDataStructure => {
                self.category_enabled("performance")
                    && self.rules.performance.enabled
                    && self.rules.performance.data_structure.enabled
            }
            IssueKind::CyclomaticComplexity => {
                self.category_enabled("complexity")
                    && self.rules.complexity.enabled
                    && self.rules.complexity.cyclomatic_complexity.enabled
            }
            IssueKind::FunctionLength => {
                self.category_enabled("complexity")
                    && self.rules.complexity.enabled
                    && self.rules.complexity.function_length.enabled
            }
            IssueKind::MemoryAllocation => {
                self.category_enabled("memory")
                    && self.rules.memory.enabled
                    && self.rules.memory.allocation.enabled
            }
            IssueKind::SliceGrowth => {
                self.category_enabled("memory")
                    && self.rules.memory.enabled
                    && self.rules.memory.slice_growth.enabled
            }
            IssueKind::ImportCycle => {
                self.category_enabled("quality")
                    && self.rules.quality.enabled
                    && self.rules.quality.import_cycles.enabled
            }
        }
    }

    fn category_enabled(&self, name: &str) -> bool {
        self.analysis
            .enabled_categories
            .iter()
            .any(|c| c == name)
    }

    /// Write this configuration to a YAML file.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, yaml)?;
        Ok(())
    }
}

fn validate_tiers(name: &str, tiers: &TierThresholds) -> Result<(), ConfigError> {
    if !tiers.enabled {
        return Ok(());
    }
    if tiers.medium_threshold >= tiers.high_threshold
        || tiers.high_threshold >= tiers.critical_threshold
    {
        return Err(ConfigError::Invalid(format!(
            "{} thresholds must be strictly ascending",
            name
        )));
    }
    Ok(())
}

/// Look for a config file in conventional locations.
fn find_config_file() -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

/// Write a sample config (the defaults) to `path`.
pub fn generate(path: &Path) -> anyhow::Result<()> {
    Config::default().save(path)
}
