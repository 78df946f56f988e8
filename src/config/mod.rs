use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ReforgeError, Result};

/// Name of the per-project record directory.
pub const RECORD_DIR: &str = ".reforge";

/// Canonical ledger document, overwritten in place on every mutation.
pub const LEDGER_FILE: &str = "ledger.json";

/// Subdirectory for immutable, timestamped scan snapshots.
pub const SCANS_DIR: &str = "scans";

/// Latest rule-injection record.
pub const INJECTION_FILE: &str = "injection.json";

/// Returns the record directory for a project: `<project>/.reforge/`
pub fn record_dir(project_root: &Path) -> PathBuf {
    project_root.join(RECORD_DIR)
}

/// Returns the canonical ledger path for a project.
pub fn ledger_path(project_root: &Path) -> PathBuf {
    record_dir(project_root).join(LEDGER_FILE)
}

/// Top-level project configuration, read from `.reforge/config.yml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// File discovery and classification rules.
    #[serde(default)]
    pub scan: ScanConfig,

    /// Ledger behavior.
    #[serde(default)]
    pub ledger: LedgerPolicy,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            scan: ScanConfig::default(),
            ledger: LedgerPolicy::default(),
        }
    }
}

impl ProjectConfig {
    /// Load config from a YAML file. Returns default if file doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&contents).map_err(|e| ReforgeError::ConfigParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Load config from the project root. Checks `.reforge/config.yml`.
    pub fn load_project(project_root: &Path) -> Result<Self> {
        let path = record_dir(project_root).join("config.yml");
        Self::load_from(&path)
    }
}

/// File discovery rules for the project scanner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Extensions included in a scan (without the leading dot).
    pub extensions: Vec<String>,

    /// Directory names skipped outright (dependency caches, build output).
    pub exclude_dirs: Vec<String>,

    /// Extra exclusion globs matched against project-relative paths.
    #[serde(default)]
    pub exclude_patterns: Vec<String>,

    /// Substrings marking a directory as test-related (lowercased compare).
    pub test_dir_markers: Vec<String>,

    /// Substrings marking an individual file as test-related.
    pub test_file_markers: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: ["swift", "m", "h", "mm", "cpp", "cc", "c"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exclude_dirs: [
                "Pods",
                "build",
                "DerivedData",
                "Carthage",
                "node_modules",
                ".build",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            exclude_patterns: Vec::new(),
            test_dir_markers: ["tests", "testing", "unittest", "uitest"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            test_file_markers: ["test", "spec"].iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Ledger behavior knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerPolicy {
    /// Whether a re-scan preserves prior completions (intersected against the
    /// fresh file list) or resets them. Default: preserve.
    #[serde(default = "default_preserve_on_rescan")]
    pub preserve_on_rescan: bool,
}

fn default_preserve_on_rescan() -> bool {
    true
}

impl Default for LedgerPolicy {
    fn default() -> Self {
        Self {
            preserve_on_rescan: true,
        }
    }
}
