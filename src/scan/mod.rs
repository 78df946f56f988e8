use chrono::{DateTime, Utc};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::analyze::{Complexity, FileAnalyzer, FileKind, FileRecord, SizeBucket};
use crate::config::{record_dir, ProjectConfig, ScanConfig, SCANS_DIR};
use crate::error::{ReforgeError, Result};
use crate::ledger::{ensure_record_dir, ProgressLedger};

/// Result of one scan invocation. Written to durable storage as an
/// immutable, timestamped artifact (a new file per scan).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSnapshot {
    pub project_path: String,
    pub scanned_at: DateTime<Utc>,
    pub total_files: usize,
    pub total_lines: usize,

    /// Per-file records in directory-walk order. The order is NOT guaranteed
    /// sorted; callers requiring determinism must sort explicitly.
    pub files: Vec<FileRecord>,

    pub stats: ScanStats,

    /// Set when the scan completed but found nothing to analyze.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate counts over one snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanStats {
    pub complexity_low: usize,
    pub complexity_medium: usize,
    pub complexity_high: usize,
    pub size_small: usize,
    pub size_medium: usize,
    pub size_large: usize,
    pub swift_files: usize,
    pub objc_files: usize,
    pub cpp_files: usize,
    pub sensitive_files: usize,
    pub unreadable_files: usize,
    /// Percentage of files per language family, rounded to 2 decimals.
    pub language_split: BTreeMap<String, f64>,
}

impl ScanStats {
    /// The language family with the most files; Swift wins ties.
    pub fn dominant_language(&self) -> FileKind {
        if self.swift_files >= self.objc_files && self.swift_files >= self.cpp_files {
            FileKind::Swift
        } else if self.objc_files >= self.cpp_files {
            FileKind::Objc
        } else {
            FileKind::Cpp
        }
    }
}

/// Where the scan's durable artifacts landed.
#[derive(Debug, Clone, Serialize)]
pub struct RecordInfo {
    pub record_directory: String,
    pub snapshot_file: String,
    pub ledger_file: String,
}

/// Walks a project tree, applies inclusion/exclusion rules, and classifies
/// every matching file. Stateless; construct per call.
pub struct ProjectScanner {
    config: ScanConfig,
    analyzer: FileAnalyzer,
    exclude_globs: GlobSet,
}

impl ProjectScanner {
    pub fn new(config: ScanConfig) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &config.exclude_patterns {
            let glob = Glob::new(pattern).map_err(|e| ReforgeError::GlobPattern {
                pattern: pattern.clone(),
                reason: e.to_string(),
            })?;
            builder.add(glob);
        }
        let exclude_globs = builder.build().map_err(|e| ReforgeError::GlobPattern {
            pattern: "<set>".into(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            config,
            analyzer: FileAnalyzer::default(),
            exclude_globs,
        })
    }

    /// Walk the tree and classify every matching file. A single unreadable
    /// file never fails the scan; its record carries `analysis_error`.
    pub fn scan(&self, project_root: &Path, include_tests: bool) -> Result<ScanSnapshot> {
        if !project_root.exists() {
            return Err(ReforgeError::PathNotFound {
                path: project_root.to_path_buf(),
            });
        }

        let mut files = Vec::new();
        let walker = WalkDir::new(project_root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                // Only directories are pruned here; files are filtered below.
                if entry.depth() == 0 || !entry.file_type().is_dir() {
                    return true;
                }
                self.keep_dir(entry.path(), project_root, include_tests)
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("failed to read entry: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if !self.keep_file(path, project_root, include_tests) {
                continue;
            }

            let relative = path
                .strip_prefix(project_root)
                .unwrap_or(path)
                .to_string_lossy()
                .into_owned();
            files.push(self.analyze_on_disk(path, &relative));
        }

        let mut snapshot = aggregate(project_root, files);
        if snapshot.files.is_empty() {
            snapshot.error = Some(format!(
                "no matching source files under {}",
                project_root.display()
            ));
        }
        Ok(snapshot)
    }

    fn analyze_on_disk(&self, path: &Path, relative: &str) -> FileRecord {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("failed to read {}: {e}", path.display());
                return self.analyzer.unreadable(relative, &format!("read failed: {e}"));
            }
        };
        match decode_text(bytes) {
            Ok(content) => self.analyzer.analyze(relative, &content),
            Err(reason) => {
                tracing::warn!("failed to decode {}: {reason}", path.display());
                self.analyzer.unreadable(relative, &reason)
            }
        }
    }

    fn keep_dir(&self, path: &Path, root: &Path, include_tests: bool) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if name.starts_with('.') {
            return false;
        }
        if self.config.exclude_dirs.iter().any(|d| d == name) {
            return false;
        }
        if !include_tests {
            let lowered = name.to_lowercase();
            if self
                .config
                .test_dir_markers
                .iter()
                .any(|marker| lowered.contains(marker))
            {
                return false;
            }
        }
        !self.globs_exclude(path, root)
    }

    fn keep_file(&self, path: &Path, root: &Path, include_tests: bool) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        let ext = ext.to_ascii_lowercase();
        if !self.config.extensions.iter().any(|e| e == &ext) {
            return false;
        }
        if !include_tests {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                let lowered = name.to_lowercase();
                if self
                    .config
                    .test_file_markers
                    .iter()
                    .any(|marker| lowered.contains(marker))
                {
                    return false;
                }
            }
        }
        !self.globs_exclude(path, root)
    }

    fn globs_exclude(&self, path: &Path, root: &Path) -> bool {
        if self.exclude_globs.is_empty() {
            return false;
        }
        path.strip_prefix(root)
            .map(|rel| self.exclude_globs.is_match(rel))
            .unwrap_or(false)
    }
}

/// Decode file bytes as UTF-8, falling back to Latin-1 for textual content.
/// Byte streams carrying NUL are treated as binary, not text.
fn decode_text(bytes: Vec<u8>) -> std::result::Result<String, String> {
    match String::from_utf8(bytes) {
        Ok(content) => Ok(content),
        Err(e) => {
            let bytes = e.into_bytes();
            if bytes.contains(&0) {
                Err("content is not text (NUL bytes present)".into())
            } else {
                // Latin-1: each byte maps 1:1 to the same code point.
                Ok(bytes.iter().map(|&b| b as char).collect())
            }
        }
    }
}

fn aggregate(project_root: &Path, files: Vec<FileRecord>) -> ScanSnapshot {
    let mut stats = ScanStats::default();
    let mut total_lines = 0usize;

    for record in &files {
        total_lines += record.line_count;
        match record.complexity {
            Complexity::Low => stats.complexity_low += 1,
            Complexity::Medium => stats.complexity_medium += 1,
            Complexity::High => stats.complexity_high += 1,
        }
        match record.size_bucket {
            SizeBucket::Small => stats.size_small += 1,
            SizeBucket::Medium => stats.size_medium += 1,
            SizeBucket::Large => stats.size_large += 1,
        }
        match record.kind {
            FileKind::Swift => stats.swift_files += 1,
            FileKind::Objc => stats.objc_files += 1,
            FileKind::Cpp => stats.cpp_files += 1,
            FileKind::Other => {}
        }
        if record.sensitive {
            stats.sensitive_files += 1;
        }
        if record.analysis_error.is_some() {
            stats.unreadable_files += 1;
        }
    }

    let total = files.len();
    if total > 0 {
        let pct = |n: usize| (n as f64 / total as f64 * 10_000.0).round() / 100.0;
        stats
            .language_split
            .insert("swift".into(), pct(stats.swift_files));
        stats
            .language_split
            .insert("objc".into(), pct(stats.objc_files));
        stats.language_split.insert("cpp".into(), pct(stats.cpp_files));
    }

    ScanSnapshot {
        project_path: project_root.to_string_lossy().into_owned(),
        scanned_at: Utc::now(),
        total_files: total,
        total_lines,
        files,
        stats,
        error: None,
    }
}

/// Scan a project and record the results: persist an immutable snapshot
/// artifact and (re-)initialize the progress ledger. This is the sole point
/// where the ledger's `total_files` changes.
///
/// An empty scan returns the zero-file snapshot with its `error` field set
/// and leaves all durable state untouched.
pub fn scan_project(
    project_root: &Path,
    include_tests: bool,
    preserve_completed: Option<bool>,
) -> Result<(ScanSnapshot, Option<RecordInfo>)> {
    let config = ProjectConfig::load_project(project_root)?;
    let scanner = ProjectScanner::new(config.scan)?;
    let snapshot = scanner.scan(project_root, include_tests)?;

    if snapshot.error.is_some() {
        return Ok((snapshot, None));
    }

    ensure_record_dir(project_root)?;
    let snapshot_file = persist_snapshot(project_root, &snapshot)?;

    let paths: Vec<String> = snapshot.files.iter().map(|f| f.path.clone()).collect();
    let preserve = preserve_completed.unwrap_or(config.ledger.preserve_on_rescan);
    ProgressLedger::initialize(project_root, &paths, preserve)?;

    let info = RecordInfo {
        record_directory: record_dir(project_root).to_string_lossy().into_owned(),
        snapshot_file: snapshot_file.to_string_lossy().into_owned(),
        ledger_file: crate::config::ledger_path(project_root)
            .to_string_lossy()
            .into_owned(),
    };
    tracing::info!(
        "scanned {} files ({} lines) under {}",
        snapshot.total_files,
        snapshot.total_lines,
        project_root.display()
    );
    Ok((snapshot, Some(info)))
}

/// Write the snapshot as a new, uniquely named artifact. Existing snapshots
/// are never overwritten.
fn persist_snapshot(project_root: &Path, snapshot: &ScanSnapshot) -> Result<PathBuf> {
    let scans = record_dir(project_root).join(SCANS_DIR);
    std::fs::create_dir_all(&scans)?;

    let stamp = snapshot.scanned_at.format("%Y%m%d_%H%M%S");
    let mut path = scans.join(format!("scan_{stamp}.json"));
    let mut suffix = 1u32;
    while path.exists() {
        suffix += 1;
        path = scans.join(format!("scan_{stamp}_{suffix}.json"));
    }

    let json = serde_json::to_string_pretty(snapshot)?;
    std::fs::write(&path, json)?;
    Ok(path)
}

/// Load the most recent persisted snapshot, if any scan has run.
pub fn latest_snapshot(project_root: &Path) -> Result<Option<ScanSnapshot>> {
    let scans = record_dir(project_root).join(SCANS_DIR);
    if !scans.exists() {
        return Ok(None);
    }

    let mut names: Vec<String> = std::fs::read_dir(&scans)?
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().to_str().map(|s| s.to_string()))
        .filter(|n| n.starts_with("scan_") && n.ends_with(".json"))
        .collect();
    // Timestamped names sort chronologically.
    names.sort();

    let Some(newest) = names.pop() else {
        return Ok(None);
    };
    let contents = std::fs::read_to_string(scans.join(&newest))?;
    let snapshot = serde_json::from_str(&contents)?;
    Ok(Some(snapshot))
}
