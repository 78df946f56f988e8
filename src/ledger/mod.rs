pub mod schema;

pub use schema::{LedgerDoc, UpdateRecord, LEDGER_VERSION};

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::config::{ledger_path, record_dir};
use crate::error::{ReforgeError, Result};

/// The durable per-project record of which tracked files have been marked
/// complete. Every mutation loads, rewrites, and persists the whole document.
///
/// Known hazard: there is no file lock. Two concurrent callers performing the
/// read-modify-write cycle against the same project race, and the second
/// writer silently overwrites the first's update. The design assumes
/// at-most-one-caller-at-a-time, which is what the MCP tool transport
/// provides.
#[derive(Debug)]
pub struct ProgressLedger {
    path: PathBuf,
    doc: LedgerDoc,
}

/// Result of one `record_completion` call.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionOutcome {
    pub completed_count: usize,
    pub total_files: usize,
    pub completion_percentage: f64,
    pub remaining_files: usize,
    /// Paths accepted by this call (already-completed ones are accepted
    /// silently; completing is idempotent).
    pub updated_files: Vec<String>,
    /// Caller-supplied paths not present in the tracked file set.
    pub invalid_files: Vec<String>,
}

/// Snapshot of overall progress.
#[derive(Debug, Clone, Serialize)]
pub struct LedgerStatistics {
    pub total_files: usize,
    pub completed_count: usize,
    pub completion_percentage: f64,
    pub remaining_files: usize,
    pub completed_files: Vec<String>,
    /// First few not-yet-completed paths, in scan order.
    pub remaining_preview: Vec<String>,
    pub last_update: DateTime<Utc>,
}

const REMAINING_PREVIEW_LEN: usize = 10;

impl ProgressLedger {
    /// Load the ledger for a project. Fails with `LedgerNotFound` if no scan
    /// has ever created one, `LedgerCorrupt` if the file cannot be parsed.
    pub fn load(project_root: &Path) -> Result<Self> {
        let path = ledger_path(project_root);
        if !path.exists() {
            return Err(ReforgeError::LedgerNotFound {
                project: project_root.to_path_buf(),
            });
        }
        let doc = schema::load_doc(&path)?;
        Ok(Self { path, doc })
    }

    /// Create or re-initialize the ledger from a scan's file list. This is
    /// the only operation that rewrites `total_files`.
    ///
    /// With `preserve_completed`, prior completions survive the re-scan,
    /// intersected against the fresh file list so the subset invariant
    /// holds; otherwise completion state starts empty.
    pub fn initialize(
        project_root: &Path,
        files: &[String],
        preserve_completed: bool,
    ) -> Result<Self> {
        let path = ledger_path(project_root);
        let now = Utc::now();

        let (completed, history, created_at) = match (preserve_completed, path.exists()) {
            (true, true) => {
                let prior = schema::load_doc(&path)?;
                let known: HashSet<&String> = files.iter().collect();
                let kept: Vec<String> = prior
                    .completed
                    .into_iter()
                    .filter(|p| known.contains(p))
                    .collect();
                (kept, prior.update_history, prior.created_at)
            }
            _ => (Vec::new(), Vec::new(), now),
        };

        let doc = LedgerDoc {
            version: LEDGER_VERSION,
            project_path: project_root.to_string_lossy().into_owned(),
            total_files: files.len(),
            file_list: files.to_vec(),
            completed,
            update_history: history,
            created_at,
            last_update: now,
        };

        let ledger = Self { path, doc };
        ledger.persist()?;
        Ok(ledger)
    }

    /// Mark files complete. Input paths are checked for membership in the
    /// tracked file list (not against the filesystem); unknown paths are
    /// partitioned into `invalid_files` and never added to the completed set.
    /// Re-marking an already-completed file is a no-op.
    pub fn record_completion(&mut self, paths: &[String], notes: &str) -> Result<CompletionOutcome> {
        let known: HashSet<&String> = self.doc.file_list.iter().collect();
        let mut valid = Vec::new();
        let mut invalid = Vec::new();
        for path in paths {
            if known.contains(path) {
                valid.push(path.clone());
            } else {
                invalid.push(path.clone());
            }
        }

        let newly: Vec<String> = {
            let already: HashSet<&String> = self.doc.completed.iter().collect();
            valid
                .iter()
                .filter(|p| !already.contains(*p))
                .cloned()
                .collect()
        };
        self.doc.completed.extend(newly);

        let completed_count = self.doc.completed.len();
        let total = self.doc.total_files;
        let percentage = completion_percentage(completed_count, total);
        let now = Utc::now();

        self.doc.update_history.push(UpdateRecord {
            timestamp: now,
            completed_files: valid.clone(),
            invalid_files: invalid.clone(),
            notes: notes.to_string(),
            completed_total: completed_count,
            completion_percentage: percentage,
        });
        self.doc.last_update = now;
        self.persist()?;

        if !invalid.is_empty() {
            tracing::warn!(
                "rejected {} unknown path(s) in completion update: {:?}",
                invalid.len(),
                invalid
            );
        }

        Ok(CompletionOutcome {
            completed_count,
            total_files: total,
            completion_percentage: percentage,
            remaining_files: total.saturating_sub(completed_count),
            updated_files: valid,
            invalid_files: invalid,
        })
    }

    /// Current progress statistics. Read-only.
    pub fn statistics(&self) -> LedgerStatistics {
        let completed: HashSet<&String> = self.doc.completed.iter().collect();
        let remaining_preview: Vec<String> = self
            .doc
            .file_list
            .iter()
            .filter(|p| !completed.contains(*p))
            .take(REMAINING_PREVIEW_LEN)
            .cloned()
            .collect();

        let completed_count = self.doc.completed.len();
        let total = self.doc.total_files;
        LedgerStatistics {
            total_files: total,
            completed_count,
            completion_percentage: completion_percentage(completed_count, total),
            remaining_files: total.saturating_sub(completed_count),
            completed_files: self.doc.completed.clone(),
            remaining_preview,
            last_update: self.doc.last_update,
        }
    }

    /// Clear completion state and history. The tracked file list and
    /// `total_files` are untouched.
    pub fn reset(&mut self) -> Result<()> {
        self.doc.completed.clear();
        self.doc.update_history.clear();
        self.doc.last_update = Utc::now();
        self.persist()
    }

    pub fn total_files(&self) -> usize {
        self.doc.total_files
    }

    pub fn file_list(&self) -> &[String] {
        &self.doc.file_list
    }

    pub fn completed(&self) -> &[String] {
        &self.doc.completed
    }

    /// Rewrite the whole document to its canonical path.
    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.doc)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// `completed / total * 100`, rounded to 2 decimal places; 0 when total is 0.
pub fn completion_percentage(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (completed as f64 / total as f64 * 10_000.0).round() / 100.0
}

/// Ensure the record directory exists, with its one-time README.
pub fn ensure_record_dir(project_root: &Path) -> Result<PathBuf> {
    let dir = record_dir(project_root);
    std::fs::create_dir_all(&dir)?;

    let readme = dir.join("README.md");
    if !readme.exists() {
        std::fs::write(&readme, RECORD_README)?;
    }
    Ok(dir)
}

const RECORD_README: &str = "\
# reforge record directory

Bookkeeping for transformation progress tracking. Contents:

- `ledger.json` - progress ledger (which files are marked complete)
- `scans/` - immutable, timestamped scan snapshots, one per scan
- `injection.json` - latest rule-injection record
- `config.yml` - optional project configuration

These files are managed by the reforge tools; editing them by hand may
confuse progress reporting.
";

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn files(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_initialize_then_statistics_round_trip() {
        let tmp = TempDir::new().unwrap();
        let ledger =
            ProgressLedger::initialize(tmp.path(), &files(&["a.swift", "b.m"]), true).unwrap();
        let stats = ledger.statistics();
        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.completed_count, 0);
        assert_eq!(stats.completion_percentage, 0.0);
    }

    #[test]
    fn test_load_without_scan_fails() {
        let tmp = TempDir::new().unwrap();
        let err = ProgressLedger::load(tmp.path()).unwrap_err();
        assert!(matches!(err, ReforgeError::LedgerNotFound { .. }));
    }

    #[test]
    fn test_record_completion_partitions_invalid() {
        let tmp = TempDir::new().unwrap();
        let mut ledger =
            ProgressLedger::initialize(tmp.path(), &files(&["a.swift", "b.m"]), true).unwrap();

        let outcome = ledger
            .record_completion(&files(&["a.swift", "ghost.swift"]), "first pass")
            .unwrap();
        assert_eq!(outcome.completed_count, 1);
        assert_eq!(outcome.invalid_files, vec!["ghost.swift"]);
        assert_eq!(outcome.completion_percentage, 50.0);

        // Subset invariant holds after the bogus input.
        let reloaded = ProgressLedger::load(tmp.path()).unwrap();
        for path in reloaded.completed() {
            assert!(reloaded.file_list().contains(path));
        }
    }

    #[test]
    fn test_recompletion_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let mut ledger =
            ProgressLedger::initialize(tmp.path(), &files(&["a.swift", "b.m"]), true).unwrap();

        ledger.record_completion(&files(&["a.swift"]), "").unwrap();
        let outcome = ledger.record_completion(&files(&["a.swift"]), "").unwrap();
        assert_eq!(outcome.completed_count, 1);
        assert!(outcome.invalid_files.is_empty());
    }

    #[test]
    fn test_reinitialize_preserves_and_intersects() {
        let tmp = TempDir::new().unwrap();
        let mut ledger = ProgressLedger::initialize(
            tmp.path(),
            &files(&["a.swift", "b.m", "c.swift"]),
            true,
        )
        .unwrap();
        ledger
            .record_completion(&files(&["a.swift", "c.swift"]), "")
            .unwrap();

        // c.swift disappeared from the project between scans.
        let ledger =
            ProgressLedger::initialize(tmp.path(), &files(&["a.swift", "b.m"]), true).unwrap();
        assert_eq!(ledger.completed(), &["a.swift".to_string()]);
        assert_eq!(ledger.total_files(), 2);
    }

    #[test]
    fn test_reinitialize_can_reset() {
        let tmp = TempDir::new().unwrap();
        let mut ledger =
            ProgressLedger::initialize(tmp.path(), &files(&["a.swift"]), true).unwrap();
        ledger.record_completion(&files(&["a.swift"]), "").unwrap();

        let ledger = ProgressLedger::initialize(tmp.path(), &files(&["a.swift"]), false).unwrap();
        assert!(ledger.completed().is_empty());
    }

    #[test]
    fn test_reset_clears_progress_keeps_universe() {
        let tmp = TempDir::new().unwrap();
        let mut ledger =
            ProgressLedger::initialize(tmp.path(), &files(&["a.swift", "b.m"]), true).unwrap();
        ledger.record_completion(&files(&["a.swift"]), "").unwrap();

        ledger.reset().unwrap();
        let stats = ledger.statistics();
        assert_eq!(stats.completed_count, 0);
        assert_eq!(stats.total_files, 2);

        let reloaded = ProgressLedger::load(tmp.path()).unwrap();
        assert_eq!(reloaded.file_list().len(), 2);
    }

    #[test]
    fn test_percentage_bounds() {
        assert_eq!(completion_percentage(0, 0), 0.0);
        assert_eq!(completion_percentage(0, 7), 0.0);
        assert_eq!(completion_percentage(7, 7), 100.0);
        let p = completion_percentage(1, 3);
        assert_eq!(p, 33.33);
        assert!((0.0..=100.0).contains(&p));
    }

    #[test]
    fn test_corrupt_ledger_reported_not_reset() {
        let tmp = TempDir::new().unwrap();
        ensure_record_dir(tmp.path()).unwrap();
        std::fs::write(ledger_path(tmp.path()), "{{{").unwrap();
        let err = ProgressLedger::load(tmp.path()).unwrap_err();
        assert!(matches!(err, ReforgeError::LedgerCorrupt { .. }));
        // The broken file is left in place for inspection.
        assert!(ledger_path(tmp.path()).exists());
    }

    #[test]
    fn test_record_readme_written_once() {
        let tmp = TempDir::new().unwrap();
        ensure_record_dir(tmp.path()).unwrap();
        let readme = record_dir(tmp.path()).join("README.md");
        std::fs::write(&readme, "customized").unwrap();
        ensure_record_dir(tmp.path()).unwrap();
        assert_eq!(std::fs::read_to_string(&readme).unwrap(), "customized");
    }
}
