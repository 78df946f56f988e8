//! Persisted ledger document: canonical versioned shape plus a one-shot
//! migration for the legacy shape, where `completed` was sometimes a list of
//! paths and sometimes a bare count. The legacy shape is only ever touched at
//! the load boundary; everything past it works on [`LedgerDoc`] and only the
//! canonical shape is written back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::error::{ReforgeError, Result};

pub const LEDGER_VERSION: u32 = 2;

/// Canonical on-disk ledger document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerDoc {
    pub version: u32,

    /// Display path of the tracked project.
    pub project_path: String,

    /// File count at last (re-)initialization. Only a scan rewrites this.
    pub total_files: usize,

    /// The universe of tracked project-relative paths, in scan order.
    pub file_list: Vec<String>,

    /// Paths marked done. Invariant: subset of `file_list`.
    pub completed: Vec<String>,

    /// Append-only update log.
    pub update_history: Vec<UpdateRecord>,

    pub created_at: DateTime<Utc>,
    pub last_update: DateTime<Utc>,
}

/// One entry of the update log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRecord {
    pub timestamp: DateTime<Utc>,

    /// Valid paths accepted by this update.
    pub completed_files: Vec<String>,

    /// Caller-supplied paths rejected because they are not tracked.
    pub invalid_files: Vec<String>,

    pub notes: String,

    /// Completion count after this update.
    pub completed_total: usize,

    pub completion_percentage: f64,
}

/// Legacy (unversioned) ledger written by earlier releases.
#[derive(Debug, Deserialize)]
struct LegacyLedger {
    #[serde(default)]
    project_info: LegacyProjectInfo,
    #[serde(default)]
    transformation_progress: Option<LegacyProgress>,
    #[serde(default)]
    update_history: Vec<LegacyUpdate>,
    /// Present in the oldest shape only.
    #[serde(default)]
    file_list: Vec<String>,
    #[serde(default)]
    project_path: Option<String>,
    #[serde(default)]
    last_update: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize)]
struct LegacyProjectInfo {
    #[serde(default)]
    total_files: usize,
}

#[derive(Debug, Deserialize)]
struct LegacyProgress {
    completed: LegacyCompleted,
    #[serde(default)]
    not_started: LegacyNotStarted,
}

/// The duck-typed field: a list of paths in some ledgers, a bare count in
/// others. Tagged here once; never branched on again.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LegacyCompleted {
    Paths(Vec<String>),
    Count(u64),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LegacyNotStarted {
    Paths(Vec<String>),
    Count(u64),
}

impl Default for LegacyNotStarted {
    fn default() -> Self {
        LegacyNotStarted::Paths(Vec::new())
    }
}

#[derive(Debug, Deserialize)]
struct LegacyUpdate {
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    completed_files: Vec<String>,
    #[serde(default)]
    invalid_files: Vec<String>,
    #[serde(default)]
    notes: String,
}

/// Load a ledger document from disk, migrating legacy shapes to the
/// canonical one. A file that exists but cannot be interpreted as either
/// shape is reported as corrupt, never silently reset.
pub fn load_doc(path: &Path) -> Result<LedgerDoc> {
    let contents = std::fs::read_to_string(path)?;
    let value: serde_json::Value =
        serde_json::from_str(&contents).map_err(|e| ReforgeError::LedgerCorrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    if value.get("version").and_then(|v| v.as_u64()).is_some() {
        return serde_json::from_value(value).map_err(|e| ReforgeError::LedgerCorrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        });
    }

    let legacy: LegacyLedger =
        serde_json::from_value(value).map_err(|e| ReforgeError::LedgerCorrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    Ok(migrate(legacy))
}

/// Convert a legacy ledger into the canonical shape, once.
///
/// When `completed` was stored as a bare count, the actual set of completed
/// paths is reconstructed best-effort from the update history; with no
/// history the set is empty and the stored count is advisory only; counts
/// are always recomputed from the set afterwards.
fn migrate(legacy: LegacyLedger) -> LedgerDoc {
    let history_paths = || {
        let mut seen = HashSet::new();
        let mut paths = Vec::new();
        for update in &legacy.update_history {
            for path in &update.completed_files {
                if seen.insert(path.clone()) {
                    paths.push(path.clone());
                }
            }
        }
        paths
    };

    let completed = match legacy.transformation_progress.as_ref().map(|p| &p.completed) {
        Some(LegacyCompleted::Paths(paths)) => paths.clone(),
        Some(LegacyCompleted::Count(_)) | None => history_paths(),
    };

    // The oldest shape carried the universe at top level; the newer one only
    // carried the not-started remainder next to the completed list.
    let mut file_list = legacy.file_list.clone();
    if file_list.is_empty() {
        if let Some(LegacyNotStarted::Paths(not_started)) =
            legacy.transformation_progress.as_ref().map(|p| &p.not_started)
        {
            file_list = not_started.clone();
            for path in &completed {
                if !file_list.contains(path) {
                    file_list.push(path.clone());
                }
            }
        }
    }

    let total_files = if legacy.project_info.total_files > 0 {
        legacy.project_info.total_files
    } else {
        file_list.len()
    };

    // Enforce the subset invariant on the way in.
    let known: HashSet<&String> = file_list.iter().collect();
    let completed: Vec<String> = completed
        .into_iter()
        .filter(|p| known.contains(p))
        .collect();

    let last_update = legacy
        .last_update
        .or_else(|| legacy.update_history.iter().rev().find_map(|u| u.timestamp))
        .unwrap_or_else(Utc::now);

    LedgerDoc {
        version: LEDGER_VERSION,
        project_path: legacy.project_path.unwrap_or_default(),
        total_files,
        file_list,
        completed,
        update_history: legacy
            .update_history
            .into_iter()
            .map(|u| UpdateRecord {
                timestamp: u.timestamp.unwrap_or(last_update),
                completed_files: u.completed_files,
                invalid_files: u.invalid_files,
                notes: u.notes,
                completed_total: 0,
                completion_percentage: 0.0,
            })
            .collect(),
        created_at: last_update,
        last_update,
    }
}
