use std::path::Path;

use crate::error::Result;
use crate::ledger::ProgressLedger;

/// Print progress statistics for a project.
pub fn run_stats(path: &Path) -> Result<()> {
    let ledger = ProgressLedger::load(path)?;
    let stats = ledger.statistics();
    eprintln!(
        "reforge: {}/{} file(s) complete ({}%)",
        stats.completed_count, stats.total_files, stats.completion_percentage
    );
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

/// Mark files complete in a project's ledger.
pub fn run_record(path: &Path, files: &[String], notes: &str) -> Result<()> {
    let mut ledger = ProgressLedger::load(path)?;
    let outcome = ledger.record_completion(files, notes)?;

    if !outcome.invalid_files.is_empty() {
        eprintln!(
            "reforge: {} path(s) not tracked: {}",
            outcome.invalid_files.len(),
            outcome.invalid_files.join(", ")
        );
    }
    eprintln!(
        "reforge: {}/{} file(s) complete ({}%)",
        outcome.completed_count, outcome.total_files, outcome.completion_percentage
    );
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

/// Clear completion state, keeping the tracked file list.
pub fn run_reset(path: &Path) -> Result<()> {
    let mut ledger = ProgressLedger::load(path)?;
    ledger.reset()?;
    eprintln!(
        "reforge: progress reset ({} tracked file(s) kept)",
        ledger.total_files()
    );
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "success": true,
            "total_files": ledger.total_files(),
        }))?
    );
    Ok(())
}
