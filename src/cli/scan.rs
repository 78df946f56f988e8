use std::path::Path;

use crate::error::Result;
use crate::scan::scan_project;

/// Scan a project tree and initialize its progress ledger. Prints the scan
/// payload to stdout; status lines go to stderr.
pub fn run(path: &Path, include_tests: bool, reset_completed: bool) -> Result<()> {
    eprintln!("reforge: scanning {}...", path.display());

    let preserve = if reset_completed { Some(false) } else { None };
    let (snapshot, record_info) = scan_project(path, include_tests, preserve)?;

    if let Some(reason) = &snapshot.error {
        eprintln!("reforge: {reason}");
    } else {
        eprintln!(
            "reforge: found {} file(s), {} line(s)",
            snapshot.total_files, snapshot.total_lines
        );
    }

    let mut payload = serde_json::to_value(&snapshot)?;
    if let Some(info) = record_info {
        payload["record_info"] = serde_json::to_value(&info)?;
    }
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}
