use std::path::Path;

use crate::error::Result;
use crate::inject::inject_rules;

/// Copy rule templates into an editor workspace.
pub fn run(path: &Path, editor_root: &Path, theme: Option<&str>) -> Result<()> {
    let outcome = inject_rules(path, editor_root, theme)?;
    eprintln!(
        "reforge: injected {} rule file(s) into {}",
        outcome.injected_files.len(),
        outcome.rules_directory
    );
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}
