//! Rule-template injection for the editor workspace. Thin file copy plus one
//! generated document parameterized by the latest scan's statistics.

use chrono::Utc;
use serde::Serialize;
use std::path::Path;

use crate::config::{record_dir, INJECTION_FILE};
use crate::error::{ReforgeError, Result};
use crate::ledger::ensure_record_dir;
use crate::scan::latest_snapshot;

const PLAYBOOK: &str = include_str!("../../templates/transformation_playbook.md");
const GUIDELINES: &str = include_str!("../../templates/code_guidelines.md");

const PLAYBOOK_NAME: &str = "transformation_playbook.md";
const GUIDELINES_NAME: &str = "code_guidelines.md";
const PROJECT_RULES_NAME: &str = "project_rules.md";

/// Result payload of one injection.
#[derive(Debug, Clone, Serialize)]
pub struct InjectionOutcome {
    pub success: bool,
    pub rules_directory: String,
    pub injected_files: Vec<String>,
    pub record_file: String,
}

/// What gets persisted to `.reforge/injection.json`.
#[derive(Debug, Serialize)]
struct InjectionRecord<'a> {
    last_updated: chrono::DateTime<Utc>,
    target_project: String,
    editor_root: String,
    rules_directory: String,
    app_theme: Option<&'a str>,
    injected_files: &'a [String],
}

/// Copy the fixed rule templates into `<editor_root>/.cursor/rules/` and
/// synthesize the project-specific rules document from the latest scan.
pub fn inject_rules(
    project_root: &Path,
    editor_root: &Path,
    app_theme: Option<&str>,
) -> Result<InjectionOutcome> {
    if !project_root.exists() {
        return Err(ReforgeError::PathNotFound {
            path: project_root.to_path_buf(),
        });
    }
    if !editor_root.exists() {
        return Err(ReforgeError::EditorRootNotFound {
            path: editor_root.to_path_buf(),
        });
    }

    let rules_dir = editor_root.join(".cursor").join("rules");
    std::fs::create_dir_all(&rules_dir)?;

    let mut injected = Vec::new();
    std::fs::write(rules_dir.join(PLAYBOOK_NAME), PLAYBOOK)?;
    injected.push(PLAYBOOK_NAME.to_string());
    std::fs::write(rules_dir.join(GUIDELINES_NAME), GUIDELINES)?;
    injected.push(GUIDELINES_NAME.to_string());

    let rules_doc = project_rules(project_root, app_theme)?;
    std::fs::write(rules_dir.join(PROJECT_RULES_NAME), rules_doc)?;
    injected.push(PROJECT_RULES_NAME.to_string());

    ensure_record_dir(project_root)?;
    let record_file = record_dir(project_root).join(INJECTION_FILE);
    let record = InjectionRecord {
        last_updated: Utc::now(),
        target_project: project_root.to_string_lossy().into_owned(),
        editor_root: editor_root.to_string_lossy().into_owned(),
        rules_directory: rules_dir.to_string_lossy().into_owned(),
        app_theme,
        injected_files: &injected,
    };
    std::fs::write(&record_file, serde_json::to_string_pretty(&record)?)?;

    tracing::info!(
        "injected {} rule file(s) into {}",
        injected.len(),
        rules_dir.display()
    );

    Ok(InjectionOutcome {
        success: true,
        rules_directory: rules_dir.to_string_lossy().into_owned(),
        injected_files: injected,
        record_file: record_file.to_string_lossy().into_owned(),
    })
}

/// Render the project-specific rules document from the newest scan snapshot.
/// Works without one (all counts read as zero) so injection can precede the
/// first scan.
fn project_rules(project_root: &Path, app_theme: Option<&str>) -> Result<String> {
    let snapshot = latest_snapshot(project_root)?;
    let (swift, objc, total_lines, dominant) = match &snapshot {
        Some(s) => (
            s.stats.swift_files,
            s.stats.objc_files,
            s.total_lines,
            s.stats.dominant_language().to_string(),
        ),
        None => (0, 0, 0, "swift".to_string()),
    };

    let theme_section = match app_theme {
        Some(theme) if !theme.is_empty() => format!(
            "\n## Theme guidance\n\n\
             Application theme: {theme}\n\n\
             New code (names, helper types, behaviors) should fit the '{theme}' \
             theme and stay coherent with it across files.\n"
        ),
        _ => String::new(),
    };

    Ok(format!(
        "# Project transformation rules\n\
         \n\
         ## Project profile\n\
         \n\
         - Dominant language: {dominant}\n\
         - Swift files: {swift}\n\
         - Objective-C files: {objc}\n\
         - Total lines: {total_lines}\n\
         {theme_section}\
         \n\
         ## Ground rules\n\
         \n\
         1. Existing behavior is preserved exactly; additions never change \
         current logic or data flow.\n\
         2. Low-complexity files may take direct additions; medium and high \
         complexity files should be extended through extensions/categories.\n\
         3. Avoid denylisted features (payments, embedded web content, \
         scripting bridges); files flagged sensitive are skipped.\n\
         4. After transforming files, record them via the `record_completion` \
         tool so progress statistics stay accurate.\n"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_inject_writes_templates_and_record() {
        let project = TempDir::new().unwrap();
        let editor = TempDir::new().unwrap();

        let outcome = inject_rules(project.path(), editor.path(), Some("fitness")).unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.injected_files.len(), 3);

        let rules_dir = editor.path().join(".cursor").join("rules");
        assert!(rules_dir.join(PLAYBOOK_NAME).exists());
        assert!(rules_dir.join(GUIDELINES_NAME).exists());
        let generated = std::fs::read_to_string(rules_dir.join(PROJECT_RULES_NAME)).unwrap();
        assert!(generated.contains("fitness"));

        assert!(project.path().join(".reforge").join(INJECTION_FILE).exists());
    }

    #[test]
    fn test_inject_missing_editor_root_fails() {
        let project = TempDir::new().unwrap();
        let err = inject_rules(project.path(), Path::new("/nonexistent/editor"), None).unwrap_err();
        assert!(matches!(err, ReforgeError::EditorRootNotFound { .. }));
    }
}
