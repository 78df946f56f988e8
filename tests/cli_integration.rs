//! CLI integration tests using assert_cmd to exercise the actual binary.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn reforge() -> Command {
    Command::cargo_bin("reforge").unwrap()
}

fn seed_project(tmp: &TempDir) {
    let swift: String = (0..10).map(|i| format!("let v{i} = {i}\n")).collect();
    std::fs::write(tmp.path().join("A.swift"), &swift).unwrap();
    std::fs::write(tmp.path().join("B.m"), "int x;\n").unwrap();
}

// ---------------------------------------------------------------------------
// Scan subcommand
// ---------------------------------------------------------------------------

#[test]
fn cli_scan_creates_record_directory() {
    let tmp = TempDir::new().unwrap();
    seed_project(&tmp);

    reforge()
        .args(["scan", &tmp.path().to_string_lossy()])
        .assert()
        .success()
        .stderr(predicate::str::contains("found 2 file(s)"))
        .stdout(predicate::str::contains("\"total_files\": 2"));

    assert!(tmp.path().join(".reforge/ledger.json").exists());
    assert!(tmp.path().join(".reforge/README.md").exists());
    assert!(tmp.path().join(".reforge/scans").is_dir());
}

#[test]
fn cli_scan_missing_path_fails() {
    reforge()
        .args(["scan", "/nonexistent/project"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn cli_scan_empty_project_reports_error_field() {
    let tmp = TempDir::new().unwrap();

    reforge()
        .args(["scan", &tmp.path().to_string_lossy()])
        .assert()
        .success()
        .stdout(predicate::str::contains("no matching source files"));
}

// ---------------------------------------------------------------------------
// Stats / Record / Reset
// ---------------------------------------------------------------------------

#[test]
fn cli_stats_before_scan_fails() {
    let tmp = TempDir::new().unwrap();

    reforge()
        .args(["stats", &tmp.path().to_string_lossy()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("run a scan first"));
}

#[test]
fn cli_record_then_stats() {
    let tmp = TempDir::new().unwrap();
    seed_project(&tmp);

    reforge()
        .args(["scan", &tmp.path().to_string_lossy()])
        .assert()
        .success();

    reforge()
        .args([
            "record",
            &tmp.path().to_string_lossy(),
            "--files",
            "A.swift",
            "--notes",
            "first pass",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("1/2 file(s) complete (50%)"));

    reforge()
        .args(["stats", &tmp.path().to_string_lossy()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"completed_count\": 1"))
        .stdout(predicate::str::contains("\"completion_percentage\": 50.0"));
}

#[test]
fn cli_record_unknown_path_reported_invalid() {
    let tmp = TempDir::new().unwrap();
    seed_project(&tmp);

    reforge()
        .args(["scan", &tmp.path().to_string_lossy()])
        .assert()
        .success();

    reforge()
        .args([
            "record",
            &tmp.path().to_string_lossy(),
            "--files",
            "C.swift",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("not tracked: C.swift"))
        .stdout(predicate::str::contains("\"invalid_files\""));
}

#[test]
fn cli_reset_clears_progress() {
    let tmp = TempDir::new().unwrap();
    seed_project(&tmp);

    reforge()
        .args(["scan", &tmp.path().to_string_lossy()])
        .assert()
        .success();
    reforge()
        .args(["record", &tmp.path().to_string_lossy(), "--files", "A.swift"])
        .assert()
        .success();

    reforge()
        .args(["reset", &tmp.path().to_string_lossy()])
        .assert()
        .success()
        .stderr(predicate::str::contains("progress reset"));

    reforge()
        .args(["stats", &tmp.path().to_string_lossy()])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"completed_count\": 0"));
}

// ---------------------------------------------------------------------------
// Inject subcommand
// ---------------------------------------------------------------------------

#[test]
fn cli_inject_writes_rules() {
    let tmp = TempDir::new().unwrap();
    let editor = TempDir::new().unwrap();
    seed_project(&tmp);

    reforge()
        .args([
            "inject",
            &tmp.path().to_string_lossy(),
            "--editor-root",
            &editor.path().to_string_lossy(),
            "--theme",
            "cooking",
        ])
        .assert()
        .success()
        .stderr(predicate::str::contains("injected 3 rule file(s)"));

    let rules = editor.path().join(".cursor/rules");
    assert!(rules.join("transformation_playbook.md").exists());
    assert!(rules.join("code_guidelines.md").exists());
    let generated = std::fs::read_to_string(rules.join("project_rules.md")).unwrap();
    assert!(generated.contains("cooking"));
}

// ---------------------------------------------------------------------------
// Help / version
// ---------------------------------------------------------------------------

#[test]
fn cli_help() {
    reforge()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "transformation progress tracking",
        ));
}

#[test]
fn cli_version() {
    reforge()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("reforge"));
}

#[test]
fn cli_no_args_shows_help() {
    reforge()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}
