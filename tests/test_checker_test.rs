// Tests for the test/coverage checker.
// A shell script stands in for pytest and writes a canned coverage report.

use notebook_qa::analyzer::NotebookCheck;
use notebook_qa::coverage::RunnerCommand;
use notebook_qa::report::CheckResult;
use notebook_qa::rules::tests::TestCheck;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn check(project: &Path, runner: &str, threshold: f64) -> TestCheck {
    TestCheck::new(
        project.to_path_buf(),
        RunnerCommand::pytest(runner),
        threshold,
        Duration::from_secs(30),
    )
}

#[cfg(unix)]
fn fake_runner(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("fake-pytest");
    fs::write(&script, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = fs::metadata(&script).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&script, perms).unwrap();
    script
}

#[test]
fn test_no_test_files_fails() {
    let project = tempfile::tempdir().unwrap();
    fs::write(project.path().join("analysis.py"), "x = 1\n").unwrap();

    let report = check(project.path(), "pytest", 80.0).check(Path::new("nb.ipynb"));
    assert_eq!(report.status, CheckResult::Failure);
    assert_eq!(report.issues[0].rule_id, "NQA-T001");
}

#[test]
fn test_missing_runner_fails() {
    let project = tempfile::tempdir().unwrap();
    fs::write(project.path().join("test_analysis.py"), "def test_x(): pass\n").unwrap();

    let report = check(project.path(), "notebook-qa-missing-runner", 80.0).check(Path::new("nb.ipynb"));
    assert_eq!(report.status, CheckResult::Failure);
    assert_eq!(report.issues[0].rule_id, "NQA-T002");
}

#[cfg(unix)]
#[test]
fn test_coverage_threshold() {
    let project = tempfile::tempdir().unwrap();
    let bin = tempfile::tempdir().unwrap();
    fs::create_dir(project.path().join("tests")).unwrap();
    fs::write(project.path().join("tests/test_io.py"), "def test_io(): pass\n").unwrap();

    let runner = fake_runner(
        bin.path(),
        r#"echo '<coverage line-rate="0.85"/>' > coverage.xml"#,
    );
    let runner = runner.to_string_lossy().to_string();

    let report = check(project.path(), &runner, 80.0).check(Path::new("nb.ipynb"));
    assert_eq!(report.status, CheckResult::Success);
    assert!(report.notes.iter().any(|n| n.contains("85.0%")));

    let report = check(project.path(), &runner, 90.0).check(Path::new("nb.ipynb"));
    assert_eq!(report.status, CheckResult::Failure);
    assert_eq!(report.issues[0].rule_id, "NQA-T006");
}

#[cfg(unix)]
#[test]
fn test_missing_report_fails_even_with_stale_file() {
    let project = tempfile::tempdir().unwrap();
    let bin = tempfile::tempdir().unwrap();
    fs::write(project.path().join("model_test.py"), "def test_m(): pass\n").unwrap();
    fs::write(project.path().join("coverage.xml"), r#"<coverage line-rate="1.0"/>"#).unwrap();

    let runner = fake_runner(bin.path(), "exit 0");
    let report =
        check(project.path(), &runner.to_string_lossy(), 80.0).check(Path::new("nb.ipynb"));
    assert_eq!(report.status, CheckResult::Failure);
    assert_eq!(report.issues[0].rule_id, "NQA-T004");
}
