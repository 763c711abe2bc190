//! CLI 集成测试
//!
//! 在真实的临时 Git 仓库上执行编译后的二进制文件

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// 获取编译后的二进制文件路径
fn get_binary_path() -> &'static str {
    env!("CARGO_BIN_EXE_api-drift")
}

/// 在测试仓库中执行 git 命令
fn git(repo_path: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_path)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
}

/// 写入文件、提交并打标签
fn release(repo_path: &Path, files: &[(&str, &str)], tag: &str) {
    for (name, content) in files {
        let file_path = repo_path.join(name);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }
    git(repo_path, &["add", "-A"]);
    git(repo_path, &["commit", "-m", &format!("Release {tag}")]);
    git(repo_path, &["tag", tag]);
}

/// 创建包含两个发布版本的 joblib 风格仓库
fn create_test_repo() -> TempDir {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let repo_path = temp_dir.path();

    git(repo_path, &["init"]);
    git(repo_path, &["config", "user.name", "Test User"]);
    git(repo_path, &["config", "user.email", "test@example.com"]);

    release(
        repo_path,
        &[
            ("joblib/__init__.py", "__all__ = ['Memory', 'Parallel']\n"),
            (
                "joblib/memory.py",
                "class Memory:\n    def cache(self, func):\n        pass\n",
            ),
            (
                "joblib/parallel.py",
                "def cpu_count():\n    pass\n\nclass Parallel:\n    pass\n",
            ),
        ],
        "1.0",
    );
    release(
        repo_path,
        &[
            (
                "joblib/__init__.py",
                "__all__ = ['Memory', 'Parallel', 'dump']\n",
            ),
            (
                "joblib/memory.py",
                "class Memory:\n    def cache(self, func, ignore):\n        pass\n",
            ),
            (
                "joblib/parallel.py",
                "def cpu_count(only_physical_cores=False):\n    pass\n\nclass Parallel:\n    pass\n",
            ),
        ],
        "2.0",
    );

    temp_dir
}

fn run(args: &[&str]) -> Output {
    Command::new(get_binary_path())
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("API_DRIFT_REPO")
        .output()
        .expect("Failed to execute command")
}

#[test]
fn test_help_output() {
    let output = run(&["--help"]);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("api-drift"));
    assert!(stdout.contains("--old-version"));
    assert!(stdout.contains("--new-version"));
    assert!(stdout.contains("--output-file"));
}

#[test]
fn test_version_output() {
    let output = run(&["--version"]);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("0.1.0"));
}

#[test]
fn test_missing_required_arguments() {
    let output = run(&["--old-version", "1.0"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("--new-version"));
}

#[test]
fn test_nonexistent_repository() {
    let output = run(&[
        "--old-version",
        "1.0",
        "--new-version",
        "2.0",
        "--repo",
        "/nonexistent/api-drift/repo",
    ]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Repository path does not exist"));
    assert!(!stderr.contains("Analyzing changes"));
}

#[test]
fn test_json_output_to_stdout() {
    let repo = create_test_repo();
    let output = run(&[
        "--old-version",
        "1.0",
        "--new-version",
        "2.0",
        "--repo",
        repo.path().to_str().unwrap(),
        "--output",
        "json",
    ]);

    assert!(output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Analyzing changes from 1.0 to 2.0..."));
    assert!(stderr.contains("Total changes: 3"));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("stdout should be JSON");
    let records = parsed.as_array().unwrap();
    assert_eq!(records.len(), 3);

    assert_eq!(records[0]["type"], "added");
    assert_eq!(records[0]["category"], "export");
    assert_eq!(records[0]["module"], "joblib");
    assert_eq!(records[0]["name"], "dump");

    assert_eq!(records[1]["type"], "modified");
    assert_eq!(records[1]["module"], "joblib.memory");
    assert_eq!(records[1]["name"], "Memory.cache");
    assert_eq!(
        records[1]["details"]["new_signature"],
        "cache(self, func, ignore)"
    );

    assert_eq!(records[2]["module"], "joblib.parallel");
    assert_eq!(records[2]["name"], "cpu_count");
}

#[test]
fn test_text_output_to_file() {
    let repo = create_test_repo();
    let out_dir = TempDir::new().unwrap();
    let report_path = out_dir.path().join("reports/changes.md");

    let output = run(&[
        "--old-version",
        "1.0",
        "--new-version",
        "2.0",
        "--repo",
        repo.path().to_str().unwrap(),
        "--output-file",
        report_path.to_str().unwrap(),
    ]);

    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains(&format!("Output written to {}", report_path.display())));
    assert!(stderr.contains("Total changes: 3"));

    let report = std::fs::read_to_string(&report_path).unwrap();
    assert!(report.starts_with("# Joblib API Changes Report"));
    assert!(report.contains("## Added"));
    assert!(report.contains("- `joblib`: export `dump`"));
    assert!(report.contains("## Modified"));
    assert!(report.contains("  - Old: `cache(self, func)`"));
    assert!(report.contains("  - New: `cache(self, func, ignore)`"));
    assert!(!report.contains("## Removed"));
}

#[test]
fn test_identical_revisions_report_no_changes() {
    let repo = create_test_repo();
    let output = run(&[
        "--old-version",
        "2.0",
        "--new-version",
        "2.0",
        "--repo",
        repo.path().to_str().unwrap(),
    ]);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("No public API changes detected."));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Total changes: 0"));
}

#[test]
fn test_unknown_revision_reports_nothing() {
    let repo = create_test_repo();
    let output = run(&[
        "--old-version",
        "0.1",
        "--new-version",
        "0.2",
        "--repo",
        repo.path().to_str().unwrap(),
        "--output",
        "json",
    ]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap().trim(), "[]");
}
