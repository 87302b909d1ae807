use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

fn jsondiff(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_jsondiff"))
        .args(args)
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to run jsondiff")
}

fn write(dir: &TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, body).unwrap();
    path
}

fn s(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn json_output_lists_differences() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(&dir, "test1.json", r#"{"name": "svc", "replicas": 2, "tags": ["a", "b"]}"#);
    let b = write(&dir, "test2.json5", "{name: 'svc', replicas: 3, tags: ['a'], extra: true}");

    let out = jsondiff(&[s(&a), s(&b), "-o", "json"]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));

    let report: Value = serde_json::from_slice(&out.stdout).unwrap();
    let paths: Vec<&str> = report["differences"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["path"].as_str().unwrap())
        .collect();
    assert_eq!(paths, vec!["replicas", "tags[1]", "extra"]);
    assert_eq!(report["summary"]["added"], 1);
    assert_eq!(report["files"].as_array().unwrap().len(), 2);
}

#[test]
fn identical_files_print_no_differences() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(&dir, "a.json", r#"{"x": [1, 2]}"#);
    let b = write(&dir, "b.json", r#"{"x": [1, 2]}"#);

    let out = jsondiff(&[s(&a), s(&b), "--no-color"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("No differences found."));
}

#[test]
fn ignore_order_flag_matches_reordered_arrays() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(&dir, "a.json", r#"{"x": [1, 2, 3]}"#);
    let b = write(&dir, "b.json", r#"{"x": [3, 2, 1]}"#);

    let out = jsondiff(&[s(&a), s(&b), "-i", "--no-color"]);
    assert!(String::from_utf8_lossy(&out.stdout).contains("No differences found."));

    let out = jsondiff(&[s(&a), s(&b), "--no-color"]);
    assert!(String::from_utf8_lossy(&out.stdout).contains("Total differences: 2"));
}

#[test]
fn output_file_receives_plain_text() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(&dir, "a.json", r#"{"x": 1}"#);
    let b = write(&dir, "b.json", r#"{"x": 2}"#);
    let target = dir.path().join("reports/diff.txt");

    let out = jsondiff(&[s(&a), s(&b), "-o", "tree", "--output-file", s(&target)]);
    assert!(out.status.success());
    assert!(out.stdout.is_empty());

    let written = fs::read_to_string(&target).unwrap();
    assert!(written.contains("└── ~ x"));
    assert!(!written.contains('\u{1b}'));
}

#[test]
fn three_files_compare_against_the_first() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(&dir, "a.json", r#"{"v": 1}"#);
    let b = write(&dir, "b.json", r#"{"v": 2}"#);
    let c = write(&dir, "c.json", r#"{"v": 1, "w": 0}"#);

    let out = jsondiff(&[s(&a), s(&b), s(&c), "-o", "yaml", "--no-stats"]);
    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.contains("comparison between file 0 and file 1"));
    assert!(text.contains("comparison between file 0 and file 2"));
    assert!(!text.contains("summary:"));
}

#[test]
fn single_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(&dir, "a.json", "{}");

    let out = jsondiff(&[s(&a)]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("at least 2 files"));
}

#[test]
fn missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(&dir, "a.json", "{}");
    let missing = dir.path().join("missing.json");

    let out = jsondiff(&[s(&a), s(&missing)]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("file not found"));
}

#[test]
fn filter_keeps_matching_paths() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(&dir, "a.json", r#"{"db": {"host": "a"}, "port": 1}"#);
    let b = write(&dir, "b.json", r#"{"db": {"host": "b"}, "port": 2}"#);

    let out = jsondiff(&[s(&a), s(&b), "-o", "json", "-f", "^db\\."]);
    let report: Value = serde_json::from_slice(&out.stdout).unwrap();
    let diffs = report["differences"].as_array().unwrap();
    assert_eq!(diffs.len(), 1);
    assert_eq!(diffs[0]["path"], "db.host");
}

#[test]
fn depth_help_explains_container_levels() {
    let out = jsondiff(&["--help"]);
    assert!(out.status.success());
    assert!(String::from_utf8_lossy(&out.stdout).contains("number of container levels opened"));
}

#[test]
fn large_integers_and_non_finite_numbers() {
    let dir = tempfile::tempdir().unwrap();
    let a = write(&dir, "a.json", r#"{"id": 9223372036854775808}"#);
    let b = write(&dir, "b.json", r#"{"id": 9223372036854775809}"#);
    let out = jsondiff(&[s(&a), s(&b), "-o", "json"]);
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let report: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["differences"][0]["path"], "id");

    let c = write(&dir, "c.json5", "{id: Infinity}");
    let out = jsondiff(&[s(&a), s(&c)]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("non-finite"));
}
