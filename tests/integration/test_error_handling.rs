// スキップ診断・引数エラー・セットアップ失敗のテスト

#[path = "../fixtures/mod.rs"]
mod fixtures;

use fixtures::*;
use tempfile::TempDir;

#[test]
fn test_missing_path_is_diagnosed_and_skipped() {
    let dir = TempDir::new().unwrap();
    let first = write_records(dir.path(), "a.dat", &[0, 2]);
    let missing = dir.path().join("does-not-exist.dat");
    let second = write_records(dir.path(), "b.dat", &[0, 0, 3]);

    let output = farm_command(&dir)
        .arg(&first)
        .arg(&missing)
        .arg(&second)
        .output()
        .unwrap();

    assert!(output.status.success());
    let stderr = stderr_text(&output);
    let diagnostics: Vec<_> = stderr
        .lines()
        .filter(|line| line.contains("does-not-exist.dat"))
        .collect();
    assert_eq!(diagnostics.len(), 1, "stderr: {stderr}");

    let mut lines = stdout_lines(&output);
    lines.sort();
    assert_eq!(
        lines,
        vec![
            format!("2 {}", first.display()),
            format!("6 {}", second.display())
        ]
    );
}

#[test]
fn test_directory_argument_is_skipped() {
    let dir = TempDir::new().unwrap();
    let file = write_records(dir.path(), "a.dat", &[1]);

    let output = farm_command(&dir)
        .arg(dir.path())
        .arg(&file)
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(stderr_text(&output).contains("not a regular file"));
    assert_eq!(stdout_lines(&output).len(), 1);
}

#[test]
fn test_non_numeric_option_exits_with_one() {
    let dir = TempDir::new().unwrap();
    let output = farm_command(&dir).args(["-n", "four", "x.dat"]).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout_lines(&output).is_empty());
}

#[test]
fn test_overflowing_option_exits_with_two() {
    let dir = TempDir::new().unwrap();
    let output = farm_command(&dir)
        .args(["-q", "123456789012345678901234567890", "x.dat"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn test_out_of_range_option_exits_with_one() {
    let dir = TempDir::new().unwrap();
    for args in [["-n", "0"], ["-t", "-5"]] {
        let output = farm_command(&dir).args(args).arg("x.dat").output().unwrap();
        assert_eq!(output.status.code(), Some(1));
    }
}

#[test]
fn test_unknown_flag_exits_with_one() {
    let dir = TempDir::new().unwrap();
    let output = farm_command(&dir).arg("--bogus").output().unwrap();

    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_missing_collector_program_fails() {
    let dir = TempDir::new().unwrap();
    let file = write_records(dir.path(), "a.dat", &[1]);

    let output = std::process::Command::new(farm_bin())
        .arg("--socket")
        .arg(socket_path(&dir))
        .arg("--collector")
        .arg(dir.path().join("no-such-collector"))
        .arg(&file)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_text(&output).contains("no-such-collector"));
}

#[test]
fn test_deep_queue_is_allocated_on_demand() {
    let dir = TempDir::new().unwrap();
    let first = write_records(dir.path(), "a.dat", &[0, 4]);
    let second = write_records(dir.path(), "b.dat", &[0, 0, 1]);

    let output = farm_command(&dir)
        .args(["-q", "100000000000000"])
        .arg(&first)
        .arg(&second)
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", stderr_text(&output));
    let mut lines = stdout_lines(&output);
    lines.sort();
    assert_eq!(
        lines,
        vec![
            format!("2 {}", second.display()),
            format!("4 {}", first.display())
        ]
    );
    assert!(!socket_path(&dir).exists());
}

#[test]
fn test_excessive_worker_count_fails_before_collector_starts() {
    let dir = TempDir::new().unwrap();
    let file = write_records(dir.path(), "a.dat", &[1]);

    let output = farm_command(&dir)
        .args(["-n", "100000000000000"])
        .arg(&file)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_text(&output).contains("workers"));
    assert!(stdout_lines(&output).is_empty());
    assert!(!socket_path(&dir).exists());
}
