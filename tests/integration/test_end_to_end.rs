// farm と collector の2プロセスを通した実行テスト

#[path = "../fixtures/mod.rs"]
mod fixtures;

use fixtures::*;
use std::process::Command;
use tempfile::TempDir;

#[test]
fn test_three_zero_files_yield_zero_checksums() {
    let dir = TempDir::new().unwrap();
    let files: Vec<_> = (0..3)
        .map(|i| write_records(dir.path(), &format!("zero{i}.dat"), &[0; 100]))
        .collect();
    for file in &files {
        assert_eq!(std::fs::metadata(file).unwrap().len(), 800);
    }

    let output = farm_command(&dir)
        .args(["-n", "2", "-q", "2"])
        .args(&files)
        .output()
        .expect("Failed to execute farm");

    assert!(output.status.success(), "stderr: {}", stderr_text(&output));
    let mut lines = stdout_lines(&output);
    lines.sort();
    let mut expected: Vec<String> = files
        .iter()
        .map(|f| format!("0 {}", f.display()))
        .collect();
    expected.sort();
    assert_eq!(lines, expected);
}

#[test]
fn test_checksum_matches_formula() {
    let dir = TempDir::new().unwrap();
    let values = [3, -1, 7, i64::MAX, i64::MIN, 42];
    let file = write_records(dir.path(), "mixed.dat", &values);

    let output = farm_command(&dir).arg(&file).output().unwrap();

    assert!(output.status.success());
    assert_eq!(
        stdout_lines(&output),
        vec![format!("{} {}", expected_checksum(&values), file.display())]
    );
}

#[test]
fn test_trailing_partial_record_is_ignored() {
    let dir = TempDir::new().unwrap();
    let file = write_records(dir.path(), "partial.dat", &[5, 6]);
    let mut bytes = std::fs::read(&file).unwrap();
    bytes.extend_from_slice(&[0xff, 0xff, 0xff]);
    std::fs::write(&file, bytes).unwrap();

    let output = farm_command(&dir).arg(&file).output().unwrap();

    assert!(output.status.success());
    assert_eq!(stdout_lines(&output), vec![format!("6 {}", file.display())]);
}

#[test]
fn test_many_files_across_pool_sizes() {
    let dir = TempDir::new().unwrap();
    let files: Vec<_> = (0..12)
        .map(|i| write_records(dir.path(), &format!("f{i}.dat"), &[i, i, i]))
        .collect();

    for threads in ["1", "3", "8"] {
        let output = farm_command(&dir)
            .args(["-n", threads, "-q", "1"])
            .args(&files)
            .output()
            .unwrap();

        assert!(output.status.success());
        let lines = stdout_lines(&output);
        assert_eq!(lines.len(), files.len());
        for (i, file) in files.iter().enumerate() {
            let expected = format!("{} {}", 3 * i as i64, file.display());
            assert!(lines.contains(&expected), "missing {expected}");
        }
    }
}

#[test]
fn test_collector_is_found_next_to_farm() {
    let dir = TempDir::new().unwrap();
    let file = write_records(dir.path(), "one.dat", &[1, 1]);

    let output = Command::new(farm_bin())
        .arg("--socket")
        .arg(socket_path(&dir))
        .arg("--quiet")
        .arg(&file)
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", stderr_text(&output));
    assert_eq!(stdout_lines(&output), vec![format!("1 {}", file.display())]);
}

#[test]
fn test_socket_is_removed_after_run() {
    let dir = TempDir::new().unwrap();
    let file = write_records(dir.path(), "a.dat", &[1]);
    // 前回の実行で残ったソケットファイル
    std::fs::write(socket_path(&dir), b"").unwrap();

    let output = farm_command(&dir).arg(&file).output().unwrap();

    assert!(output.status.success());
    assert!(!socket_path(&dir).exists());
}

#[test]
fn test_no_arguments_prints_usage() {
    let output = Command::new(farm_bin()).output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"));
    assert!(stdout.contains("THREADS"));
}

#[test]
fn test_collector_binary_prints_help() {
    let output = Command::new(collector_bin()).arg("--help").output().unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("--socket"));
}
