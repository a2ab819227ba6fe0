// 終了シグナルによる協調停止のテスト

#[path = "../fixtures/mod.rs"]
mod fixtures;

use fixtures::*;
use std::io::Write;
use std::os::unix::net::UnixStream;
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn send_signal(pid: u32, signal: &str) {
    let status = Command::new("kill")
        .arg(format!("-{signal}"))
        .arg(pid.to_string())
        .status()
        .expect("Failed to execute kill");
    assert!(status.success());
}

/// 端末のCtrl-Cと同様に、プロセスグループ全体へシグナルを送る
fn send_signal_to_group(pgid: u32, signal: &str) {
    let status = Command::new("kill")
        .arg(format!("-{signal}"))
        .arg("--")
        .arg(format!("-{pgid}"))
        .status()
        .expect("Failed to execute kill");
    assert!(status.success());
}

fn run_and_signal(signal: &str) {
    run_and_deliver(|pid| send_signal(pid, signal));
}

fn run_and_deliver(deliver: impl FnOnce(u32)) {
    let dir = TempDir::new().unwrap();
    let files: Vec<_> = (0..60)
        .map(|i| write_records(dir.path(), &format!("f{i}.dat"), &[1, 1]))
        .collect();

    // farmを新しいプロセスグループの先頭にし、Collectorも同じグループに入れる
    let child = farm_command(&dir)
        .args(["-n", "2", "-q", "2", "-t", "50"])
        .args(&files)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .process_group(0)
        .spawn()
        .unwrap();

    std::thread::sleep(Duration::from_millis(500));
    deliver(child.id());

    let output = child.wait_with_output().unwrap();
    assert!(output.status.success(), "stderr: {}", stderr_text(&output));

    // 走査は途中で止まるが、投入済みのジョブはすべて結果になる
    let lines = stdout_lines(&output);
    assert!(lines.len() < files.len());
    for line in &lines {
        assert!(line.starts_with("1 "), "unexpected line {line}");
    }
    assert!(!socket_path(&dir).exists());

    let stderr = stderr_text(&output);
    assert!(!stderr.contains("abnormally"), "stderr: {stderr}");
    assert!(!stderr.contains("never processed"), "stderr: {stderr}");
}

#[test]
fn test_sigterm_drains_and_exits_zero() {
    run_and_signal("TERM");
}

#[test]
fn test_sigint_drains_and_exits_zero() {
    run_and_signal("INT");
}

#[test]
fn test_sighup_drains_and_exits_zero() {
    run_and_signal("HUP");
}

#[test]
fn test_group_sigint_drains_and_exits_zero() {
    run_and_deliver(|pgid| send_signal_to_group(pgid, "INT"));
}

#[test]
fn test_group_sigterm_drains_and_exits_zero() {
    run_and_deliver(|pgid| send_signal_to_group(pgid, "TERM"));
}

#[test]
fn test_collector_outlives_termination_signal() {
    let dir = TempDir::new().unwrap();
    let socket = socket_path(&dir);
    let collector = Command::new(collector_bin())
        .arg("--socket")
        .arg(&socket)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    let started = Instant::now();
    while !socket.exists() {
        assert!(started.elapsed() < Duration::from_secs(10), "collector never bound");
        std::thread::sleep(Duration::from_millis(10));
    }
    send_signal(collector.id(), "INT");
    std::thread::sleep(Duration::from_millis(100));

    let mut stream = UnixStream::connect(&socket).unwrap();
    let body = b"5 /data/late.dat";
    stream.write_all(&(body.len() as u32).to_be_bytes()).unwrap();
    stream.write_all(body).unwrap();
    drop(stream);

    let output = collector.wait_with_output().unwrap();
    assert!(output.status.success(), "stderr: {}", stderr_text(&output));
    assert_eq!(stdout_lines(&output), vec!["5 /data/late.dat".to_string()]);
}
