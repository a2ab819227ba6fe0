// 統合テスト用のヘルパー
// レコードファイルの生成とfarmバイナリの起動

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub fn farm_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_farm"))
}

pub fn collector_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_collector"))
}

/// ネイティブエンディアンの8バイト整数列としてファイルを書き出す
pub fn write_records(dir: &Path, name: &str, values: &[i64]) -> PathBuf {
    let path = dir.join(name);
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_ne_bytes()).collect();
    std::fs::write(&path, bytes).unwrap();
    path
}

/// `Σ i * content[i]` を折り返し演算で計算
pub fn expected_checksum(values: &[i64]) -> i64 {
    values
        .iter()
        .enumerate()
        .fold(0i64, |acc, (i, v)| acc.wrapping_add((i as i64).wrapping_mul(*v)))
}

pub fn socket_path(dir: &TempDir) -> PathBuf {
    dir.path().join("farm.sck")
}

/// 一時ディレクトリのソケットを使うfarmコマンド
pub fn farm_command(dir: &TempDir) -> Command {
    let mut command = Command::new(farm_bin());
    command
        .arg("--socket")
        .arg(socket_path(dir))
        .arg("--collector")
        .arg(collector_bin())
        .arg("--quiet");
    command
}

pub fn stdout_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}

pub fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
