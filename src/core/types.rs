// ファームで扱うデータ型定義

use std::fmt;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};

/// 1ファイル分の処理単位
///
/// Dispatcherが生成し、キューを経由してちょうど1つのワーカーが消費する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    path: PathBuf,
    size: u64,
}

impl Job {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// ディスパッチ時点でのファイルサイズ（バイト）
    pub fn size(&self) -> u64 {
        self.size
    }
}

/// キューに流れる要素
///
/// `Terminate`は終端マーカー。どの`Job`とも区別される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueItem {
    Job(Job),
    Terminate,
}

impl From<Job> for QueueItem {
    fn from(job: Job) -> Self {
        Self::Job(job)
    }
}

/// ワーカーが算出した1ファイル分の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRecord {
    pub value: i64,
    pub source_path: PathBuf,
}

impl ResultRecord {
    pub fn new(value: i64, source_path: impl Into<PathBuf>) -> Self {
        Self {
            value,
            source_path: source_path.into(),
        }
    }

    pub fn for_job(job: &Job, value: i64) -> Self {
        Self::new(value, job.path())
    }

    /// `"<value> <path>"` 形式のメッセージ本文
    ///
    /// パスはUTF-8でなくてもバイト列のまま埋め込む。
    pub fn to_message(&self) -> Vec<u8> {
        let mut message = format!("{} ", self.value).into_bytes();
        message.extend_from_slice(self.source_path.as_os_str().as_bytes());
        message
    }
}

impl fmt::Display for ResultRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.source_path.display())
    }
}

/// ファイル種別の判定結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Regular { size: u64 },
    Other,
}

/// ファイル読み込み失敗時の方針
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// 実行全体を停止する
    #[default]
    Abort,
    /// 診断を出してそのファイルだけを飛ばす
    SkipFailed,
}

/// ワーカー1つ分の処理件数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub processed: usize,
    pub failed: usize,
}

impl WorkerStats {
    pub fn merge(self, other: WorkerStats) -> WorkerStats {
        WorkerStats {
            processed: self.processed + other.processed,
            failed: self.failed + other.failed,
        }
    }
}

/// Dispatcherの走査結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub candidates: usize,
    pub dispatched: usize,
    pub skipped: usize,
    pub cancelled: bool,
}

/// 実行全体のサマリー
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub candidates: usize,
    pub dispatched: usize,
    pub skipped: usize,
    pub processed: usize,
    pub failed: usize,
    pub cancelled: bool,
    pub elapsed_ms: u64,
}

impl RunSummary {
    pub fn new(dispatch: DispatchReport, workers: WorkerStats, elapsed_ms: u64) -> Self {
        Self {
            candidates: dispatch.candidates,
            dispatched: dispatch.dispatched,
            skipped: dispatch.skipped,
            processed: workers.processed,
            failed: workers.failed,
            cancelled: dispatch.cancelled,
            elapsed_ms,
        }
    }
}
