// ファームの抽象化インターフェース定義
// 外部協力者（ファイル種別判定・レコード読み込み）と報告先をトレイトで切り離す

use super::types::{FileKind, Job, ResultRecord, RunSummary};
use anyhow::Result;
use async_trait::async_trait;
use mockall::automock;
use std::path::Path;
use tokio::io::AsyncRead;

/// ファイル内容を先頭から読み出すストリーム
pub type RecordStream = Box<dyn AsyncRead + Send + Unpin>;

/// パスが通常ファイルかどうかを判定するトレイト
#[automock]
#[async_trait]
pub trait FileInspector: Send + Sync {
    /// 通常ファイルならサイズ付きで`FileKind::Regular`を返す
    async fn inspect(&self, path: &Path) -> Result<FileKind>;
}

/// ジョブのファイル内容を固定長整数列として提供するトレイト
#[automock]
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// ジョブが指すファイルの先頭`job.size()`バイトを読み出すストリームを開く
    async fn open(&self, job: &Job) -> Result<RecordStream>;
}

/// 実行状況の報告を抽象化するトレイト
#[automock]
#[async_trait]
pub trait FarmReporter: Send + Sync {
    /// 走査開始時の報告
    async fn report_started(&self, candidates: usize);

    /// 通常ファイルでないパスをスキップした報告
    async fn report_skipped(&self, path: &Path, reason: &str);

    /// 結果をCollectorへ送信した報告
    async fn report_result(&self, record: &ResultRecord);

    /// ワーカーでのエラー報告
    async fn report_error(&self, path: &Path, error: &str);

    /// 終了シグナルによる走査停止の報告
    async fn report_cancelled(&self);

    /// 実行完了時の報告
    async fn report_completed(&self, summary: &RunSummary);
}

/// 整数列をネイティブバイトオーダーで読み出すストリーム
#[cfg(test)]
pub(crate) fn record_stream(values: &[i64]) -> RecordStream {
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_ne_bytes()).collect();
    Box::new(std::io::Cursor::new(bytes))
}
