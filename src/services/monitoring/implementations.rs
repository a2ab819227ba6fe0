// 実行状況報告の具象実装
// 標準出力はCollectorの結果行と共有するため、報告はすべて標準エラーへ出す

use crate::core::{FarmReporter, ResultRecord, RunSummary};
use async_trait::async_trait;
use std::path::Path;

/// コンソール出力による報告実装
///
/// quietモードでもスキップ診断とエラーは出力する。
#[derive(Debug, Default, Clone)]
pub struct ConsoleFarmReporter {
    quiet: bool,
}

impl ConsoleFarmReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quiet() -> Self {
        Self { quiet: true }
    }
}

#[async_trait]
impl FarmReporter for ConsoleFarmReporter {
    async fn report_started(&self, candidates: usize) {
        if !self.quiet {
            eprintln!("🚀 Dispatching {candidates} candidate files...");
        }
    }

    async fn report_skipped(&self, path: &Path, reason: &str) {
        eprintln!("⚠️  Skipping {}: {reason}", path.display());
    }

    async fn report_result(&self, record: &ResultRecord) {
        tracing::debug!(value = record.value, path = %record.source_path.display(), "result sent");
    }

    async fn report_error(&self, path: &Path, error: &str) {
        eprintln!("❌ Error processing {}: {error}", path.display());
    }

    async fn report_cancelled(&self) {
        if !self.quiet {
            eprintln!("🛑 Termination requested, draining queued jobs...");
        }
    }

    async fn report_completed(&self, summary: &RunSummary) {
        if !self.quiet {
            eprintln!(
                "✅ Completed! Processed: {}, Skipped: {}, Failed: {} ({}ms)",
                summary.processed, summary.skipped, summary.failed, summary.elapsed_ms
            );
        }
    }
}

/// 何もしない報告実装（テスト・ベンチマーク用）
#[derive(Debug, Default, Clone)]
pub struct NoOpFarmReporter;

impl NoOpFarmReporter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FarmReporter for NoOpFarmReporter {
    async fn report_started(&self, _candidates: usize) {}

    async fn report_skipped(&self, _path: &Path, _reason: &str) {}

    async fn report_result(&self, _record: &ResultRecord) {}

    async fn report_error(&self, _path: &Path, _error: &str) {}

    async fn report_cancelled(&self) {}

    async fn report_completed(&self, _summary: &RunSummary) {}
}
