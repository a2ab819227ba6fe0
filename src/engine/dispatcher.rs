// Dispatcher - ジョブの走査と投入
// 引数順にパスを検査し、通常ファイルだけをキューへ投入する

use super::shutdown::CancellationFlag;
use crate::core::{
    DispatchReport, FarmReporter, FarmResult, FileInspector, FileKind, Job, QueueItem,
};
use crate::queue::BoundedQueue;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// キューへの投入を担うProducer
pub struct Dispatcher<I, R> {
    inspector: Arc<I>,
    reporter: Arc<R>,
    queue: Arc<BoundedQueue<QueueItem>>,
    cancel: Arc<CancellationFlag>,
    pacing: Duration,
}

impl<I, R> Dispatcher<I, R>
where
    I: FileInspector,
    R: FarmReporter,
{
    pub fn new(
        inspector: Arc<I>,
        reporter: Arc<R>,
        queue: Arc<BoundedQueue<QueueItem>>,
        cancel: Arc<CancellationFlag>,
        pacing: Duration,
    ) -> Self {
        Self {
            inspector,
            reporter,
            queue,
            cancel,
            pacing,
        }
    }

    /// パスを走査してジョブを投入し、最後に終端マーカーを1つ投入する
    ///
    /// キャンセルフラグは投入のたびに確認し、立っていれば走査を打ち切る。
    /// 投入済みのジョブは取り消さない。
    pub async fn dispatch(&self, paths: &[PathBuf]) -> FarmResult<DispatchReport> {
        let report = self.scan(paths).await?;
        self.queue.push(QueueItem::Terminate).await?;
        tracing::debug!(?report, "termination marker enqueued");
        Ok(report)
    }

    async fn scan(&self, paths: &[PathBuf]) -> FarmResult<DispatchReport> {
        let mut report = DispatchReport {
            candidates: paths.len(),
            ..DispatchReport::default()
        };

        for path in paths {
            if self.cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            let size = match self.inspector.inspect(path).await {
                Ok(FileKind::Regular { size }) => size,
                Ok(FileKind::Other) => {
                    self.reporter
                        .report_skipped(path, "not a regular file")
                        .await;
                    report.skipped += 1;
                    continue;
                }
                Err(error) => {
                    self.reporter
                        .report_skipped(path, &format!("{error:#}"))
                        .await;
                    report.skipped += 1;
                    continue;
                }
            };

            if !self.pacing.is_zero() {
                tokio::time::sleep(self.pacing).await;
            }
            if self.cancel.is_cancelled() {
                report.cancelled = true;
                break;
            }

            self.queue.push(Job::new(path, size).into()).await?;
            report.dispatched += 1;
        }

        if report.cancelled {
            self.reporter.report_cancelled().await;
        }
        Ok(report)
    }
}
