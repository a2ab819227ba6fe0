// WorkerPool - ジョブを処理する並列ワーカー群
// 終端マーカーを次のワーカーへ中継してから抜ける（poison-pill relay）

use crate::checksum::checksum_stream;
use crate::core::{
    FailurePolicy, FarmError, FarmReporter, FarmResult, Job, QueueItem, RecordSource,
    ResultRecord, WorkerStats,
};
use crate::ipc::ResultChannel;
use crate::queue::BoundedQueue;
use std::sync::Arc;
use tokio::io::AsyncWrite;
use tokio::task::JoinHandle;

/// 全ワーカーで共有する依存関係
pub struct WorkerContext<S, R, W> {
    pub queue: Arc<BoundedQueue<QueueItem>>,
    pub channel: Arc<ResultChannel<W>>,
    pub source: Arc<S>,
    pub reporter: Arc<R>,
    pub policy: FailurePolicy,
}

/// 起動済みのワーカー群
pub struct WorkerPool {
    handles: Vec<JoinHandle<FarmResult<WorkerStats>>>,
}

impl WorkerPool {
    /// 同一ループを実行するワーカーを`count`個起動する
    ///
    /// ワーカー数はDispatcher側から知る必要がない。終端マーカー1つが
    /// ワーカーからワーカーへ中継され、全員を順に退出させる。
    pub fn spawn<S, R, W>(count: usize, context: WorkerContext<S, R, W>) -> Self
    where
        S: RecordSource + 'static,
        R: FarmReporter + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let context = Arc::new(context);
        let handles = (0..count)
            .map(|worker_id| {
                let context = Arc::clone(&context);
                tokio::spawn(async move { run_worker(worker_id, context).await })
            })
            .collect();

        Self { handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// 全ワーカーの終了を待つ
    ///
    /// いずれかのワーカーが致命エラーで抜けた場合は、全員の終了を待った上で
    /// 最初のエラーを返す。
    pub async fn join(self) -> FarmResult<WorkerStats> {
        let mut total = WorkerStats::default();
        let mut first_error = None;

        for handle in self.handles {
            match handle.await {
                Ok(Ok(stats)) => total = total.merge(stats),
                Ok(Err(error)) => {
                    first_error.get_or_insert(error);
                }
                Err(join_error) => {
                    first_error.get_or_insert(FarmError::task(join_error));
                }
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(total),
        }
    }
}

async fn run_worker<S, R, W>(
    worker_id: usize,
    context: Arc<WorkerContext<S, R, W>>,
) -> FarmResult<WorkerStats>
where
    S: RecordSource,
    R: FarmReporter,
    W: AsyncWrite + Unpin + Send,
{
    let mut stats = WorkerStats::default();
    tracing::debug!(worker_id, "worker started");

    loop {
        let item = match context.queue.pop().await {
            Ok(item) => item,
            // 他のワーカーが異常停止させた
            Err(FarmError::QueueClosedError) => break,
            Err(error) => return Err(error),
        };

        let job = match item {
            QueueItem::Job(job) => job,
            QueueItem::Terminate => {
                // 次に待っているワーカーにも見えるよう戻してから抜ける
                match context.queue.push(QueueItem::Terminate).await {
                    Ok(()) | Err(FarmError::QueueClosedError) => break,
                    Err(error) => return Err(error),
                }
            }
        };

        match process_job(&context, &job).await {
            Ok(()) => stats.processed += 1,
            Err(error) => {
                context
                    .reporter
                    .report_error(job.path(), &error.to_string())
                    .await;

                if error.is_recoverable() && context.policy == FailurePolicy::SkipFailed {
                    stats.failed += 1;
                    continue;
                }

                tracing::error!(worker_id, %error, "worker failed, aborting run");
                context.queue.close();
                return Err(error);
            }
        }
    }

    tracing::debug!(worker_id, ?stats, "worker exiting");
    Ok(stats)
}

/// 1ジョブ分の読み込み・計算・送信
async fn process_job<S, R, W>(context: &WorkerContext<S, R, W>, job: &Job) -> FarmResult<()>
where
    S: RecordSource,
    R: FarmReporter,
    W: AsyncWrite + Unpin + Send,
{
    let stream = context
        .source
        .open(job)
        .await
        .map_err(|e| FarmError::record_load(job.path(), e))?;
    let checksum = checksum_stream(stream)
        .await
        .map_err(|e| FarmError::record_load(job.path(), e.into()))?;
    tracing::trace!(path = %job.path().display(), records = checksum.records(), "checksum computed");

    let record = ResultRecord::for_job(job, checksum.value());
    context.channel.send(&record).await?;
    context.reporter.report_result(&record).await;
    Ok(())
}
