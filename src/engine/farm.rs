// FarmEngine - 依存性注入によるファームのオーケストレーション
// Dispatcher・WorkerPool・ShutdownMonitorを組み立て、終了順序を管理する

use super::dispatcher::Dispatcher;
use super::shutdown::{CancellationFlag, ShutdownMonitor};
use super::worker::{WorkerContext, WorkerPool};
use crate::core::{
    FarmError, FarmReporter, FarmResult, FileInspector, QueueItem, RecordSource, RunSummary,
};
use crate::ipc::{connect_with_retry, CollectorProcess, ResultChannel};
use crate::queue::BoundedQueue;
use crate::services::{ConsoleFarmReporter, FarmConfig, LocalFileInspector, LocalRecordSource};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::io::AsyncWrite;

/// 接続済みのストリームに対して1回の実行を行うエンジン
///
/// 依存関係はすべてコンストラクタで注入する。Collectorの起動と接続は
/// `run_farm`が担い、エンジン自体は任意の書き込み先で動作する。
pub struct FarmEngine<I, S, R> {
    inspector: Arc<I>,
    source: Arc<S>,
    reporter: Arc<R>,
    config: Arc<FarmConfig>,
}

impl<I, S, R> FarmEngine<I, S, R>
where
    I: FileInspector + 'static,
    S: RecordSource + 'static,
    R: FarmReporter + 'static,
{
    pub fn new(inspector: I, source: S, reporter: R, config: FarmConfig) -> Self {
        Self {
            inspector: Arc::new(inspector),
            source: Arc::new(source),
            reporter: Arc::new(reporter),
            config: Arc::new(config),
        }
    }

    /// パス一覧を処理し、結果を`writer`へ送る
    ///
    /// 終了順序: 終端マーカー投入 → 監視タスクの停止または合流 → 全ワーカー合流
    /// → キュー破棄 → チャンネルと接続のクローズ。
    pub async fn run<W>(
        &self,
        paths: &[PathBuf],
        writer: W,
        monitor: ShutdownMonitor,
    ) -> FarmResult<RunSummary>
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        self.config.validate()?;
        let started = Instant::now();

        let queue = Arc::new(BoundedQueue::new(self.config.queue_depth())?);
        let channel = Arc::new(ResultChannel::new(writer));

        self.reporter.report_started(paths.len()).await;

        let pool = WorkerPool::spawn(
            self.config.workers(),
            WorkerContext {
                queue: Arc::clone(&queue),
                channel: Arc::clone(&channel),
                source: Arc::clone(&self.source),
                reporter: Arc::clone(&self.reporter),
                policy: self.config.failure_policy(),
            },
        );
        tracing::debug!(workers = pool.len(), queue_depth = queue.capacity(), "worker pool started");

        let dispatcher = Dispatcher::new(
            Arc::clone(&self.inspector),
            Arc::clone(&self.reporter),
            Arc::clone(&queue),
            monitor.flag(),
            self.config.pacing(),
        );
        let dispatched = dispatcher.dispatch(paths).await;
        drop(dispatcher);

        if monitor.is_cancelled() {
            let cause = monitor.join().await?;
            tracing::info!(?cause, "shutdown monitor joined");
        } else {
            monitor.stop();
        }

        let workers = pool.join().await;
        teardown_queue(queue);

        // ワーカーの失敗でキューが閉じられた場合、Dispatcher側のエラーは二次的なもの
        let workers = workers?;
        let dispatch = dispatched?;

        match Arc::try_unwrap(channel) {
            Ok(channel) => channel.close().await?,
            Err(_) => {
                return Err(FarmError::internal(anyhow::anyhow!(
                    "result channel is still shared after workers joined"
                )))
            }
        }

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let summary = RunSummary::new(dispatch, workers, elapsed_ms);
        tracing::info!(?summary, "farm run finished");
        self.reporter.report_completed(&summary).await;
        Ok(summary)
    }
}

/// キューを破棄し、取り残されたジョブを記録する
fn teardown_queue(queue: Arc<BoundedQueue<QueueItem>>) {
    let queue = match Arc::try_unwrap(queue) {
        Ok(queue) => queue,
        Err(_) => {
            tracing::warn!("job queue is still shared, skipping teardown");
            return;
        }
    };

    let closed = queue.is_closed();
    let mut leftover_jobs = 0usize;
    let remaining = queue.destroy_with(|item| {
        if let QueueItem::Job(job) = item {
            leftover_jobs += 1;
            tracing::warn!(path = %job.path().display(), "job was never processed");
        }
    });
    tracing::debug!(remaining, leftover_jobs, closed, "job queue destroyed");
}

/// ソケットパスに残った前回のファイルを削除する
async fn remove_socket_file(path: &Path) -> FarmResult<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(FarmError::collector_io(
            format!("remove socket {}", path.display()),
            e,
        )),
    }
}

/// Collectorプロセスを起動して接続し、1回の実行を最後まで行う
///
/// Collectorの終了状態は記録するだけで、実行結果には影響しない。
pub async fn run_farm(config: FarmConfig, paths: &[PathBuf]) -> FarmResult<RunSummary> {
    config.validate()?;

    // シグナルはCollectorの起動より前に捕捉しておく
    let monitor = ShutdownMonitor::spawn(Arc::new(CancellationFlag::new()))?;

    let socket = config.socket_path().to_path_buf();
    remove_socket_file(&socket).await?;

    let program = config.collector_program()?;
    let collector = CollectorProcess::spawn(&program, &socket)?;

    let stream = match connect_with_retry(&socket, config.retry()).await {
        Ok(stream) => stream,
        Err(error) => {
            // kill_on_drop によりCollectorも停止する
            drop(collector);
            remove_socket_file(&socket).await?;
            return Err(error);
        }
    };

    let reporter = if config.quiet() {
        ConsoleFarmReporter::quiet()
    } else {
        ConsoleFarmReporter::new()
    };
    let engine = FarmEngine::new(
        LocalFileInspector::new(),
        LocalRecordSource::new(),
        reporter,
        config,
    );

    let outcome = engine.run(paths, stream, monitor).await;

    if let Err(error) = collector.wait().await {
        tracing::warn!(%error, "failed to wait for collector");
    }
    remove_socket_file(&socket).await?;

    outcome
}
