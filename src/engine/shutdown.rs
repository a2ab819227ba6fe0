// ShutdownMonitor - 終了シグナルの監視とキャンセルフラグ
// データ経路から独立したタスクで、シグナル受信時にフラグを一度だけ立てる

use crate::core::{FarmError, FarmResult};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::signal::unix::{signal, Signal, SignalKind};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// 実行単位で共有するキャンセルフラグ
///
/// 書き込みはShutdownMonitorのみ、読み取りはDispatcherのみ。
/// 読み書きとも単純なatomic load/storeで行う。
#[derive(Debug, Default)]
pub struct CancellationFlag {
    cancelled: AtomicBool,
}

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

/// 監視対象の終了シグナル
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    Interrupt,
    Quit,
    Terminate,
    Hangup,
}

/// 監視タスクが終了した理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownCause {
    /// 終了シグナルを受信してフラグを立てた
    Signal(TerminationSignal),
    /// 走査完了によりDispatcherから停止を要求された
    Stopped,
    /// シグナル源が閉じた
    SourceClosed,
}

/// SIGINT / SIGQUIT / SIGTERM / SIGHUP のハンドラ群
pub struct TerminationSignals {
    interrupt: Signal,
    quit: Signal,
    terminate: Signal,
    hangup: Signal,
}

impl TerminationSignals {
    /// ハンドラを登録する。ランタイム内から呼び出すこと。
    pub fn register() -> FarmResult<Self> {
        Ok(Self {
            interrupt: signal(SignalKind::interrupt()).map_err(FarmError::signal_setup)?,
            quit: signal(SignalKind::quit()).map_err(FarmError::signal_setup)?,
            terminate: signal(SignalKind::terminate()).map_err(FarmError::signal_setup)?,
            hangup: signal(SignalKind::hangup()).map_err(FarmError::signal_setup)?,
        })
    }

    /// いずれかの終了シグナルを待つ。繰り返し呼び出してよい。
    pub async fn recv(&mut self) -> Option<TerminationSignal> {
        tokio::select! {
            received = self.interrupt.recv() => received.map(|_| TerminationSignal::Interrupt),
            received = self.quit.recv() => received.map(|_| TerminationSignal::Quit),
            received = self.terminate.recv() => received.map(|_| TerminationSignal::Terminate),
            received = self.hangup.recv() => received.map(|_| TerminationSignal::Hangup),
        }
    }
}

/// 実行ごとに1つだけ起動する監視タスク
pub struct ShutdownMonitor {
    flag: Arc<CancellationFlag>,
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<ShutdownCause>,
}

impl ShutdownMonitor {
    /// OSの終了シグナルを監視するタスクを起動
    pub fn spawn(flag: Arc<CancellationFlag>) -> FarmResult<Self> {
        let mut signals = TerminationSignals::register()?;
        Ok(Self::spawn_with(flag, async move { signals.recv().await }))
    }

    /// 任意の終了通知源を監視するタスクを起動
    pub fn spawn_with<F>(flag: Arc<CancellationFlag>, termination: F) -> Self
    where
        F: Future<Output = Option<TerminationSignal>> + Send + 'static,
    {
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let task_flag = Arc::clone(&flag);

        let handle = tokio::spawn(async move {
            tokio::select! {
                received = termination => match received {
                    Some(signal) => {
                        task_flag.cancel();
                        tracing::info!(?signal, "termination signal received, draining");
                        ShutdownCause::Signal(signal)
                    }
                    None => ShutdownCause::SourceClosed,
                },
                _ = stop_rx => {
                    tracing::debug!("shutdown monitor stopped");
                    ShutdownCause::Stopped
                }
            }
        });

        Self {
            flag,
            stop_tx,
            handle,
        }
    }

    pub fn flag(&self) -> Arc<CancellationFlag> {
        Arc::clone(&self.flag)
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.is_cancelled()
    }

    /// 停止を要求する。終了は待たない。
    pub fn stop(self) {
        // 既に終了している場合は受信側が無いので送信失敗は無視してよい
        let _ = self.stop_tx.send(());
    }

    /// 監視タスクの終了を待つ
    pub async fn join(self) -> FarmResult<ShutdownCause> {
        drop(self.stop_tx);
        self.handle.await.map_err(FarmError::task)
    }
}
