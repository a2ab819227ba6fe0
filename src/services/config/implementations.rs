// ファーム設定の具象実装

use crate::core::{FailurePolicy, FarmError, FarmResult};
use crate::ipc::RetryPolicy;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::Semaphore;

/// Collectorと共有する既定のソケットパス
pub const DEFAULT_SOCKET_PATH: &str = "./farm.sck";

/// 実行ファイルと同じディレクトリで探すCollectorのファイル名
pub const COLLECTOR_PROGRAM: &str = "collector";

/// 起動できるワーカー数の上限
pub const MAX_WORKERS: usize = 4096;

/// 1回の実行の設定
#[derive(Debug, Clone, PartialEq)]
pub struct FarmConfig {
    workers: usize,
    queue_depth: usize,
    pacing: Duration,
    socket_path: PathBuf,
    retry: RetryPolicy,
    failure_policy: FailurePolicy,
    collector_program: Option<PathBuf>,
    quiet: bool,
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            queue_depth: 8,
            pacing: Duration::ZERO,
            socket_path: PathBuf::from(DEFAULT_SOCKET_PATH),
            retry: RetryPolicy::default(),
            failure_policy: FailurePolicy::Abort,
            collector_program: None,
            quiet: false,
        }
    }
}

impl FarmConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_queue_depth(mut self, queue_depth: usize) -> Self {
        self.queue_depth = queue_depth;
        self
    }

    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_socket_path(mut self, socket_path: impl Into<PathBuf>) -> Self {
        self.socket_path = socket_path.into();
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_collector_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.collector_program = Some(program.into());
        self
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn queue_depth(&self) -> usize {
        self.queue_depth
    }

    pub fn pacing(&self) -> Duration {
        self.pacing
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    pub fn quiet(&self) -> bool {
        self.quiet
    }

    /// 起動するCollectorのパス
    ///
    /// 明示されていなければ実行中のバイナリと同じディレクトリの`collector`を使う。
    pub fn collector_program(&self) -> FarmResult<PathBuf> {
        if let Some(program) = &self.collector_program {
            return Ok(program.clone());
        }

        let current = std::env::current_exe().map_err(|e| {
            FarmError::configuration(format!("cannot locate running executable: {e}"))
        })?;
        Ok(current.with_file_name(COLLECTOR_PROGRAM))
    }

    /// 設定値の検証
    pub fn validate(&self) -> FarmResult<()> {
        if self.workers == 0 {
            return Err(FarmError::validation("workers", "must be at least 1"));
        }
        if self.workers > MAX_WORKERS {
            return Err(FarmError::validation(
                "workers",
                format!("must be at most {MAX_WORKERS}"),
            ));
        }
        if self.queue_depth == 0 {
            return Err(FarmError::validation("queue_depth", "must be at least 1"));
        }
        if self.queue_depth > Semaphore::MAX_PERMITS {
            return Err(FarmError::validation(
                "queue_depth",
                format!("must be at most {}", Semaphore::MAX_PERMITS),
            ));
        }
        if self.socket_path.as_os_str().is_empty() {
            return Err(FarmError::validation("socket_path", "must not be empty"));
        }
        Ok(())
    }
}
