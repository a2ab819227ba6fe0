// CollectorProcess - Collectorの子プロセス管理
// 起動・終了待ち・終了ステータスの記録

use crate::core::{FarmError, FarmResult};
use std::os::unix::process::ExitStatusExt;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::process::{Child, Command};

/// Collectorの終了状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectorExit {
    /// 正常終了（終了コード付き）
    Exited(i32),
    /// シグナル等による異常終了
    Abnormal(Option<i32>),
}

impl CollectorExit {
    pub fn from_status(status: ExitStatus) -> Self {
        match status.code() {
            Some(code) => Self::Exited(code),
            None => Self::Abnormal(status.signal()),
        }
    }
}

/// 起動済みのCollectorプロセス
pub struct CollectorProcess {
    child: Child,
    program: PathBuf,
}

impl CollectorProcess {
    /// `program --socket <socket_path>` を起動する
    ///
    /// 標準出力は親プロセスと共有し、結果行をそのまま出力させる。
    pub fn spawn(program: &Path, socket_path: &Path) -> FarmResult<Self> {
        let child = Command::new(program)
            .arg("--socket")
            .arg(socket_path)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| FarmError::collector_launch(program, e))?;

        tracing::debug!(pid = child.id(), program = %program.display(), "collector started");
        Ok(Self {
            child,
            program: program.to_path_buf(),
        })
    }

    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    /// 終了を待ち、正常・異常終了を記録する
    pub async fn wait(mut self) -> FarmResult<CollectorExit> {
        let pid = self.id();
        let status = self
            .child
            .wait()
            .await
            .map_err(|e| FarmError::collector_io(format!("wait {}", self.program.display()), e))?;

        let exit = CollectorExit::from_status(status);
        match exit {
            CollectorExit::Exited(code) => {
                tracing::info!(?pid, code, "collector exited normally");
            }
            CollectorExit::Abnormal(signal) => {
                tracing::warn!(?pid, ?signal, "collector terminated abnormally");
            }
        }
        Ok(exit)
    }
}
