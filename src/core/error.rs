// ファームのエラー型定義
// セットアップ時の失敗とジョブ単位の失敗を型で区別する

use std::path::PathBuf;
use thiserror::Error;

/// ファーム処理固有のエラー型
#[derive(Error, Debug)]
pub enum FarmError {
    #[error("設定エラー: {message}")]
    ConfigurationError { message: String },

    #[error("バリデーションエラー: {field} - {reason}")]
    ValidationError { field: String, reason: String },

    #[error("シグナル監視の初期化エラー: {source}")]
    SignalSetupError {
        #[source]
        source: std::io::Error,
    },

    #[error("Collectorへの接続エラー: {} - {source}", .path.display())]
    ConnectionError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Collectorへの接続タイムアウト: {} ({waited_ms}ms)", .path.display())]
    ConnectTimeoutError { path: PathBuf, waited_ms: u64 },

    #[error("Collectorプロセスの起動エラー: {} - {source}", .program.display())]
    CollectorLaunchError {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Collector入出力エラー: {operation} - {source}")]
    CollectorIoError {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ジョブキューが閉じられています")]
    QueueClosedError,

    #[error("ファイル読み込みエラー: {} - {source}", .path.display())]
    RecordLoadError {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("結果送信エラー: {} - {source}", .path.display())]
    ResultSendError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("フレームエラー: {message}")]
    FrameError { message: String },

    #[error("タスクエラー: {source}")]
    TaskError {
        #[source]
        source: tokio::task::JoinError,
    },

    #[error("内部エラー: {source}")]
    InternalError {
        #[source]
        source: anyhow::Error,
    },
}

impl FarmError {
    /// 設定エラーの作成
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::ConfigurationError {
            message: message.into(),
        }
    }

    /// バリデーションエラーの作成
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn signal_setup(source: std::io::Error) -> Self {
        Self::SignalSetupError { source }
    }

    /// 接続エラーの作成
    pub fn connection(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConnectionError {
            path: path.into(),
            source,
        }
    }

    pub fn connect_timeout(path: impl Into<PathBuf>, waited_ms: u64) -> Self {
        Self::ConnectTimeoutError {
            path: path.into(),
            waited_ms,
        }
    }

    pub fn collector_launch(program: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CollectorLaunchError {
            program: program.into(),
            source,
        }
    }

    pub fn collector_io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::CollectorIoError {
            operation: operation.into(),
            source,
        }
    }

    /// ファイル読み込みエラーの作成
    pub fn record_load(path: impl Into<PathBuf>, source: anyhow::Error) -> Self {
        Self::RecordLoadError {
            path: path.into(),
            source,
        }
    }

    /// 結果送信エラーの作成
    pub fn result_send(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ResultSendError {
            path: path.into(),
            source,
        }
    }

    pub fn frame(message: impl Into<String>) -> Self {
        Self::FrameError {
            message: message.into(),
        }
    }

    pub fn task(source: tokio::task::JoinError) -> Self {
        Self::TaskError { source }
    }

    pub fn internal(source: anyhow::Error) -> Self {
        Self::InternalError { source }
    }

    /// エラーの重要度を取得
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ValidationError { .. } | Self::InternalError { .. } => ErrorSeverity::Critical,
            Self::ConfigurationError { .. }
            | Self::SignalSetupError { .. }
            | Self::ConnectionError { .. }
            | Self::ConnectTimeoutError { .. }
            | Self::CollectorLaunchError { .. }
            | Self::CollectorIoError { .. } => ErrorSeverity::High,
            Self::RecordLoadError { .. } | Self::ResultSendError { .. } => ErrorSeverity::High,
            Self::FrameError { .. } | Self::TaskError { .. } => ErrorSeverity::Medium,
            Self::QueueClosedError => ErrorSeverity::Low,
        }
    }

    /// エラーが回復可能かどうかを判定
    ///
    /// 回復可能なのはファイル単位の読み込み失敗のみ（`--keep-going`時にスキップ対象）
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::RecordLoadError { .. })
    }
}

/// エラーの重要度レベル
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// 低重要度 - ログ出力程度
    Low,
    /// 中重要度 - 警告レベル
    Medium,
    /// 高重要度 - 要対応
    High,
    /// 致命的 - システム停止レベル
    Critical,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Critical => "CRITICAL",
        }
    }
}

/// ファーム処理の結果型
pub type FarmResult<T> = std::result::Result<T, FarmError>;

impl From<anyhow::Error> for FarmError {
    fn from(error: anyhow::Error) -> Self {
        FarmError::InternalError { source: error }
    }
}

impl From<tokio::task::JoinError> for FarmError {
    fn from(error: tokio::task::JoinError) -> Self {
        FarmError::TaskError { source: error }
    }
}
