// コアレイヤー - 基盤となるトレイト、型、エラー定義
// 他のレイヤーから参照される基本的な抽象化を提供

pub mod error;
pub mod traits;
pub mod types;

pub use error::{ErrorSeverity, FarmError, FarmResult};
pub use traits::{FarmReporter, FileInspector, RecordSource, RecordStream};
pub use types::{
    DispatchReport, FailurePolicy, FileKind, Job, QueueItem, ResultRecord, RunSummary, WorkerStats,
};
