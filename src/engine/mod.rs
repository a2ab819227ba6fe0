// エンジン層 - 並列処理とオーケストレーション
// キュー・ワーカー・監視タスクを組み合わせて1回の実行を構成する

pub mod dispatcher;
pub mod farm;
pub mod shutdown;
pub mod worker;

// 公開API - 主要エンジンクラス
pub use dispatcher::Dispatcher;
pub use farm::{run_farm, FarmEngine};
pub use shutdown::{
    CancellationFlag, ShutdownCause, ShutdownMonitor, TerminationSignal, TerminationSignals,
};
pub use worker::{WorkerContext, WorkerPool};
