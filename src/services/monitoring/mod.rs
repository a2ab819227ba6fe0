// 実行状況の監視機能
// 開始・スキップ診断・エラー・完了の報告

pub mod implementations;

// 公開API
pub use implementations::{ConsoleFarmReporter, NoOpFarmReporter};
