// サービス層 - 外部協力者の具象実装と設定
// コアのトレイトをローカル環境向けに実装する

pub mod config;
pub mod inspector;
pub mod loader;
pub mod monitoring;

// 公開API
pub use config::{FailurePolicy, FarmConfig};
pub use inspector::LocalFileInspector;
pub use loader::LocalRecordSource;
pub use monitoring::{ConsoleFarmReporter, NoOpFarmReporter};
