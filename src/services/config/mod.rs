// 設定管理機能

pub mod implementations;

// 公開API
pub use crate::core::FailurePolicy;
pub use implementations::{FarmConfig, COLLECTOR_PROGRAM, DEFAULT_SOCKET_PATH};
