//! ローカル並列ファイル処理ファーム
//!
//! 固定長レコードのファイル群をワーカープールへ分配し、各ファイルの加重チェックサムを
//! Unixドメインソケット経由で別プロセスのCollectorへ送る。

pub mod checksum;
pub mod cli;
pub mod core;
pub mod engine;
pub mod ipc;
pub mod queue;
pub mod services;

pub use crate::core::{FarmError, FarmResult, ResultRecord, RunSummary};
pub use crate::engine::{run_farm, FarmEngine};
pub use crate::services::FarmConfig;
