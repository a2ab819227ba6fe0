// CLI層 - コマンドライン引数の定義と処理
// ユーザーインターフェースとアプリケーションロジックの橋渡し

pub mod args;

// 公開API
pub use args::{parse_number, ArgumentError, Cli};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// `RUST_LOG`未設定時のフィルタ
///
/// 警告以上に加え、Collectorの終了状態の記録だけはinfoで出力する。
pub const DEFAULT_LOG_FILTER: &str = "farm=warn,farm::ipc::process=info";

/// 標準エラーへ出力するトレーシングを初期化する
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
