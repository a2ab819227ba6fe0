// IPC層 - Collectorとのプロセス間通信
// ワイヤ形式、送信チャンネル、受信側、子プロセス管理

pub mod channel;
pub mod collector;
pub mod frame;
pub mod process;

pub use channel::{connect_with_retry, ResultChannel, RetryPolicy};
pub use collector::{drain_messages, Collector};
pub use frame::{encode_frame, read_frame, MAX_FRAME_LEN};
pub use process::{CollectorExit, CollectorProcess};
