// ResultChannel - Collectorへの単一接続と排他ガード
// 全ワーカーで共有し、1メッセージずつ書き込む

use super::frame::encode_frame;
use crate::core::{FarmError, FarmResult, ResultRecord};
use std::io::ErrorKind;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::sync::Mutex;

/// Collectorへの結果送信チャンネル
///
/// 書き込みは必ずガード取得中に行われるため、並行する`send`のバイト列が
/// ワイヤ上で混ざることはない。
pub struct ResultChannel<W> {
    writer: Mutex<W>,
}

impl<W> ResultChannel<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// 1件の結果をフレームとして完全に書き込む
    pub async fn send(&self, record: &ResultRecord) -> FarmResult<()> {
        let frame = encode_frame(&record.to_message())?;
        let source = &record.source_path;

        let mut writer = self.writer.lock().await;
        writer
            .write_all(&frame)
            .await
            .map_err(|e| FarmError::result_send(source, e))?;
        writer
            .flush()
            .await
            .map_err(|e| FarmError::result_send(source, e))
    }

    /// 書き込み側を閉じ、Collectorに終端を伝える
    pub async fn close(self) -> FarmResult<()> {
        let mut writer = self.writer.into_inner();
        writer
            .shutdown()
            .await
            .map_err(|e| FarmError::collector_io("shutdown connection", e))
    }
}

/// 再接続の方針
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(50),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Collectorのソケットへ接続する
///
/// ソケットがまだ存在しない間は一定間隔で再試行し、それ以外のエラーは即座に失敗する。
pub async fn connect_with_retry(path: &Path, policy: RetryPolicy) -> FarmResult<UnixStream> {
    let started = Instant::now();
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        match UnixStream::connect(path).await {
            Ok(stream) => {
                tracing::debug!(path = %path.display(), attempts, "connected to collector");
                return Ok(stream);
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                if started.elapsed() >= policy.timeout {
                    return Err(FarmError::connect_timeout(
                        path,
                        started.elapsed().as_millis() as u64,
                    ));
                }
                tokio::time::sleep(policy.interval).await;
            }
            Err(e) => return Err(FarmError::connection(path, e)),
        }
    }
}
