// Collector - 結果の受信と出力
// 1つの接続だけを受け付け、切断されるまでメッセージを1行ずつ出力する

use super::frame::read_frame;
use crate::core::{FarmError, FarmResult};
use std::path::Path;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::UnixListener;

/// ソケットにバインド済みのCollector
pub struct Collector {
    listener: UnixListener,
}

impl Collector {
    /// ソケットパスにバインドして待ち受けを開始
    pub fn bind(socket_path: impl AsRef<Path>) -> FarmResult<Self> {
        let socket_path = socket_path.as_ref();
        let listener = UnixListener::bind(socket_path)
            .map_err(|e| FarmError::collector_io(format!("bind {}", socket_path.display()), e))?;

        tracing::debug!(socket = %socket_path.display(), "collector is listening");
        Ok(Self { listener })
    }

    /// 1つの接続を受け付け、切断まで受信したメッセージを`out`へ出力する
    ///
    /// 戻り値は受信したメッセージ数。
    pub async fn serve<W>(self, out: &mut W) -> FarmResult<usize>
    where
        W: AsyncWrite + Unpin,
    {
        let (stream, _) = self
            .listener
            .accept()
            .await
            .map_err(|e| FarmError::collector_io("accept", e))?;
        // 以後の接続は受け付けない
        drop(self.listener);

        drain_messages(stream, out).await
    }
}

/// 接続からメッセージを読み切り、1メッセージ1行で出力する
pub async fn drain_messages<R, W>(mut stream: R, out: &mut W) -> FarmResult<usize>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut received = 0;
    while let Some(mut line) = read_frame(&mut stream).await? {
        line.push(b'\n');
        out.write_all(&line)
            .await
            .map_err(|e| FarmError::collector_io("write output", e))?;
        out.flush()
            .await
            .map_err(|e| FarmError::collector_io("flush output", e))?;
        received += 1;
    }

    tracing::debug!(received, "collector connection closed");
    Ok(received)
}
