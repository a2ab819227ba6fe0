// Frame - 結果メッセージのワイヤ形式
// 4バイトのビッグエンディアン長 + 本文 `"<value> <path>"`（パスはバイト列のまま）

use crate::core::{FarmError, FarmResult};
use tokio::io::{AsyncRead, AsyncReadExt};

/// 1フレームの本文最大長
pub const MAX_FRAME_LEN: usize = 64 * 1024;

const LENGTH_PREFIX: usize = 4;

/// メッセージ本文を1フレームにエンコード
pub fn encode_frame(body: &[u8]) -> FarmResult<Vec<u8>> {
    if body.len() > MAX_FRAME_LEN {
        return Err(FarmError::frame(format!(
            "メッセージ長{}バイトが上限{}バイトを超えています",
            body.len(),
            MAX_FRAME_LEN
        )));
    }

    let mut frame = Vec::with_capacity(LENGTH_PREFIX + body.len());
    frame.extend_from_slice(&(body.len() as u32).to_be_bytes());
    frame.extend_from_slice(body);
    Ok(frame)
}

/// 1フレームを読み取る
///
/// フレーム境界での切断は`Ok(None)`、フレーム途中での切断はエラー。
pub async fn read_frame<R>(reader: &mut R) -> FarmResult<Option<Vec<u8>>>
where
    R: AsyncRead + Unpin,
{
    let mut prefix = [0u8; LENGTH_PREFIX];
    let mut filled = 0;
    while filled < LENGTH_PREFIX {
        let n = reader
            .read(&mut prefix[filled..])
            .await
            .map_err(|e| FarmError::collector_io("read frame header", e))?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(FarmError::frame("フレームヘッダの途中で接続が閉じられました"));
        }
        filled += n;
    }

    let len = u32::from_be_bytes(prefix) as usize;
    if len > MAX_FRAME_LEN {
        return Err(FarmError::frame(format!(
            "フレーム長{len}バイトが上限{MAX_FRAME_LEN}バイトを超えています"
        )));
    }

    let mut body = vec![0u8; len];
    reader.read_exact(&mut body).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            FarmError::frame("フレーム本文の途中で接続が閉じられました")
        } else {
            FarmError::collector_io("read frame body", e)
        }
    })?;

    Ok(Some(body))
}
