// Checksum - 固定長整数レコードの重み付きチェックサム
// ファイル内容を8バイト符号付き整数の列として先頭から逐次処理する

use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};

/// 1レコードのバイト幅
pub const RECORD_WIDTH: usize = 8;

/// 1回の読み込みで処理する最大バイト数
pub const CHUNK_SIZE: usize = 256 * 1024;

/// 完全な8バイトレコードのみを公開する読み取り専用ビュー
///
/// 末尾の8バイトに満たない端数は`tail`として分けて保持する。
#[derive(Debug, Clone, Copy)]
pub struct RecordView<'a> {
    records: &'a [u8],
    tail: &'a [u8],
}

impl<'a> RecordView<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        let whole = bytes.len() - bytes.len() % RECORD_WIDTH;
        let (records, tail) = bytes.split_at(whole);
        Self { records, tail }
    }

    /// レコード数 = floor(バイト数 / 8)
    pub fn len(&self) -> usize {
        self.records.len() / RECORD_WIDTH
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + 'a {
        self.records.chunks_exact(RECORD_WIDTH).map(decode_record)
    }

    /// レコードに満たない末尾のバイト列
    pub fn tail(&self) -> &'a [u8] {
        self.tail
    }
}

fn decode_record(chunk: &[u8]) -> i64 {
    let mut raw = [0u8; RECORD_WIDTH];
    raw.copy_from_slice(chunk);
    i64::from_ne_bytes(raw)
}

/// `Σ i * content[i]` を2の補数の折り返し演算で逐次計算する
///
/// バイト列は任意の位置で分割して`update`に渡してよい。塊の境界をまたぐ
/// レコードは次の塊まで持ち越され、最後まで揃わなかった端数は無視される。
#[derive(Debug, Clone, Default)]
pub struct WeightedChecksum {
    value: i64,
    records: u64,
    pending: [u8; RECORD_WIDTH],
    pending_len: usize,
}

impl WeightedChecksum {
    pub fn new() -> Self {
        Self::default()
    }

    /// 次の塊を取り込む
    pub fn update(&mut self, mut bytes: &[u8]) {
        if self.pending_len > 0 {
            let take = (RECORD_WIDTH - self.pending_len).min(bytes.len());
            self.pending[self.pending_len..self.pending_len + take]
                .copy_from_slice(&bytes[..take]);
            self.pending_len += take;
            bytes = &bytes[take..];

            if self.pending_len < RECORD_WIDTH {
                return;
            }
            let value = i64::from_ne_bytes(self.pending);
            self.pending_len = 0;
            self.add_records(std::iter::once(value), 1);
        }

        let view = RecordView::new(bytes);
        if !view.is_empty() {
            self.add_records(view.iter(), view.len() as u64);
        }

        let tail = view.tail();
        self.pending[..tail.len()].copy_from_slice(tail);
        self.pending_len = tail.len();
    }

    fn add_records(&mut self, values: impl Iterator<Item = i64>, count: u64) {
        let start = self.records;
        self.value = values.enumerate().fold(self.value, |acc, (offset, value)| {
            let index = start.wrapping_add(offset as u64) as i64;
            acc.wrapping_add(index.wrapping_mul(value))
        });
        self.records += count;
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    /// 取り込んだ完全なレコードの数
    pub fn records(&self) -> u64 {
        self.records
    }
}

/// 読み込み元を終端まで読み、チェックサムを計算する
///
/// 一度に保持するのは`CHUNK_SIZE`バイトの塊だけなので、ファイルサイズに
/// 比例したメモリは確保しない。
pub async fn checksum_stream<R>(mut reader: R) -> io::Result<WeightedChecksum>
where
    R: AsyncRead + Unpin,
{
    let mut checksum = WeightedChecksum::new();
    let mut chunk = vec![0u8; CHUNK_SIZE];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        checksum.update(&chunk[..n]);
    }
    Ok(checksum)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_bytes(values: &[i64]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_ne_bytes()).collect()
    }

    fn checksum_of(bytes: &[u8]) -> WeightedChecksum {
        let mut checksum = WeightedChecksum::new();
        checksum.update(bytes);
        checksum
    }

    #[test]
    fn test_checksum_weights_by_index() {
        // 0*100 + 1*1 + 2*2 + 3*3
        assert_eq!(checksum_of(&to_bytes(&[100, 1, 2, 3])).value(), 14);
    }

    #[test]
    fn test_checksum_of_zero_records() {
        let checksum = checksum_of(&to_bytes(&[0; 100]));
        assert_eq!(checksum.records(), 100);
        assert_eq!(checksum.value(), 0);
    }

    #[test]
    fn test_empty_input_checksum_is_zero() {
        let checksum = checksum_of(&[]);
        assert_eq!(checksum.records(), 0);
        assert_eq!(checksum.value(), 0);
    }

    #[test]
    fn test_trailing_partial_record_is_ignored() {
        let mut bytes = to_bytes(&[5, 7]);
        bytes.extend_from_slice(&[0xff; 5]);

        let view = RecordView::new(&bytes);
        assert_eq!(view.len(), 2);
        assert_eq!(view.tail().len(), 5);

        let checksum = checksum_of(&bytes);
        assert_eq!(checksum.records(), 2);
        assert_eq!(checksum.value(), 7);
    }

    #[test]
    fn test_negative_values() {
        assert_eq!(checksum_of(&to_bytes(&[9, -4, -1])).value(), -4 - 2);
    }

    #[test]
    fn test_overflow_wraps() {
        let expected = i64::MAX.wrapping_add(i64::MAX.wrapping_mul(2));
        assert_eq!(
            checksum_of(&to_bytes(&[0, i64::MAX, i64::MAX])).value(),
            expected
        );
    }

    #[test]
    fn test_records_split_across_chunks() {
        let values: Vec<i64> = (0..50).map(|v| v * 3 - 40).collect();
        let bytes = to_bytes(&values);
        let whole = checksum_of(&bytes);

        // 塊の長さを変えても結果は同じ
        for size in [1usize, 3, 7, 8, 13, 64] {
            let mut split = WeightedChecksum::new();
            for chunk in bytes.chunks(size) {
                split.update(chunk);
            }
            assert_eq!(split.value(), whole.value(), "chunk size {size}");
            assert_eq!(split.records(), whole.records(), "chunk size {size}");
        }
    }

    #[tokio::test]
    async fn test_checksum_stream_reads_to_end() {
        let mut bytes = to_bytes(&(0..(CHUNK_SIZE as i64 / 4)).collect::<Vec<_>>());
        bytes.extend_from_slice(&[1, 2, 3]);

        let checksum = checksum_stream(bytes.as_slice()).await.unwrap();
        assert_eq!(checksum.value(), checksum_of(&bytes).value());
        assert_eq!(checksum.records(), CHUNK_SIZE as u64 / 4);
    }
}
