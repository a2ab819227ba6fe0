// ローカルファイルからのレコード読み込み
// ディスパッチ時点のサイズを上限として先頭から順に読み出す

use crate::checksum::CHUNK_SIZE;
use crate::core::{Job, RecordSource, RecordStream};
use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::io::{AsyncReadExt, BufReader};

/// ファイルを先頭から逐次読み出す`RecordSource`
#[derive(Debug, Clone, Default)]
pub struct LocalRecordSource;

impl LocalRecordSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl RecordSource for LocalRecordSource {
    async fn open(&self, job: &Job) -> Result<RecordStream> {
        let file = tokio::fs::File::open(job.path())
            .await
            .with_context(|| format!("Failed to open: {}", job.path().display()))?;

        // 縮んだファイルは実際に存在する分だけになる
        let reader = BufReader::with_capacity(CHUNK_SIZE, file).take(job.size());
        Ok(Box::new(reader))
    }
}
