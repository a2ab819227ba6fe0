// ローカルファイルシステムのファイル種別判定

use crate::core::{FileInspector, FileKind};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::Path;

/// `metadata`によって通常ファイルかどうかを判定する
#[derive(Debug, Clone, Default)]
pub struct LocalFileInspector;

impl LocalFileInspector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl FileInspector for LocalFileInspector {
    async fn inspect(&self, path: &Path) -> Result<FileKind> {
        let metadata = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("Failed to get metadata for: {}", path.display()))?;

        if metadata.is_file() {
            Ok(FileKind::Regular {
                size: metadata.len(),
            })
        } else {
            Ok(FileKind::Other)
        }
    }
}
