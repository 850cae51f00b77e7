//! 로컬 JSON 파일 보존 저장소.
//!
//! 행 목록을 JSON 배열로 저장합니다. 쓰기는 임시 파일에 먼저 기록한 뒤
//! 이름을 바꿔 기존 내용을 교체합니다.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::RetentionStore;
use crate::error::Result;

/// JSON 파일 보존 저장소.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// 파일 경로로 저장소 생성.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// 저장 파일 경로.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl RetentionStore for JsonFileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn read_rows(&self) -> Result<Vec<Vec<String>>> {
        if !tokio::fs::try_exists(&self.path).await? {
            debug!(path = %self.path.display(), "저장 파일 없음, 빈 테이블");
            return Ok(Vec::new());
        }

        let content = tokio::fs::read_to_string(&self.path).await?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    async fn write_rows(&self, rows: &[Vec<String>]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(rows)?;
        let temp = self.temp_path();

        tokio::fs::write(&temp, content).await?;
        tokio::fs::rename(&temp, &self.path).await?;

        debug!(path = %self.path.display(), rows = rows.len(), "저장 파일 교체");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("scanner-data-{}-{}", name, std::process::id()))
            .join("retention.json")
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let store = JsonFileStore::new(temp_file("missing"));
        assert!(store.read_rows().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let path = temp_file("roundtrip");
        let store = JsonFileStore::new(&path);
        let rows = vec![
            vec!["date".to_string(), "ticker".to_string(), "display_name".to_string()],
            vec!["2024-07-01".to_string(), "2330.TW".to_string(), "台積電".to_string()],
        ];

        store.write_rows(&rows).await.unwrap();
        store.write_rows(&rows[..1]).await.unwrap();

        assert_eq!(store.read_rows().await.unwrap(), rows[..1].to_vec());
        assert!(!store.temp_path().exists());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
