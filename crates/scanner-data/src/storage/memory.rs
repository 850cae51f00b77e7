//! 메모리 보존 저장소.
//!
//! 드라이런과 테스트에서 사용합니다. 프로세스가 끝나면 내용이 사라집니다.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::RetentionStore;
use crate::error::Result;

/// 메모리 보존 저장소.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<Vec<String>>>,
    writes: RwLock<usize>,
}

impl MemoryStore {
    /// 빈 저장소 생성.
    pub fn new() -> Self {
        Self::default()
    }

    /// 초기 행으로 저장소 생성.
    pub fn with_rows(rows: Vec<Vec<String>>) -> Self {
        Self {
            rows: RwLock::new(rows),
            writes: RwLock::new(0),
        }
    }

    /// 현재 내용의 복사본.
    pub async fn snapshot(&self) -> Vec<Vec<String>> {
        self.rows.read().await.clone()
    }

    /// 지금까지의 쓰기 횟수.
    pub async fn write_count(&self) -> usize {
        *self.writes.read().await
    }
}

#[async_trait]
impl RetentionStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn read_rows(&self) -> Result<Vec<Vec<String>>> {
        Ok(self.snapshot().await)
    }

    async fn write_rows(&self, rows: &[Vec<String>]) -> Result<()> {
        *self.rows.write().await = rows.to_vec();
        *self.writes.write().await += 1;
        Ok(())
    }
}
