//! 보존 저장소 모듈.
//!
//! 스캔 결과 테이블(헤더 + 데이터 행)을 실행 사이에 유지합니다.
//! 모든 백엔드는 전체 테이블을 읽고 전체를 교체하는 방식으로 동작합니다.
//!
//! - `GoogleSheetsStore`: Google Sheets 워크시트
//! - `JsonFileStore`: 로컬 JSON 파일
//! - `MemoryStore`: 프로세스 메모리 (드라이런, 테스트)

pub mod file;
pub mod memory;
pub mod sheets;

use async_trait::async_trait;

use crate::error::Result;

pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use sheets::{spreadsheet_id_from_url, GoogleSheetsStore, ServiceAccountKey};

/// 보존 저장소 trait.
#[async_trait]
pub trait RetentionStore: Send + Sync {
    /// 백엔드 이름.
    fn name(&self) -> &str;

    /// 현재 저장된 전체 행 (헤더 포함). 이전 상태가 없으면 빈 목록.
    async fn read_rows(&self) -> Result<Vec<Vec<String>>>;

    /// 전체 행으로 저장소 내용을 교체.
    async fn write_rows(&self, rows: &[Vec<String>]) -> Result<()>;
}
