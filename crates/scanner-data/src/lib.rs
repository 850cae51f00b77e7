//! 외부 데이터 어댑터.
//!
//! 이 crate는 다음을 제공합니다:
//! - 상장 종목 카탈로그 (TWSE ISIN 공시 페이지)
//! - 일봉 가격 이력 (Yahoo Finance)
//! - 보존 저장소 백엔드 (Google Sheets, JSON 파일, 메모리)

pub mod error;
pub mod provider;
pub mod storage;

pub use error::{DataError, Result};

// Provider 재내보내기
pub use provider::{
    InstrumentCatalog, InstrumentInfo, ListingCatalog, PriceHistoryProvider, TwseIsinClient,
    YahooPriceProvider, DEFAULT_HISTORY_RANGE,
};

// 저장소 재내보내기
pub use storage::{
    spreadsheet_id_from_url, GoogleSheetsStore, JsonFileStore, MemoryStore, RetentionStore,
    ServiceAccountKey,
};
