//! 데이터 Provider 모듈.
//!
//! 스캔에 필요한 외부 데이터를 가져오는 Provider들을 정의합니다.
//!
//! ## 종목 카탈로그
//! - `InstrumentCatalog`: 종목 조회 trait (코드 → 이름, 시장)
//! - `ListingCatalog`: 메모리 내 카탈로그
//! - `TwseIsinClient`: TWSE ISIN 공시 페이지 크롤러 (상장/장외)
//!
//! ## 가격 이력
//! - `PriceHistoryProvider`: 일봉 이력 조회 trait
//! - `YahooPriceProvider`: Yahoo Finance 구현

pub mod catalog;
pub mod yahoo;

pub use catalog::{
    InstrumentCatalog, InstrumentInfo, ListingCatalog, TwseIsinClient, COMMON_STOCK,
    DEFAULT_ISIN_BASE_URL,
};
pub use yahoo::{bar_from_quote, PriceHistoryProvider, YahooPriceProvider, DEFAULT_HISTORY_RANGE};
