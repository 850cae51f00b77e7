//! 모멘텀 돌파 스캐너 실행 crate.
//!
//! 이 crate는 `breakout-scanner` 바이너리를 구성하는 작업들을 제공합니다:
//! - 스캔 대상 선정 (TWSE 상장/장외 보통주)
//! - 종목별 게이트, 지표 계산, 첫 돌파 감지
//! - 최근 3일 보존 테이블 병합 및 기록

pub mod config;
pub mod error;
pub mod modules;
pub mod stats;

pub use config::{log_filter, CollectorConfig, ScanConfig, StoreBackend, StoreConfig};
pub use error::{CollectorError, Result};
pub use stats::ScanStats;
