//! # Scanner Core
//!
//! 모멘텀 돌파 스캐너의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 스캐너 전반에서 사용되는 기본 타입을 제공합니다:
//! - 일봉 가격 데이터 (`PriceBar`, `PriceSeries`)
//! - 거래소 티커 및 출력 형식
//! - 스캔 신호와 보존 레코드
//! - 최근 N일 보존 병합 (`RetentionMerger`)
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
