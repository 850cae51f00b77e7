//! 지표 계산 및 돌파 감지 엔진.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 기술적 지표 (Wilder RSI, SMA) 와 세션별 지표 프레임
//! - 지표 계산 전 가격/거래량 게이트
//! - 이동평균 첫 돌파 감지
//!
//! # Re-exports
//!
//! - [`indicators`]: 지표 엔진 (IndicatorEngine, IndicatorFrame 등)
//! - [`breakout`]: 돌파 감지 (BreakoutDetector, BreakoutCheck)
//! - [`liquidity_gate`]: 유동성 게이트 (LiquidityGate, GateVerdict)

pub mod breakout;
pub mod indicators;
pub mod liquidity_gate;

// Indicators 모듈 re-exports
pub use indicators::{
    IndicatorEngine, IndicatorError, IndicatorFrame, IndicatorResult, IndicatorRow,
    MomentumCalculator, RsiParams, SmaParams, TrendIndicators,
};

// Breakout 모듈 re-exports
pub use breakout::{BreakoutCheck, BreakoutDetector};

// Liquidity Gate 모듈 re-exports
pub use liquidity_gate::{GateVerdict, LiquidityGate};
