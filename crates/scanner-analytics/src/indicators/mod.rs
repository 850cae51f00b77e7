//! 기술적 지표 모듈.
//!
//! 돌파 스크리닝에 필요한 지표를 종가 시퀀스에서 계산합니다.
//!
//! # 지원 지표
//!
//! ## 추세 지표 (Trend Indicators)
//! - **SMA**: 단순 이동평균 (종가 MA20/60/120/240, RSI 기준선)
//!
//! ## 모멘텀 지표 (Momentum Indicators)
//! - **RSI**: Wilder 상대강도지수
//!
//! # 사용 예시
//!
//! ```ignore
//! use scanner_analytics::indicators::IndicatorEngine;
//! use scanner_core::IndicatorConfig;
//!
//! let engine = IndicatorEngine::new(IndicatorConfig::default());
//! let frame = engine.compute_frame(&closes)?;
//! let latest = frame.row(frame.len() - 1);
//! ```

pub mod frame;
pub mod momentum;
pub mod trend;

use rust_decimal::Decimal;
use scanner_core::IndicatorConfig;
use thiserror::Error;

pub use frame::{IndicatorFrame, IndicatorRow};
pub use momentum::{MomentumCalculator, RsiParams};
pub use trend::{SmaParams, TrendIndicators};

/// 지표 계산 오류.
#[derive(Debug, Error)]
pub enum IndicatorError {
    /// 데이터 부족 오류
    #[error("데이터가 부족합니다: 필요 {required}개, 제공 {provided}개")]
    InsufficientData { required: usize, provided: usize },

    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;

/// 통합 지표 엔진.
///
/// 설정된 기간으로 RSI, RSI 기준선, 종가 이동평균을 한 번에 계산합니다.
#[derive(Debug, Default)]
pub struct IndicatorEngine {
    config: IndicatorConfig,
    trend: TrendIndicators,
    momentum: MomentumCalculator,
}

impl IndicatorEngine {
    /// 새로운 지표 엔진 생성.
    pub fn new(config: IndicatorConfig) -> Self {
        Self {
            config,
            trend: TrendIndicators::new(),
            momentum: MomentumCalculator::new(),
        }
    }

    /// 엔진 설정.
    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// 단순 이동평균 계산.
    pub fn sma(&self, prices: &[Decimal], params: SmaParams) -> IndicatorResult<Vec<Option<Decimal>>> {
        self.trend.sma(prices, params)
    }

    /// Wilder RSI 계산.
    pub fn rsi(&self, prices: &[Decimal], params: RsiParams) -> IndicatorResult<Vec<Option<Decimal>>> {
        self.momentum.rsi(prices, params)
    }

    /// 종가 시퀀스 전체에 대한 지표 프레임을 계산합니다.
    ///
    /// 세션 수가 `min_history` 미만이면 `InsufficientData`를 반환합니다.
    pub fn compute_frame(&self, closes: &[Decimal]) -> IndicatorResult<IndicatorFrame> {
        let required = self.required_history();
        if closes.len() < required {
            return Err(IndicatorError::InsufficientData {
                required,
                provided: closes.len(),
            });
        }

        let rsi = self.rsi(
            closes,
            RsiParams {
                period: self.config.rsi_period,
            },
        )?;
        let rsi_baseline = self.trend.sma_defined(
            &rsi,
            SmaParams {
                period: self.config.rsi_baseline_period,
            },
        )?;

        let [p0, p1, p2, p3] = self.config.ma_periods;
        let moving_averages = [
            self.sma(closes, SmaParams { period: p0 })?,
            self.sma(closes, SmaParams { period: p1 })?,
            self.sma(closes, SmaParams { period: p2 })?,
            self.sma(closes, SmaParams { period: p3 })?,
        ];

        Ok(IndicatorFrame::new(
            closes.to_vec(),
            rsi,
            rsi_baseline,
            moving_averages,
        ))
    }

    /// 프레임 계산에 필요한 최소 세션 수.
    ///
    /// 설정된 `min_history`와 개별 지표가 요구하는 길이 중 큰 값입니다.
    pub fn required_history(&self) -> usize {
        let longest_ma = self.config.ma_periods.iter().copied().max().unwrap_or(0);
        self.config
            .min_history
            .max(self.config.rsi_period + 1)
            .max(self.config.rsi_baseline_period)
            .max(longest_ma)
            .max(2)
    }
}
