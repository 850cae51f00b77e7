//! 모멘텀 지표 (Momentum Indicators).
//!
//! Wilder 방식 RSI (Relative Strength Index).
//!
//! ```text
//! delta[i]    = close[i] - close[i-1]
//! gain[i]     = max(delta[i], 0)
//! loss[i]     = max(-delta[i], 0)
//! avg[1]      = gain[1]                     (손실도 동일)
//! avg[i]      = a * gain[i] + (1 - a) * avg[i-1],  a = 1 / period
//! RSI[i]      = 100 - 100 / (1 + avg_gain[i] / avg_loss[i])
//! ```
//!
//! RSI는 인덱스 `period`부터 정의되며, 평균 손실이 0이면 100입니다.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};

/// RSI 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RsiParams {
    /// 평활 기간.
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 100 }
    }
}

/// 모멘텀 지표 계산기.
#[derive(Debug, Default)]
pub struct MomentumCalculator;

impl MomentumCalculator {
    /// 새로운 모멘텀 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// Wilder RSI 계산.
    ///
    /// # 반환
    /// 입력과 같은 길이의 RSI 값 (인덱스 `period` 이전은 None, 값 범위 0~100)
    pub fn rsi(&self, prices: &[Decimal], params: RsiParams) -> IndicatorResult<Vec<Option<Decimal>>> {
        let period = params.period;

        if period == 0 {
            return Err(IndicatorError::InvalidParameter(
                "RSI 기간은 0보다 커야 합니다".to_string(),
            ));
        }

        if prices.len() <= period {
            return Err(IndicatorError::InsufficientData {
                required: period + 1,
                provided: prices.len(),
            });
        }

        let alpha = Decimal::ONE / Decimal::from(period);
        let decay = Decimal::ONE - alpha;

        let mut result = vec![None; prices.len()];
        let mut avg_gain = Decimal::ZERO;
        let mut avg_loss = Decimal::ZERO;

        for i in 1..prices.len() {
            let delta = prices[i] - prices[i - 1];
            let gain = delta.max(Decimal::ZERO);
            let loss = (-delta).max(Decimal::ZERO);

            if i == 1 {
                avg_gain = gain;
                avg_loss = loss;
            } else {
                avg_gain = alpha * gain + decay * avg_gain;
                avg_loss = alpha * loss + decay * avg_loss;
            }

            if i >= period {
                result[i] = Some(relative_strength_index(avg_gain, avg_loss));
            }
        }

        Ok(result)
    }
}

/// 평균 상승폭과 평균 하락폭으로 RSI를 계산합니다.
fn relative_strength_index(avg_gain: Decimal, avg_loss: Decimal) -> Decimal {
    let hundred = dec!(100);

    if avg_loss.is_zero() {
        return hundred;
    }

    // 하락폭이 극히 작으면 RS가 Decimal 범위를 넘을 수 있음
    let denominator = avg_gain
        .checked_div(avg_loss)
        .and_then(|rs| rs.checked_add(Decimal::ONE));

    match denominator {
        Some(d) => (hundred - hundred / d).clamp(Decimal::ZERO, hundred),
        None => hundred,
    }
}
