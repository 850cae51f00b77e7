//! 추세 지표 (Trend Indicators).
//!
//! 이동평균 기반의 추세 지표를 제공합니다.
//! - SMA (Simple Moving Average) - 가격 시퀀스
//! - SMA - 선행 구간이 정의되지 않은 지표 시퀀스 (RSI 기준선 등)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};

/// SMA 파라미터.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SmaParams {
    /// 이동평균 기간.
    pub period: usize,
}

impl Default for SmaParams {
    fn default() -> Self {
        Self { period: 20 }
    }
}

/// 추세 지표 계산기.
#[derive(Debug, Default)]
pub struct TrendIndicators;

impl TrendIndicators {
    /// 새로운 추세 지표 계산기 생성.
    pub fn new() -> Self {
        Self
    }

    /// 단순 이동평균 (SMA) 계산.
    ///
    /// SMA[i] = (P[i-n+1] + ... + P[i]) / n
    ///
    /// # 반환
    /// 입력과 같은 길이의 SMA 값 (처음 period-1개는 None)
    pub fn sma(&self, prices: &[Decimal], params: SmaParams) -> IndicatorResult<Vec<Option<Decimal>>> {
        let period = validate_period(prices.len(), params.period)?;
        let period_decimal = Decimal::from(period);

        let mut result = Vec::with_capacity(prices.len());
        for i in 0..prices.len() {
            if i + 1 < period {
                result.push(None);
            } else {
                let sum: Decimal = prices[i + 1 - period..=i].iter().sum();
                result.push(Some(sum / period_decimal));
            }
        }

        Ok(result)
    }

    /// 정의되지 않은 값이 섞인 시퀀스의 SMA 계산.
    ///
    /// 창 안의 값이 모두 정의된 경우에만 평균을 계산하고,
    /// 하나라도 None이면 해당 시점도 None입니다.
    pub fn sma_defined(
        &self,
        values: &[Option<Decimal>],
        params: SmaParams,
    ) -> IndicatorResult<Vec<Option<Decimal>>> {
        let period = validate_period(values.len(), params.period)?;
        let period_decimal = Decimal::from(period);

        let mut result = Vec::with_capacity(values.len());
        for i in 0..values.len() {
            if i + 1 < period {
                result.push(None);
                continue;
            }

            let window = &values[i + 1 - period..=i];
            let sum: Option<Decimal> = window.iter().copied().sum();
            result.push(sum.map(|s| s / period_decimal));
        }

        Ok(result)
    }
}

fn validate_period(len: usize, period: usize) -> IndicatorResult<usize> {
    if period == 0 {
        return Err(IndicatorError::InvalidParameter(
            "기간은 0보다 커야 합니다".to_string(),
        ));
    }

    if len < period {
        return Err(IndicatorError::InsufficientData {
            required: period,
            provided: len,
        });
    }

    Ok(period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_prices() -> Vec<Decimal> {
        vec![
            dec!(100.0),
            dec!(102.0),
            dec!(101.0),
            dec!(103.0),
            dec!(105.0),
            dec!(104.0),
        ]
    }

    #[test]
    fn test_sma_basic() {
        let trend = TrendIndicators::new();
        let sma = trend.sma(&sample_prices(), SmaParams { period: 3 }).unwrap();

        assert_eq!(sma.len(), 6);
        assert!(sma[0].is_none());
        assert!(sma[1].is_none());

        // (100 + 102 + 101) / 3 = 101
        assert_eq!(sma[2], Some(dec!(101)));
        // (103 + 105 + 104) / 3 = 104
        assert_eq!(sma[5], Some(dec!(104)));
    }

    #[test]
    fn test_sma_period_one_is_identity() {
        let trend = TrendIndicators::new();
        let prices = sample_prices();
        let sma = trend.sma(&prices, SmaParams { period: 1 }).unwrap();

        let expected: Vec<Option<Decimal>> = prices.iter().copied().map(Some).collect();
        assert_eq!(sma, expected);
    }

    #[test]
    fn test_sma_errors() {
        let trend = TrendIndicators::new();

        let short = trend.sma(&[dec!(1), dec!(2)], SmaParams { period: 5 });
        assert!(matches!(
            short,
            Err(IndicatorError::InsufficientData { required: 5, provided: 2 })
        ));

        let zero = trend.sma(&sample_prices(), SmaParams { period: 0 });
        assert!(matches!(zero, Err(IndicatorError::InvalidParameter(_))));
    }

    #[test]
    fn test_sma_defined_waits_for_full_window() {
        let trend = TrendIndicators::new();
        let values = vec![None, None, Some(dec!(10)), Some(dec!(20)), Some(dec!(30)), Some(dec!(40))];

        let sma = trend.sma_defined(&values, SmaParams { period: 2 }).unwrap();

        assert_eq!(sma[1], None);
        // 창에 None이 포함됨
        assert_eq!(sma[2], None);
        assert_eq!(sma[3], Some(dec!(15)));
        assert_eq!(sma[5], Some(dec!(35)));
    }
}
