//! Yahoo Finance 일봉 가격 이력.
//!
//! 타임스탬프는 거래소 현지 날짜로 변환하고, 유한하지 않은 값이 있는 일봉은 버립니다.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use scanner_core::{PriceBar, PriceSeries, Ticker};
use tracing::debug;

use crate::error::{DataError, Result};

/// 기본 조회 범위.
pub const DEFAULT_HISTORY_RANGE: &str = "2y";

/// 일봉 가격 이력 Provider trait.
#[async_trait]
pub trait PriceHistoryProvider: Send + Sync {
    /// Provider 이름.
    fn name(&self) -> &str;

    /// 일봉 이력 조회.
    ///
    /// `range`는 조회 기간입니다 (예: `2y`, `1y`, `6mo`).
    async fn fetch_daily(&self, ticker: &Ticker, range: &str) -> Result<PriceSeries>;
}

/// Yahoo Finance 일봉 Provider.
pub struct YahooPriceProvider {
    connector: yahoo_finance_api::YahooConnector,
    timezone: Tz,
}

impl YahooPriceProvider {
    /// 거래소 시간대를 지정해 생성.
    pub fn new(timezone: Tz) -> Result<Self> {
        let connector = yahoo_finance_api::YahooConnector::new()
            .map_err(|e| DataError::FetchError(format!("Yahoo Finance 연결 실패: {}", e)))?;
        Ok(Self { connector, timezone })
    }
}

#[async_trait]
impl PriceHistoryProvider for YahooPriceProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch_daily(&self, ticker: &Ticker, range: &str) -> Result<PriceSeries> {
        let symbol = ticker.qualified();
        debug!(symbol = %symbol, range = range, "Yahoo Finance API 호출");

        let response = self
            .connector
            .get_quote_range(&symbol, "1d", range)
            .await
            .map_err(|e| DataError::FetchError(format!("Yahoo Finance API 오류 ({}): {}", symbol, e)))?;

        let quotes = response
            .quotes()
            .map_err(|e| DataError::ParseError(format!("Quote 파싱 오류 ({}): {}", symbol, e)))?;

        let bars: Vec<PriceBar> = quotes
            .iter()
            .filter_map(|q| {
                bar_from_quote(
                    q.timestamp as i64,
                    [q.open, q.high, q.low, q.close],
                    q.volume,
                    &self.timezone,
                )
            })
            .collect();

        if bars.is_empty() {
            return Err(DataError::NotFound(format!("일봉 데이터 없음: {}", symbol)));
        }

        if bars.len() < quotes.len() {
            debug!(
                symbol = %symbol,
                dropped = quotes.len() - bars.len(),
                "유효하지 않은 일봉 제외"
            );
        }

        Ok(PriceSeries::new(ticker.clone(), bars))
    }
}

/// 시세 한 건을 일봉으로 변환.
///
/// `ohlc`는 `[open, high, low, close]` 순서이며, 하나라도 유한하지 않으면 `None`.
pub fn bar_from_quote(timestamp: i64, ohlc: [f64; 4], volume: u64, timezone: &Tz) -> Option<PriceBar> {
    let date = Utc
        .timestamp_opt(timestamp, 0)
        .single()?
        .with_timezone(timezone)
        .date_naive();

    let mut values = [Decimal::ZERO; 4];
    for (slot, raw) in values.iter_mut().zip(ohlc) {
        if !raw.is_finite() {
            return None;
        }
        *slot = Decimal::from_f64_retain(raw)?;
    }
    let [open, high, low, close] = values;

    Some(PriceBar::new(date, open, high, low, close, Decimal::from(volume)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use chrono_tz::Asia::Taipei;
    use rust_decimal_macros::dec;

    #[test]
    fn test_bar_uses_exchange_local_date() {
        // 2024-07-01 01:00 UTC = 2024-07-01 09:00 Taipei
        let bar = bar_from_quote(1_719_795_600, [100.0, 101.5, 99.5, 100.5], 2_000_000, &Taipei).unwrap();

        assert_eq!(bar.date, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
        assert_eq!(bar.close, dec!(100.5));
        assert_eq!(bar.volume, dec!(2000000));
    }

    #[test]
    fn test_bar_date_crosses_midnight() {
        // 2024-06-30 17:00 UTC = 2024-07-01 01:00 Taipei
        let bar = bar_from_quote(1_719_766_800, [1.0, 1.0, 1.0, 1.0], 0, &Taipei).unwrap();
        assert_eq!(bar.date, NaiveDate::from_ymd_opt(2024, 7, 1).unwrap());
    }

    #[test]
    fn test_non_finite_quote_dropped() {
        assert!(bar_from_quote(1_719_795_600, [1.0, f64::NAN, 1.0, 1.0], 10, &Taipei).is_none());
        assert!(bar_from_quote(1_719_795_600, [1.0, 1.0, 1.0, f64::INFINITY], 10, &Taipei).is_none());
    }
}
