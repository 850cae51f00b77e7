//! 일봉 가격 데이터 타입.
//!
//! - `PriceBar` - 한 종목의 한 거래 세션 OHLCV
//! - `PriceSeries` - 한 종목의 시간순 일봉 시퀀스

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Ticker;

/// 한 거래 세션의 OHLCV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// 거래일 (거래소 현지 날짜)
    pub date: NaiveDate,
    /// 시가
    pub open: Decimal,
    /// 고가
    pub high: Decimal,
    /// 저가
    pub low: Decimal,
    /// 종가
    pub close: Decimal,
    /// 거래량 (주)
    pub volume: Decimal,
}

impl PriceBar {
    /// 새 일봉을 생성합니다.
    pub fn new(
        date: NaiveDate,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
        volume: Decimal,
    ) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// 한 종목의 시간순 일봉 시퀀스.
///
/// 생성 시 날짜순으로 정렬되며, 같은 날짜가 중복되면 마지막 값만 남깁니다.
/// 생성 이후에는 변경되지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    ticker: Ticker,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// 일봉 목록으로 시퀀스를 생성합니다.
    pub fn new(ticker: Ticker, mut bars: Vec<PriceBar>) -> Self {
        bars.sort_by_key(|b| b.date);

        // 같은 날짜는 뒤쪽 값 유지
        let mut deduped: Vec<PriceBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => deduped.push(bar),
            }
        }

        Self {
            ticker,
            bars: deduped,
        }
    }

    /// 종목 티커.
    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    /// 모든 일봉.
    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    /// 세션 수.
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// 종가 시퀀스.
    pub fn closes(&self) -> Vec<Decimal> {
        self.bars.iter().map(|b| b.close).collect()
    }

    /// 가장 최근 세션.
    pub fn latest(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// 최소 세션 수를 만족하는지 확인합니다.
    pub fn has_history(&self, min_sessions: usize) -> bool {
        self.bars.len() >= min_sessions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bar(day: u32, close: Decimal) -> PriceBar {
        let date = NaiveDate::from_ymd_opt(2024, 3, day).unwrap();
        PriceBar::new(date, close, close, close, close, dec!(1000))
    }

    #[test]
    fn test_series_sorted_and_deduplicated() {
        let series = PriceSeries::new(
            Ticker::twse("2330"),
            vec![bar(5, dec!(3)), bar(1, dec!(1)), bar(5, dec!(4)), bar(2, dec!(2))],
        );

        assert_eq!(series.len(), 3);
        assert_eq!(series.closes(), vec![dec!(1), dec!(2), dec!(4)]);
        assert_eq!(series.latest().map(|b| b.close), Some(dec!(4)));
    }

    #[test]
    fn test_has_history() {
        let series = PriceSeries::new(Ticker::twse("2330"), vec![bar(1, dec!(1)), bar(2, dec!(2))]);
        assert!(series.has_history(2));
        assert!(!series.has_history(3));
        assert!(!series.is_empty());
    }
}
