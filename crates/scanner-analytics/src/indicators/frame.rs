//! 세션별 지표 프레임.

use rust_decimal::Decimal;

/// 한 종목의 세션별 지표 값 모음.
///
/// 모든 시퀀스는 종가 시퀀스와 같은 길이이며, 정의되지 않은 값은 `None`입니다.
#[derive(Debug, Clone)]
pub struct IndicatorFrame {
    closes: Vec<Decimal>,
    rsi: Vec<Option<Decimal>>,
    rsi_baseline: Vec<Option<Decimal>>,
    moving_averages: [Vec<Option<Decimal>>; 4],
}

/// 한 세션의 지표 스냅샷.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorRow {
    /// 종가
    pub close: Decimal,
    /// RSI
    pub rsi: Option<Decimal>,
    /// RSI 기준선
    pub rsi_baseline: Option<Decimal>,
    /// 종가 이동평균 (설정된 기간 순)
    pub moving_averages: [Option<Decimal>; 4],
}

impl IndicatorFrame {
    /// 계산된 시퀀스로 프레임을 생성합니다.
    pub fn new(
        closes: Vec<Decimal>,
        rsi: Vec<Option<Decimal>>,
        rsi_baseline: Vec<Option<Decimal>>,
        moving_averages: [Vec<Option<Decimal>>; 4],
    ) -> Self {
        Self {
            closes,
            rsi,
            rsi_baseline,
            moving_averages,
        }
    }

    /// 세션 수.
    pub fn len(&self) -> usize {
        self.closes.len()
    }

    /// 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn closes(&self) -> &[Decimal] {
        &self.closes
    }

    pub fn rsi(&self) -> &[Option<Decimal>] {
        &self.rsi
    }

    pub fn rsi_baseline(&self) -> &[Option<Decimal>] {
        &self.rsi_baseline
    }

    pub fn moving_averages(&self) -> &[Vec<Option<Decimal>>; 4] {
        &self.moving_averages
    }

    /// 인덱스의 세션 스냅샷. 범위를 벗어나면 `None`.
    pub fn row(&self, index: usize) -> Option<IndicatorRow> {
        let close = *self.closes.get(index)?;
        let value_at = |series: &Vec<Option<Decimal>>| series.get(index).copied().flatten();

        Some(IndicatorRow {
            close,
            rsi: value_at(&self.rsi),
            rsi_baseline: value_at(&self.rsi_baseline),
            moving_averages: [
                value_at(&self.moving_averages[0]),
                value_at(&self.moving_averages[1]),
                value_at(&self.moving_averages[2]),
                value_at(&self.moving_averages[3]),
            ],
        })
    }

    /// 가장 최근 세션과 그 직전 세션.
    pub fn latest_pair(&self) -> Option<(IndicatorRow, IndicatorRow)> {
        let last = self.len().checked_sub(1)?;
        let previous = last.checked_sub(1)?;
        Some((self.row(last)?, self.row(previous)?))
    }
}

impl IndicatorRow {
    /// 종가가 모든 이동평균보다 높은지 (엄격히 초과).
    ///
    /// 이동평균이 하나라도 정의되지 않았으면 `None`.
    pub fn above_all_moving_averages(&self) -> Option<bool> {
        let mut above = true;
        for ma in self.moving_averages {
            above &= self.close > ma?;
        }
        Some(above)
    }

    /// RSI가 기준선보다 높은지 (엄격히 초과).
    pub fn rsi_above_baseline(&self) -> Option<bool> {
        Some(self.rsi? > self.rsi_baseline?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn row(close: Decimal, mas: [Option<Decimal>; 4]) -> IndicatorRow {
        IndicatorRow {
            close,
            rsi: Some(dec!(55)),
            rsi_baseline: Some(dec!(50)),
            moving_averages: mas,
        }
    }

    #[test]
    fn test_above_all_is_strict() {
        let mas = [Some(dec!(9)), Some(dec!(9.5)), Some(dec!(8)), Some(dec!(10))];

        assert_eq!(row(dec!(10.01), mas).above_all_moving_averages(), Some(true));
        // 종가 == MA240 은 위가 아님
        assert_eq!(row(dec!(10), mas).above_all_moving_averages(), Some(false));
    }

    #[test]
    fn test_undefined_values_propagate() {
        let partial = row(dec!(10), [Some(dec!(1)), None, Some(dec!(1)), Some(dec!(1))]);
        assert_eq!(partial.above_all_moving_averages(), None);

        let mut no_baseline = row(dec!(10), [Some(dec!(1)); 4]);
        no_baseline.rsi_baseline = None;
        assert_eq!(no_baseline.rsi_above_baseline(), None);
    }

    #[test]
    fn test_latest_pair() {
        let closes = vec![dec!(1), dec!(2), dec!(3)];
        let empty = || vec![None; 3];
        let frame = IndicatorFrame::new(closes, empty(), empty(), [empty(), empty(), empty(), empty()]);

        let (today, previous) = frame.latest_pair().unwrap();
        assert_eq!(today.close, dec!(3));
        assert_eq!(previous.close, dec!(2));

        let single = IndicatorFrame::new(vec![dec!(1)], vec![None], vec![None], Default::default());
        assert!(single.latest_pair().is_none());
        assert!(frame.row(3).is_none());
    }
}
