//! 스캔 통계 구조체.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::modules::scan::{FilterReason, InstrumentOutcome};

/// 스캔 작업 통계
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanStats {
    /// 평가한 종목 수
    pub total: usize,
    /// 신호 발견
    pub matched: usize,
    /// 조건 미충족
    pub no_signal: usize,
    /// 가격 기준 미달
    pub filtered_price: usize,
    /// 거래량 기준 미달
    pub filtered_volume: usize,
    /// 이력 부족
    pub filtered_history: usize,
    /// 데이터 조회 실패
    pub unavailable: usize,
    /// 소요 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl ScanStats {
    /// 새 통계 객체 생성
    pub fn new() -> Self {
        Self::default()
    }

    /// 종목 평가 결과 반영
    pub fn record(&mut self, outcome: &InstrumentOutcome) {
        self.total += 1;
        match outcome {
            InstrumentOutcome::Matched(_) => self.matched += 1,
            InstrumentOutcome::NoSignal => self.no_signal += 1,
            InstrumentOutcome::Filtered(FilterReason::PriceBelowMinimum) => self.filtered_price += 1,
            InstrumentOutcome::Filtered(FilterReason::VolumeBelowMinimum) => self.filtered_volume += 1,
            InstrumentOutcome::Filtered(FilterReason::InsufficientHistory) => {
                self.filtered_history += 1
            }
            InstrumentOutcome::Unavailable(_) => self.unavailable += 1,
        }
    }

    /// 필터에 걸린 종목 수
    pub fn filtered(&self) -> usize {
        self.filtered_price + self.filtered_volume + self.filtered_history
    }

    /// 신호 발견률 (%)
    pub fn match_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.matched as f64 / self.total as f64) * 100.0
        }
    }

    /// 통계 요약 로그 출력
    pub fn log_summary(&self, operation: &str) {
        tracing::info!(
            operation = operation,
            total = self.total,
            matched = self.matched,
            no_signal = self.no_signal,
            filtered = self.filtered(),
            filtered_price = self.filtered_price,
            filtered_volume = self.filtered_volume,
            filtered_history = self.filtered_history,
            unavailable = self.unavailable,
            match_rate = format!("{:.1}%", self.match_rate()),
            elapsed = format!("{:.1}s", self.elapsed.as_secs_f64()),
            "스캔 완료"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scanner_core::Signal;

    #[test]
    fn test_record_outcomes() {
        let mut stats = ScanStats::new();

        stats.record(&InstrumentOutcome::Matched(Signal::new("2330.TW", "台積電")));
        stats.record(&InstrumentOutcome::NoSignal);
        stats.record(&InstrumentOutcome::Filtered(FilterReason::PriceBelowMinimum));
        stats.record(&InstrumentOutcome::Filtered(FilterReason::InsufficientHistory));
        stats.record(&InstrumentOutcome::Unavailable("timeout".to_string()));

        assert_eq!(stats.total, 5);
        assert_eq!(stats.matched, 1);
        assert_eq!(stats.filtered(), 2);
        assert_eq!(stats.unavailable, 1);
        assert!((stats.match_rate() - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_match_rate() {
        assert_eq!(ScanStats::new().match_rate(), 0.0);
    }
}
