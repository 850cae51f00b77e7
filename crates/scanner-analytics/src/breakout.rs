//! 첫 돌파 감지기.
//!
//! 최근 세션(오늘)과 직전 세션(어제)의 지표 스냅샷을 비교해
//! 다음 세 조건이 모두 참일 때만 신호를 냅니다.
//!
//! 1. 오늘 RSI > 오늘 RSI 기준선
//! 2. 오늘 종가가 네 이동평균 모두보다 높음
//! 3. 어제 종가는 네 이동평균 중 하나 이상보다 높지 않음
//!
//! 판단에 쓰는 값(오늘의 RSI, 기준선, 이동평균과 어제의 이동평균) 중
//! 하나라도 정의되지 않았으면 신호가 없습니다. 어제의 RSI는 보지 않습니다.

use rust_decimal::Decimal;
use scanner_core::IndicatorConfig;

use crate::indicators::{IndicatorEngine, IndicatorFrame, IndicatorResult, IndicatorRow};

/// 두 세션 비교 결과.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakoutCheck {
    /// 오늘 RSI가 기준선보다 높음
    pub rsi_above_baseline: bool,
    /// 오늘 종가가 모든 이동평균 위
    pub above_all_today: bool,
    /// 어제 종가가 모든 이동평균 위
    pub above_all_previous: bool,
}

impl BreakoutCheck {
    /// 첫 돌파 여부.
    pub fn is_breakout(&self) -> bool {
        self.rsi_above_baseline && self.above_all_today && !self.above_all_previous
    }
}

/// 첫 돌파 감지기.
#[derive(Debug, Default)]
pub struct BreakoutDetector {
    engine: IndicatorEngine,
}

impl BreakoutDetector {
    /// 지표 설정으로 감지기 생성.
    pub fn new(config: IndicatorConfig) -> Self {
        Self {
            engine: IndicatorEngine::new(config),
        }
    }

    /// 내부 지표 엔진.
    pub fn engine(&self) -> &IndicatorEngine {
        &self.engine
    }

    /// 평가에 필요한 최소 세션 수.
    pub fn required_history(&self) -> usize {
        self.engine.required_history()
    }

    /// 두 세션 스냅샷을 비교합니다.
    ///
    /// 비교에 필요한 값이 정의되지 않았으면 `None`.
    pub fn compare(today: &IndicatorRow, previous: &IndicatorRow) -> Option<BreakoutCheck> {
        Some(BreakoutCheck {
            rsi_above_baseline: today.rsi_above_baseline()?,
            above_all_today: today.above_all_moving_averages()?,
            above_all_previous: previous.above_all_moving_averages()?,
        })
    }

    /// 프레임의 `index` 세션이 첫 돌파인지 확인합니다.
    pub fn detect_at(&self, frame: &IndicatorFrame, index: usize) -> bool {
        let Some(previous_index) = index.checked_sub(1) else {
            return false;
        };

        match (frame.row(index), frame.row(previous_index)) {
            (Some(today), Some(previous)) => {
                Self::compare(&today, &previous).is_some_and(|check| check.is_breakout())
            }
            _ => false,
        }
    }

    /// 프레임의 마지막 세션이 첫 돌파인지 확인합니다.
    pub fn detect(&self, frame: &IndicatorFrame) -> bool {
        match frame.len().checked_sub(1) {
            Some(last) => self.detect_at(frame, last),
            None => false,
        }
    }

    /// 종가 시퀀스를 평가합니다.
    ///
    /// 세션 수가 부족하면 `InsufficientData` 오류를, 그 외에는 마지막 두 세션의
    /// 비교 결과를 반환합니다 (정의되지 않은 값이 있으면 `None`).
    pub fn evaluate(&self, closes: &[Decimal]) -> IndicatorResult<Option<BreakoutCheck>> {
        let frame = self.engine.compute_frame(closes)?;

        let check = frame
            .latest_pair()
            .and_then(|(today, previous)| Self::compare(&today, &previous));

        tracing::trace!(sessions = closes.len(), ?check, "돌파 평가");

        Ok(check)
    }

    /// 종가 시퀀스의 마지막 세션이 첫 돌파인지 확인합니다.
    ///
    /// 세션 수 부족은 오류가 아니라 신호 없음으로 처리합니다.
    pub fn screen(&self, closes: &[Decimal]) -> bool {
        match self.evaluate(closes) {
            Ok(check) => check.is_some_and(|c| c.is_breakout()),
            Err(e) => {
                tracing::debug!(error = %e, "평가 불가, 신호 없음");
                false
            }
        }
    }
}
