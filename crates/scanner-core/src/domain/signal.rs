//! 스캔 결과 신호.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{Ticker, TickerFormat};

/// 돌파 조건을 만족한 종목.
///
/// 스캔 오케스트레이터가 생성하고 보존 병합기가 소비합니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signal {
    /// 결과에 기록할 티커 (출력 형식 적용됨)
    pub ticker: String,
    /// 현지 종목명 (없으면 티커)
    pub display_name: String,
}

impl Signal {
    /// 새 신호를 생성합니다.
    pub fn new(ticker: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            display_name: display_name.into(),
        }
    }

    /// 티커와 종목명으로 신호를 생성합니다.
    ///
    /// 종목명이 없으면 시장 접미사가 붙은 티커를 이름으로 사용합니다.
    pub fn for_ticker(ticker: &Ticker, name: Option<&str>, format: TickerFormat) -> Self {
        let display_name = match name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => ticker.qualified(),
        };

        Self {
            ticker: ticker.render(format),
            display_name,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.display_name, self.ticker)
    }
}
