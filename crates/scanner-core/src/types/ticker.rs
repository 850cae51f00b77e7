//! 거래소 티커 및 상장 시장 정의.
//!
//! 이 모듈은 스캔 대상 종목을 식별하는 타입을 정의합니다:
//! - `Venue` - 상장 시장 (상장/장외)
//! - `Ticker` - 종목 코드 + 시장 접미사 (예: 2330.TW)
//! - `TickerFormat` - 결과에 기록할 티커 표기 방식

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ScannerError;

/// 상장 시장.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Venue {
    /// 증권거래소 상장 (上市)
    Twse,
    /// 장외 시장 (上櫃)
    Tpex,
}

impl Venue {
    /// 시세 조회용 접미사를 반환합니다.
    pub fn suffix(&self) -> &'static str {
        match self {
            Venue::Twse => "TW",
            Venue::Tpex => "TWO",
        }
    }

    /// 접미사에서 시장을 파싱합니다.
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        match suffix.to_uppercase().as_str() {
            "TW" => Some(Venue::Twse),
            "TWO" => Some(Venue::Tpex),
            _ => None,
        }
    }
}

impl fmt::Display for Venue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Venue::Twse => write!(f, "twse"),
            Venue::Tpex => write!(f, "tpex"),
        }
    }
}

/// 시장 접미사가 붙은 종목 식별자.
///
/// 표시 형식은 `{code}.{suffix}` 입니다 (예: `2330.TW`, `6488.TWO`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticker {
    /// 종목 코드 (예: 2330)
    pub code: String,
    /// 상장 시장
    pub venue: Venue,
}

impl Ticker {
    /// 새 티커를 생성합니다.
    pub fn new(code: impl Into<String>, venue: Venue) -> Self {
        Self {
            code: code.into().trim().to_string(),
            venue,
        }
    }

    /// 상장 종목 티커를 생성합니다.
    pub fn twse(code: impl Into<String>) -> Self {
        Self::new(code, Venue::Twse)
    }

    /// 장외 종목 티커를 생성합니다.
    pub fn tpex(code: impl Into<String>) -> Self {
        Self::new(code, Venue::Tpex)
    }

    /// 시장 접미사가 붙은 표기를 반환합니다.
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.code, self.venue.suffix())
    }

    /// 주어진 형식으로 티커를 표기합니다.
    pub fn render(&self, format: TickerFormat) -> String {
        match format {
            TickerFormat::Qualified => self.qualified(),
            TickerFormat::Bare => self.code.clone(),
        }
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.code, self.venue.suffix())
    }
}

impl FromStr for Ticker {
    type Err = ScannerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (code, suffix) = s
            .rsplit_once('.')
            .ok_or_else(|| ScannerError::InvalidInput(format!("시장 접미사가 없는 티커: {}", s)))?;

        if code.is_empty() {
            return Err(ScannerError::InvalidInput(format!("종목 코드가 비어 있음: {}", s)));
        }

        let venue = Venue::from_suffix(suffix)
            .ok_or_else(|| ScannerError::InvalidInput(format!("알 수 없는 시장 접미사: {}", s)))?;

        Ok(Self::new(code, venue))
    }
}

/// 결과 레코드에 기록할 티커 표기 방식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TickerFormat {
    /// 시장 접미사 포함 (2330.TW)
    #[default]
    Qualified,
    /// 종목 코드만 (2330)
    Bare,
}

impl FromStr for TickerFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "qualified" => Ok(Self::Qualified),
            "bare" => Ok(Self::Bare),
            _ => Err(format!("Unknown ticker format: {}", s)),
        }
    }
}
