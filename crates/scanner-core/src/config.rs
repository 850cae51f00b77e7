//! 설정 관리.
//!
//! 필터 임계값, 지표 기간, 보존 기간 등 스캐너 동작을 결정하는 값을
//! 하나의 설정 레코드로 모아 오케스트레이터와 지표 엔진에 전달합니다.

use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ScannerError, ScannerResult};
use crate::types::TickerFormat;

/// 스캐너 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ScannerConfig {
    /// 유동성/가격 필터
    #[serde(default)]
    pub filter: FilterConfig,
    /// 지표 기간
    #[serde(default)]
    pub indicators: IndicatorConfig,
    /// 보존 정책
    #[serde(default)]
    pub retention: RetentionConfig,
    /// 결과 출력 형식
    #[serde(default)]
    pub output: OutputConfig,
}

/// 지표 계산 전 적용하는 유동성/가격 필터.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FilterConfig {
    /// 최소 종가
    pub min_price: Decimal,
    /// 최소 거래량 (거래 단위 기준)
    pub min_volume_lots: Decimal,
    /// 1 거래 단위의 주식 수
    pub round_lot_size: u32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            min_price: Decimal::from(10),
            min_volume_lots: Decimal::from(500),
            round_lot_size: 1000,
        }
    }
}

/// 지표 기간 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct IndicatorConfig {
    /// RSI 기간
    pub rsi_period: usize,
    /// RSI 기준선 (RSI의 SMA) 기간
    pub rsi_baseline_period: usize,
    /// 가격 이동평균 기간 (단기, 중기, 장기, 초장기)
    pub ma_periods: [usize; 4],
    /// 평가에 필요한 최소 세션 수
    pub min_history: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: 100,
            rsi_baseline_period: 200,
            ma_periods: [20, 60, 120, 240],
            min_history: 300,
        }
    }
}

/// 보존 정책 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetentionConfig {
    /// 보존할 최근 날짜 수
    pub window_days: usize,
    /// 저장소가 비어 있을 때 사용할 헤더
    pub header: Vec<String>,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            window_days: 3,
            header: vec![
                "date".to_string(),
                "ticker".to_string(),
                "display_name".to_string(),
            ],
        }
    }
}

/// 결과 출력 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// 티커 표기 방식
    #[serde(default)]
    pub ticker_format: TickerFormat,
    /// 실행 날짜를 정하는 시간대
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
}

fn default_timezone() -> Tz {
    chrono_tz::Asia::Taipei
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            ticker_format: TickerFormat::default(),
            timezone: default_timezone(),
        }
    }
}

impl ScannerConfig {
    /// 기본값, 선택적 설정 파일, 환경 변수 순으로 설정을 로드합니다.
    ///
    /// 환경 변수는 `SCANNER__FILTER__MIN_PRICE=20` 형식을 사용합니다.
    pub fn load<P: AsRef<Path>>(path: Option<P>) -> ScannerResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path.as_ref()).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("SCANNER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: Self = config.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// 설정 값의 유효성을 검사합니다.
    pub fn validate(&self) -> ScannerResult<()> {
        let ind = &self.indicators;

        if ind.rsi_period == 0 || ind.rsi_baseline_period == 0 {
            return Err(ScannerError::Config("RSI 기간은 0보다 커야 합니다".to_string()));
        }
        if ind.ma_periods.iter().any(|&p| p == 0) {
            return Err(ScannerError::Config(
                "이동평균 기간은 0보다 커야 합니다".to_string(),
            ));
        }
        if ind.min_history < 2 {
            return Err(ScannerError::Config(
                "최소 이력은 2 세션 이상이어야 합니다".to_string(),
            ));
        }
        if self.retention.window_days == 0 {
            return Err(ScannerError::Config("보존 기간은 1일 이상이어야 합니다".to_string()));
        }
        if self.retention.header.is_empty() {
            return Err(ScannerError::Config("보존 헤더가 비어 있습니다".to_string()));
        }
        if self.filter.round_lot_size == 0 {
            return Err(ScannerError::Config("거래 단위는 0보다 커야 합니다".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config_matches_scanner_constants() {
        let config = ScannerConfig::default();

        assert_eq!(config.filter.min_price, dec!(10));
        assert_eq!(config.filter.min_volume_lots, dec!(500));
        assert_eq!(config.indicators.rsi_period, 100);
        assert_eq!(config.indicators.rsi_baseline_period, 200);
        assert_eq!(config.indicators.ma_periods, [20, 60, 120, 240]);
        assert_eq!(config.indicators.min_history, 300);
        assert_eq!(config.retention.window_days, 3);
        assert_eq!(config.output.ticker_format, TickerFormat::Qualified);
        assert_eq!(config.output.timezone, chrono_tz::Asia::Taipei);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_windows() {
        let mut config = ScannerConfig::default();
        config.indicators.ma_periods = [20, 0, 120, 240];
        assert!(config.validate().is_err());

        let mut config = ScannerConfig::default();
        config.retention.window_days = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_partial_toml_uses_defaults() {
        let parsed: ScannerConfig = config::Config::builder()
            .add_source(config::File::from_str(
                "[output]\nticker_format = \"bare\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(parsed.output.ticker_format, TickerFormat::Bare);
        assert_eq!(parsed.output.timezone, chrono_tz::Asia::Taipei);
        assert_eq!(parsed.retention.window_days, 3);
    }
}
