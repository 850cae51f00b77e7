//! 스캔 오케스트레이터.
//!
//! 종목마다 다음 순서로 평가하고, 한 종목의 실패가 전체 스캔을 중단시키지 않습니다.
//!
//! 1. 일봉 이력 조회 (실패 시 `Unavailable`)
//! 2. 최소 세션 수 확인
//! 3. 최근 세션의 가격/거래량 게이트
//! 4. 지표 계산과 첫 돌파 감지
//!
//! 신호는 발견 순서대로 모입니다.

use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use scanner_analytics::{BreakoutDetector, GateVerdict, IndicatorError, LiquidityGate};
use scanner_core::{scan_span, ScannerConfig, Signal, Ticker, TickerFormat};
use scanner_data::{InstrumentCatalog, PriceHistoryProvider};
use tracing::Instrument;

use crate::stats::ScanStats;

/// 필터 사유
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterReason {
    /// 종가가 최소 가격 미만
    PriceBelowMinimum,
    /// 거래량이 최소 거래 단위 미만
    VolumeBelowMinimum,
    /// 세션 수가 최소 이력 미만
    InsufficientHistory,
}

impl std::fmt::Display for FilterReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PriceBelowMinimum => write!(f, "price_below_minimum"),
            Self::VolumeBelowMinimum => write!(f, "volume_below_minimum"),
            Self::InsufficientHistory => write!(f, "insufficient_history"),
        }
    }
}

/// 종목 한 건의 평가 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstrumentOutcome {
    /// 첫 돌파 발견
    Matched(Signal),
    /// 조건 미충족
    NoSignal,
    /// 지표 계산 전 필터
    Filtered(FilterReason),
    /// 데이터를 사용할 수 없음
    Unavailable(String),
}

/// 스캔 실행 옵션
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// 가격 이력 조회 범위
    pub history_range: String,
    /// 종목 간 딜레이
    pub request_delay: Duration,
    /// 진행률 표시 여부
    pub show_progress: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            history_range: "2y".to_string(),
            request_delay: Duration::from_millis(500),
            show_progress: false,
        }
    }
}

/// 스캔 결과
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    /// 발견 순서의 신호
    pub signals: Vec<Signal>,
    /// 통계
    pub stats: ScanStats,
}

/// 스캔 오케스트레이터
pub struct Scanner<'a> {
    provider: &'a dyn PriceHistoryProvider,
    catalog: &'a dyn InstrumentCatalog,
    gate: LiquidityGate,
    detector: BreakoutDetector,
    ticker_format: TickerFormat,
    min_history: usize,
}

impl<'a> Scanner<'a> {
    /// Provider, 카탈로그, 설정으로 생성
    pub fn new(
        provider: &'a dyn PriceHistoryProvider,
        catalog: &'a dyn InstrumentCatalog,
        config: &ScannerConfig,
    ) -> Self {
        let detector = BreakoutDetector::new(config.indicators.clone());
        let min_history = detector.required_history();

        Self {
            provider,
            catalog,
            gate: LiquidityGate::from_config(&config.filter),
            detector,
            ticker_format: config.output.ticker_format,
            min_history,
        }
    }

    /// 종목 한 건 평가
    pub async fn evaluate(&self, ticker: &Ticker, history_range: &str) -> InstrumentOutcome {
        let series = match self.provider.fetch_daily(ticker, history_range).await {
            Ok(series) => series,
            Err(e) => {
                tracing::debug!(error = %e, "일봉 조회 실패, 건너뜀");
                return InstrumentOutcome::Unavailable(e.to_string());
            }
        };

        if !series.has_history(self.min_history) {
            tracing::debug!(sessions = series.len(), required = self.min_history, "이력 부족");
            return InstrumentOutcome::Filtered(FilterReason::InsufficientHistory);
        }

        let Some(latest) = series.latest() else {
            return InstrumentOutcome::Filtered(FilterReason::InsufficientHistory);
        };

        match self.gate.check(latest) {
            GateVerdict::Pass => {}
            GateVerdict::PriceBelowMinimum => {
                tracing::trace!(close = %latest.close, "가격 기준 미달");
                return InstrumentOutcome::Filtered(FilterReason::PriceBelowMinimum);
            }
            GateVerdict::VolumeBelowMinimum => {
                tracing::trace!(volume = %latest.volume, "거래량 기준 미달");
                return InstrumentOutcome::Filtered(FilterReason::VolumeBelowMinimum);
            }
        }

        match self.detector.evaluate(&series.closes()) {
            Ok(Some(check)) if check.is_breakout() => {
                let name = self.catalog.display_name(ticker);
                InstrumentOutcome::Matched(Signal::for_ticker(ticker, name, self.ticker_format))
            }
            Ok(_) => InstrumentOutcome::NoSignal,
            Err(IndicatorError::InsufficientData { .. }) => {
                InstrumentOutcome::Filtered(FilterReason::InsufficientHistory)
            }
            Err(e) => {
                tracing::warn!(error = %e, "지표 계산 실패");
                InstrumentOutcome::Unavailable(e.to_string())
            }
        }
    }

    /// 종목 목록 전체 스캔
    pub async fn run(&self, tickers: &[Ticker], options: &ScanOptions) -> ScanReport {
        let start = Instant::now();
        let mut report = ScanReport::default();

        tracing::info!(instruments = tickers.len(), range = %options.history_range, "스캔 시작");

        let pb = if options.show_progress {
            progress_bar(tickers.len())
        } else {
            ProgressBar::hidden()
        };

        for (idx, ticker) in tickers.iter().enumerate() {
            let outcome = self
                .evaluate(ticker, &options.history_range)
                .instrument(scan_span!(ticker))
                .await;

            report.stats.record(&outcome);

            match outcome {
                InstrumentOutcome::Matched(signal) => {
                    tracing::info!(ticker = %ticker, name = %signal.display_name, "신호 발견");
                    pb.println(format!("발견: {}", signal));
                    report.signals.push(signal);
                }
                InstrumentOutcome::Filtered(reason) => {
                    tracing::debug!(ticker = %ticker, reason = %reason, "필터 제외");
                }
                InstrumentOutcome::Unavailable(reason) => {
                    tracing::debug!(ticker = %ticker, reason = %reason, "데이터 없음");
                }
                InstrumentOutcome::NoSignal => {}
            }

            pb.set_message(format!("found {}", report.signals.len()));
            pb.inc(1);

            // Rate limiting
            if idx + 1 < tickers.len() && !options.request_delay.is_zero() {
                tokio::time::sleep(options.request_delay).await;
            }
        }

        pb.finish_and_clear();
        report.stats.elapsed = start.elapsed();
        report
    }
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    match ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
    {
        Ok(style) => pb.set_style(style.progress_chars("#>-")),
        Err(e) => tracing::debug!(error = %e, "진행률 스타일 적용 실패"),
    }
    pb
}
