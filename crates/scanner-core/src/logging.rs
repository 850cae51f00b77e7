//! tracing을 사용한 로깅 인프라.
//!
//! 스캔 진행 상황과 발견된 신호를 구조화된 이벤트로 기록합니다.
//! 출력 형식은 세 가지를 지원합니다:
//! - **pretty**: 터미널에서 읽기 쉬운 형식
//! - **json**: 로그 수집기용 JSON 형식
//! - **compact**: 한 줄 형식

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// 색상이 포함된 사람이 읽기 쉬운 형식
    #[default]
    Pretty,
    /// JSON 형식
    Json,
    /// 간결한 한 줄 형식
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 로그 레벨 필터 (예: "info", "scanner_collector=debug")
    pub level: String,
    /// 출력 형식
    pub format: LogFormat,
    /// 대상(모듈 경로) 포함 여부
    pub with_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            with_target: false,
        }
    }
}

impl LogConfig {
    /// 새 로그 설정을 생성합니다.
    pub fn new(level: impl Into<String>) -> Self {
        Self {
            level: level.into(),
            ..Default::default()
        }
    }

    /// 로그 형식을 설정합니다.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// 환경 변수에서 설정을 생성합니다.
    ///
    /// 레벨은 `RUST_LOG`, 형식은 `LOG_FORMAT`을 사용합니다.
    pub fn from_env() -> Self {
        let level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let format = std::env::var("LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        Self {
            level,
            format,
            ..Default::default()
        }
    }
}

/// 주어진 설정으로 로깅 시스템을 초기화합니다.
///
/// `RUST_LOG`가 설정되어 있으면 `config.level`보다 우선합니다.
///
/// ```no_run
/// use scanner_core::logging::{init_logging, LogConfig, LogFormat};
///
/// init_logging(LogConfig::new("debug").with_format(LogFormat::Compact)).unwrap();
/// ```
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;
    let registry = tracing_subscriber::registry().with(env_filter);

    match config.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_target(config.with_target))
            .try_init()?,
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(config.with_target))
            .try_init()?,
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_target(config.with_target))
            .try_init()?,
    }

    tracing::debug!(format = ?config.format, level = %config.level, "Logging initialized");

    Ok(())
}

/// 종목 단위 스캔 span을 생성하는 매크로.
#[macro_export]
macro_rules! scan_span {
    ($ticker:expr) => {
        tracing::debug_span!("scan", ticker = %$ticker)
    };
    ($ticker:expr, $step:expr) => {
        tracing::debug_span!("scan", ticker = %$ticker, step = %$step)
    };
}
