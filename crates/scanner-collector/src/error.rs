//! 에러 타입 정의.

use scanner_core::ScannerError;
use scanner_data::DataError;
use std::fmt;

/// Collector 에러 타입
#[derive(Debug)]
pub enum CollectorError {
    /// 설정 에러 (스캔 시작 전 종료)
    Config(String),
    /// 데이터 소스 에러 (카탈로그, Yahoo 등)
    DataSource(String),
    /// 보존 저장소 에러
    Persistence(String),
    /// 일반 에러
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl CollectorError {
    /// 프로세스를 종료해야 하는 설정 에러인지 확인
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

impl fmt::Display for CollectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Configuration error: {}", msg),
            Self::DataSource(msg) => write!(f, "Data source error: {}", msg),
            Self::Persistence(msg) => write!(f, "Persistence error: {}", msg),
            Self::Other(e) => write!(f, "Error: {}", e),
        }
    }
}

impl std::error::Error for CollectorError {}

impl From<ScannerError> for CollectorError {
    fn from(err: ScannerError) -> Self {
        match err {
            ScannerError::Config(msg) => Self::Config(msg),
            ScannerError::Persistence(msg) => Self::Persistence(msg),
            ScannerError::DataUnavailable(msg) => Self::DataSource(msg),
            other => Self::Other(Box::new(other)),
        }
    }
}

impl From<DataError> for CollectorError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::ConfigError(msg) => Self::Config(msg),
            e if e.is_persistence_failure() => Self::Persistence(e.to_string()),
            e => Self::DataSource(e.to_string()),
        }
    }
}

impl From<std::env::VarError> for CollectorError {
    fn from(err: std::env::VarError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CollectorError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::Other(err)
    }
}

/// Result 타입 별칭
pub type Result<T> = std::result::Result<T, CollectorError>;
