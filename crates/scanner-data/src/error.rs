//! 데이터 모듈 오류 타입.

use scanner_core::ScannerError;
use thiserror::Error;

/// 데이터 관련 오류.
#[derive(Debug, Error)]
pub enum DataError {
    /// 데이터 가져오기 오류 (외부 소스)
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// 파싱 오류
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 레코드를 찾을 수 없음
    #[error("Record not found: {0}")]
    NotFound(String),

    /// 인증 오류 (서비스 계정, 토큰 교환)
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// 저장소 요청 실패
    #[error("Persistence error: {0}")]
    PersistenceError(String),

    /// 설정 오류
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// 직렬화/역직렬화 오류
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// 파일 입출력 오류
    #[error("I/O error: {0}")]
    IoError(String),
}

impl DataError {
    /// 저장소 단계의 실패인지 확인 (인증, 연결, 스키마 문제).
    pub fn is_persistence_failure(&self) -> bool {
        matches!(
            self,
            DataError::AuthError(_)
                | DataError::PersistenceError(_)
                | DataError::IoError(_)
                | DataError::SerializationError(_)
        )
    }
}

impl From<reqwest::Error> for DataError {
    fn from(err: reqwest::Error) -> Self {
        DataError::FetchError(err.to_string())
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for DataError {
    fn from(err: std::io::Error) -> Self {
        DataError::IoError(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for DataError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        DataError::AuthError(err.to_string())
    }
}

impl From<DataError> for ScannerError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::ConfigError(msg) => ScannerError::Config(msg),
            e if e.is_persistence_failure() => ScannerError::Persistence(e.to_string()),
            e => ScannerError::DataUnavailable(e.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
