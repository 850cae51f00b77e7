//! 스캐너의 에러 타입.
//!
//! 이 모듈은 스캐너 전반에서 사용되는 에러 타입을 정의합니다.

use thiserror::Error;

/// 핵심 스캐너 에러.
#[derive(Debug, Error)]
pub enum ScannerError {
    /// 설정 누락 또는 잘못된 설정
    #[error("설정 에러: {0}")]
    Config(String),

    /// 종목 데이터를 사용할 수 없음 (조회 실패, 이력 부족)
    #[error("데이터 없음: {0}")]
    DataUnavailable(String),

    /// 보존 저장소 읽기/쓰기 실패
    #[error("저장소 에러: {0}")]
    Persistence(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),
}

/// 스캐너 작업을 위한 Result 타입.
pub type ScannerResult<T> = Result<T, ScannerError>;

impl ScannerError {
    /// 스캔 시작 전 프로세스를 종료해야 하는 에러인지 확인합니다.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScannerError::Config(_))
    }

    /// 해당 종목만 건너뛰면 되는 에러인지 확인합니다.
    pub fn is_skippable(&self) -> bool {
        matches!(self, ScannerError::DataUnavailable(_))
    }
}

impl From<serde_json::Error> for ScannerError {
    fn from(err: serde_json::Error) -> Self {
        ScannerError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for ScannerError {
    fn from(err: config::ConfigError) -> Self {
        ScannerError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_fatal() {
        let config_err = ScannerError::Config("missing credential".to_string());
        assert!(config_err.is_fatal());

        let store_err = ScannerError::Persistence("timeout".to_string());
        assert!(!store_err.is_fatal());
    }

    #[test]
    fn test_error_skippable() {
        let data_err = ScannerError::DataUnavailable("2330.TW".to_string());
        assert!(data_err.is_skippable());

        let input_err = ScannerError::InvalidInput("bad".to_string());
        assert!(!input_err.is_skippable());
    }
}
