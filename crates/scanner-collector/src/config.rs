//! 환경변수 기반 설정 모듈.

use crate::error::CollectorError;
use crate::Result;
use scanner_core::ScannerConfig;
use scanner_data::spreadsheet_id_from_url;
use std::path::PathBuf;
use std::time::Duration;

/// Collector 전체 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// 보존 저장소 설정
    pub store: StoreConfig,
    /// 스캔 실행 설정
    pub scan: ScanConfig,
    /// 필터/지표/보존/출력 설정
    pub scanner: ScannerConfig,
}

/// 보존 저장소 백엔드
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Google Sheets 워크시트
    Sheets,
    /// 로컬 JSON 파일
    File,
}

impl std::str::FromStr for StoreBackend {
    type Err = CollectorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sheets" | "google_sheets" => Ok(Self::Sheets),
            "file" | "json" => Ok(Self::File),
            other => Err(CollectorError::Config(format!(
                "알 수 없는 STORE_BACKEND: {}",
                other
            ))),
        }
    }
}

/// 보존 저장소 설정
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// 백엔드 종류
    pub backend: StoreBackend,
    /// 서비스 계정 키 파일
    pub service_account_file: PathBuf,
    /// 스프레드시트 ID
    pub spreadsheet_id: Option<String>,
    /// 워크시트 이름
    pub sheet_name: String,
    /// 파일 백엔드 경로
    pub store_file: PathBuf,
}

/// 스캔 실행 설정
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// 스캔할 최대 종목 수 (0 = 전체)
    pub limit: usize,
    /// API 요청 간 딜레이 (밀리초)
    pub request_delay_ms: u64,
    /// 가격 이력 조회 범위 (예: 2y)
    pub history_range: String,
}

/// CLI 로그 레벨로 tracing 필터 지시어 생성
///
/// 레벨은 기본 지시어로 들어가므로 바이너리(`breakout_scanner`)와
/// 모든 scanner crate의 이벤트가 함께 출력됩니다. HTTP 클라이언트 내부 로그는 warn으로 제한합니다.
pub fn log_filter(level: &str) -> String {
    format!("{},hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn", level)
}

impl CollectorConfig {
    /// 환경변수에서 설정 로드
    ///
    /// 스캐너 설정은 `SCANNER_CONFIG` 파일과 `SCANNER__*` 환경변수로 구성하고,
    /// 나머지 실행 설정은 일반 환경변수에서 읽습니다.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        let scanner = ScannerConfig::load(std::env::var("SCANNER_CONFIG").ok().map(PathBuf::from))?;
        Self::from_lookup(|key| std::env::var(key).ok(), scanner)
    }

    /// 변수 조회 함수와 로드된 스캐너 설정으로 구성
    ///
    /// 프로세스 환경은 읽지 않습니다.
    pub fn from_lookup<F>(lookup: F, scanner: ScannerConfig) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let backend = match lookup("STORE_BACKEND") {
            Some(value) => value.parse()?,
            None => StoreBackend::Sheets,
        };

        let spreadsheet_id = lookup("SHEET_ID")
            .filter(|id| !id.trim().is_empty())
            .or_else(|| lookup("SHEET_URL").and_then(|url| spreadsheet_id_from_url(&url)));

        Ok(Self {
            store: StoreConfig {
                backend,
                service_account_file: lookup("GOOGLE_SERVICE_ACCOUNT_FILE")
                    .unwrap_or_else(|| "service_account.json".to_string())
                    .into(),
                spreadsheet_id,
                sheet_name: lookup("SHEET_NAME").unwrap_or_else(|| "rsi_scanner".to_string()),
                store_file: lookup("STORE_FILE")
                    .unwrap_or_else(|| "rsi_scanner.json".to_string())
                    .into(),
            },
            scan: ScanConfig {
                limit: var_parse(&lookup, "SCAN_LIMIT", 50),
                request_delay_ms: var_parse(&lookup, "SCAN_REQUEST_DELAY_MS", 500),
                history_range: lookup("HISTORY_RANGE").unwrap_or_else(|| "2y".to_string()),
            },
            scanner,
        })
    }
}

impl StoreConfig {
    /// 선택된 백엔드에 필요한 설정이 있는지 확인
    ///
    /// Sheets 백엔드는 서비스 계정 키 파일과 스프레드시트 ID가 필요합니다.
    pub fn validate(&self) -> Result<()> {
        if self.backend != StoreBackend::Sheets {
            return Ok(());
        }

        if !self.service_account_file.exists() {
            return Err(CollectorError::Config(format!(
                "서비스 계정 키 파일을 찾을 수 없습니다: {}",
                self.service_account_file.display()
            )));
        }

        if self.spreadsheet_id.is_none() {
            return Err(CollectorError::Config(
                "SHEET_URL 또는 SHEET_ID 환경변수가 설정되지 않았습니다".to_string(),
            ));
        }

        Ok(())
    }
}

impl ScanConfig {
    /// API 요청 간 딜레이를 Duration으로 반환
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

/// 변수에서 값을 파싱 (실패 시 기본값 사용)
fn var_parse<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
