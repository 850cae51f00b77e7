//! Google Sheets 보존 저장소.
//!
//! 서비스 계정 키로 OAuth 토큰을 발급받아 Sheets v4 REST API를 호출합니다.
//!
//! # 인증 흐름
//!
//! 1. 서비스 계정 키(JSON)의 개인 키로 RS256 JWT assertion 서명
//! 2. `token_uri`에 jwt-bearer grant로 교환해 access token 획득
//! 3. 만료 1분 전까지 토큰 재사용
//!
//! # 쓰기
//!
//! 기존 범위와 새 범위를 합친 영역을 한 번의 `values.update` 요청으로 덮어씁니다.
//! 남는 칸은 빈 문자열로 채우므로 요청이 실패하면 기존 내용이 그대로 남습니다.
//! `values.update`는 그리드를 늘리지 않으므로, 쓸 영역이 워크시트보다 크면
//! 먼저 `appendDimension` 요청으로 행/열을 추가합니다.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::RetentionStore;
use crate::error::{DataError, Result};

/// 기본 Sheets API 서버.
pub const DEFAULT_SHEETS_API_BASE: &str = "https://sheets.googleapis.com";

/// 기본 토큰 교환 주소.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// 새 워크시트 크기.
const NEW_SHEET_ROWS: u32 = 1000;
const NEW_SHEET_COLUMNS: u32 = 5;

/// 서비스 계정 키.
#[derive(Debug)]
pub struct ServiceAccountKey {
    client_email: String,
    token_uri: String,
    private_key: SecretString,
}

#[derive(Deserialize)]
struct RawServiceAccountKey {
    client_email: String,
    private_key: String,
    #[serde(default)]
    token_uri: Option<String>,
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

impl ServiceAccountKey {
    /// 키 JSON 문자열에서 생성.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawServiceAccountKey = serde_json::from_str(json)
            .map_err(|e| DataError::ConfigError(format!("서비스 계정 키 형식 오류: {}", e)))?;

        Ok(Self {
            client_email: raw.client_email,
            token_uri: raw.token_uri.unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
            private_key: SecretString::new(raw.private_key.into_boxed_str()),
        })
    }

    /// 키 파일에서 생성.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            DataError::ConfigError(format!("서비스 계정 키를 읽을 수 없음 ({}): {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    /// 서비스 계정 이메일.
    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    /// 토큰 교환 주소.
    pub fn token_uri(&self) -> &str {
        &self.token_uri
    }

    /// RS256 JWT assertion 서명.
    fn sign_assertion(&self, issued_at: i64) -> Result<String> {
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: SHEETS_SCOPE,
            aud: &self.token_uri,
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
        };
        let key = EncodingKey::from_rsa_pem(self.private_key.expose_secret().as_bytes())?;
        Ok(encode(&Header::new(Algorithm::RS256), &claims, &key)?)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMetadata {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    title: String,
    #[serde(default)]
    sheet_id: Option<i64>,
    #[serde(default)]
    grid_properties: Option<GridProperties>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GridProperties {
    #[serde(default)]
    row_count: usize,
    #[serde(default)]
    column_count: usize,
}

#[derive(Debug, Default, Deserialize)]
struct BatchUpdateResponse {
    #[serde(default)]
    replies: Vec<BatchUpdateReply>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdateReply {
    #[serde(default)]
    add_sheet: Option<SheetEntry>,
}

/// 워크시트 ID와 그리드 크기.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SheetGrid {
    sheet_id: Option<i64>,
    rows: usize,
    columns: usize,
}

impl SheetGrid {
    fn from_properties(properties: &SheetProperties) -> Self {
        let (rows, columns) = properties
            .grid_properties
            .as_ref()
            .map(|g| (g.row_count, g.column_count))
            .unwrap_or((NEW_SHEET_ROWS as usize, NEW_SHEET_COLUMNS as usize));
        Self {
            sheet_id: properties.sheet_id,
            rows,
            columns,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// Google Sheets 워크시트 보존 저장소.
pub struct GoogleSheetsStore {
    client: Client,
    key: ServiceAccountKey,
    spreadsheet_id: String,
    sheet_name: String,
    api_base: String,
    token: Mutex<Option<AccessToken>>,
    grid: Mutex<Option<SheetGrid>>,
}

impl GoogleSheetsStore {
    /// 서비스 계정 키와 스프레드시트 ID, 워크시트 이름으로 생성.
    pub fn new(
        key: ServiceAccountKey,
        spreadsheet_id: impl Into<String>,
        sheet_name: impl Into<String>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DataError::ConfigError(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self {
            client,
            key,
            spreadsheet_id: spreadsheet_id.into(),
            sheet_name: sheet_name.into(),
            api_base: DEFAULT_SHEETS_API_BASE.to_string(),
            token: Mutex::new(None),
            grid: Mutex::new(None),
        })
    }

    /// API 서버 주소 변경.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// 워크시트 이름.
    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    /// 유효한 access token 반환 (필요 시 재발급).
    async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.expires_at - chrono::Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) > Utc::now() {
                return Ok(token.value.clone());
            }
        }

        let now = Utc::now();
        let assertion = self.key.sign_assertion(now.timestamp())?;

        let response = self
            .client
            .post(self.key.token_uri())
            .form(&[("grant_type", JWT_GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| DataError::AuthError(format!("토큰 요청 실패: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DataError::AuthError(format!("토큰 교환 거부 ({}): {}", status, body)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| DataError::AuthError(format!("토큰 응답 파싱 실패: {}", e)))?;

        debug!(client_email = %self.key.client_email(), expires_in = token.expires_in, "access token 발급");

        let access = AccessToken {
            value: token.access_token,
            expires_at: now + chrono::Duration::seconds(token.expires_in),
        };
        let value = access.value.clone();
        *cached = Some(access);

        Ok(value)
    }

    /// `{base}/v4/spreadsheets/{segments...}` URL 생성.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| DataError::ConfigError(format!("잘못된 API 주소 ({}): {}", self.api_base, e)))?;

        url.path_segments_mut()
            .map_err(|_| DataError::ConfigError(format!("잘못된 API 주소: {}", self.api_base)))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets"])
            .extend(segments);

        Ok(url)
    }

    /// 인증 헤더를 붙여 요청하고 상태 코드를 확인.
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let token = self.access_token().await?;
        let response = request
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| DataError::PersistenceError(format!("Sheets 요청 실패: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(DataError::AuthError(format!(
                "Sheets 접근 거부 ({}): {}",
                status, body
            ))),
            _ => Err(DataError::PersistenceError(format!(
                "Sheets 응답 오류 ({}): {}",
                status, body
            ))),
        }
    }

    /// 워크시트가 없으면 생성하고 그리드 정보를 반환.
    async fn ensure_worksheet(&self) -> Result<SheetGrid> {
        let mut cached = self.grid.lock().await;
        if let Some(grid) = *cached {
            return Ok(grid);
        }

        let mut url = self.endpoint(&[self.spreadsheet_id.as_str()])?;
        url.query_pairs_mut().append_pair("fields", "sheets.properties");

        let metadata: SpreadsheetMetadata = self
            .send(self.client.get(url))
            .await?
            .json()
            .await
            .map_err(|e| DataError::PersistenceError(format!("스프레드시트 정보 파싱 실패: {}", e)))?;

        let existing = metadata
            .sheets
            .iter()
            .find(|s| s.properties.title == self.sheet_name)
            .map(|s| SheetGrid::from_properties(&s.properties));

        let grid = match existing {
            Some(grid) => grid,
            None => {
                let body = json!({
                    "requests": [{
                        "addSheet": {
                            "properties": {
                                "title": self.sheet_name,
                                "gridProperties": {
                                    "rowCount": NEW_SHEET_ROWS,
                                    "columnCount": NEW_SHEET_COLUMNS,
                                }
                            }
                        }
                    }]
                });

                let reply = self.batch_update(&body).await?;
                info!(sheet = %self.sheet_name, "워크시트 생성");

                reply
                    .replies
                    .iter()
                    .find_map(|r| r.add_sheet.as_ref())
                    .map(|s| SheetGrid::from_properties(&s.properties))
                    .unwrap_or(SheetGrid {
                        sheet_id: None,
                        rows: NEW_SHEET_ROWS as usize,
                        columns: NEW_SHEET_COLUMNS as usize,
                    })
            }
        };

        *cached = Some(grid);
        Ok(grid)
    }

    /// `spreadsheets.batchUpdate` 요청.
    async fn batch_update(&self, body: &serde_json::Value) -> Result<BatchUpdateResponse> {
        let batch_update = format!("{}:batchUpdate", self.spreadsheet_id);
        let url = self.endpoint(&[batch_update.as_str()])?;

        let text = self
            .send(self.client.post(url).json(body))
            .await?
            .text()
            .await
            .map_err(|e| DataError::PersistenceError(format!("batchUpdate 응답 수신 실패: {}", e)))?;
        if text.trim().is_empty() {
            return Ok(BatchUpdateResponse::default());
        }
        serde_json::from_str(&text)
            .map_err(|e| DataError::PersistenceError(format!("batchUpdate 응답 파싱 실패: {}", e)))
    }

    /// 쓸 영역이 그리드보다 크면 행/열 추가.
    async fn grow_grid(&self, grid: SheetGrid, height: usize, width: usize) -> Result<()> {
        let extra_rows = height.saturating_sub(grid.rows);
        let extra_columns = width.saturating_sub(grid.columns);
        if extra_rows == 0 && extra_columns == 0 {
            return Ok(());
        }

        let sheet_id = grid.sheet_id.ok_or_else(|| {
            DataError::PersistenceError(format!(
                "워크시트 ID를 알 수 없어 그리드를 늘릴 수 없음: {}",
                self.sheet_name
            ))
        })?;

        let requests: Vec<serde_json::Value> = [("ROWS", extra_rows), ("COLUMNS", extra_columns)]
            .into_iter()
            .filter(|(_, length)| *length > 0)
            .map(|(dimension, length)| {
                json!({
                    "appendDimension": {
                        "sheetId": sheet_id,
                        "dimension": dimension,
                        "length": length,
                    }
                })
            })
            .collect();

        self.batch_update(&json!({ "requests": requests })).await?;
        debug!(sheet = %self.sheet_name, extra_rows, extra_columns, "워크시트 그리드 확장");

        *self.grid.lock().await = Some(SheetGrid {
            rows: grid.rows.max(height),
            columns: grid.columns.max(width),
            ..grid
        });
        Ok(())
    }

    /// 워크시트의 현재 값 조회.
    async fn fetch_values(&self) -> Result<Vec<Vec<String>>> {
        let range = sheet_range(&self.sheet_name, None);
        let url = self.endpoint(&[self.spreadsheet_id.as_str(), "values", range.as_str()])?;

        let values: ValueRange = self
            .send(self.client.get(url))
            .await?
            .json()
            .await
            .map_err(|e| DataError::PersistenceError(format!("값 응답 파싱 실패: {}", e)))?;

        Ok(values.values)
    }
}

#[async_trait]
impl RetentionStore for GoogleSheetsStore {
    fn name(&self) -> &str {
        "sheets"
    }

    async fn read_rows(&self) -> Result<Vec<Vec<String>>> {
        self.ensure_worksheet().await?;
        self.fetch_values().await
    }

    async fn write_rows(&self, rows: &[Vec<String>]) -> Result<()> {
        let grid = self.ensure_worksheet().await?;

        let existing = self.fetch_values().await?;
        let padded = pad_to_extent(rows, &existing);
        let Some(width) = padded.first().map(Vec::len) else {
            return Ok(());
        };

        self.grow_grid(grid, padded.len(), width).await?;

        let cells = format!("A1:{}{}", column_letter(width), padded.len());
        let range = sheet_range(&self.sheet_name, Some(&cells));

        let mut url = self.endpoint(&[self.spreadsheet_id.as_str(), "values", range.as_str()])?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");

        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": padded,
        });

        self.send(self.client.put(url).json(&body)).await?;

        debug!(
            sheet = %self.sheet_name,
            rows = rows.len(),
            cleared_rows = existing.len().saturating_sub(rows.len()),
            "워크시트 교체"
        );
        Ok(())
    }
}

/// 워크시트 이름을 A1 표기 범위로 변환.
fn sheet_range(sheet_name: &str, cells: Option<&str>) -> String {
    let quoted = format!("'{}'", sheet_name.replace('\'', "''"));
    match cells {
        Some(cells) => format!("{}!{}", quoted, cells),
        None => quoted,
    }
}

/// 1부터 시작하는 열 번호를 A1 표기 열 문자로 변환.
fn column_letter(mut column: usize) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        column = (column - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// 새 행을 기존 범위까지 빈 문자열로 채움.
///
/// 결과는 `max(새 행 수, 기존 행 수)` × `max(모든 행의 열 수)` 직사각형입니다.
fn pad_to_extent(rows: &[Vec<String>], existing: &[Vec<String>]) -> Vec<Vec<String>> {
    let height = rows.len().max(existing.len());
    let width = rows
        .iter()
        .chain(existing.iter())
        .map(Vec::len)
        .max()
        .unwrap_or(0);

    if height == 0 || width == 0 {
        return Vec::new();
    }

    (0..height)
        .map(|i| {
            let mut row = rows.get(i).cloned().unwrap_or_default();
            row.resize(width, String::new());
            row
        })
        .collect()
}

/// 스프레드시트 URL에서 ID 추출.
///
/// `https://docs.google.com/spreadsheets/d/{id}/edit...` 형식을 지원합니다.
pub fn spreadsheet_id_from_url(url: &str) -> Option<String> {
    let (_, rest) = url.split_once("/spreadsheets/d/")?;
    let id = rest.split(['/', '?', '#']).next()?.trim();
    (!id.is_empty()).then(|| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_spreadsheet_id_from_url() {
        assert_eq!(
            spreadsheet_id_from_url("https://docs.google.com/spreadsheets/d/abc-123_X/edit?usp=sharing"),
            Some("abc-123_X".to_string())
        );
        assert_eq!(
            spreadsheet_id_from_url("https://docs.google.com/spreadsheets/d/abc"),
            Some("abc".to_string())
        );
        assert_eq!(spreadsheet_id_from_url("https://example.com/"), None);
    }

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(1), "A");
        assert_eq!(column_letter(3), "C");
        assert_eq!(column_letter(26), "Z");
        assert_eq!(column_letter(27), "AA");
        assert_eq!(column_letter(53), "BA");
    }

    #[test]
    fn test_sheet_range_quotes_name() {
        assert_eq!(sheet_range("rsi_scanner", Some("A1:C4")), "'rsi_scanner'!A1:C4");
        assert_eq!(sheet_range("Bob's", None), "'Bob''s'");
    }

    #[test]
    fn test_pad_to_extent_clears_old_cells() {
        let existing = vec![
            row(&["h1", "h2", "h3"]),
            row(&["a", "b", "c"]),
            row(&["d", "e", "f", "extra"]),
        ];
        let rows = vec![row(&["h1", "h2", "h3"])];

        let padded = pad_to_extent(&rows, &existing);

        assert_eq!(
            padded,
            vec![
                row(&["h1", "h2", "h3", ""]),
                row(&["", "", "", ""]),
                row(&["", "", "", ""]),
            ]
        );
    }

    #[test]
    fn test_sheet_grid_from_properties() {
        let properties: SheetProperties = serde_json::from_str(
            r#"{"sheetId": 9, "title": "rsi_scanner", "gridProperties": {"rowCount": 40, "columnCount": 3}}"#,
        )
        .unwrap();
        assert_eq!(
            SheetGrid::from_properties(&properties),
            SheetGrid { sheet_id: Some(9), rows: 40, columns: 3 }
        );

        let bare: SheetProperties = serde_json::from_str(r#"{"title": "rsi_scanner"}"#).unwrap();
        assert_eq!(
            SheetGrid::from_properties(&bare),
            SheetGrid { sheet_id: None, rows: 1000, columns: 5 }
        );
    }

    #[test]
    fn test_pad_to_extent_empty() {
        assert!(pad_to_extent(&[], &[]).is_empty());
    }

    #[test]
    fn test_key_requires_fields() {
        let err = ServiceAccountKey::from_json(r#"{"client_email": "x@y"}"#).unwrap_err();
        assert!(matches!(err, DataError::ConfigError(_)));

        let err = ServiceAccountKey::from_file("/nonexistent/service_account.json").unwrap_err();
        assert!(matches!(err, DataError::ConfigError(_)));
    }

    #[test]
    fn test_key_defaults_token_uri() {
        let key = ServiceAccountKey::from_json(
            r#"{"client_email": "bot@project.iam.gserviceaccount.com", "private_key": "pem"}"#,
        )
        .unwrap();
        assert_eq!(key.token_uri(), DEFAULT_TOKEN_URI);
        assert_eq!(key.client_email(), "bot@project.iam.gserviceaccount.com");
    }
}
