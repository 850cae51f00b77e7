//! 상장 종목 카탈로그.
//!
//! TWSE ISIN 공시 페이지(상장/장외)에서 종목 목록을 수집합니다.
//!
//! ## 데이터 소스
//! - `/isin/C_public.jsp?strMode=2`: 증권거래소 상장 (上市)
//! - `/isin/C_public.jsp?strMode=4`: 장외 시장 (上櫃)
//!
//! 페이지는 Big5 인코딩 HTML 표이며, 한 칸짜리 행이 증권 종류 구분(예: `股票`)이고
//! 그 아래 행들이 `코드　이름 | ISIN | 상장일 | 시장 | 산업 | CFI | 비고` 형식입니다.
//!
//! ## 사용 예시
//! ```rust,ignore
//! let client = TwseIsinClient::new()?;
//! let catalog = client.fetch_catalog().await?;
//! let universe = catalog.universe();
//! ```

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Client;
use scanner_core::{Ticker, Venue};
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{DataError, Result};

/// 보통주 증권 종류.
pub const COMMON_STOCK: &str = "股票";

/// 상장 시장 표기.
const MARKET_LISTED: &str = "上市";
/// 장외 시장 표기.
const MARKET_OTC: &str = "上櫃";

/// 기본 TWSE ISIN 서버.
pub const DEFAULT_ISIN_BASE_URL: &str = "https://isin.twse.com.tw";

/// 카탈로그의 종목 한 건.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentInfo {
    /// 종목 코드 (예: 2330)
    pub code: String,
    /// 현지 종목명
    pub name: String,
    /// ISIN 코드
    pub isin: String,
    /// 상장일
    pub listed_on: Option<NaiveDate>,
    /// 시장 구분 (上市, 上櫃 등)
    pub market: String,
    /// 산업 분류
    pub industry: String,
    /// CFI 코드
    pub cfi: String,
    /// 증권 종류 (股票, ETF 등)
    pub security_type: String,
}

impl InstrumentInfo {
    /// 보통주인지 확인합니다.
    pub fn is_common_stock(&self) -> bool {
        self.security_type == COMMON_STOCK
    }

    /// 시장 구분에 대응하는 상장 시장.
    pub fn venue(&self) -> Option<Venue> {
        match self.market.as_str() {
            MARKET_LISTED => Some(Venue::Twse),
            MARKET_OTC => Some(Venue::Tpex),
            _ => None,
        }
    }

    /// 시장 접미사가 붙은 티커.
    pub fn ticker(&self) -> Option<Ticker> {
        self.venue().map(|venue| Ticker::new(self.code.clone(), venue))
    }
}

/// 종목 카탈로그 trait.
pub trait InstrumentCatalog: Send + Sync {
    /// 종목 코드로 조회.
    fn lookup(&self, code: &str) -> Option<&InstrumentInfo>;

    /// 카탈로그 순서의 전체 종목.
    fn instruments(&self) -> &[InstrumentInfo];

    /// 스캔 대상 (보통주 중 상장/장외 시장 종목), 카탈로그 순서.
    fn universe(&self) -> Vec<Ticker> {
        self.instruments()
            .iter()
            .filter(|info| info.is_common_stock())
            .filter_map(InstrumentInfo::ticker)
            .collect()
    }

    /// 티커의 현지 종목명.
    fn display_name(&self, ticker: &Ticker) -> Option<&str> {
        self.lookup(&ticker.code).map(|info| info.name.as_str())
    }

    /// 사용자 입력(`2330` 또는 `2330.TW`)을 티커로 해석.
    ///
    /// 접미사가 없으면 카탈로그의 시장 구분을 사용합니다.
    fn resolve(&self, input: &str) -> Option<Ticker> {
        let input = input.trim();
        if input.contains('.') {
            return Ticker::from_str(input).ok();
        }
        self.lookup(input).and_then(InstrumentInfo::ticker)
    }
}

/// 메모리 내 종목 카탈로그.
#[derive(Debug, Clone, Default)]
pub struct ListingCatalog {
    instruments: Vec<InstrumentInfo>,
    index: HashMap<String, usize>,
}

impl ListingCatalog {
    /// 종목 목록으로 카탈로그 생성.
    ///
    /// 같은 코드가 중복되면 먼저 나온 항목을 사용합니다.
    pub fn new(instruments: Vec<InstrumentInfo>) -> Self {
        let mut index = HashMap::with_capacity(instruments.len());
        for (i, info) in instruments.iter().enumerate() {
            index.entry(info.code.clone()).or_insert(i);
        }
        Self { instruments, index }
    }

    /// 종목 수.
    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    /// 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    /// ISIN 공시 페이지 HTML을 파싱합니다.
    pub fn parse_isin_html(html: &str) -> Result<Vec<InstrumentInfo>> {
        let document = Html::parse_document(html);
        let tr_selector = Selector::parse("tr")
            .map_err(|e| DataError::ParseError(format!("selector: {:?}", e)))?;
        let td_selector = Selector::parse("td")
            .map_err(|e| DataError::ParseError(format!("selector: {:?}", e)))?;

        let mut section = String::new();
        let mut instruments = Vec::new();

        for tr in document.select(&tr_selector) {
            let cells: Vec<String> = tr
                .select(&td_selector)
                .map(|td| td.text().collect::<String>().trim().to_string())
                .collect();

            match cells.len() {
                0 => {}
                1 => section = cells[0].clone(),
                n if n >= 6 => {
                    if let Some(info) = parse_data_row(&cells, &section) {
                        instruments.push(info);
                    }
                }
                _ => {}
            }
        }

        Ok(instruments)
    }
}

impl InstrumentCatalog for ListingCatalog {
    fn lookup(&self, code: &str) -> Option<&InstrumentInfo> {
        self.index.get(code).and_then(|&i| self.instruments.get(i))
    }

    fn instruments(&self) -> &[InstrumentInfo] {
        &self.instruments
    }
}

/// 데이터 행 파싱. 헤더 행이나 코드가 없는 행은 `None`.
fn parse_data_row(cells: &[String], section: &str) -> Option<InstrumentInfo> {
    let (code, name) = split_code_and_name(&cells[0])?;

    Some(InstrumentInfo {
        code,
        name,
        isin: cells[1].clone(),
        listed_on: NaiveDate::parse_from_str(&cells[2], "%Y/%m/%d").ok(),
        market: cells[3].clone(),
        industry: cells[4].clone(),
        cfi: cells[5].clone(),
        security_type: section.to_string(),
    })
}

/// `2330　台積電` 형식의 셀을 코드와 이름으로 분리.
fn split_code_and_name(cell: &str) -> Option<(String, String)> {
    let (code, name) = cell
        .split_once('\u{3000}')
        .or_else(|| cell.split_once(char::is_whitespace))?;

    let code = code.trim();
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }

    Some((code.to_string(), name.trim().to_string()))
}

/// TWSE ISIN 공시 페이지 클라이언트.
pub struct TwseIsinClient {
    client: Client,
    base_url: String,
}

impl TwseIsinClient {
    /// 기본 서버로 생성.
    pub fn new() -> Result<Self> {
        Self::with_base_url(DEFAULT_ISIN_BASE_URL)
    }

    /// 서버 주소를 지정해 생성.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// 한 시장 페이지의 종목 목록 조회.
    ///
    /// `mode`: 2 = 상장, 4 = 장외
    pub async fn fetch_listing(&self, mode: u8) -> Result<Vec<InstrumentInfo>> {
        let url = format!("{}/isin/C_public.jsp?strMode={}", self.base_url, mode);
        debug!(url = %url, "ISIN 목록 요청");

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(DataError::FetchError(format!(
                "ISIN 목록 응답 오류 ({}): {}",
                mode,
                response.status()
            )));
        }

        // Content-Type에 charset이 없으면 Big5로 해석
        let html = response.text_with_charset("big5").await?;
        ListingCatalog::parse_isin_html(&html)
    }

    /// 상장 + 장외 시장 카탈로그 조회.
    pub async fn fetch_catalog(&self) -> Result<ListingCatalog> {
        let mut instruments = self.fetch_listing(2).await?;
        instruments.extend(self.fetch_listing(4).await?);

        if instruments.is_empty() {
            return Err(DataError::NotFound("ISIN 목록이 비어 있습니다".to_string()));
        }

        let catalog = ListingCatalog::new(instruments);
        info!(
            instruments = catalog.len(),
            universe = catalog.universe().len(),
            "종목 카탈로그 로드 완료"
        );

        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_HTML: &str = r#"
<html><body>
<table class="h4">
<tr><td>有價證券代號及名稱 </td><td>國際證券辨識號碼(ISIN Code)</td><td>上市日</td><td>市場別</td><td>產業別</td><td>CFICode</td><td>備註</td></tr>
<tr><td colspan=7><B> 股票 <B> </td></tr>
<tr><td>1101　台泥</td><td>TW0001101004</td><td>1962/02/09</td><td>上市</td><td>水泥工業</td><td>ESVUFR</td><td></td></tr>
<tr><td>2330　台積電</td><td>TW0002330008</td><td>1994/09/05</td><td>上市</td><td>半導體業</td><td>ESVUFR</td><td></td></tr>
<tr><td colspan=7><B> ETF <B> </td></tr>
<tr><td>0050　元大台灣50</td><td>TW0000050004</td><td>2003/06/30</td><td>上市</td><td></td><td>CEOGEU</td><td></td></tr>
</table>
</body></html>
"#;

    fn info(code: &str, name: &str, market: &str, security_type: &str) -> InstrumentInfo {
        InstrumentInfo {
            code: code.to_string(),
            name: name.to_string(),
            isin: String::new(),
            listed_on: None,
            market: market.to_string(),
            industry: String::new(),
            cfi: String::new(),
            security_type: security_type.to_string(),
        }
    }

    #[test]
    fn test_parse_isin_html() {
        let instruments = ListingCatalog::parse_isin_html(SAMPLE_HTML).unwrap();

        assert_eq!(instruments.len(), 3);
        assert_eq!(instruments[1].code, "2330");
        assert_eq!(instruments[1].name, "台積電");
        assert_eq!(instruments[1].security_type, COMMON_STOCK);
        assert_eq!(instruments[1].listed_on, NaiveDate::from_ymd_opt(1994, 9, 5));
        assert_eq!(instruments[2].security_type, "ETF");
    }

    #[test]
    fn test_universe_filters_common_stock_and_market() {
        let catalog = ListingCatalog::new(vec![
            info("1101", "台泥", "上市", "股票"),
            info("0050", "元大台灣50", "上市", "ETF"),
            info("6488", "環球晶", "上櫃", "股票"),
            info("7777", "興櫃股", "興櫃", "股票"),
        ]);

        let universe: Vec<String> = catalog.universe().iter().map(Ticker::qualified).collect();
        assert_eq!(universe, vec!["1101.TW", "6488.TWO"]);
    }

    #[test]
    fn test_resolve_and_display_name() {
        let catalog = ListingCatalog::new(vec![info("6488", "環球晶", "上櫃", "股票")]);

        assert_eq!(catalog.resolve("6488"), Some(Ticker::tpex("6488")));
        assert_eq!(catalog.resolve("2330.TW"), Some(Ticker::twse("2330")));
        assert_eq!(catalog.resolve("9999"), None);

        assert_eq!(catalog.display_name(&Ticker::tpex("6488")), Some("環球晶"));
        assert_eq!(catalog.display_name(&Ticker::twse("2330")), None);
    }

    #[test]
    fn test_duplicate_code_keeps_first() {
        let catalog = ListingCatalog::new(vec![
            info("1234", "first", "上市", "股票"),
            info("1234", "second", "上櫃", "股票"),
        ]);

        assert_eq!(catalog.lookup("1234").map(|i| i.name.as_str()), Some("first"));
    }

    #[tokio::test]
    async fn test_fetch_catalog_from_server() {
        let mut server = mockito::Server::new_async().await;
        let listed = server
            .mock("GET", "/isin/C_public.jsp")
            .match_query(mockito::Matcher::UrlEncoded("strMode".into(), "2".into()))
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body(SAMPLE_HTML)
            .create_async()
            .await;
        let otc = server
            .mock("GET", "/isin/C_public.jsp")
            .match_query(mockito::Matcher::UrlEncoded("strMode".into(), "4".into()))
            .with_header("content-type", "text/html; charset=utf-8")
            .with_body("<table><tr><td>股票</td></tr><tr><td>6488　環球晶</td><td>TW0006488000</td><td>2001/10/24</td><td>上櫃</td><td>半導體業</td><td>ESVUFR</td><td></td></tr></table>")
            .create_async()
            .await;

        let client = TwseIsinClient::with_base_url(server.url()).unwrap();
        let catalog = client.fetch_catalog().await.unwrap();

        listed.assert_async().await;
        otc.assert_async().await;
        assert_eq!(catalog.len(), 4);
        let universe: Vec<String> = catalog.universe().iter().map(Ticker::qualified).collect();
        assert_eq!(universe, vec!["1101.TW", "2330.TW", "6488.TWO"]);
    }
}
