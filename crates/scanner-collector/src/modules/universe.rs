//! 스캔 대상 종목 선정.

use scanner_core::Ticker;
use scanner_data::{InstrumentCatalog, ListingCatalog, TwseIsinClient};

use crate::Result;

/// 상장/장외 종목 카탈로그 조회
pub async fn load_catalog() -> Result<ListingCatalog> {
    let client = TwseIsinClient::new()?;
    let catalog = client.fetch_catalog().await?;

    tracing::info!(instruments = catalog.len(), "종목 카탈로그 로드 완료");
    Ok(catalog)
}

/// 스캔 대상 결정
///
/// `symbols`가 주어지면 쉼표로 구분된 코드를 카탈로그로 해석하고,
/// 없으면 카탈로그 순서의 보통주 중 앞에서부터 `limit`개를 사용합니다 (0 = 전체).
pub fn select_universe(
    catalog: &dyn InstrumentCatalog,
    symbols: Option<&str>,
    limit: usize,
) -> Vec<Ticker> {
    match symbols {
        Some(list) => {
            let mut tickers = Vec::new();
            for code in list.split(',').map(str::trim).filter(|c| !c.is_empty()) {
                match catalog.resolve(code) {
                    Some(ticker) if !tickers.contains(&ticker) => tickers.push(ticker),
                    Some(_) => {}
                    None => tracing::warn!(code = code, "종목을 찾을 수 없어 제외"),
                }
            }
            tracing::info!(count = tickers.len(), "지정 종목 스캔");
            tickers
        }
        None => {
            let universe = catalog.universe();
            let total = universe.len();
            let tickers: Vec<Ticker> = if limit == 0 {
                universe
            } else {
                universe.into_iter().take(limit).collect()
            };
            tracing::info!(selected = tickers.len(), total = total, "스캔 대상 선정");
            tickers
        }
    }
}
