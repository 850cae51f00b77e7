//! 보존 저장소 병합 및 기록.
//!
//! 실행마다 한 번 읽고, 병합한 뒤, 전체를 교체 기록합니다.
//! 동시 실행에 대한 잠금은 없습니다 (마지막 기록이 남음).

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use scanner_core::{MergeOutcome, RetentionConfig, RetentionMerger, RetentionTable, Signal};
use scanner_data::{GoogleSheetsStore, JsonFileStore, MemoryStore, RetentionStore, ServiceAccountKey};

use crate::config::{StoreBackend, StoreConfig};
use crate::error::CollectorError;
use crate::Result;

/// 설정된 백엔드로 저장소 생성
///
/// `dry_run`이면 외부 저장소 대신 빈 메모리 저장소를 사용합니다.
pub fn build_store(config: &StoreConfig, dry_run: bool) -> Result<Box<dyn RetentionStore>> {
    if dry_run {
        tracing::info!("dry-run: 메모리 저장소 사용");
        return Ok(Box::new(MemoryStore::new()));
    }

    match config.backend {
        StoreBackend::Sheets => {
            let spreadsheet_id = config.spreadsheet_id.clone().ok_or_else(|| {
                CollectorError::Config("스프레드시트 ID가 설정되지 않았습니다".to_string())
            })?;
            let key = ServiceAccountKey::from_file(&config.service_account_file)?;
            let store = GoogleSheetsStore::new(key, spreadsheet_id, config.sheet_name.clone())?;
            Ok(Box::new(store))
        }
        StoreBackend::File => Ok(Box::new(JsonFileStore::new(config.store_file.clone()))),
    }
}

/// 설정된 시간대 기준 오늘 날짜
pub fn run_date(timezone: Tz) -> NaiveDate {
    Utc::now().with_timezone(&timezone).date_naive()
}

/// 오늘 신호를 저장소에 병합
///
/// 신호가 없어도 병합합니다 (보존 기간 정리 목적).
pub async fn persist_signals(
    store: &dyn RetentionStore,
    signals: &[Signal],
    today: NaiveDate,
    retention: &RetentionConfig,
) -> Result<MergeOutcome> {
    let rows = store.read_rows().await?;
    let existing = RetentionTable::from_rows(rows, &retention.header);

    tracing::debug!(
        store = store.name(),
        rows = existing.len(),
        dates = existing.distinct_dates().len(),
        "기존 보존 테이블 로드"
    );

    let outcome = RetentionMerger::from_config(retention).merge(existing, signals, today);
    store.write_rows(&outcome.table.to_rows()).await?;

    tracing::info!(
        store = store.name(),
        date = %today,
        added = outcome.added,
        replaced = outcome.replaced,
        pruned = outcome.pruned_dates.len(),
        rows = outcome.table.len(),
        "보존 테이블 기록 완료"
    );

    Ok(outcome)
}

/// 오늘 신호를 저장소에 병합하고, 실패하면 기록만 남김
///
/// 저장 실패는 재시도하지 않으며 이번 실행의 결과는 버려집니다.
pub async fn persist_or_log(
    store: &dyn RetentionStore,
    signals: &[Signal],
    today: NaiveDate,
    retention: &RetentionConfig,
) -> Option<MergeOutcome> {
    match persist_signals(store, signals, today, retention).await {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            tracing::error!(
                store = store.name(),
                date = %today,
                signals = signals.len(),
                error = %e,
                "보존 테이블 기록 실패, 이번 실행 결과는 저장되지 않았습니다"
            );
            None
        }
    }
}

/// 저장소의 현재 보존 테이블 조회
pub async fn load_table(
    store: &dyn RetentionStore,
    retention: &RetentionConfig,
) -> Result<RetentionTable> {
    let rows = store.read_rows().await?;
    Ok(RetentionTable::from_rows(rows, &retention.header))
}
