//! 보존 병합 통합 테스트
//!
//! 빈 저장소에서 시작해 여러 날에 걸쳐 병합했을 때
//! 최근 3일 보존과 같은 날 재실행 덮어쓰기가 유지되는지 확인합니다.

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use scanner_core::{RetentionConfig, RetentionMerger, RetentionRecord, RetentionTable, Signal};

// ============================================================================
// 테스트 헬퍼 함수
// ============================================================================

fn day(n: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, n).unwrap()
}

fn default_header() -> Vec<String> {
    RetentionConfig::default().header
}

/// 저장소 왕복(행 변환 후 다시 파싱)을 거친 병합
fn merge_through_store(
    merger: &RetentionMerger,
    stored_rows: Vec<Vec<String>>,
    signals: &[Signal],
    today: NaiveDate,
) -> Vec<Vec<String>> {
    let existing = RetentionTable::from_rows(stored_rows, &default_header());
    merger.merge(existing, signals, today).table.to_rows()
}

fn dates_of(rows: &[Vec<String>]) -> Vec<String> {
    let mut dates: Vec<String> = rows.iter().skip(1).map(|r| r[0].clone()).collect();
    dates.sort();
    dates.dedup();
    dates
}

// ============================================================================
// 시나리오 테스트
// ============================================================================

#[test]
fn test_five_day_rolling_scenario() {
    let merger = RetentionMerger::new(3);

    // D1: 빈 저장소 + AAA
    let rows = merge_through_store(&merger, vec![], &[Signal::new("AAA", "Alpha")], day(1));
    assert_eq!(
        rows,
        vec![
            default_header(),
            vec!["2024-06-01".to_string(), "AAA".to_string(), "Alpha".to_string()],
        ]
    );

    // D2: 신호 없음 → D1만 남음
    let rows = merge_through_store(&merger, rows, &[], day(2));
    assert_eq!(dates_of(&rows), vec!["2024-06-01"]);
    assert_eq!(rows.len(), 2);

    // D3: BBB
    let rows = merge_through_store(&merger, rows, &[Signal::new("BBB", "Beta")], day(3));
    assert_eq!(dates_of(&rows), vec!["2024-06-01", "2024-06-03"]);

    // D4: CCC → 3개 날짜
    let rows = merge_through_store(&merger, rows, &[Signal::new("CCC", "Gamma")], day(4));
    assert_eq!(dates_of(&rows), vec!["2024-06-01", "2024-06-03", "2024-06-04"]);

    // D4 재실행: 완전히 동일해야 함
    let rerun = merge_through_store(&merger, rows.clone(), &[Signal::new("CCC", "Gamma")], day(4));
    assert_eq!(rerun, rows);
    let ccc_rows = rerun.iter().filter(|r| r[1] == "CCC").count();
    assert_eq!(ccc_rows, 1);

    // D5: D1 제거
    let rows = merge_through_store(&merger, rows, &[Signal::new("DDD", "Delta")], day(5));
    assert_eq!(dates_of(&rows), vec!["2024-06-03", "2024-06-04", "2024-06-05"]);
    assert!(rows.iter().all(|r| r[1] != "AAA"));
}

#[test]
fn test_append_order_is_discovery_order() {
    let merger = RetentionMerger::new(3);
    let signals = vec![
        Signal::new("2330.TW", "台積電"),
        Signal::new("1101.TW", "台泥"),
        Signal::new("6488.TWO", "環球晶"),
    ];

    let outcome = merger.merge(RetentionTable::new(default_header()), &signals, day(10));
    let tickers: Vec<&str> = outcome.table.records().iter().map(|r| r.ticker.as_str()).collect();

    assert_eq!(tickers, vec!["2330.TW", "1101.TW", "6488.TWO"]);
}

// ============================================================================
// 속성 테스트
// ============================================================================

fn arb_table() -> impl Strategy<Value = RetentionTable> {
    prop::collection::vec((0i64..20, "[A-Z]{3}"), 0..30).prop_map(|entries| {
        let base = day(1);
        let records = entries
            .into_iter()
            .map(|(offset, ticker)| RetentionRecord::new(base + Duration::days(offset), ticker.clone(), ticker))
            .collect();
        RetentionTable::with_records(default_header(), records)
    })
}

fn arb_signals() -> impl Strategy<Value = Vec<Signal>> {
    prop::collection::vec("[A-Z]{4}", 0..5)
        .prop_map(|tickers| tickers.into_iter().map(|t| Signal::new(t.clone(), t)).collect())
}

proptest! {
    #[test]
    fn prop_merge_keeps_most_recent_dates(
        table in arb_table(),
        signals in arb_signals(),
        offset in 0i64..25,
        window in 1usize..5,
    ) {
        let today = day(1) + Duration::days(offset);
        let mut expected_dates = table.distinct_dates();
        if !signals.is_empty() {
            expected_dates.insert(today);
        } else {
            expected_dates.remove(&today);
        }
        let expected: Vec<NaiveDate> = expected_dates.into_iter().rev().take(window).collect();

        let outcome = RetentionMerger::new(window).merge(table, &signals, today);
        let actual: Vec<NaiveDate> = outcome.table.distinct_dates().into_iter().rev().collect();

        prop_assert!(actual.len() <= window);
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn prop_same_day_merge_is_idempotent(
        table in arb_table(),
        signals in arb_signals(),
        offset in 0i64..25,
    ) {
        let today = day(1) + Duration::days(offset);
        let merger = RetentionMerger::new(3);

        let once = merger.merge(table, &signals, today).table;
        let twice = merger.merge(once.clone(), &signals, today).table;

        prop_assert_eq!(once, twice);
    }
}
