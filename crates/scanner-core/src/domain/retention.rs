//! 최근 N일 보존 테이블과 병합 알고리즘.
//!
//! 저장소에는 `[날짜, 티커, 종목명]` 행이 누적되며, 병합 후에는 항상
//! 서로 다른 날짜가 최대 `window_days`개만 남습니다.
//!
//! # 병합 순서
//!
//! 1. 이번 실행의 신호에 실행 날짜(하나의 값)를 붙여 레코드로 만든다
//! 2. 기존 레코드 중 같은 날짜의 행은 모두 버린다 (같은 날 재실행은 덮어쓰기)
//! 3. 나머지 기존 행 뒤에 새 레코드를 이어 붙인다
//! 4. 서로 다른 날짜가 `window_days`개를 넘으면 최근 날짜만 남긴다
//!
//! 결과 테이블은 저장소 전체를 교체하는 데 사용됩니다.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::signal::Signal;
use crate::config::RetentionConfig;

/// 저장소 날짜 셀 형식.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 저장소의 한 행.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionRecord {
    /// 발견 날짜
    pub date: NaiveDate,
    /// 티커
    pub ticker: String,
    /// 종목명
    pub display_name: String,
}

impl RetentionRecord {
    /// 새 레코드를 생성합니다.
    pub fn new(date: NaiveDate, ticker: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            date,
            ticker: ticker.into(),
            display_name: display_name.into(),
        }
    }

    /// 신호에 날짜를 붙여 레코드를 생성합니다.
    pub fn from_signal(signal: &Signal, date: NaiveDate) -> Self {
        Self::new(date, signal.ticker.clone(), signal.display_name.clone())
    }

    /// 저장소 셀 목록에서 레코드를 파싱합니다.
    ///
    /// 첫 셀이 `YYYY-MM-DD` 형식이 아니면 `None`을 반환합니다.
    pub fn from_row(row: &[String]) -> Option<Self> {
        let date = NaiveDate::parse_from_str(row.first()?.trim(), DATE_FORMAT).ok()?;
        let cell = |idx: usize| row.get(idx).cloned().unwrap_or_default();

        Some(Self::new(date, cell(1), cell(2)))
    }

    /// 저장소 셀 목록으로 변환합니다.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.date.format(DATE_FORMAT).to_string(),
            self.ticker.clone(),
            self.display_name.clone(),
        ]
    }
}

/// 헤더와 데이터 행으로 구성된 보존 테이블.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetentionTable {
    header: Vec<String>,
    records: Vec<RetentionRecord>,
}

impl RetentionTable {
    /// 빈 테이블을 생성합니다.
    pub fn new(header: Vec<String>) -> Self {
        Self {
            header,
            records: Vec::new(),
        }
    }

    /// 헤더와 레코드로 테이블을 생성합니다.
    pub fn with_records(header: Vec<String>, records: Vec<RetentionRecord>) -> Self {
        Self { header, records }
    }

    /// 저장소에서 읽은 원시 행으로 테이블을 생성합니다.
    ///
    /// 행이 1개 이하이면 기본 헤더를 사용하고, 그 외에는 첫 행을 헤더로
    /// 유지합니다. 날짜를 해석할 수 없는 행은 경고 후 버립니다.
    pub fn from_rows(rows: Vec<Vec<String>>, default_header: &[String]) -> Self {
        if rows.len() <= 1 {
            return Self::new(default_header.to_vec());
        }

        let mut iter = rows.into_iter();
        let header = iter.next().unwrap_or_else(|| default_header.to_vec());

        let mut records = Vec::new();
        for (idx, row) in iter.enumerate() {
            if row.iter().all(|c| c.trim().is_empty()) {
                continue;
            }
            match RetentionRecord::from_row(&row) {
                Some(record) => records.push(record),
                None => tracing::warn!(row = idx + 2, cells = ?row, "날짜를 해석할 수 없는 행 제외"),
            }
        }

        Self { header, records }
    }

    /// 헤더 행.
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// 데이터 레코드.
    pub fn records(&self) -> &[RetentionRecord] {
        &self.records
    }

    /// 데이터 행 수.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// 데이터 행이 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 테이블에 존재하는 서로 다른 날짜.
    pub fn distinct_dates(&self) -> BTreeSet<NaiveDate> {
        self.records.iter().map(|r| r.date).collect()
    }

    /// 헤더를 포함한 저장소 행 목록으로 변환합니다.
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        std::iter::once(self.header.clone())
            .chain(self.records.iter().map(RetentionRecord::to_row))
            .collect()
    }
}

/// 병합 결과.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// 새 테이블 (저장소 전체 교체용)
    pub table: RetentionTable,
    /// 같은 날짜라서 교체된 기존 행 수
    pub replaced: usize,
    /// 새로 추가된 행 수
    pub added: usize,
    /// 보존 기간을 벗어나 제거된 날짜
    pub pruned_dates: Vec<NaiveDate>,
}

/// 최근 N일 보존 병합기.
#[derive(Debug, Clone, Copy)]
pub struct RetentionMerger {
    window_days: usize,
}

impl RetentionMerger {
    /// 보존할 날짜 수로 병합기를 생성합니다.
    pub fn new(window_days: usize) -> Self {
        Self {
            window_days: window_days.max(1),
        }
    }

    /// 설정에서 병합기를 생성합니다.
    pub fn from_config(config: &RetentionConfig) -> Self {
        Self::new(config.window_days)
    }

    /// 보존할 날짜 수.
    pub fn window_days(&self) -> usize {
        self.window_days
    }

    /// 오늘 신호를 기존 테이블과 병합합니다.
    ///
    /// 기존 행의 상대 순서는 유지되고 새 행은 신호 순서대로 뒤에 붙습니다.
    pub fn merge(&self, existing: RetentionTable, signals: &[Signal], today: NaiveDate) -> MergeOutcome {
        let RetentionTable { header, records } = existing;

        let before = records.len();
        let mut merged: Vec<RetentionRecord> = records.into_iter().filter(|r| r.date != today).collect();
        let replaced = before - merged.len();

        merged.extend(signals.iter().map(|s| RetentionRecord::from_signal(s, today)));

        let dates: BTreeSet<NaiveDate> = merged.iter().map(|r| r.date).collect();
        let mut pruned_dates = Vec::new();

        if dates.len() > self.window_days {
            let keep: BTreeSet<NaiveDate> = dates.iter().rev().take(self.window_days).copied().collect();
            pruned_dates = dates.difference(&keep).copied().collect();

            tracing::info!(
                keep = ?keep,
                pruned = ?pruned_dates,
                "보존 기간 초과, 최근 {}일만 유지",
                self.window_days
            );

            merged.retain(|r| keep.contains(&r.date));
        }

        MergeOutcome {
            table: RetentionTable::with_records(header, merged),
            replaced,
            added: signals.len(),
            pruned_dates,
        }
    }
}

impl Default for RetentionMerger {
    fn default() -> Self {
        Self::from_config(&RetentionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).unwrap()
    }

    fn header() -> Vec<String> {
        RetentionConfig::default().header
    }

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_from_rows_empty_uses_default_header() {
        let table = RetentionTable::from_rows(vec![], &header());
        assert_eq!(table.header(), header().as_slice());
        assert!(table.is_empty());

        let header_only = RetentionTable::from_rows(vec![row(&["日期", "股票代號", "股票名稱"])], &header());
        assert_eq!(header_only.header(), header().as_slice());
    }

    #[test]
    fn test_from_rows_keeps_stored_header_and_skips_bad_rows() {
        let rows = vec![
            row(&["日期", "股票代號", "股票名稱"]),
            row(&["2024-05-01", "2330.TW", "台積電"]),
            row(&["not-a-date", "2317.TW", "鴻海"]),
            row(&["", "", ""]),
            row(&["2024-05-02", "6488.TWO"]),
        ];

        let table = RetentionTable::from_rows(rows, &header());

        assert_eq!(table.header()[0], "日期");
        assert_eq!(table.len(), 2);
        assert_eq!(table.records()[1], RetentionRecord::new(date(2), "6488.TWO", ""));
    }

    #[test]
    fn test_to_rows_round_trip() {
        let table = RetentionTable::with_records(
            header(),
            vec![RetentionRecord::new(date(3), "2330.TW", "台積電")],
        );

        let rows = table.to_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], row(&["2024-05-03", "2330.TW", "台積電"]));
        assert_eq!(RetentionTable::from_rows(rows, &header()), table);
    }

    #[test]
    fn test_merge_replaces_same_day_rows() {
        let existing = RetentionTable::with_records(
            header(),
            vec![
                RetentionRecord::new(date(1), "AAA", "Alpha"),
                RetentionRecord::new(date(2), "OLD", "Stale"),
            ],
        );

        let outcome = RetentionMerger::new(3).merge(existing, &[Signal::new("BBB", "Beta")], date(2));

        assert_eq!(outcome.replaced, 1);
        assert_eq!(outcome.added, 1);
        assert_eq!(
            outcome.table.records(),
            &[
                RetentionRecord::new(date(1), "AAA", "Alpha"),
                RetentionRecord::new(date(2), "BBB", "Beta"),
            ]
        );
    }

    #[test]
    fn test_merge_prunes_oldest_dates_from_middle() {
        // 오래된 날짜가 뒤쪽에 섞여 있어도 날짜 기준으로 제거
        let existing = RetentionTable::with_records(
            header(),
            vec![
                RetentionRecord::new(date(3), "C1", "c"),
                RetentionRecord::new(date(1), "A1", "a"),
                RetentionRecord::new(date(4), "D1", "d"),
                RetentionRecord::new(date(1), "A2", "a"),
            ],
        );

        let outcome = RetentionMerger::new(3).merge(existing, &[Signal::new("E1", "e")], date(5));

        assert_eq!(outcome.pruned_dates, vec![date(1)]);
        let tickers: Vec<&str> = outcome.table.records().iter().map(|r| r.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["C1", "D1", "E1"]);
        assert_eq!(outcome.table.distinct_dates().len(), 3);
    }

    #[test]
    fn test_merge_without_signals_drops_today_rows() {
        let existing = RetentionTable::with_records(
            header(),
            vec![
                RetentionRecord::new(date(1), "AAA", "Alpha"),
                RetentionRecord::new(date(2), "BBB", "Beta"),
            ],
        );

        let outcome = RetentionMerger::new(3).merge(existing, &[], date(2));

        assert_eq!(outcome.table.distinct_dates().into_iter().collect::<Vec<_>>(), vec![date(1)]);
        assert_eq!(outcome.replaced, 1);
        assert_eq!(outcome.added, 0);
    }

    #[test]
    fn test_merger_window_never_zero() {
        assert_eq!(RetentionMerger::new(0).window_days(), 1);
        assert_eq!(RetentionMerger::default().window_days(), 3);
    }
}
