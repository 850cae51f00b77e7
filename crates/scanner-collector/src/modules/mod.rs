//! 스캔 작업 모듈.

pub mod persist;
pub mod scan;
pub mod universe;

pub use persist::{build_store, load_table, persist_or_log, persist_signals, run_date};
pub use scan::{FilterReason, InstrumentOutcome, ScanOptions, ScanReport, Scanner};
pub use universe::{load_catalog, select_universe};
