//! 스캔 및 보존 처리를 위한 도메인 모델.

mod market_data;
mod retention;
mod signal;

pub use market_data::*;
pub use retention::*;
pub use signal::*;
