//! 유동성 게이트 (Liquidity Gate).
//!
//! 지표 계산 전에 최근 세션의 종가와 거래량으로 종목을 걸러냅니다.
//! 두 기준 모두 경계값을 포함합니다 (`>=`).

use rust_decimal::Decimal;
use scanner_core::{FilterConfig, PriceBar};

/// 유동성 게이트 설정.
#[derive(Debug, Clone)]
pub struct LiquidityGate {
    /// 최소 종가
    pub min_price: Decimal,

    /// 최소 거래량 (거래 단위)
    pub min_volume_lots: Decimal,

    /// 1 거래 단위의 주식 수
    pub round_lot_size: u32,
}

impl LiquidityGate {
    /// 필터 설정으로 게이트 생성.
    pub fn from_config(config: &FilterConfig) -> Self {
        Self {
            min_price: config.min_price,
            min_volume_lots: config.min_volume_lots,
            round_lot_size: config.round_lot_size.max(1),
        }
    }

    /// 종가가 최소 가격 이상인지 확인.
    pub fn passes_price(&self, close: Decimal) -> bool {
        close >= self.min_price
    }

    /// 거래량(주)을 거래 단위로 환산해 최소 기준 이상인지 확인.
    pub fn passes_volume(&self, volume: Decimal) -> bool {
        self.volume_in_lots(volume) >= self.min_volume_lots
    }

    /// 거래량(주)을 거래 단위로 환산.
    pub fn volume_in_lots(&self, volume: Decimal) -> Decimal {
        volume / Decimal::from(self.round_lot_size.max(1))
    }

    /// 세션을 검사해 판정을 반환.
    ///
    /// 가격 기준을 먼저 검사합니다.
    pub fn check(&self, bar: &PriceBar) -> GateVerdict {
        if !self.passes_price(bar.close) {
            GateVerdict::PriceBelowMinimum
        } else if !self.passes_volume(bar.volume) {
            GateVerdict::VolumeBelowMinimum
        } else {
            GateVerdict::Pass
        }
    }
}

impl Default for LiquidityGate {
    fn default() -> Self {
        Self::from_config(&FilterConfig::default())
    }
}

/// 게이트 판정.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateVerdict {
    /// 통과
    Pass,
    /// 종가가 최소 가격 미만
    PriceBelowMinimum,
    /// 거래량이 최소 거래 단위 미만
    VolumeBelowMinimum,
}

impl GateVerdict {
    /// 통과 여부.
    pub fn is_pass(&self) -> bool {
        matches!(self, GateVerdict::Pass)
    }
}

// ================================================================================================
// 테스트
// ================================================================================================
