use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Break-even unit price of a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakEven {
    /// The row is not losing money; the current price already breaks even.
    AtCurrentPrice(Decimal),

    /// Unit price at which net profit becomes exactly zero.
    Price(Decimal),

    /// The expense rates consume the whole price, so no finite break-even
    /// price exists. `fallback_price` is the row's own unit price.
    Undefined { fallback_price: Decimal },
}

impl BreakEven {
    /// Price to report for this row, whatever the variant.
    pub fn price(&self) -> Decimal {
        match *self {
            Self::AtCurrentPrice(price) | Self::Price(price) => price,
            Self::Undefined { fallback_price } => fallback_price,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined { .. })
    }
}

/// Financial figures derived from one [`CommercialRow`](super::CommercialRow).
///
/// All amounts are in BRL and kept at full precision; rounding happens only
/// when results are exported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedResult {
    pub subtotal: Decimal,
    pub freight_total: Decimal,
    pub ipi_amount: Decimal,

    /// ICMS-ST calculation base: (subtotal + IPI) × (1 + MVA).
    pub st_base: Decimal,
    pub icms_own: Decimal,
    pub icms_st: Decimal,
    pub pis_amount: Decimal,
    pub cofins_amount: Decimal,

    pub unit_cost_total: Decimal,
    pub expense_rate_sum: Decimal,
    pub real_expenses: Decimal,

    pub gross_profit: Decimal,
    pub net_profit: Decimal,
    pub irpj: Decimal,
    pub csll: Decimal,

    /// Net profit over subtotal, scaled by 100.
    pub profit_margin_pct: Decimal,
    pub total_invoice: Decimal,
    pub break_even: BreakEven,
}
