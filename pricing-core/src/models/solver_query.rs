use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Request to recover the negotiated price behind a tax-inclusive price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverQuery {
    /// Downstream price including IPI and ICMS-ST.
    pub target_price: Decimal,
    pub mva_rate: Decimal,
    pub ipi_rate: Decimal,
    pub icms_rate: Decimal,
}

/// Solved negotiated price together with the taxes it carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiatedPrice {
    pub negotiated_price: Decimal,
    pub ipi_amount: Decimal,
    pub st_amount: Decimal,

    /// Forward price recomputed from `negotiated_price`.
    pub simulated_price: Decimal,

    /// `simulated_price - target_price`.
    pub difference: Decimal,
    pub iterations: u32,
}

impl NegotiatedPrice {
    pub(crate) fn zero() -> Self {
        Self {
            negotiated_price: Decimal::ZERO,
            ipi_amount: Decimal::ZERO,
            st_amount: Decimal::ZERO,
            simulated_price: Decimal::ZERO,
            difference: Decimal::ZERO,
            iterations: 0,
        }
    }
}
