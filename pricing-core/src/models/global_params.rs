use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{CommercialRow, FreightMode};

/// Errors raised by [`GlobalParams::validate`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GlobalParamsError {
    #[error("freight per unit must be non-negative, got {0}")]
    InvalidFreight(Decimal),

    #[error("contract rate must be between 0 and 1, got {0}")]
    InvalidContractRate(Decimal),

    #[error("ICMS rate must be between 0 and 1, got {0}")]
    InvalidIcmsRate(Decimal),
}

/// Run-wide parameters applied on top of every row.
///
/// The `Option` fields are overrides: when set, they replace the value
/// carried by each row before any calculation happens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalParams {
    #[serde(default)]
    pub freight_mode: FreightMode,

    /// Freight per unit forced onto every row.
    #[serde(default)]
    pub freight_per_unit: Option<Decimal>,

    /// Contract markup (fraction) forced onto every row.
    #[serde(default)]
    pub contract_rate: Option<Decimal>,

    /// ICMS rate (fraction) forced onto every row and used by the batch solver.
    #[serde(default)]
    pub icms_rate: Option<Decimal>,
}

impl GlobalParams {
    pub fn validate(&self) -> Result<(), GlobalParamsError> {
        if let Some(freight) = self.freight_per_unit {
            if freight < Decimal::ZERO {
                return Err(GlobalParamsError::InvalidFreight(freight));
            }
        }
        if let Some(contract) = self.contract_rate {
            if !is_fraction(contract) {
                return Err(GlobalParamsError::InvalidContractRate(contract));
            }
        }
        if let Some(icms) = self.icms_rate {
            if !is_fraction(icms) {
                return Err(GlobalParamsError::InvalidIcmsRate(icms));
            }
        }
        Ok(())
    }

    /// Returns a copy of `row` with the configured overrides applied.
    pub fn apply(
        &self,
        row: &CommercialRow,
    ) -> CommercialRow {
        let mut effective = row.clone();
        if let Some(freight) = self.freight_per_unit {
            effective.freight_per_unit = freight;
        }
        if let Some(contract) = self.contract_rate {
            effective.markup_rates.contract = contract;
        }
        if let Some(icms) = self.icms_rate {
            effective.tax_rates.icms = icms;
        }
        effective
    }
}

/// A rate is valid when it lies in `[0, 1)`.
pub(crate) fn is_fraction(rate: Decimal) -> bool {
    rate >= Decimal::ZERO && rate < Decimal::ONE
}
