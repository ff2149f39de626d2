use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Freight terms for a sale.
///
/// Under CIF the seller pays the freight, so it enters the expense base.
/// Under FOB the buyer pays it and the seller's figures ignore it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FreightMode {
    #[default]
    Cif,
    Fob,
}

impl FreightMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cif => "CIF",
            Self::Fob => "FOB",
        }
    }

    pub fn includes_freight(&self) -> bool {
        matches!(self, Self::Cif)
    }
}

impl fmt::Display for FreightMode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognised freight mode '{0}' (expected CIF or FOB)")]
pub struct ParseFreightModeError(pub String);

impl FromStr for FreightMode {
    type Err = ParseFreightModeError;

    /// Accepts `CIF`/`FOB` and the single-letter sheet codes `C`/`F`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "CIF" | "C" => Ok(Self::Cif),
            "FOB" | "F" => Ok(Self::Fob),
            _ => Err(ParseFreightModeError(s.to_string())),
        }
    }
}

/// Revenue-based tax rates, as fractions (0.18 = 18%).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRates {
    pub icms: Decimal,
    pub cofins: Decimal,
    pub pis: Decimal,
    pub ipi: Decimal,
}

/// Commercial markups charged against the sale price, as fractions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkupRates {
    pub commission: Decimal,
    pub bonus: Decimal,
    pub contingency: Decimal,
    pub contract: Decimal,
    pub strategic: Decimal,
}

impl MarkupRates {
    pub fn total(&self) -> Decimal {
        self.commission + self.bonus + self.contingency + self.contract + self.strategic
    }
}

/// One line of pricing input: a product sold at a unit price in some quantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommercialRow {
    pub unit_price: Decimal,
    pub quantity: i64,
    pub unit_cost_variable: Decimal,
    pub unit_cost_fixed: Decimal,
    pub freight_per_unit: Decimal,
    pub tax_rates: TaxRates,
    pub markup_rates: MarkupRates,

    /// Tax-substitution markup (MVA) used only for the ICMS-ST base.
    pub mva_rate: Decimal,
}

impl CommercialRow {
    /// Sum of every percentage applied to the unit price: ICMS, COFINS, PIS
    /// and all commercial markups. IPI is charged on top of the price and is
    /// not part of it.
    pub fn expense_rate_sum(&self) -> Decimal {
        self.tax_rates.icms + self.tax_rates.cofins + self.tax_rates.pis + self.markup_rates.total()
    }

    /// `None` when the sum overflows.
    pub fn unit_cost_total(&self) -> Option<Decimal> {
        self.unit_cost_variable.checked_add(self.unit_cost_fixed)
    }
}
