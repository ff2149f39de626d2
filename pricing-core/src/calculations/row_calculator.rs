//! Sales-price formation for a single commercial row.
//!
//! Turns one row of commercial inputs (price, quantity, costs, tax and markup
//! rates) into the revenue, tax and profit figures of that sale.
//!
//! # Calculation Steps
//!
//! Later steps consume earlier ones, so the order is fixed:
//!
//! | Step | Field | Formula |
//! |------|-------|---------|
//! | 1  | Subtotal | unit price × quantity |
//! | 2  | Freight total | freight per unit × quantity (CIF only) |
//! | 3  | IPI | subtotal × IPI rate |
//! | 4  | ICMS-ST base | (subtotal + IPI) × (1 + MVA) |
//! | 5  | Own ICMS | subtotal × ICMS rate |
//! | 6  | ICMS-ST | ST base × ICMS rate − own ICMS, never below zero |
//! | 7  | Unit cost | variable cost + fixed cost |
//! | 8  | Expense rates | ICMS + COFINS + PIS + all markups |
//! | 9  | Real expenses | unit price × expense rates × quantity + freight total |
//! | 10 | Gross profit | (unit price − unit cost) × quantity − real expenses |
//! | 11 | Net profit | gross profit ÷ 1.34 when positive, else gross profit |
//! | 12 | IRPJ / CSLL | 25% / 9% of net profit when positive, else zero |
//! | 13 | Margin | net profit ÷ subtotal × 100 (zero for an empty sale) |
//! | 14 | Invoice total | subtotal + IPI + ICMS-ST |
//! | 15 | Break-even | (unit cost + unit freight) ÷ (1 − expense rates), losses only |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use pricing_core::calculations::RowCalculator;
//! use pricing_core::{CommercialRow, GlobalParams, MarkupRates, TaxRates};
//!
//! let row = CommercialRow {
//!     unit_price: dec!(10),
//!     quantity: 100,
//!     unit_cost_variable: dec!(4),
//!     unit_cost_fixed: dec!(1),
//!     freight_per_unit: dec!(1.5),
//!     tax_rates: TaxRates {
//!         icms: dec!(0.18),
//!         cofins: dec!(0.0765),
//!         pis: dec!(0.0165),
//!         ipi: dec!(0.0),
//!     },
//!     markup_rates: MarkupRates {
//!         commission: dec!(0.02),
//!         bonus: dec!(0.01),
//!         contingency: dec!(0.005),
//!         contract: dec!(0.01),
//!         strategic: dec!(0.0),
//!     },
//!     mva_rate: dec!(0.5),
//! };
//!
//! let result = RowCalculator::new(GlobalParams::default()).calculate(&row).unwrap();
//!
//! assert_eq!(result.subtotal, dec!(1000));
//! assert_eq!(result.freight_total, dec!(150));
//! assert_eq!(result.icms_st, dec!(90));
//! assert_eq!(result.gross_profit, dec!(32));
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;
use tracing::{debug, warn};

use crate::calculations::common::{checked_percent_of, max};
use crate::models::{
    BreakEven, CommercialRow, DerivedResult, GlobalParams, GlobalParamsError, is_fraction,
};

/// Divisor applied to a positive gross profit to account for the 34%
/// presumed-profit tax load.
pub const PRESUMED_PROFIT_FACTOR: Decimal = dec!(1.34);

/// IRPJ rate on net profit.
pub const IRPJ_RATE: Decimal = dec!(0.25);

/// CSLL rate on net profit.
pub const CSLL_RATE: Decimal = dec!(0.09);

/// Errors that reject a row.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RowCalculationError {
    /// An input lies outside its documented domain (negative quantity or
    /// amount, rate outside `[0, 1)`, negative MVA).
    #[error("{field} is outside its valid domain, got {value}")]
    InvalidDomain { field: &'static str, value: Decimal },

    /// The run-wide parameters are invalid.
    #[error("invalid global parameters: {0}")]
    Params(#[from] GlobalParamsError),

    /// An amount derived from valid inputs does not fit a `Decimal`.
    #[error("{field} exceeds the decimal range")]
    Overflow { field: &'static str },
}

fn checked(
    value: Option<Decimal>,
    field: &'static str,
) -> Result<Decimal, RowCalculationError> {
    value.ok_or(RowCalculationError::Overflow { field })
}

/// Checks every field of an (already overridden) row.
fn validate_row(row: &CommercialRow) -> Result<(), RowCalculationError> {
    let non_negative = [
        ("unit_price", row.unit_price),
        ("quantity", Decimal::from(row.quantity)),
        ("unit_cost_variable", row.unit_cost_variable),
        ("unit_cost_fixed", row.unit_cost_fixed),
        ("freight_per_unit", row.freight_per_unit),
        ("mva_rate", row.mva_rate),
    ];
    let fractions = [
        ("icms_rate", row.tax_rates.icms),
        ("cofins_rate", row.tax_rates.cofins),
        ("pis_rate", row.tax_rates.pis),
        ("ipi_rate", row.tax_rates.ipi),
        ("commission_rate", row.markup_rates.commission),
        ("bonus_rate", row.markup_rates.bonus),
        ("contingency_rate", row.markup_rates.contingency),
        ("contract_rate", row.markup_rates.contract),
        ("strategic_rate", row.markup_rates.strategic),
    ];

    if let Some((field, value)) = non_negative
        .into_iter()
        .find(|(_, value)| *value < Decimal::ZERO)
    {
        return Err(RowCalculationError::InvalidDomain { field, value });
    }
    if let Some((field, value)) = fractions.into_iter().find(|(_, value)| !is_fraction(*value)) {
        return Err(RowCalculationError::InvalidDomain { field, value });
    }
    Ok(())
}

/// Calculator for the per-row price formation.
///
/// Holds the run-wide [`GlobalParams`]; every row passed to
/// [`RowCalculator::calculate`] gets those overrides applied first. The
/// calculator keeps no state between rows.
#[derive(Debug, Clone, Default)]
pub struct RowCalculator {
    params: GlobalParams,
}

impl RowCalculator {
    pub fn new(params: GlobalParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &GlobalParams {
        &self.params
    }

    /// Calculates every derived field of `row`.
    ///
    /// # Errors
    ///
    /// Returns [`RowCalculationError`] if the global parameters are invalid,
    /// if any row field is outside its domain, or if an amount overflows.
    /// A row whose expense rates
    /// leave no finite break-even price is *not* an error: it is reported as
    /// [`BreakEven::Undefined`].
    pub fn calculate(
        &self,
        row: &CommercialRow,
    ) -> Result<DerivedResult, RowCalculationError> {
        self.params.validate()?;

        let row = self.params.apply(row);
        validate_row(&row)?;

        let quantity = Decimal::from(row.quantity);

        // Steps 1-6: revenue and the taxes charged on the invoice.
        // Products with a validated rate stay below the subtotal.
        let subtotal = checked(row.unit_price.checked_mul(quantity), "subtotal")?;
        let freight_total = self.freight_total(&row, quantity)?;
        let ipi_amount = subtotal * row.tax_rates.ipi;
        let st_base = checked(
            subtotal
                .checked_add(ipi_amount)
                .and_then(|base| base.checked_mul(Decimal::ONE.checked_add(row.mva_rate)?)),
            "st_base",
        )?;
        let icms_own = subtotal * row.tax_rates.icms;
        let icms_st = self.icms_st(st_base, icms_own, row.tax_rates.icms);

        // Steps 7-10: costs and expenses
        let unit_cost_total = checked(row.unit_cost_total(), "unit_cost_total")?;
        let expense_rate_sum = row.expense_rate_sum();
        let real_expenses = checked(
            row.unit_price
                .checked_mul(expense_rate_sum)
                .and_then(|unit| unit.checked_mul(quantity))
                .and_then(|variable| variable.checked_add(freight_total)),
            "real_expenses",
        )?;
        let gross_profit = checked(
            row.unit_price
                .checked_sub(unit_cost_total)
                .and_then(|unit_margin| unit_margin.checked_mul(quantity))
                .and_then(|margin| margin.checked_sub(real_expenses)),
            "gross_profit",
        )?;

        // Steps 11-13: profit after income taxes
        let net_profit = self.net_profit(gross_profit);
        let (irpj, csll) = self.profit_taxes(net_profit);
        let profit_margin_pct = checked(
            checked_percent_of(net_profit, subtotal),
            "profit_margin_pct",
        )?;

        let total_invoice = checked(
            subtotal
                .checked_add(ipi_amount)
                .and_then(|total| total.checked_add(icms_st)),
            "total_invoice",
        )?;

        // Step 15
        let break_even = self.break_even(&row, net_profit, unit_cost_total, expense_rate_sum)?;

        Ok(DerivedResult {
            subtotal,
            freight_total,
            ipi_amount,
            st_base,
            icms_own,
            icms_st,
            pis_amount: subtotal * row.tax_rates.pis,
            cofins_amount: subtotal * row.tax_rates.cofins,
            unit_cost_total,
            expense_rate_sum,
            real_expenses,
            gross_profit,
            net_profit,
            irpj,
            csll,
            profit_margin_pct,
            total_invoice,
            break_even,
        })
    }

    fn freight_total(
        &self,
        row: &CommercialRow,
        quantity: Decimal,
    ) -> Result<Decimal, RowCalculationError> {
        if self.params.freight_mode.includes_freight() {
            checked(row.freight_per_unit.checked_mul(quantity), "freight_total")
        } else {
            Ok(Decimal::ZERO)
        }
    }

    /// Tax-substitution differential. The state only ever collects more, so
    /// a negative differential is clamped to zero.
    fn icms_st(
        &self,
        st_base: Decimal,
        icms_own: Decimal,
        icms_rate: Decimal,
    ) -> Decimal {
        max(st_base * icms_rate - icms_own, Decimal::ZERO)
    }

    /// Losses are reported as-is; only a profit carries the presumed tax load.
    fn net_profit(
        &self,
        gross_profit: Decimal,
    ) -> Decimal {
        if gross_profit > Decimal::ZERO {
            gross_profit / PRESUMED_PROFIT_FACTOR
        } else {
            debug!(gross_profit = %gross_profit, "row is not profitable; no presumed-profit load");
            gross_profit
        }
    }

    /// Returns `(irpj, csll)`.
    fn profit_taxes(
        &self,
        net_profit: Decimal,
    ) -> (Decimal, Decimal) {
        if net_profit > Decimal::ZERO {
            (net_profit * IRPJ_RATE, net_profit * CSLL_RATE)
        } else {
            (Decimal::ZERO, Decimal::ZERO)
        }
    }

    fn break_even(
        &self,
        row: &CommercialRow,
        net_profit: Decimal,
        unit_cost_total: Decimal,
        expense_rate_sum: Decimal,
    ) -> Result<BreakEven, RowCalculationError> {
        if net_profit >= Decimal::ZERO {
            return Ok(BreakEven::AtCurrentPrice(row.unit_price));
        }

        let denominator = Decimal::ONE - expense_rate_sum;
        if denominator <= Decimal::ZERO {
            warn!(
                unit_price = %row.unit_price,
                expense_rate_sum = %expense_rate_sum,
                "expense rates consume the whole price; break-even price is undefined"
            );
            return Ok(BreakEven::Undefined {
                fallback_price: row.unit_price,
            });
        }

        let freight_unit = if self.params.freight_mode.includes_freight() {
            row.freight_per_unit
        } else {
            Decimal::ZERO
        };

        let price = unit_cost_total
            .checked_add(freight_unit)
            .and_then(|cost| cost.checked_div(denominator));
        checked(price, "break_even").map(BreakEven::Price)
    }
}
