//! Portfolio-level aggregates over calculated rows.
//!
//! Revenue taxes (ICMS, ICMS-ST, PIS, COFINS, IPI) are expressed as a share
//! of total revenue. Profit taxes (IRPJ, CSLL) are expressed as a share of
//! total net profit and are dropped entirely when the portfolio as a whole
//! does not make a profit.
//!
//! Volume is also split by freight mode, and each product reports the band
//! of unit prices it was quoted at.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{percent_of, round_half_up};
use crate::models::{DerivedResult, FreightMode};

/// One calculated sale, labelled with its product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryLine {
    pub product: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub freight_mode: FreightMode,
    pub result: DerivedResult,
}

/// A tax amount and its percentage of the reference base.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxShare {
    pub amount: Decimal,
    pub pct: Decimal,
}

impl TaxShare {
    fn of(
        amount: Decimal,
        base: Decimal,
    ) -> Self {
        Self {
            amount,
            pct: percent_of(amount, base),
        }
    }
}

/// Fiscal breakdown of a portfolio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBurden {
    pub icms: TaxShare,
    pub icms_st: TaxShare,
    pub pis: TaxShare,
    pub cofins: TaxShare,
    pub ipi: TaxShare,

    // Base is net profit, not revenue
    pub irpj: TaxShare,
    pub csll: TaxShare,
}

impl TaxBurden {
    pub fn revenue_taxes(&self) -> Decimal {
        self.icms.amount + self.icms_st.amount + self.pis.amount + self.cofins.amount + self.ipi.amount
    }

    pub fn profit_taxes(&self) -> Decimal {
        self.irpj.amount + self.csll.amount
    }

    pub fn total(&self) -> Decimal {
        self.revenue_taxes() + self.profit_taxes()
    }

    /// Labelled shares in report order.
    pub fn entries(&self) -> [(&'static str, TaxShare); 7] {
        [
            ("ICMS", self.icms),
            ("ICMS-ST", self.icms_st),
            ("PIS", self.pis),
            ("COFINS", self.cofins),
            ("IPI", self.ipi),
            ("IRPJ", self.irpj),
            ("CSLL", self.csll),
        ]
    }
}

/// Boxes sold under each freight mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreightSplit {
    pub cif: i64,
    pub fob: i64,
}

impl FreightSplit {
    fn add(
        &mut self,
        mode: FreightMode,
        quantity: i64,
    ) {
        match mode {
            FreightMode::Cif => self.cif += quantity,
            FreightMode::Fob => self.fob += quantity,
        }
    }

    pub fn total(&self) -> i64 {
        self.cif + self.fob
    }

    /// Share of the volume sold CIF, zero when nothing was sold.
    pub fn cif_pct(&self) -> Decimal {
        percent_of(Decimal::from(self.cif), Decimal::from(self.total()))
    }

    pub fn fob_pct(&self) -> Decimal {
        percent_of(Decimal::from(self.fob), Decimal::from(self.total()))
    }
}

/// Revenue and profit of one product across all its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub product: String,
    pub quantity: i64,
    pub revenue: Decimal,
    pub net_profit: Decimal,
    pub margin_pct: Decimal,

    /// Lowest and highest unit price among the product's lines.
    pub min_price: Decimal,
    pub max_price: Decimal,

    /// Net profit over the volume valued at `min_price` and at `max_price`.
    pub margin_at_min_pct: Decimal,
    pub margin_at_max_pct: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub revenue: Decimal,
    pub volume: i64,

    /// Revenue over volume, zero for an empty portfolio.
    pub average_price: Decimal,
    pub net_profit: Decimal,
    pub profit_pct: Decimal,
    pub freight_total: Decimal,
    pub freight_pct: Decimal,
    pub freight_split: FreightSplit,
    pub tax_burden: TaxBurden,

    /// Ordered by product name.
    pub products: Vec<ProductSummary>,
}

#[derive(Default)]
struct Totals {
    quantity: i64,
    revenue: Decimal,
    net_profit: Decimal,
    price_band: Option<(Decimal, Decimal)>,
}

impl Totals {
    fn quote(
        &mut self,
        unit_price: Decimal,
    ) {
        self.price_band = Some(match self.price_band {
            Some((min, max)) => (min.min(unit_price), max.max(unit_price)),
            None => (unit_price, unit_price),
        });
    }

    fn into_summary(
        self,
        product: &str,
    ) -> ProductSummary {
        let (min_price, max_price) = self.price_band.unwrap_or_default();
        let volume = Decimal::from(self.quantity);
        ProductSummary {
            product: product.to_owned(),
            quantity: self.quantity,
            revenue: self.revenue,
            net_profit: self.net_profit,
            margin_pct: percent_of(self.net_profit, self.revenue),
            min_price,
            max_price,
            margin_at_min_pct: percent_of(self.net_profit, volume * min_price),
            margin_at_max_pct: percent_of(self.net_profit, volume * max_price),
        }
    }
}

impl PortfolioSummary {
    pub fn from_lines(lines: &[SummaryLine]) -> Self {
        let mut revenue = Decimal::ZERO;
        let mut volume = 0_i64;
        let mut net_profit = Decimal::ZERO;
        let mut freight_total = Decimal::ZERO;
        let mut freight_split = FreightSplit::default();
        let mut taxes = [Decimal::ZERO; 7];
        let mut by_product: BTreeMap<&str, Totals> = BTreeMap::new();

        for line in lines {
            let result = &line.result;
            revenue += result.subtotal;
            volume += line.quantity;
            net_profit += result.net_profit;
            freight_total += result.freight_total;
            freight_split.add(line.freight_mode, line.quantity);

            let amounts = [
                result.icms_own,
                result.icms_st,
                result.pis_amount,
                result.cofins_amount,
                result.ipi_amount,
                result.irpj,
                result.csll,
            ];
            for (total, amount) in taxes.iter_mut().zip(amounts) {
                *total += amount;
            }

            let product = by_product.entry(line.product.as_str()).or_default();
            product.quantity += line.quantity;
            product.revenue += result.subtotal;
            product.net_profit += result.net_profit;
            product.quote(line.unit_price);
        }

        let [icms, icms_st, pis, cofins, ipi, irpj, csll] = taxes;
        let profitable = net_profit > Decimal::ZERO;
        let profit_share = |amount: Decimal| {
            if profitable {
                TaxShare::of(amount, net_profit)
            } else {
                TaxShare::default()
            }
        };

        let tax_burden = TaxBurden {
            icms: TaxShare::of(icms, revenue),
            icms_st: TaxShare::of(icms_st, revenue),
            pis: TaxShare::of(pis, revenue),
            cofins: TaxShare::of(cofins, revenue),
            ipi: TaxShare::of(ipi, revenue),
            irpj: profit_share(irpj),
            csll: profit_share(csll),
        };

        let products = by_product
            .into_iter()
            .map(|(product, totals)| totals.into_summary(product))
            .collect();

        let average_price = if volume > 0 {
            revenue / Decimal::from(volume)
        } else {
            Decimal::ZERO
        };

        debug!(lines = lines.len(), revenue = %revenue, net_profit = %net_profit, "summarized portfolio");

        Self {
            revenue,
            volume,
            average_price,
            net_profit,
            profit_pct: percent_of(net_profit, revenue),
            freight_total,
            freight_pct: percent_of(freight_total, revenue),
            freight_split,
            tax_burden,
            products,
        }
    }
}

impl fmt::Display for PortfolioSummary {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "Revenue:        {}", round_half_up(self.revenue))?;
        writeln!(f, "Volume:         {}", self.volume)?;
        writeln!(f, "Average price:  {}", round_half_up(self.average_price))?;
        writeln!(
            f,
            "Net profit:     {} ({}%)",
            round_half_up(self.net_profit),
            round_half_up(self.profit_pct)
        )?;
        writeln!(
            f,
            "Freight:        {} ({}%)",
            round_half_up(self.freight_total),
            round_half_up(self.freight_pct)
        )?;
        writeln!(
            f,
            "CIF volume:     {} ({}%)",
            self.freight_split.cif,
            round_half_up(self.freight_split.cif_pct())
        )?;
        writeln!(
            f,
            "FOB volume:     {} ({}%)",
            self.freight_split.fob,
            round_half_up(self.freight_split.fob_pct())
        )?;

        writeln!(f)?;
        writeln!(f, "{:<10} {:>16} {:>10}", "Tax", "Amount", "% Base")?;
        for (name, share) in self.tax_burden.entries() {
            writeln!(
                f,
                "{:<10} {:>16} {:>10}",
                name,
                round_half_up(share.amount).to_string(),
                round_half_up(share.pct).to_string()
            )?;
        }
        writeln!(f, "Revenue taxes:  {}", round_half_up(self.tax_burden.revenue_taxes()))?;
        writeln!(f, "Profit taxes:   {}", round_half_up(self.tax_burden.profit_taxes()))?;
        writeln!(f, "Total taxes:    {}", round_half_up(self.tax_burden.total()))?;

        writeln!(f)?;
        writeln!(
            f,
            "{:<32} {:>10} {:>16} {:>16} {:>10} {:>12} {:>12}",
            "Product", "Qty", "Revenue", "Net profit", "Margin %", "Min price", "Max price"
        )?;
        for product in &self.products {
            writeln!(
                f,
                "{:<32} {:>10} {:>16} {:>16} {:>10} {:>12} {:>12}",
                product.product,
                product.quantity,
                round_half_up(product.revenue).to_string(),
                round_half_up(product.net_profit).to_string(),
                round_half_up(product.margin_pct).to_string(),
                round_half_up(product.min_price).to_string(),
                round_half_up(product.max_price).to_string()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::RowCalculator;
    use crate::models::{CommercialRow, GlobalParams, MarkupRates, TaxRates};

    /// R$ 10 × 100 plus R$ 1 fixed cost, sold CIF; a variable cost of 9
    /// makes a loss.
    fn line(
        product: &str,
        variable_cost: Decimal,
    ) -> SummaryLine {
        quoted_line(product, dec!(10), variable_cost, FreightMode::Cif)
    }

    fn quoted_line(
        product: &str,
        unit_price: Decimal,
        variable_cost: Decimal,
        freight_mode: FreightMode,
    ) -> SummaryLine {
        let row = CommercialRow {
            unit_price,
            quantity: 100,
            unit_cost_variable: variable_cost,
            unit_cost_fixed: dec!(1),
            freight_per_unit: dec!(1.5),
            tax_rates: TaxRates {
                icms: dec!(0.18),
                cofins: dec!(0.0765),
                pis: dec!(0.0165),
                ipi: dec!(0.05),
            },
            markup_rates: MarkupRates {
                commission: dec!(0.02),
                bonus: dec!(0.01),
                contingency: dec!(0.005),
                contract: dec!(0.01),
                strategic: dec!(0),
            },
            mva_rate: dec!(0.5),
        };
        let params = GlobalParams {
            freight_mode,
            ..GlobalParams::default()
        };
        let result = RowCalculator::new(params).calculate(&row).unwrap();
        SummaryLine {
            product: product.to_owned(),
            quantity: row.quantity,
            unit_price,
            freight_mode,
            result,
        }
    }

    // =========================================================================
    // Totals
    // =========================================================================

    #[test]
    fn empty_portfolio_is_all_zero() {
        let summary = PortfolioSummary::from_lines(&[]);

        assert_eq!(summary.revenue, Decimal::ZERO);
        assert_eq!(summary.volume, 0);
        assert_eq!(summary.average_price, Decimal::ZERO);
        assert_eq!(summary.profit_pct, Decimal::ZERO);
        assert_eq!(summary.tax_burden, TaxBurden::default());
        assert_eq!(summary.freight_split, FreightSplit::default());
        assert_eq!(summary.freight_split.cif_pct(), Decimal::ZERO);
        assert!(summary.products.is_empty());
    }

    #[test]
    fn totals_add_up_across_lines() {
        let lines = vec![line("LAVA ROUPAS 5L", dec!(4)), line("AMACIANTE 5L", dec!(4))];

        let summary = PortfolioSummary::from_lines(&lines);

        assert_eq!(summary.revenue, dec!(2000));
        assert_eq!(summary.volume, 200);
        assert_eq!(summary.average_price, dec!(10));
        assert_eq!(summary.freight_total, dec!(300));
        assert_eq!(summary.freight_pct, dec!(15));
        assert_eq!(
            summary.net_profit,
            lines[0].result.net_profit + lines[1].result.net_profit
        );
    }

    #[test]
    fn volume_is_split_by_freight_mode() {
        let lines = vec![
            quoted_line("LAVA ROUPAS 5L", dec!(10), dec!(4), FreightMode::Cif),
            quoted_line("AMACIANTE 5L", dec!(10), dec!(4), FreightMode::Fob),
            quoted_line("AMACIANTE 5L", dec!(12), dec!(4), FreightMode::Cif),
            quoted_line("DESINF. 5L", dec!(10), dec!(4), FreightMode::Cif),
        ];

        let summary = PortfolioSummary::from_lines(&lines);

        assert_eq!(summary.freight_split, FreightSplit { cif: 300, fob: 100 });
        assert_eq!(summary.freight_split.total(), summary.volume);
        assert_eq!(summary.freight_split.cif_pct(), dec!(75));
        assert_eq!(summary.freight_split.fob_pct(), dec!(25));
        // Only the CIF lines carry freight
        assert_eq!(summary.freight_total, dec!(450));
    }

    // =========================================================================
    // Tax burden
    // =========================================================================

    #[test]
    fn revenue_taxes_are_shares_of_revenue() {
        let summary = PortfolioSummary::from_lines(&[line("LAVA ROUPAS 5L", dec!(4))]);
        let burden = summary.tax_burden;

        assert_eq!(burden.icms, TaxShare { amount: dec!(180), pct: dec!(18) });
        assert_eq!(burden.pis.pct, dec!(1.65));
        assert_eq!(burden.cofins.pct, dec!(7.65));
        assert_eq!(burden.ipi, TaxShare { amount: dec!(50), pct: dec!(5) });
        assert_eq!(
            burden.revenue_taxes(),
            dec!(180) + burden.icms_st.amount + dec!(16.5) + dec!(76.5) + dec!(50)
        );
    }

    #[test]
    fn profit_taxes_are_shares_of_net_profit() {
        let summary = PortfolioSummary::from_lines(&[line("LAVA ROUPAS 5L", dec!(4))]);
        let burden = summary.tax_burden;

        assert!(summary.net_profit > Decimal::ZERO);
        assert!((burden.irpj.pct - dec!(25)).abs() < dec!(0.0000001));
        assert!((burden.csll.pct - dec!(9)).abs() < dec!(0.0000001));
        assert_eq!(burden.total(), burden.revenue_taxes() + burden.profit_taxes());
    }

    #[test]
    fn profit_taxes_dropped_when_portfolio_loses_money() {
        let profitable = line("LAVA ROUPAS 5L", dec!(4));
        let losing = line("AMACIANTE 5L", dec!(9));
        assert!(profitable.result.irpj > Decimal::ZERO);

        let summary = PortfolioSummary::from_lines(&[profitable, losing]);

        assert!(summary.net_profit < Decimal::ZERO);
        assert!(summary.profit_pct < Decimal::ZERO);
        assert_eq!(summary.tax_burden.irpj, TaxShare::default());
        assert_eq!(summary.tax_burden.csll, TaxShare::default());
        assert_eq!(summary.tax_burden.profit_taxes(), Decimal::ZERO);
    }

    // =========================================================================
    // Per product
    // =========================================================================

    #[test]
    fn products_are_merged_and_sorted_by_name() {
        let lines = vec![
            line("LAVA ROUPAS 5L", dec!(4)),
            line("AMACIANTE 5L", dec!(9)),
            line("LAVA ROUPAS 5L", dec!(4)),
        ];

        let summary = PortfolioSummary::from_lines(&lines);

        let names: Vec<_> = summary.products.iter().map(|p| p.product.as_str()).collect();
        assert_eq!(names, vec!["AMACIANTE 5L", "LAVA ROUPAS 5L"]);

        let lava = &summary.products[1];
        assert_eq!(lava.quantity, 200);
        assert_eq!(lava.revenue, dec!(2000));
        assert_eq!(lava.margin_pct, percent_of(lava.net_profit, dec!(2000)));
        assert!(summary.products[0].margin_pct < Decimal::ZERO);
    }

    #[test]
    fn price_band_tracks_lowest_and_highest_quote() {
        let lines = vec![
            quoted_line("AMACIANTE 5L", dec!(12), dec!(4), FreightMode::Cif),
            quoted_line("AMACIANTE 5L", dec!(9.5), dec!(4), FreightMode::Cif),
            quoted_line("AMACIANTE 5L", dec!(10), dec!(4), FreightMode::Fob),
            quoted_line("LAVA ROUPAS 5L", dec!(10), dec!(4), FreightMode::Cif),
        ];

        let summary = PortfolioSummary::from_lines(&lines);

        let amaciante = &summary.products[0];
        assert_eq!(amaciante.min_price, dec!(9.5));
        assert_eq!(amaciante.max_price, dec!(12));
        assert_eq!(
            amaciante.margin_at_min_pct,
            percent_of(amaciante.net_profit, dec!(300) * dec!(9.5))
        );
        assert_eq!(
            amaciante.margin_at_max_pct,
            percent_of(amaciante.net_profit, dec!(3600))
        );
        assert!(amaciante.margin_at_min_pct > amaciante.margin_at_max_pct);

        let lava = &summary.products[1];
        assert_eq!((lava.min_price, lava.max_price), (dec!(10), dec!(10)));
        assert_eq!(lava.margin_at_min_pct, lava.margin_pct);
    }

    #[test]
    fn report_lists_taxes_and_products() {
        let summary = PortfolioSummary::from_lines(&[line("LAVA ROUPAS 5L", dec!(4))]);

        let report = summary.to_string();

        assert!(report.contains("Revenue:        1000"));
        assert!(report.contains("Volume:         100"));
        assert!(report.contains("ICMS-ST"));
        assert!(report.contains("CSLL"));
        assert!(report.contains("LAVA ROUPAS 5L"));
        assert!(report.contains("CIF volume:     100 (100"), "{report}");
        assert!(report.contains("FOB volume:     0 (0"), "{report}");
        assert!(report.contains("Min price"));
    }
}
