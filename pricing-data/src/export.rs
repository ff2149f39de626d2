//! CSV exports of calculated rows and solved queries.
//!
//! Money and percentages are rounded half-up to two places; negotiated
//! prices and the solver difference keep four. Rows that failed keep their
//! identity columns, leave the numeric cells empty and carry the message in
//! `Erro`.

use std::io;

use pricing_core::calculations::common::round_half_up_dp;
use pricing_core::calculations::{RowCalculationError, SolverError};
use pricing_core::{DerivedResult, NegotiatedPrice};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::loader::LoadedRow;
use crate::query_loader::LoadedQuery;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{inputs} inputs but {results} results")]
    LengthMismatch { inputs: usize, results: usize },
}

/// Rounds half-up and pads to exactly `dp` places.
fn fixed(
    value: Decimal,
    dp: u32,
) -> Decimal {
    let mut rounded = round_half_up_dp(value, dp);
    rounded.rescale(dp);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded
}

#[derive(Debug, Serialize)]
struct RowRecord<'a> {
    #[serde(rename = "Descrição")]
    description: &'a str,
    #[serde(rename = "UF")]
    uf: &'a str,
    #[serde(rename = "Preço de Venda")]
    unit_price: Decimal,
    #[serde(rename = "Quantidade")]
    quantity: i64,
    #[serde(rename = "Subtotal")]
    subtotal: Option<Decimal>,
    #[serde(rename = "Frete Total")]
    freight_total: Option<Decimal>,
    #[serde(rename = "IPI")]
    ipi: Option<Decimal>,
    #[serde(rename = "ICMS")]
    icms: Option<Decimal>,
    #[serde(rename = "Base ICMS-ST")]
    st_base: Option<Decimal>,
    #[serde(rename = "ICMS-ST")]
    icms_st: Option<Decimal>,
    #[serde(rename = "Lucro Bruto")]
    gross_profit: Option<Decimal>,
    #[serde(rename = "Lucro Líquido")]
    net_profit: Option<Decimal>,
    #[serde(rename = "IRPJ")]
    irpj: Option<Decimal>,
    #[serde(rename = "CSLL")]
    csll: Option<Decimal>,
    #[serde(rename = "Lucro %")]
    profit_margin_pct: Option<Decimal>,
    #[serde(rename = "Total NF")]
    total_invoice: Option<Decimal>,
    #[serde(rename = "Ponto de Equilíbrio")]
    break_even: Option<Decimal>,
    #[serde(rename = "Equilíbrio Indefinido")]
    break_even_undefined: Option<bool>,
    #[serde(rename = "Erro")]
    error: Option<String>,
}

impl<'a> RowRecord<'a> {
    fn new(
        input: &'a LoadedRow,
        result: &Result<DerivedResult, RowCalculationError>,
    ) -> Self {
        let mut record = Self {
            description: &input.description,
            uf: &input.uf,
            unit_price: input.row.unit_price,
            quantity: input.row.quantity,
            subtotal: None,
            freight_total: None,
            ipi: None,
            icms: None,
            st_base: None,
            icms_st: None,
            gross_profit: None,
            net_profit: None,
            irpj: None,
            csll: None,
            profit_margin_pct: None,
            total_invoice: None,
            break_even: None,
            break_even_undefined: None,
            error: None,
        };
        match result {
            Ok(r) => {
                let money = |value: Decimal| Some(fixed(value, 2));
                record.subtotal = money(r.subtotal);
                record.freight_total = money(r.freight_total);
                record.ipi = money(r.ipi_amount);
                record.icms = money(r.icms_own);
                record.st_base = money(r.st_base);
                record.icms_st = money(r.icms_st);
                record.gross_profit = money(r.gross_profit);
                record.net_profit = money(r.net_profit);
                record.irpj = money(r.irpj);
                record.csll = money(r.csll);
                record.profit_margin_pct = money(r.profit_margin_pct);
                record.total_invoice = money(r.total_invoice);
                record.break_even = money(r.break_even.price());
                record.break_even_undefined = Some(r.break_even.is_undefined());
            }
            Err(err) => record.error = Some(err.to_string()),
        }
        record
    }
}

#[derive(Debug, Serialize)]
struct QueryRecord<'a> {
    #[serde(rename = "Descrição")]
    description: &'a str,
    #[serde(rename = "PREÇO SOBEL")]
    target_price: Decimal,
    #[serde(rename = "MVA (%)")]
    mva_pct: Decimal,
    #[serde(rename = "IPI (%)")]
    ipi_pct: Decimal,
    #[serde(rename = "Preço Negociado")]
    negotiated_price: Option<Decimal>,
    #[serde(rename = "IPI Valor")]
    ipi_amount: Option<Decimal>,
    #[serde(rename = "ST Valor")]
    st_amount: Option<Decimal>,
    #[serde(rename = "Preço Sobel Simulado")]
    simulated_price: Option<Decimal>,
    #[serde(rename = "Diferença")]
    difference: Option<Decimal>,
    #[serde(rename = "Erro")]
    error: Option<String>,
}

impl<'a> QueryRecord<'a> {
    fn new(
        input: &'a LoadedQuery,
        result: &Result<NegotiatedPrice, SolverError>,
    ) -> Self {
        let (solved, error) = match result {
            Ok(solved) => (Some(solved), None),
            Err(err) => (None, Some(err.to_string())),
        };
        let field = |f: fn(&NegotiatedPrice) -> Decimal, dp: u32| {
            solved.map(|solved| fixed(f(solved), dp))
        };
        Self {
            description: &input.description,
            target_price: input.query.target_price,
            mva_pct: input.mva_pct,
            ipi_pct: input.ipi_pct,
            negotiated_price: field(|s| s.negotiated_price, 4),
            ipi_amount: field(|s| s.ipi_amount, 2),
            st_amount: field(|s| s.st_amount, 2),
            simulated_price: field(|s| s.simulated_price, 2),
            difference: field(|s| s.difference, 4),
            error,
        }
    }
}

fn check_lengths(
    inputs: usize,
    results: usize,
) -> Result<(), ExportError> {
    if inputs == results {
        Ok(())
    } else {
        Err(ExportError::LengthMismatch { inputs, results })
    }
}

/// Writes one record per row, pairing each input with its result.
///
/// # Errors
///
/// Returns [`ExportError::LengthMismatch`] when the slices differ in length,
/// or the underlying CSV/I/O error.
pub fn write_row_results<W: io::Write>(
    writer: W,
    rows: &[LoadedRow],
    results: &[Result<DerivedResult, RowCalculationError>],
) -> Result<(), ExportError> {
    check_lengths(rows.len(), results.len())?;

    let mut csv_writer = csv::Writer::from_writer(writer);
    for (row, result) in rows.iter().zip(results) {
        csv_writer.serialize(RowRecord::new(row, result))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Writes one record per solver query.
pub fn write_solver_results<W: io::Write>(
    writer: W,
    queries: &[LoadedQuery],
    results: &[Result<NegotiatedPrice, SolverError>],
) -> Result<(), ExportError> {
    check_lengths(queries.len(), results.len())?;

    let mut csv_writer = csv::Writer::from_writer(writer);
    for (query, result) in queries.iter().zip(results) {
        csv_writer.serialize(QueryRecord::new(query, result))?;
    }
    csv_writer.flush()?;
    Ok(())
}
