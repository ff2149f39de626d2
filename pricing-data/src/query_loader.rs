//! CSV loader for negotiated-price queries.
//!
//! | Column | Required | Notes |
//! |---------------|----------|----------------------------------------------|
//! | `Descrição` | yes | product name |
//! | `PREÇO SOBEL` | yes | tax-inclusive target price; empty reads as 0 |
//! | `MVA (%)` | no | percent; blank cells use the catalog rate |
//! | `IPI (%)` | no | percent; blank cells use the catalog rate |
//!
//! ICMS is not read from the sheet; the caller supplies one rate for every
//! query.

use std::path::Path;

use pricing_core::SolverQuery;
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::catalog;
use crate::loader::{RowLoadError, SheetLoadError, normalize_header, read_file, reader};
use crate::utils::{parse_decimal, parse_optional_decimal, percent_to_rate};

pub const DESCRIPTION: &str = "Descrição";
pub const TARGET_PRICE: &str = "PREÇO SOBEL";
pub const MVA_PCT: &str = "MVA (%)";
pub const IPI_PCT: &str = "IPI (%)";

/// A query row ready for the solver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedQuery {
    /// 1-based data row number (header excluded).
    pub line: usize,
    pub description: String,

    /// Percentages as written (or taken from the catalog).
    pub mva_pct: Decimal,
    pub ipi_pct: Decimal,
    pub query: SolverQuery,
}

#[derive(Debug, Default)]
pub struct QueryLoad {
    pub queries: Vec<LoadedQuery>,
    pub row_errors: Vec<RowLoadError>,
}

struct QueryColumns {
    description: usize,
    target: usize,
    mva: Option<usize>,
    ipi: Option<usize>,
}

impl QueryColumns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, SheetLoadError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|header| normalize_header(header) == normalize_header(name))
        };
        let mva = find(MVA_PCT);
        let ipi = find(IPI_PCT);
        if mva.is_none() || ipi.is_none() {
            warn!("MVA or IPI column missing; using catalog rates");
        }
        Ok(Self {
            description: find(DESCRIPTION).ok_or(SheetLoadError::MissingRequiredColumn(DESCRIPTION))?,
            target: find(TARGET_PRICE).ok_or(SheetLoadError::MissingRequiredColumn(TARGET_PRICE))?,
            mva,
            ipi,
        })
    }
}

fn cell(
    record: &csv::StringRecord,
    idx: Option<usize>,
) -> &str {
    idx.and_then(|idx| record.get(idx)).unwrap_or("")
}

/// Reads a percentage cell, falling back to the catalog when it is blank.
fn rate_pct(
    record: &csv::StringRecord,
    idx: Option<usize>,
    column: &'static str,
    line: usize,
    description: &str,
    from_catalog: fn(&catalog::Product) -> Decimal,
) -> Result<Decimal, RowLoadError> {
    let written = parse_optional_decimal(cell(record, idx)).map_err(|source| {
        RowLoadError::InvalidNumber {
            line,
            column,
            source,
        }
    })?;
    match written {
        Some(pct) => Ok(pct),
        None => catalog::find(description)
            .map(|product| from_catalog(product) * Decimal::ONE_HUNDRED)
            .ok_or_else(|| RowLoadError::UnknownProduct {
                line,
                description: description.to_string(),
            }),
    }
}

fn convert_row(
    columns: &QueryColumns,
    record: &csv::StringRecord,
    line: usize,
    icms_rate: Decimal,
) -> Result<LoadedQuery, RowLoadError> {
    let description = cell(record, Some(columns.description)).to_string();
    let target_price = parse_decimal(cell(record, Some(columns.target))).map_err(|source| {
        RowLoadError::InvalidNumber {
            line,
            column: TARGET_PRICE,
            source,
        }
    })?;
    let mva_pct = rate_pct(record, columns.mva, MVA_PCT, line, &description, |p| p.mva_rate)?;
    let ipi_pct = rate_pct(record, columns.ipi, IPI_PCT, line, &description, |p| p.ipi_rate)?;

    Ok(LoadedQuery {
        line,
        query: SolverQuery {
            target_price,
            mva_rate: percent_to_rate(mva_pct),
            ipi_rate: percent_to_rate(ipi_pct),
            icms_rate,
        },
        description,
        mva_pct,
        ipi_pct,
    })
}

/// Parses solver queries from CSV text, in file order. Rows shorter than
/// the header read their absent cells as blank.
///
/// # Errors
///
/// Returns [`SheetLoadError`] for unreadable CSV or when `Descrição` or
/// `PREÇO SOBEL` is missing from the header.
pub fn load_queries_from_str(
    input: &str,
    icms_rate: Decimal,
) -> Result<QueryLoad, SheetLoadError> {
    let mut reader = reader(input);
    let columns = QueryColumns::from_headers(reader.headers()?)?;

    let mut load = QueryLoad::default();
    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        let line = idx + 1;
        match convert_row(&columns, &record, line, icms_rate) {
            Ok(query) => load.queries.push(query),
            Err(err) => {
                warn!(line, error = %err, "skipping query");
                load.row_errors.push(err);
            }
        }
    }

    info!(
        queries = load.queries.len(),
        errors = load.row_errors.len(),
        "loaded solver queries"
    );
    Ok(load)
}

pub fn load_queries_from_file(
    path: &Path,
    icms_rate: Decimal,
) -> Result<QueryLoad, SheetLoadError> {
    let contents = read_file(path)?;
    load_queries_from_str(&contents, icms_rate)
}
