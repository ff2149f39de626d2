//! CSV loader for commercial pricing sheets.
//!
//! ## CSV Format
//!
//! Headers are matched by name after trimming, ignoring case. Column order
//! does not matter and unknown columns are ignored. Rates are fractions
//! (`0.18` for 18%).
//!
//! | Column | Default when absent | Notes |
//! |------------------|---------------------|--------------------------------------|
//! | `Preço de Venda` | 0 | unit price (R$) |
//! | `Quantidade` | 1 | non-negative whole number |
//! | `Custo NET` | 0 | variable unit cost |
//! | `Custo Fixo` | 0 | fixed unit cost |
//! | `Frete Caixa` | 0 | freight per unit |
//! | `ICMS` | 0 | |
//! | `COFINS` | 0 | |
//! | `PIS` | 0 | |
//! | `Comissão` | 0 | |
//! | `Bonificação` | 0 | |
//! | `Contigência` | 0 | `Contingência` is accepted as well |
//! | `Contrato` | 0 | |
//! | `%Estrategico` | 0 | |
//! | `IPI` | 0 | |
//! | `MVA` | 0 | |
//! | `UF` | empty | state filter is skipped when absent |
//! | `Descrição` | empty | product filter is skipped when absent |
//!
//! Cells accept both `1.234,56` and `1,234.56`. An empty cell reads as 0.
//!
//! ### Example
//!
//! ```csv
//! Descrição,UF,Preço de Venda,Quantidade,Custo NET,Custo Fixo,ICMS,PIS,COFINS,MVA
//! AMACIANTE 5L,SP,"12,90",120,"6,10","1,05",0.18,0.0165,0.0765,0.4224
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use pricing_core::{CommercialRow, MarkupRates, TaxRates};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::catalog;
use crate::utils::{ParseDecimalError, parse_decimal};

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

/// A recognised column of the commercial sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    UnitPrice,
    Quantity,
    VariableCost,
    FixedCost,
    Freight,
    Icms,
    Cofins,
    Pis,
    Commission,
    Bonus,
    Contingency,
    Contract,
    Strategic,
    Ipi,
    Mva,
    Uf,
    Description,
}

impl Column {
    pub const ALL: [Column; 17] = [
        Column::UnitPrice,
        Column::Quantity,
        Column::VariableCost,
        Column::FixedCost,
        Column::Freight,
        Column::Icms,
        Column::Cofins,
        Column::Pis,
        Column::Commission,
        Column::Bonus,
        Column::Contingency,
        Column::Contract,
        Column::Strategic,
        Column::Ipi,
        Column::Mva,
        Column::Uf,
        Column::Description,
    ];

    /// Canonical header.
    pub fn header(&self) -> &'static str {
        match self {
            Column::UnitPrice => "Preço de Venda",
            Column::Quantity => "Quantidade",
            Column::VariableCost => "Custo NET",
            Column::FixedCost => "Custo Fixo",
            Column::Freight => "Frete Caixa",
            Column::Icms => "ICMS",
            Column::Cofins => "COFINS",
            Column::Pis => "PIS",
            Column::Commission => "Comissão",
            Column::Bonus => "Bonificação",
            Column::Contingency => "Contigência",
            Column::Contract => "Contrato",
            Column::Strategic => "%Estrategico",
            Column::Ipi => "IPI",
            Column::Mva => "MVA",
            Column::Uf => "UF",
            Column::Description => "Descrição",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Column::Contingency => &["Contingência"],
            _ => &[],
        }
    }

    fn matches(
        &self,
        header: &str,
    ) -> bool {
        let header = normalize_header(header);
        std::iter::once(self.header())
            .chain(self.aliases().iter().copied())
            .any(|name| normalize_header(name) == header)
    }

    /// Value used when the column is missing from the sheet. `None` for the
    /// text columns.
    pub fn default_value(&self) -> Option<Decimal> {
        match self {
            Column::Uf | Column::Description => None,
            Column::Quantity => Some(Decimal::ONE),
            _ => Some(Decimal::ZERO),
        }
    }
}

pub(crate) fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase()
}

/// Header positions of a sheet, keyed by column.
#[derive(Debug)]
struct ColumnMap {
    positions: HashMap<Column, usize>,
}

impl ColumnMap {
    fn from_headers(headers: &csv::StringRecord) -> Self {
        let positions = Column::ALL
            .iter()
            .filter_map(|column| {
                headers
                    .iter()
                    .position(|header| column.matches(header))
                    .map(|idx| (*column, idx))
            })
            .collect();
        Self { positions }
    }

    fn missing(&self) -> impl Iterator<Item = Column> + '_ {
        Column::ALL
            .into_iter()
            .filter(|column| !self.positions.contains_key(column))
    }

    /// Trimmed cell of `column`, or `None` when the sheet has no such column
    /// or the record stops short of it.
    fn cell<'r>(
        &self,
        record: &'r csv::StringRecord,
        column: Column,
    ) -> Option<&'r str> {
        self.positions
            .get(&column)
            .and_then(|idx| record.get(*idx))
            .map(str::trim)
    }

    fn text<'r>(
        &self,
        record: &'r csv::StringRecord,
        column: Column,
    ) -> &'r str {
        self.cell(record, column).unwrap_or("")
    }
}

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Row filters applied while loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// Keep only rows of this state (case-insensitive).
    pub uf: Option<String>,

    /// Keep only these products; `None` keeps every row.
    pub allowed_products: Option<Vec<String>>,
}

impl Default for LoadOptions {
    /// No state filter, catalog allow-list.
    fn default() -> Self {
        Self {
            uf: None,
            allowed_products: Some(catalog::names()),
        }
    }
}

impl LoadOptions {
    /// Options that keep every row.
    pub fn unfiltered() -> Self {
        Self {
            uf: None,
            allowed_products: None,
        }
    }
}

/// A column that was absent from the sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingColumn {
    pub column: Column,

    /// Value every row received instead; `None` for text columns.
    pub filled_with: Option<Decimal>,
}

/// A row that passed the filters and parsed cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedRow {
    /// 1-based data row number (header excluded).
    pub line: usize,
    pub description: String,
    pub uf: String,
    pub row: CommercialRow,
}

/// Result of loading one sheet.
#[derive(Debug, Default)]
pub struct SheetLoad {
    pub rows: Vec<LoadedRow>,
    pub row_errors: Vec<RowLoadError>,
    pub missing_columns: Vec<MissingColumn>,

    /// Rows dropped by the state or product filter.
    pub filtered_out: usize,
}

impl SheetLoad {
    pub fn is_missing(
        &self,
        column: Column,
    ) -> bool {
        self.missing_columns
            .iter()
            .any(|missing| missing.column == column)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors that stop a whole sheet from loading.
#[derive(Debug, Error)]
pub enum SheetLoadError {
    /// The CSV reader failed on the header or a record. Rows of a different
    /// width than the header are not an error.
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("required column '{0}' not found")]
    MissingRequiredColumn(&'static str),
}

/// Errors local to one row; the rest of the sheet still loads.
#[derive(Debug, Error)]
pub enum RowLoadError {
    #[error("row {line}: invalid {column}: {source}")]
    InvalidNumber {
        line: usize,
        column: &'static str,
        #[source]
        source: ParseDecimalError,
    },

    #[error("row {line}: quantity must be a non-negative whole number, got {value}")]
    InvalidQuantity { line: usize, value: Decimal },

    #[error("row {line}: no MVA/IPI available for product '{description}'")]
    UnknownProduct { line: usize, description: String },
}

impl RowLoadError {
    pub fn line(&self) -> usize {
        match self {
            RowLoadError::InvalidNumber { line, .. }
            | RowLoadError::InvalidQuantity { line, .. }
            | RowLoadError::UnknownProduct { line, .. } => *line,
        }
    }
}

// ---------------------------------------------------------------------------
// Core loader
// ---------------------------------------------------------------------------

pub(crate) fn reader(input: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(input.as_bytes())
}

pub(crate) fn read_file(path: &Path) -> Result<String, SheetLoadError> {
    std::fs::read_to_string(path).map_err(|source| SheetLoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn keep_row(
    options: &LoadOptions,
    uf: &str,
    description: &str,
    sheet_has_uf: bool,
    sheet_has_description: bool,
) -> bool {
    let uf_ok = match (&options.uf, sheet_has_uf) {
        (Some(wanted), true) => wanted.trim().eq_ignore_ascii_case(uf),
        _ => true,
    };
    let product_ok = match (&options.allowed_products, sheet_has_description) {
        (Some(allowed), true) => allowed
            .iter()
            .any(|name| catalog::same_product(name, description)),
        _ => true,
    };
    uf_ok && product_ok
}

fn convert_row(
    columns: &ColumnMap,
    record: &csv::StringRecord,
    line: usize,
) -> Result<CommercialRow, RowLoadError> {
    // A cell absent from the record takes the same default as an absent column
    let number = |column: Column| -> Result<Decimal, RowLoadError> {
        let Some(text) = columns.cell(record, column) else {
            return Ok(column.default_value().unwrap_or_default());
        };
        parse_decimal(text).map_err(|source| RowLoadError::InvalidNumber {
            line,
            column: column.header(),
            source,
        })
    };

    let quantity_value = number(Column::Quantity)?;
    let quantity = Some(quantity_value)
        .filter(|value| value.fract().is_zero() && *value >= Decimal::ZERO)
        .and_then(|value| value.to_i64())
        .ok_or(RowLoadError::InvalidQuantity {
            line,
            value: quantity_value,
        })?;

    Ok(CommercialRow {
        unit_price: number(Column::UnitPrice)?,
        quantity,
        unit_cost_variable: number(Column::VariableCost)?,
        unit_cost_fixed: number(Column::FixedCost)?,
        freight_per_unit: number(Column::Freight)?,
        tax_rates: TaxRates {
            icms: number(Column::Icms)?,
            cofins: number(Column::Cofins)?,
            pis: number(Column::Pis)?,
            ipi: number(Column::Ipi)?,
        },
        markup_rates: MarkupRates {
            commission: number(Column::Commission)?,
            bonus: number(Column::Bonus)?,
            contingency: number(Column::Contingency)?,
            contract: number(Column::Contract)?,
            strategic: number(Column::Strategic)?,
        },
        mva_rate: number(Column::Mva)?,
    })
}

/// Parses a commercial sheet from CSV text.
///
/// Rows are returned in file order. Filtered rows are counted but not
/// parsed, so malformed cells in rows outside the filter are not reported.
///
/// # Errors
///
/// Returns [`SheetLoadError::Csv`] if the CSV structure is invalid. Cell
/// problems are collected in [`SheetLoad::row_errors`] instead.
pub fn load_from_str(
    input: &str,
    options: &LoadOptions,
) -> Result<SheetLoad, SheetLoadError> {
    let mut reader = reader(input);
    let headers = reader.headers()?;
    let width = headers.len();
    let columns = ColumnMap::from_headers(headers);

    let mut load = SheetLoad::default();
    for column in columns.missing() {
        let filled_with = column.default_value();
        match filled_with {
            Some(value) => {
                warn!(column = column.header(), default = %value, "column missing; using default")
            }
            None => warn!(column = column.header(), "column missing; filter skipped"),
        }
        load.missing_columns.push(MissingColumn { column, filled_with });
    }
    let has_uf = !load.is_missing(Column::Uf);
    let has_description = !load.is_missing(Column::Description);

    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        let line = idx + 1;
        if record.len() < width {
            debug!(
                line,
                cells = record.len(),
                width,
                "short row; absent cells use column defaults"
            );
        }

        let description = columns.text(&record, Column::Description).to_string();
        let uf = columns.text(&record, Column::Uf).to_string();
        if !keep_row(options, &uf, &description, has_uf, has_description) {
            load.filtered_out += 1;
            continue;
        }

        match convert_row(&columns, &record, line) {
            Ok(row) => load.rows.push(LoadedRow {
                line,
                description,
                uf,
                row,
            }),
            Err(err) => {
                warn!(line, error = %err, "skipping row");
                load.row_errors.push(err);
            }
        }
    }

    info!(
        rows = load.rows.len(),
        errors = load.row_errors.len(),
        filtered_out = load.filtered_out,
        "loaded commercial sheet"
    );
    Ok(load)
}

/// Reads a file from disk and delegates to [`load_from_str`].
pub fn load_from_file(
    path: &Path,
    options: &LoadOptions,
) -> Result<SheetLoad, SheetLoadError> {
    let contents = read_file(path)?;
    load_from_str(&contents, options)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    // -----------------------------------------------------------------------
    // Helper: every column, two states
    // -----------------------------------------------------------------------
    const FULL_CSV: &str = "\
Descrição,UF,Preço de Venda,Quantidade,Custo NET,Custo Fixo,Frete Caixa,ICMS,COFINS,PIS,Comissão,Bonificação,Contigência,Contrato,%Estrategico,IPI,MVA
AMACIANTE 5L,SP,10,100,4,1,1.5,0.18,0.0765,0.0165,0.02,0.01,0.005,0.01,0,0,0.5
DESINF. 5L,MG,\"20,50\",10,8,2,1.5,0.18,0.0765,0.0165,0.02,0.01,0.005,0.01,0,0.05,0.5
";

    fn unfiltered(csv: &str) -> SheetLoad {
        load_from_str(csv, &LoadOptions::unfiltered()).expect("should load")
    }

    // -----------------------------------------------------------------------
    // 1. Full sheet
    // -----------------------------------------------------------------------
    #[test]
    fn test_full_sheet_parses_every_field() {
        let load = unfiltered(FULL_CSV);

        assert_eq!(load.rows.len(), 2);
        assert!(load.missing_columns.is_empty());
        assert!(load.row_errors.is_empty());

        let first = &load.rows[0];
        assert_eq!(first.line, 1);
        assert_eq!(first.description, "AMACIANTE 5L");
        assert_eq!(first.uf, "SP");
        assert_eq!(
            first.row,
            CommercialRow {
                unit_price: dec!(10),
                quantity: 100,
                unit_cost_variable: dec!(4),
                unit_cost_fixed: dec!(1),
                freight_per_unit: dec!(1.5),
                tax_rates: TaxRates {
                    icms: dec!(0.18),
                    cofins: dec!(0.0765),
                    pis: dec!(0.0165),
                    ipi: dec!(0),
                },
                markup_rates: MarkupRates {
                    commission: dec!(0.02),
                    bonus: dec!(0.01),
                    contingency: dec!(0.005),
                    contract: dec!(0.01),
                    strategic: dec!(0),
                },
                mva_rate: dec!(0.5),
            }
        );
    }

    #[test]
    fn test_brazilian_decimal_cell() {
        let load = unfiltered(FULL_CSV);

        assert_eq!(load.rows[1].row.unit_price, dec!(20.50));
        assert_eq!(load.rows[1].row.tax_rates.ipi, dec!(0.05));
    }

    // -----------------------------------------------------------------------
    // 2. Header matching
    // -----------------------------------------------------------------------
    #[test]
    fn test_headers_are_trimmed_and_case_insensitive() {
        let csv = "\
 descrição , uf ,PREÇO DE VENDA, quantidade
AMACIANTE 5L,SP,10,3
";
        let load = unfiltered(csv);

        assert_eq!(load.rows[0].description, "AMACIANTE 5L");
        assert_eq!(load.rows[0].row.unit_price, dec!(10));
        assert_eq!(load.rows[0].row.quantity, 3);
    }

    #[test]
    fn test_contingency_alias_is_accepted() {
        let csv = "Descrição,Contingência\nAMACIANTE 5L,0.005\n";

        let load = unfiltered(csv);

        assert_eq!(load.rows[0].row.markup_rates.contingency, dec!(0.005));
        assert!(!load.is_missing(Column::Contingency));
    }

    #[test]
    fn test_extra_columns_are_ignored() {
        let csv = "Descrição,Observação,Preço de Venda\nAMACIANTE 5L,promo,9\n";

        let load = unfiltered(csv);

        assert_eq!(load.rows[0].row.unit_price, dec!(9));
    }

    // -----------------------------------------------------------------------
    // 3. Missing columns
    // -----------------------------------------------------------------------
    #[test]
    fn test_missing_numeric_columns_are_default_filled() {
        let csv = "Descrição,UF,Preço de Venda\nAMACIANTE 5L,SP,10\n";

        let load = unfiltered(csv);

        let row = &load.rows[0].row;
        assert_eq!(row.quantity, 1);
        assert_eq!(row.tax_rates.icms, Decimal::ZERO);
        assert_eq!(row.mva_rate, Decimal::ZERO);
        assert!(load.missing_columns.contains(&MissingColumn {
            column: Column::Quantity,
            filled_with: Some(Decimal::ONE),
        }));
        assert!(load.missing_columns.contains(&MissingColumn {
            column: Column::Mva,
            filled_with: Some(Decimal::ZERO),
        }));
        assert!(!load.is_missing(Column::UnitPrice));
    }

    #[test]
    fn test_missing_uf_skips_state_filter() {
        let csv = "Descrição,Preço de Venda\nAMACIANTE 5L,10\n";
        let options = LoadOptions {
            uf: Some("SP".to_string()),
            ..LoadOptions::default()
        };

        let load = load_from_str(csv, &options).expect("should load");

        assert_eq!(load.rows.len(), 1);
        assert_eq!(load.rows[0].uf, "");
        assert!(load.missing_columns.contains(&MissingColumn {
            column: Column::Uf,
            filled_with: None,
        }));
    }

    #[test]
    fn test_missing_description_skips_product_filter() {
        let csv = "UF,Preço de Venda\nSP,10\n";

        let load = load_from_str(csv, &LoadOptions::default()).expect("should load");

        assert_eq!(load.rows.len(), 1);
        assert_eq!(load.rows[0].description, "");
    }

    // -----------------------------------------------------------------------
    // 4. Filters
    // -----------------------------------------------------------------------
    #[test]
    fn test_uf_filter_is_case_insensitive() {
        let options = LoadOptions {
            uf: Some("mg".to_string()),
            allowed_products: None,
        };

        let load = load_from_str(FULL_CSV, &options).expect("should load");

        assert_eq!(load.rows.len(), 1);
        assert_eq!(load.rows[0].description, "DESINF. 5L");
        assert_eq!(load.filtered_out, 1);
    }

    #[test]
    fn test_default_options_use_catalog_allow_list() {
        let csv = "\
Descrição,Preço de Venda
AMACIANTE 5L,10
DETERGENTE 1L,5
 lava roupas 5l ,7
";
        let load = load_from_str(csv, &LoadOptions::default()).expect("should load");

        let names: Vec<_> = load.rows.iter().map(|r| r.description.as_str()).collect();
        assert_eq!(names, vec!["AMACIANTE 5L", "lava roupas 5l"]);
        assert_eq!(load.filtered_out, 1);
    }

    #[test]
    fn test_custom_allow_list() {
        let options = LoadOptions {
            uf: None,
            allowed_products: Some(vec!["desinf. 5l".to_string()]),
        };

        let load = load_from_str(FULL_CSV, &options).expect("should load");

        assert_eq!(load.rows.len(), 1);
        assert_eq!(load.rows[0].uf, "MG");
    }

    #[test]
    fn test_filtered_rows_are_not_parsed() {
        let csv = "Descrição,Preço de Venda\nDETERGENTE 1L,abc\n";

        let load = load_from_str(csv, &LoadOptions::default()).expect("should load");

        assert!(load.rows.is_empty());
        assert!(load.row_errors.is_empty());
        assert_eq!(load.filtered_out, 1);
    }

    // -----------------------------------------------------------------------
    // 5. Row errors
    // -----------------------------------------------------------------------
    #[test]
    fn test_bad_cell_rejects_only_its_row() {
        let csv = "\
Descrição,Preço de Venda,Quantidade
AMACIANTE 5L,abc,10
AMACIANTE 2L,8,10
";
        let load = unfiltered(csv);

        assert_eq!(load.rows.len(), 1);
        assert_eq!(load.rows[0].line, 2);
        assert_eq!(load.row_errors.len(), 1);
        match &load.row_errors[0] {
            RowLoadError::InvalidNumber { line, column, source } => {
                assert_eq!(*line, 1);
                assert_eq!(*column, "Preço de Venda");
                assert_eq!(source.input(), "abc");
            }
            other => panic!("expected InvalidNumber, got {other:?}"),
        }
    }

    #[test]
    fn test_fractional_quantity_is_rejected() {
        let csv = "Descrição,Quantidade\nAMACIANTE 5L,\"2,5\"\n";

        let load = unfiltered(csv);

        match &load.row_errors[0] {
            RowLoadError::InvalidQuantity { line, value } => {
                assert_eq!(*line, 1);
                assert_eq!(*value, dec!(2.5));
            }
            other => panic!("expected InvalidQuantity, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_quantity_is_rejected() {
        let load = unfiltered("Descrição,Quantidade\nAMACIANTE 5L,-3\n");

        assert!(matches!(
            load.row_errors[0],
            RowLoadError::InvalidQuantity { line: 1, .. }
        ));
        assert_eq!(load.row_errors[0].line(), 1);
    }

    #[test]
    fn test_empty_cells_read_as_zero() {
        let load = unfiltered("Descrição,Preço de Venda,ICMS\nAMACIANTE 5L,,\n");

        assert_eq!(load.rows[0].row.unit_price, Decimal::ZERO);
        assert_eq!(load.rows[0].row.tax_rates.icms, Decimal::ZERO);
    }

    // -----------------------------------------------------------------------
    // 6. Sheet errors
    // -----------------------------------------------------------------------
    #[test]
    fn test_short_row_between_good_rows_is_default_filled() {
        let csv = "\
Descrição,UF,Preço de Venda,Quantidade,ICMS,MVA
AMACIANTE 5L,SP,10,100,0.18,0.5
DESINF. 5L,SP,20
ÁGUA SANITÁRIA 5L,SP,5,10,0.18,0.5
";

        let load = unfiltered(csv);

        assert!(load.row_errors.is_empty());
        assert_eq!(load.rows.len(), 3);
        let short = &load.rows[1];
        assert_eq!(short.line, 2);
        assert_eq!(short.description, "DESINF. 5L");
        assert_eq!(short.row.unit_price, dec!(20));
        assert_eq!(short.row.quantity, 1);
        assert_eq!(short.row.tax_rates.icms, Decimal::ZERO);
        assert_eq!(short.row.mva_rate, Decimal::ZERO);
        assert_eq!(load.rows[2].row.quantity, 10);
    }

    #[test]
    fn test_long_row_ignores_extra_cells() {
        let csv = "Descrição,Preço de Venda\nAMACIANTE 5L,10,extra\n";

        let load = unfiltered(csv);

        assert_eq!(load.rows.len(), 1);
        assert_eq!(load.rows[0].row.unit_price, dec!(10));
    }

    #[test]
    fn test_missing_file_reports_path() {
        let path = Path::new("does/not/exist.csv");

        let err = load_from_file(path, &LoadOptions::default()).unwrap_err();

        match err {
            SheetLoadError::Io { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("expected Io, got {other:?}"),
        }
    }

    #[test]
    fn test_header_only_sheet_is_empty() {
        let load = unfiltered("Descrição,Preço de Venda\n");

        assert!(load.rows.is_empty());
        assert!(load.row_errors.is_empty());
    }
}
