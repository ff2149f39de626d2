//! Spreadsheet ingestion and export for the pricing engine.
//!
//! Sheets arrive as CSV exports of the commercial workbook. The loaders turn
//! them into typed [`pricing_core`] inputs; the exporters write the results
//! back with the workbook's column names.

pub mod catalog;
pub mod export;
pub mod loader;
pub mod query_loader;
pub mod utils;

pub use export::{ExportError, write_row_results, write_solver_results};
pub use loader::{
    Column, LoadOptions, LoadedRow, MissingColumn, RowLoadError, SheetLoad, SheetLoadError,
};
pub use query_loader::{LoadedQuery, QueryLoad};
pub use utils::{ParseDecimalError, parse_decimal};
