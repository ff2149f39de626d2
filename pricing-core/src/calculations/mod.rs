//! Price formation and tax calculations.
//!
//! The row calculator derives revenue, taxes and profit for one sale; the
//! price solver runs the inverse problem for ICMS-ST pass-through prices.
//! Batch helpers and the portfolio summary build on both.

pub mod batch;
pub mod common;
pub mod price_solver;
pub mod row_calculator;
pub mod summary;

pub use batch::{BatchStats, calculate_rows, solve_queries};
pub use price_solver::{
    PassThrough, PriceSolver, Root, SolverConfig, SolverError, StPassThrough,
    solve_negotiated_price,
};
pub use row_calculator::{RowCalculationError, RowCalculator};
pub use summary::{
    FreightSplit, PortfolioSummary, ProductSummary, SummaryLine, TaxBurden, TaxShare,
};
