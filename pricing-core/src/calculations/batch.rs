//! Batch helpers over independent rows and solver queries.
//!
//! Each element is processed on its own: a failing element yields an `Err`
//! at its position and the rest of the batch carries on. Output order always
//! matches input order.

use std::fmt;

use tracing::info;

use crate::calculations::price_solver::{PriceSolver, SolverError};
use crate::calculations::row_calculator::{RowCalculationError, RowCalculator};
use crate::models::{CommercialRow, DerivedResult, NegotiatedPrice, SolverQuery};

/// Success and failure counts of one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub ok: usize,
    pub failed: usize,
}

impl BatchStats {
    pub fn from_results<T, E>(results: &[Result<T, E>]) -> Self {
        let ok = results.iter().filter(|result| result.is_ok()).count();
        Self {
            ok,
            failed: results.len() - ok,
        }
    }

    pub fn total(&self) -> usize {
        self.ok + self.failed
    }
}

impl fmt::Display for BatchStats {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{} ok, {} failed", self.ok, self.failed)
    }
}

/// Runs the row calculator over every row.
pub fn calculate_rows(
    calculator: &RowCalculator,
    rows: &[CommercialRow],
) -> Vec<Result<DerivedResult, RowCalculationError>> {
    let results: Vec<_> = rows.iter().map(|row| calculator.calculate(row)).collect();

    let stats = BatchStats::from_results(&results);
    info!(ok = stats.ok, failed = stats.failed, "calculated commercial rows");
    results
}

/// Runs the price solver over every query.
pub fn solve_queries(
    solver: &PriceSolver,
    queries: &[SolverQuery],
) -> Vec<Result<NegotiatedPrice, SolverError>> {
    let results: Vec<_> = queries.iter().map(|query| solver.solve(query)).collect();

    let stats = BatchStats::from_results(&results);
    info!(ok = stats.ok, failed = stats.failed, "solved negotiated prices");
    results
}
