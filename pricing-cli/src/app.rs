//! The four simulator commands, independent of argument parsing.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use pricing_core::calculations::common::{round_half_up, round_half_up_dp};
use pricing_core::calculations::{
    BatchStats, PortfolioSummary, PriceSolver, RowCalculator, SummaryLine, calculate_rows,
    solve_queries,
};
use pricing_core::{NegotiatedPrice, SolverQuery};
use pricing_data::query_loader::load_queries_from_file;
use pricing_data::utils::percent_to_rate;
use pricing_data::{LoadOptions, SheetLoad, catalog, loader, write_row_results, write_solver_results};
use rust_decimal::Decimal;
use tracing::warn;

use crate::config::Settings;

/// Counts reported after a batch command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOutcome {
    pub stats: BatchStats,

    /// Rows rejected while loading, before any calculation.
    pub load_errors: usize,
}

/// Where the MVA and IPI rates of a single query come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateSource<'a> {
    Product(&'a str),
    Explicit { mva_pct: Decimal, ipi_pct: Decimal },
}

/// Opens `path` for writing, or stdout when no path is given.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Cannot create output file '{}'", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

fn load_sheet(
    input: &Path,
    options: &LoadOptions,
) -> Result<SheetLoad> {
    loader::load_from_file(input, options)
        .with_context(|| format!("Failed to load sheet '{}'", input.display()))
}

/// Calculates every row of the sheet at `input` and writes the results as CSV.
pub fn simulate<W: Write>(
    settings: &Settings,
    input: &Path,
    options: &LoadOptions,
    output: W,
) -> Result<RunOutcome> {
    let load = load_sheet(input, options)?;
    let calculator = RowCalculator::new(settings.params.clone());
    let rows: Vec<_> = load.rows.iter().map(|loaded| loaded.row.clone()).collect();

    let results = calculate_rows(&calculator, &rows);
    write_row_results(output, &load.rows, &results).context("Failed to write results")?;

    Ok(RunOutcome {
        stats: BatchStats::from_results(&results),
        load_errors: load.row_errors.len(),
    })
}

/// Solves one negotiated price.
pub fn solve_single(
    settings: &Settings,
    target_price: Decimal,
    rates: RateSource<'_>,
) -> Result<NegotiatedPrice> {
    let (mva_rate, ipi_rate) = match rates {
        RateSource::Product(name) => match catalog::find(name) {
            Some(product) => (product.mva_rate, product.ipi_rate),
            None => bail!("Unknown product '{name}'; pass --mva and --ipi instead"),
        },
        RateSource::Explicit { mva_pct, ipi_pct } => {
            (percent_to_rate(mva_pct), percent_to_rate(ipi_pct))
        }
    };

    let query = SolverQuery {
        target_price,
        mva_rate,
        ipi_rate,
        icms_rate: settings.solver_icms_rate,
    };
    PriceSolver::new(settings.solver.clone())
        .solve(&query)
        .context("Solver failed")
}

/// Solves every query of the sheet at `input` and writes the results as CSV.
pub fn solve_batch<W: Write>(
    settings: &Settings,
    input: &Path,
    output: W,
) -> Result<RunOutcome> {
    let load = load_queries_from_file(input, settings.solver_icms_rate)
        .with_context(|| format!("Failed to load queries '{}'", input.display()))?;
    let queries: Vec<_> = load.queries.iter().map(|loaded| loaded.query).collect();

    let results = solve_queries(&PriceSolver::new(settings.solver.clone()), &queries);
    write_solver_results(output, &load.queries, &results).context("Failed to write results")?;

    Ok(RunOutcome {
        stats: BatchStats::from_results(&results),
        load_errors: load.row_errors.len(),
    })
}

/// Aggregates the sheet at `input`. Rows that fail to calculate are left out.
pub fn summarize(
    settings: &Settings,
    input: &Path,
    options: &LoadOptions,
) -> Result<PortfolioSummary> {
    let load = load_sheet(input, options)?;
    let calculator = RowCalculator::new(settings.params.clone());

    let mut lines = Vec::with_capacity(load.rows.len());
    for loaded in &load.rows {
        match calculator.calculate(&loaded.row) {
            Ok(result) => lines.push(SummaryLine {
                product: loaded.description.clone(),
                quantity: loaded.row.quantity,
                unit_price: loaded.row.unit_price,
                freight_mode: settings.params.freight_mode,
                result,
            }),
            Err(err) => warn!(line = loaded.line, error = %err, "row left out of summary"),
        }
    }

    Ok(PortfolioSummary::from_lines(&lines))
}

/// Human-readable report of one solved price.
pub fn format_negotiated(price: &NegotiatedPrice) -> String {
    format!(
        "Negotiated price: {}\n\
         IPI:              {}\n\
         ICMS-ST:          {}\n\
         Simulated price:  {}\n\
         Difference:       {}\n\
         Iterations:       {}\n",
        round_half_up_dp(price.negotiated_price, 4),
        round_half_up(price.ipi_amount),
        round_half_up(price.st_amount),
        round_half_up(price.simulated_price),
        round_half_up_dp(price.difference, 4),
        price.iterations,
    )
}
