use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pricing_cli::app::{self, RateSource, RunOutcome};
use pricing_cli::config::{AppConfig, ParamOverrides, Settings};
use pricing_cli::logging;
use pricing_core::FreightMode;
use pricing_data::{LoadOptions, parse_decimal};
use rust_decimal::Decimal;
use tracing::{debug, info};

// ─── CLI definition ───────────────────────────────────────────────────────────

/// Sales-price formation and tax simulator.
///
/// Percent flags take human percentages: `--contract 1` means 1%.
#[derive(Parser, Debug)]
#[command(name = "price-simulator", version, about, long_about = None)]
struct Cli {
    /// TOML config file with [params], [solver] and [logging] tables.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Freight per unit (R$) applied to every row.
    #[arg(long, global = true, value_parser = parse_decimal)]
    freight: Option<Decimal>,

    /// Contract markup (%) applied to every row.
    #[arg(long, global = true, value_parser = parse_decimal)]
    contract: Option<Decimal>,

    /// ICMS rate (%) applied to every row and to solver queries.
    #[arg(long, global = true, value_parser = parse_decimal)]
    icms: Option<Decimal>,

    /// CIF counts freight among the seller's expenses; FOB leaves it to the buyer.
    #[arg(long, global = true)]
    freight_mode: Option<FreightMode>,

    /// Log filter, e.g. "debug" or "pricing_core=trace". RUST_LOG wins.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also append log records to this file.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Calculate every row of a commercial sheet and write the results as CSV.
    Simulate(SimulateArgs),

    /// Recover the negotiated price behind one tax-inclusive price.
    Solve(SolveArgs),

    /// Solve every query of a CSV sheet.
    SolveBatch(SolveBatchArgs),

    /// Print revenue, profit and tax burden of a commercial sheet.
    Summary(SummaryArgs),
}

#[derive(Args, Debug)]
struct SheetFilterArgs {
    /// Keep only rows of this state.
    #[arg(long)]
    uf: Option<String>,
}

#[derive(Args, Debug)]
struct SimulateArgs {
    #[arg(long)]
    input: PathBuf,

    /// Defaults to stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    filter: SheetFilterArgs,

    /// Keep rows whose product is not in the catalog.
    #[arg(long)]
    all_products: bool,
}

#[derive(Args, Debug)]
struct SolveArgs {
    /// Target price including IPI and ICMS-ST.
    #[arg(long, value_parser = parse_decimal)]
    target: Decimal,

    /// Catalog product whose MVA and IPI rates apply.
    #[arg(long, conflicts_with_all = ["mva", "ipi"], required_unless_present_all = ["mva", "ipi"])]
    product: Option<String>,

    /// MVA (%).
    #[arg(long, requires = "ipi", value_parser = parse_decimal)]
    mva: Option<Decimal>,

    /// IPI (%).
    #[arg(long, requires = "mva", value_parser = parse_decimal)]
    ipi: Option<Decimal>,
}

#[derive(Args, Debug)]
struct SolveBatchArgs {
    #[arg(long)]
    input: PathBuf,

    /// Defaults to stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SummaryArgs {
    #[arg(long)]
    input: PathBuf,

    #[command(flatten)]
    filter: SheetFilterArgs,
}

impl Cli {
    fn overrides(&self) -> ParamOverrides {
        ParamOverrides {
            freight_mode: self.freight_mode,
            freight_per_unit: self.freight,
            contract_pct: self.contract,
            icms_pct: self.icms,
        }
    }
}

impl SheetFilterArgs {
    fn load_options(
        &self,
        all_products: bool,
    ) -> LoadOptions {
        let base = if all_products {
            LoadOptions::unfiltered()
        } else {
            LoadOptions::default()
        };
        LoadOptions {
            uf: self.uf.clone(),
            ..base
        }
    }
}

// ─── Startup ──────────────────────────────────────────────────────────────────

/// Reads the config file and finishes logging setup from it.
fn load_settings(cli: &Cli) -> Result<Settings> {
    let config = AppConfig::load_or_default(cli.config.as_deref())?;

    if cli.log_level.is_none() && !logging::env_filter_set() {
        if let Some(level) = &config.logging.level {
            logging::set_log_level(level)?;
        }
    }
    if let Some(path) = cli.log_file.as_ref().or(config.logging.file.as_ref()) {
        logging::enable_file_logging(path)?;
    }

    let settings = Settings::resolve(&config, &cli.overrides()).context("Invalid parameters")?;
    debug!(?settings, "resolved settings");
    Ok(settings)
}

fn report(
    command: &str,
    outcome: &RunOutcome,
) {
    info!(command, stats = %outcome.stats, load_errors = outcome.load_errors, "done");
    eprintln!(
        "{}; {} rows rejected while loading",
        outcome.stats, outcome.load_errors
    );
}

// ─── Entry point ──────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.log_level.as_deref().unwrap_or(logging::DEFAULT_LEVEL));

    let settings = load_settings(&cli)?;

    match &cli.command {
        Commands::Simulate(args) => {
            let options = args.filter.load_options(args.all_products);
            let mut output = app::open_output(args.output.as_deref())?;
            let outcome = app::simulate(&settings, &args.input, &options, &mut output)?;
            output.flush()?;
            report("simulate", &outcome);
        }
        Commands::Solve(args) => {
            let rates = match (&args.product, args.mva, args.ipi) {
                (Some(product), _, _) => RateSource::Product(product),
                (None, Some(mva_pct), Some(ipi_pct)) => RateSource::Explicit { mva_pct, ipi_pct },
                _ => anyhow::bail!("Pass --product, or both --mva and --ipi"),
            };
            let price = app::solve_single(&settings, args.target, rates)?;
            print!("{}", app::format_negotiated(&price));
        }
        Commands::SolveBatch(args) => {
            let mut output = app::open_output(args.output.as_deref())?;
            let outcome = app::solve_batch(&settings, &args.input, &mut output)?;
            output.flush()?;
            report("solve-batch", &outcome);
        }
        Commands::Summary(args) => {
            let summary = app::summarize(&settings, &args.input, &args.filter.load_options(false))?;
            print!("{summary}");
        }
    }

    Ok(())
}
