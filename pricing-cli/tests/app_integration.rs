//! Runs the simulator commands against the sheet fixtures shipped with
//! `pricing-data`.

use std::io::Write;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use pricing_cli::app::{self, RunOutcome};
use pricing_cli::config::{AppConfig, ParamOverrides, Settings};
use pricing_core::calculations::BatchStats;
use pricing_data::LoadOptions;
use rust_decimal_macros::dec;

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("pricing-data")
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn default_settings() -> Settings {
    Settings::resolve(&AppConfig::default(), &ParamOverrides::default()).unwrap()
}

fn sp_options() -> LoadOptions {
    LoadOptions {
        uf: Some("SP".to_string()),
        ..LoadOptions::default()
    }
}

// ---------------------------------------------------------------------------
// simulate
// ---------------------------------------------------------------------------

#[test]
fn test_simulate_writes_one_record_per_row() {
    let mut out = Vec::new();

    let outcome = app::simulate(
        &default_settings(),
        &fixture_path("commercial_sheet.csv"),
        &sp_options(),
        &mut out,
    )
    .expect("simulate should succeed");

    assert_eq!(
        outcome,
        RunOutcome {
            stats: BatchStats { ok: 3, failed: 0 },
            load_errors: 1,
        }
    );
    let csv = String::from_utf8(out).unwrap();
    assert_eq!(csv.lines().count(), 4);
    assert!(csv.starts_with("Descrição,UF,"));
}

#[test]
fn test_simulate_missing_input_names_the_file() {
    let err = app::simulate(
        &default_settings(),
        Path::new("does-not-exist.csv"),
        &sp_options(),
        Vec::new(),
    )
    .unwrap_err();

    assert!(format!("{err:#}").contains("does-not-exist.csv"));
}

#[test]
fn test_simulate_to_file() {
    let path = std::env::temp_dir().join(format!("price-simulator-{}-out.csv", std::process::id()));

    {
        let mut output = app::open_output(Some(path.as_path())).expect("output should open");
        app::simulate(
            &default_settings(),
            &fixture_path("commercial_sheet.csv"),
            &LoadOptions::default(),
            &mut output,
        )
        .expect("simulate should succeed");
        output.flush().unwrap();
    }

    let written = std::fs::read_to_string(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(written.lines().count(), 5);
}

// ---------------------------------------------------------------------------
// solve-batch
// ---------------------------------------------------------------------------

#[test]
fn test_solve_batch_reports_unknown_products() {
    let mut out = Vec::new();

    let outcome = app::solve_batch(
        &default_settings(),
        &fixture_path("solver_queries.csv"),
        &mut out,
    )
    .expect("solve-batch should succeed");

    assert_eq!(outcome.stats, BatchStats { ok: 3, failed: 0 });
    assert_eq!(outcome.load_errors, 1);
    assert_eq!(String::from_utf8(out).unwrap().lines().count(), 4);
}

// ---------------------------------------------------------------------------
// summary
// ---------------------------------------------------------------------------

#[test]
fn test_summary_of_state() {
    let summary = app::summarize(
        &default_settings(),
        &fixture_path("commercial_sheet.csv"),
        &sp_options(),
    )
    .expect("summary should succeed");

    assert_eq!(summary.volume, 340);
    assert_eq!(summary.products.len(), 3);
}

#[test]
fn test_contract_override_lowers_profit() {
    let base = app::summarize(
        &default_settings(),
        &fixture_path("commercial_sheet.csv"),
        &sp_options(),
    )
    .unwrap();

    let overrides = ParamOverrides {
        contract_pct: Some(dec!(5)),
        ..ParamOverrides::default()
    };
    let settings = Settings::resolve(&AppConfig::default(), &overrides).unwrap();
    let squeezed = app::summarize(
        &settings,
        &fixture_path("commercial_sheet.csv"),
        &sp_options(),
    )
    .unwrap();

    assert_eq!(squeezed.revenue, base.revenue);
    assert!(squeezed.net_profit < base.net_profit);
}

#[test]
fn test_fob_run_counts_volume_as_fob() {
    let overrides = ParamOverrides {
        freight_mode: Some(pricing_core::FreightMode::Fob),
        ..ParamOverrides::default()
    };
    let settings = Settings::resolve(&AppConfig::default(), &overrides).unwrap();

    let summary = app::summarize(
        &settings,
        &fixture_path("commercial_sheet.csv"),
        &sp_options(),
    )
    .unwrap();

    assert_eq!(summary.freight_split.fob, 340);
    assert_eq!(summary.freight_split.cif, 0);
    assert_eq!(summary.freight_total, rust_decimal::Decimal::ZERO);
    let product = &summary.products[0];
    assert!(product.min_price <= product.max_price);
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

#[test]
fn test_sample_config_resolves() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("price-simulator.toml");
    let config = AppConfig::load(&path).expect("sample config should parse");

    let settings = Settings::resolve(&config, &ParamOverrides::default()).unwrap();

    assert_eq!(settings.params.freight_per_unit, Some(dec!(1.50)));
    assert_eq!(settings.params.contract_rate, Some(dec!(0.01)));
    assert_eq!(settings.solver_icms_rate, dec!(0.18));
    assert_eq!(config.logging.level.as_deref(), Some("info"));
}
