//! TOML configuration for the simulator.
//!
//! ```toml
//! [params]
//! freight_mode = "CIF"
//! freight_per_unit = 1.50
//! contract_pct = 1.0
//! # icms_pct = 18.0
//!
//! [solver]
//! max_iterations = 100
//! tolerance = "0.0000000001"
//!
//! [logging]
//! level = "info"
//! file = "price-simulator.log"
//! ```
//!
//! Every table and key is optional. Percentages are human percentages
//! (`1.0` means 1%). Command-line flags override the file.

use std::path::{Path, PathBuf};

use pricing_core::calculations::SolverConfig;
use pricing_core::{FreightMode, GlobalParams, GlobalParamsError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use thiserror::Error;

/// ICMS rate the solver uses when neither the config nor the command line
/// sets one.
pub const DEFAULT_SOLVER_ICMS_PCT: Decimal = dec!(18);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Params(#[from] GlobalParamsError),

    #[error(transparent)]
    Solver(#[from] pricing_core::calculations::SolverError),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub params: ParamsSection,
    pub solver: SolverSection,
    pub logging: LoggingSection,
}

/// `[params]`: run-wide overrides, in human percentages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParamsSection {
    pub freight_mode: FreightMode,
    pub freight_per_unit: Option<Decimal>,
    pub contract_pct: Option<Decimal>,
    pub icms_pct: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolverSection {
    pub max_iterations: u32,
    pub tolerance: Decimal,
}

impl Default for SolverSection {
    fn default() -> Self {
        let defaults = SolverConfig::default();
        Self {
            max_iterations: defaults.max_iterations,
            tolerance: defaults.tolerance,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    pub level: Option<String>,
    pub file: Option<PathBuf>,
}

/// Parameter values given on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamOverrides {
    pub freight_mode: Option<FreightMode>,
    pub freight_per_unit: Option<Decimal>,
    pub contract_pct: Option<Decimal>,
    pub icms_pct: Option<Decimal>,
}

impl AppConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(input)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads `path` when given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

impl ParamsSection {
    pub fn apply_overrides(
        &mut self,
        overrides: &ParamOverrides,
    ) {
        if let Some(mode) = overrides.freight_mode {
            self.freight_mode = mode;
        }
        if overrides.freight_per_unit.is_some() {
            self.freight_per_unit = overrides.freight_per_unit;
        }
        if overrides.contract_pct.is_some() {
            self.contract_pct = overrides.contract_pct;
        }
        if overrides.icms_pct.is_some() {
            self.icms_pct = overrides.icms_pct;
        }
    }

    pub fn to_global_params(&self) -> GlobalParams {
        GlobalParams {
            freight_mode: self.freight_mode,
            freight_per_unit: self.freight_per_unit,
            contract_rate: self.contract_pct.map(pricing_data::utils::percent_to_rate),
            icms_rate: self.icms_pct.map(pricing_data::utils::percent_to_rate),
        }
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub params: GlobalParams,
    pub solver: SolverConfig,

    /// ICMS fraction for solver queries.
    pub solver_icms_rate: Decimal,
}

impl Settings {
    /// Merges the command-line overrides into `config` and validates the
    /// result.
    pub fn resolve(
        config: &AppConfig,
        overrides: &ParamOverrides,
    ) -> Result<Self, ConfigError> {
        let mut params_section = config.params.clone();
        params_section.apply_overrides(overrides);

        let params = params_section.to_global_params();
        params.validate()?;

        let solver = SolverConfig {
            max_iterations: config.solver.max_iterations,
            tolerance: config.solver.tolerance,
        };
        solver.validate()?;

        let solver_icms_rate = params
            .icms_rate
            .unwrap_or_else(|| pricing_data::utils::percent_to_rate(DEFAULT_SOLVER_ICMS_PCT));

        Ok(Self {
            params,
            solver,
            solver_icms_rate,
        })
    }
}
