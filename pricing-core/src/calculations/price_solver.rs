//! Negotiated-price recovery from a tax-inclusive downstream price.
//!
//! A distributor knows the price its customer pays (IPI and ICMS-ST already
//! added) and needs the negotiated price that produces it. The forward map
//! for a negotiated price `x` is
//!
//! ```text
//! F(x) = x + x·ipi + [x·(1 + ipi)·(1 + mva)·icms − x·icms]
//! ```
//!
//! `F` is strictly increasing for valid rates and `F(0) = 0`, so the root of
//! `F(x) − target` lies in `[0, target]` whenever taxes only add to the price.
//! The solver brackets that root and runs Newton steps with a bisection
//! fallback, which bounds the iteration count regardless of the map.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use pricing_core::calculations::{PassThrough, PriceSolver, StPassThrough};
//! use pricing_core::SolverQuery;
//!
//! let query = SolverQuery {
//!     target_price: dec!(90),
//!     mva_rate: dec!(0.5686),
//!     ipi_rate: dec!(0.0),
//!     icms_rate: dec!(0.18),
//! };
//!
//! let solved = PriceSolver::default().solve(&query).unwrap();
//!
//! assert!(solved.negotiated_price < dec!(90));
//! let forward = StPassThrough::from(&query).gross_up(solved.negotiated_price).unwrap();
//! assert!((forward - dec!(90)).abs() < dec!(0.0001));
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{NegotiatedPrice, SolverQuery, is_fraction};

/// Fraction of the target used as the first guess; taxes only inflate the
/// price, so the root sits below the target.
pub const SEED_FACTOR: Decimal = dec!(0.9);

/// Upper bound on doublings of the bracket's upper end.
const MAX_BRACKET_EXPANSIONS: u32 = 32;

/// Relative step for the central-difference slope.
const SLOPE_STEP: Decimal = dec!(0.000001);

/// Errors returned by [`PriceSolver`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SolverError {
    /// A query rate is outside its domain.
    #[error("{field} is outside its valid domain, got {value}")]
    InvalidDomain { field: &'static str, value: Decimal },

    /// The solver configuration cannot produce a result.
    #[error("invalid solver configuration: {0}")]
    InvalidConfig(&'static str),

    /// The iteration budget ran out before the residual met the tolerance.
    #[error(
        "negotiated price did not converge after {iterations} iterations \
         (last iterate {last_iterate}, residual {residual})"
    )]
    Convergence {
        last_iterate: Decimal,
        residual: Decimal,
        iterations: u32,
    },

    /// The pass-through left the range of `Decimal`.
    #[error("tax pass-through overflows at negotiated price {negotiated}")]
    Overflow { negotiated: Decimal },
}

/// Maps a negotiated price to the downstream price the customer pays.
///
/// Implementations must be non-decreasing and map zero to at most zero.
/// `None` means the downstream price does not fit a `Decimal`.
pub trait PassThrough {
    fn gross_up(
        &self,
        negotiated: Decimal,
    ) -> Option<Decimal>;
}

/// IPI plus ICMS-ST pass-through for one product.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StPassThrough {
    pub mva_rate: Decimal,
    pub ipi_rate: Decimal,
    pub icms_rate: Decimal,
}

impl StPassThrough {
    pub fn ipi_amount(
        &self,
        negotiated: Decimal,
    ) -> Option<Decimal> {
        negotiated.checked_mul(self.ipi_rate)
    }

    /// ICMS-ST on the MVA-inflated base minus the seller's own ICMS.
    pub fn st_amount(
        &self,
        negotiated: Decimal,
    ) -> Option<Decimal> {
        let st_base = negotiated
            .checked_mul(Decimal::ONE.checked_add(self.ipi_rate)?)?
            .checked_mul(Decimal::ONE.checked_add(self.mva_rate)?)?;
        st_base
            .checked_mul(self.icms_rate)?
            .checked_sub(negotiated.checked_mul(self.icms_rate)?)
    }
}

impl From<&SolverQuery> for StPassThrough {
    fn from(query: &SolverQuery) -> Self {
        Self {
            mva_rate: query.mva_rate,
            ipi_rate: query.ipi_rate,
            icms_rate: query.icms_rate,
        }
    }
}

impl PassThrough for StPassThrough {
    fn gross_up(
        &self,
        negotiated: Decimal,
    ) -> Option<Decimal> {
        negotiated
            .checked_add(self.ipi_amount(negotiated)?)?
            .checked_add(self.st_amount(negotiated)?)
    }
}

/// Iteration budget and tolerance of the root-finder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    pub max_iterations: u32,

    /// Maximum accepted `|F(x) − target|`.
    pub tolerance: Decimal,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: dec!(0.0000000001),
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> Result<(), SolverError> {
        if self.max_iterations == 0 {
            return Err(SolverError::InvalidConfig("max_iterations must be positive"));
        }
        if self.tolerance <= Decimal::ZERO {
            return Err(SolverError::InvalidConfig("tolerance must be positive"));
        }
        Ok(())
    }
}

/// Root of a pass-through equation and the iterations it took.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Root {
    pub value: Decimal,
    pub iterations: u32,
}

/// Bracketed Newton solver for negotiated prices.
#[derive(Debug, Clone, Default)]
pub struct PriceSolver {
    config: SolverConfig,
}

impl PriceSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solves one query.
    ///
    /// A non-positive target short-circuits to a zero price without running
    /// the solver.
    ///
    /// # Errors
    ///
    /// * [`SolverError::InvalidDomain`] if IPI or ICMS is outside `[0, 1)` or
    ///   MVA is negative.
    /// * [`SolverError::InvalidConfig`] if the configuration is unusable.
    /// * [`SolverError::Convergence`] if the budget runs out.
    /// * [`SolverError::Overflow`] if the pass-through of a candidate price
    ///   exceeds the `Decimal` range.
    pub fn solve(
        &self,
        query: &SolverQuery,
    ) -> Result<NegotiatedPrice, SolverError> {
        if query.target_price <= Decimal::ZERO {
            debug!(target_price = %query.target_price, "non-positive target; skipping solve");
            return Ok(NegotiatedPrice::zero());
        }
        validate_query(query)?;

        let map = StPassThrough::from(query);
        let root = self.find_root(&map, query.target_price)?;

        let overflow = || SolverError::Overflow {
            negotiated: root.value,
        };
        let simulated_price = map.gross_up(root.value).ok_or_else(overflow)?;
        Ok(NegotiatedPrice {
            negotiated_price: root.value,
            ipi_amount: map.ipi_amount(root.value).ok_or_else(overflow)?,
            st_amount: map.st_amount(root.value).ok_or_else(overflow)?,
            simulated_price,
            difference: simulated_price - query.target_price,
            iterations: root.iterations,
        })
    }

    /// Finds `x ≥ 0` with `map.gross_up(x) = target` for a positive target.
    pub fn find_root<P: PassThrough>(
        &self,
        map: &P,
        target: Decimal,
    ) -> Result<Root, SolverError> {
        self.config.validate()?;

        let residual = |x: Decimal| {
            map.gross_up(x)
                .and_then(|gross| gross.checked_sub(target))
                .ok_or(SolverError::Overflow { negotiated: x })
        };

        let mut lo = Decimal::ZERO;
        let r_lo = residual(lo)?;
        if r_lo > Decimal::ZERO {
            return Err(SolverError::Convergence {
                last_iterate: lo,
                residual: r_lo,
                iterations: 0,
            });
        }

        let mut hi = self.upper_bracket(&residual, target)?;

        let mut x = target * SEED_FACTOR;
        if x <= lo || x >= hi {
            x = midpoint(lo, hi);
        }

        for iteration in 1..=self.config.max_iterations {
            let r = residual(x)?;
            debug!(iteration, x = %x, residual = %r, "negotiated price iteration");

            if r.abs() <= self.config.tolerance {
                return Ok(Root {
                    value: x,
                    iterations: iteration,
                });
            }

            if r < Decimal::ZERO {
                lo = x;
            } else {
                hi = x;
            }

            x = match slope(map, x).and_then(|s| newton_step(x, r, s)) {
                Some(next) if next > lo && next < hi => next,
                _ => midpoint(lo, hi),
            };
        }

        let r = residual(x)?;
        if r.abs() <= self.config.tolerance {
            return Ok(Root {
                value: x,
                iterations: self.config.max_iterations,
            });
        }

        warn!(
            target = %target,
            last_iterate = %x,
            residual = %r,
            max_iterations = self.config.max_iterations,
            "negotiated price solver did not converge"
        );
        Err(SolverError::Convergence {
            last_iterate: x,
            residual: r,
            iterations: self.config.max_iterations,
        })
    }

    /// Grows the upper end from `target` until the residual turns non-negative.
    fn upper_bracket(
        &self,
        residual: &impl Fn(Decimal) -> Result<Decimal, SolverError>,
        target: Decimal,
    ) -> Result<Decimal, SolverError> {
        let mut hi = target;
        for _ in 0..MAX_BRACKET_EXPANSIONS {
            if residual(hi)? >= Decimal::ZERO {
                return Ok(hi);
            }
            hi = match hi.checked_mul(Decimal::TWO) {
                Some(doubled) => doubled,
                None => break,
            };
        }

        let r = residual(hi)?;
        if r >= Decimal::ZERO {
            return Ok(hi);
        }
        warn!(target = %target, upper = %hi, residual = %r, "could not bracket negotiated price");
        Err(SolverError::Convergence {
            last_iterate: hi,
            residual: r,
            iterations: 0,
        })
    }
}

fn validate_query(query: &SolverQuery) -> Result<(), SolverError> {
    if query.mva_rate < Decimal::ZERO {
        return Err(SolverError::InvalidDomain {
            field: "mva_rate",
            value: query.mva_rate,
        });
    }
    if !is_fraction(query.ipi_rate) {
        return Err(SolverError::InvalidDomain {
            field: "ipi_rate",
            value: query.ipi_rate,
        });
    }
    if !is_fraction(query.icms_rate) {
        return Err(SolverError::InvalidDomain {
            field: "icms_rate",
            value: query.icms_rate,
        });
    }
    Ok(())
}

/// Central-difference slope of `map` at `x`, or `None` if a sample point
/// overflows.
fn slope<P: PassThrough>(
    map: &P,
    x: Decimal,
) -> Option<Decimal> {
    let h = SLOPE_STEP.checked_mul(x.abs().max(Decimal::ONE))?;
    let rise = map
        .gross_up(x.checked_add(h)?)?
        .checked_sub(map.gross_up(x.checked_sub(h)?)?)?;
    rise.checked_div(h.checked_mul(Decimal::TWO)?)
}

fn newton_step(
    x: Decimal,
    residual: Decimal,
    slope: Decimal,
) -> Option<Decimal> {
    if slope <= Decimal::ZERO {
        return None;
    }
    residual.checked_div(slope).and_then(|delta| x.checked_sub(delta))
}

/// Midpoint of `lo <= hi` without forming `lo + hi`.
fn midpoint(
    lo: Decimal,
    hi: Decimal,
) -> Decimal {
    lo + (hi - lo) / Decimal::TWO
}

/// Solves a single query with the default [`SolverConfig`] and returns the
/// negotiated price alone.
///
/// ```
/// use rust_decimal_macros::dec;
/// use pricing_core::calculations::solve_negotiated_price;
///
/// assert_eq!(solve_negotiated_price(dec!(0), dec!(0.5), dec!(0), dec!(0.18)), Ok(dec!(0)));
/// ```
pub fn solve_negotiated_price(
    target_price: Decimal,
    mva_rate: Decimal,
    ipi_rate: Decimal,
    icms_rate: Decimal,
) -> Result<Decimal, SolverError> {
    let query = SolverQuery {
        target_price,
        mva_rate,
        ipi_rate,
        icms_rate,
    };
    PriceSolver::default()
        .solve(&query)
        .map(|solved| solved.negotiated_price)
}
