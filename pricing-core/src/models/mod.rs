mod commercial_row;
mod derived_result;
mod global_params;
mod solver_query;

pub use commercial_row::{CommercialRow, FreightMode, MarkupRates, ParseFreightModeError, TaxRates};
pub use derived_result::{BreakEven, DerivedResult};
pub use global_params::{GlobalParams, GlobalParamsError};
pub(crate) use global_params::is_fraction;
pub use solver_query::{NegotiatedPrice, SolverQuery};
