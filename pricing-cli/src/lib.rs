//! Command-line front end for the pricing engine.

pub mod app;
pub mod config;
pub mod logging;
