use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid decimal '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

impl ParseDecimalError {
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// Normalizes a spreadsheet number to the `1234.56` form.
///
/// When both separators appear, the last one is the decimal separator. A
/// lone comma is a decimal comma (`12,5`); repeated commas or dots are
/// thousands separators.
fn normalize_decimal_input(s: &str) -> String {
    let trimmed = s.trim();
    let last_comma = trimmed.rfind(',');
    let last_dot = trimmed.rfind('.');

    match (last_comma, last_dot) {
        (Some(comma), Some(dot)) if comma > dot => trimmed.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => trimmed.replace(',', ""),
        (Some(_), None) if trimmed.matches(',').count() == 1 => trimmed.replace(',', "."),
        (Some(_), None) => trimmed.replace(',', ""),
        (None, Some(_)) if trimmed.matches('.').count() > 1 => trimmed.replace('.', ""),
        _ => trimmed.to_string(),
    }
}

/// Parses a spreadsheet cell into a [`Decimal`].
///
/// Accepts Brazilian (`1.234,56`) and US (`1,234.56`) grouping. Empty or
/// whitespace-only input is treated as 0.
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    parse_optional_decimal(s).map(Option::unwrap_or_default)
}

/// Like [`parse_decimal`], but returns `None` for an empty cell.
pub fn parse_optional_decimal(s: &str) -> Result<Option<Decimal>, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(None);
    }
    normalized.parse().map(Some).map_err(|e| {
        tracing::debug!(input = %s, "invalid decimal: {}", e);
        ParseDecimalError {
            input: s.to_string(),
            source: e,
        }
    })
}

/// Converts a human percentage (`18` for 18%) into a fraction.
pub fn percent_to_rate(percent: Decimal) -> Decimal {
    percent / Decimal::ONE_HUNDRED
}
