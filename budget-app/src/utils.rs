use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;

/// Error returned when a string cannot be parsed as a [`Decimal`].
#[derive(Debug, Error)]
#[error("invalid decimal '{input}': {source}")]
pub struct ParseDecimalError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Errors raised when user-entered text cannot be used as a budget input.
#[derive(Debug, Error)]
pub enum InputError {
    #[error(transparent)]
    Decimal(#[from] ParseDecimalError),

    #[error("invalid quantity '{input}': {reason}")]
    Quantity { input: String, reason: &'static str },

    #[error("invalid item '{input}': expected PRODUCT_ID or PRODUCT_ID:QUANTITY")]
    ItemSpec { input: String },
}

/// Normalizes input for decimal parsing: trims whitespace and removes commas (thousands separator).
fn normalize_decimal_input(s: &str) -> String {
    s.trim().replace(',', "")
}

/// Parses a string into a [`Decimal`].
///
/// Handles comma as thousands separator (e.g. `"1,234.56"`).
/// Empty or whitespace-only input is treated as 0.
/// Returns an error and logs when the input is invalid (non-empty but not parseable).
pub fn parse_decimal(s: &str) -> Result<Decimal, ParseDecimalError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|e| {
        tracing::error!(input = %s, "invalid decimal: {}", e);
        ParseDecimalError {
            input: s.to_string(),
            source: e,
        }
    })
}

/// Parses a profit margin percentage such as `"12.5"`.
///
/// Same rules as [`parse_decimal`]; range checks happen when the margin is
/// applied to a budget.
pub fn parse_margin(s: &str) -> Result<Decimal, InputError> {
    Ok(parse_decimal(s)?)
}

/// Parses a line item quantity.
///
/// Empty input is treated as 0. Negative, fractional and non-numeric input
/// is rejected rather than clamped.
pub fn parse_quantity(s: &str) -> Result<u32, InputError> {
    let normalized = normalize_decimal_input(s);
    if normalized.is_empty() {
        return Ok(0);
    }

    let reject = |reason| {
        tracing::warn!(input = %s, reason, "rejected quantity");
        InputError::Quantity {
            input: s.to_string(),
            reason,
        }
    };

    let value: Decimal = normalized
        .parse()
        .map_err(|_| reject("not a number"))?;
    if value.is_sign_negative() && !value.is_zero() {
        return Err(reject("must not be negative"));
    }
    if !value.fract().is_zero() {
        return Err(reject("must be a whole number"));
    }
    value.to_u32().ok_or_else(|| reject("too large"))
}

/// Parses a `PRODUCT_ID[:QUANTITY]` item specification.
///
/// Without a quantity the item keeps the default quantity of one.
pub fn parse_item_spec(s: &str) -> Result<(u32, u32), InputError> {
    let bad_spec = || InputError::ItemSpec {
        input: s.to_string(),
    };

    let (id, quantity) = match s.split_once(':') {
        Some((id, quantity)) => (id, parse_quantity(quantity)?),
        None => (s, 1),
    };
    let id = id.trim().parse().map_err(|_| bad_spec())?;
    Ok((id, quantity))
}

/// Formats an optional [`Decimal`] for display, using "—" when `None`.
pub fn opt_decimal_display(d: &Option<Decimal>) -> String {
    d.as_ref()
        .map(|v| budget_core::calculations::common::format_two_places(*v))
        .unwrap_or_else(|| "—".to_string())
}
