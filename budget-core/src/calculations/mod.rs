//! Pricing calculations for budgets.
//!
//! This module turns a client's state rates, a list of selected items and a
//! profit margin into per-line revenue, cost and margin figures.

pub mod common;
pub mod pricing;

pub use pricing::{PricingCalculator, PricingConfig, PricingError};
