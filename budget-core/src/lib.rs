pub mod calculations;
pub mod models;
pub mod selection;

pub use calculations::{PricingCalculator, PricingConfig, PricingError};
pub use models::*;
pub use selection::{Budget, MAX_MARGIN_PERCENT, SelectionError};
