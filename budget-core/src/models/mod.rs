mod client;
mod line_result;
mod product;
mod rate_table;
mod reference_data;

pub use client::Client;
pub use line_result::{BudgetTotals, LineResult};
pub use product::{Product, SelectedItem};
pub use rate_table::{RateTable, StateRates};
pub use reference_data::ReferenceData;
