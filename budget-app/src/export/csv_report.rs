//! CSV budget export.
//!
//! One row per line item, in budget order:
//!
//! ```csv
//! Product,Quantity,Sale Price,Gross Revenue,Gross Profit,Gross Margin,CMV
//! Produto 1,1,828.93,828.93,141.14,17.74,654.63
//! ```
//!
//! Money and percentages carry two decimals. An undefined gross margin
//! (zero net revenue) is written as an empty cell.

use std::io::Read;

use budget_core::LineResult;
use budget_core::calculations::common::format_two_places;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use tracing::debug;

use super::ExportError;

pub const HEADER: [&str; 7] = [
    "Product",
    "Quantity",
    "Sale Price",
    "Gross Revenue",
    "Gross Profit",
    "Gross Margin",
    "CMV",
];

/// One exported CSV row. Field order matches [`HEADER`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetCsvRow {
    #[serde(rename = "Product")]
    pub product: String,

    #[serde(rename = "Quantity")]
    pub quantity: u32,

    #[serde(rename = "Sale Price", serialize_with = "two_places")]
    pub sale_price: Decimal,

    #[serde(rename = "Gross Revenue", serialize_with = "two_places")]
    pub gross_revenue: Decimal,

    #[serde(rename = "Gross Profit", serialize_with = "two_places")]
    pub gross_profit: Decimal,

    #[serde(rename = "Gross Margin", serialize_with = "opt_two_places")]
    pub gross_margin_percent: Option<Decimal>,

    #[serde(rename = "CMV", serialize_with = "two_places")]
    pub cost_of_goods: Decimal,
}

impl From<&LineResult> for BudgetCsvRow {
    fn from(line: &LineResult) -> Self {
        Self {
            product: line.product_name.clone(),
            quantity: line.quantity,
            sale_price: line.sale_price,
            gross_revenue: line.gross_revenue,
            gross_profit: line.gross_profit,
            gross_margin_percent: line.gross_margin_percent,
            cost_of_goods: line.cost_of_goods,
        }
    }
}

fn two_places<S: Serializer>(
    value: &Decimal,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_two_places(*value))
}

fn opt_two_places<S: Serializer>(
    value: &Option<Decimal>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) => two_places(v, serializer),
        None => serializer.serialize_str(""),
    }
}

/// Renders `lines` as CSV. The header is written even when `lines` is empty.
pub fn render(lines: &[LineResult]) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;
    for line in lines {
        writer.serialize(BudgetCsvRow::from(line))?;
    }
    writer.flush().map_err(csv::Error::from)?;

    debug!(rows = lines.len(), "rendered CSV budget");
    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(csv::Error::from(e.into_error())))
}

/// Reads an exported budget back into rows.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<BudgetCsvRow>, ExportError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let rows = csv_reader
        .deserialize()
        .collect::<Result<Vec<BudgetCsvRow>, _>>()?;
    Ok(rows)
}
