use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub factory_price: Decimal,
    pub description: String,
    pub segment: String,
}

/// A product placed on a budget, with the quantity the user asked for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedItem {
    pub product: Product,
    pub quantity: u32,
}

impl SelectedItem {
    /// New line items always start with a quantity of one.
    pub fn new(product: Product) -> Self {
        Self {
            product,
            quantity: 1,
        }
    }
}
