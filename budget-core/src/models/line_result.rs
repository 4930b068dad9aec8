use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Pricing outcome for one selected item.
///
/// Values are unrounded; round with
/// [`round_half_up`](crate::calculations::common::round_half_up) for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineResult {
    pub product_name: String,
    pub quantity: u32,

    /// Factory price grossed up for the client's ICMS rate.
    pub adjusted_factory_price: Decimal,
    /// Factory price after the distributor repasse discount.
    pub repasse_price: Decimal,
    /// Repasse price after the fixed distributor discount.
    pub final_cost: Decimal,
    /// Final cost net of the purchase-side ICMS credit.
    pub net_cost: Decimal,

    pub sale_price: Decimal,
    /// RB
    pub gross_revenue: Decimal,
    /// RL
    pub net_revenue: Decimal,
    /// CMV
    pub cost_of_goods: Decimal,
    /// LB
    pub gross_profit: Decimal,
    /// MB. `None` when net revenue is zero.
    pub gross_margin_percent: Option<Decimal>,
}

/// Aggregate figures over every line of a budget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetTotals {
    pub gross_revenue: Decimal,
    pub net_revenue: Decimal,
    pub cost_of_goods: Decimal,
    pub gross_profit: Decimal,
    pub gross_margin_percent: Option<Decimal>,
    /// Set when a client is selected and total gross revenue is above
    /// the client's budget ceiling.
    pub exceeds_ceiling: bool,
}
