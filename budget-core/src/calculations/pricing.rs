//! Per-item pricing for a budget.
//!
//! Each selected item is priced in two independent chains that meet at the
//! gross profit line:
//!
//! | Step | Value | Formula |
//! |------|-------|---------|
//! | 1    | ICMS, repasse | Client state rates (zero when no client is selected) |
//! | 2    | Adjusted factory price | `factory × 0.82 / (1 − ICMS)` |
//! | 3    | Repasse price | `factory − factory × repasse` |
//! | 4    | Final cost | `repasse price − repasse price × 0.06` |
//! | 5    | Net cost | `final cost × (1 − 0.04)` |
//! | 6    | Sale price | `adjusted factory price × (1 + margin / 100)` |
//! | 7    | Gross revenue (RB) | `sale price × quantity` |
//! | 8    | Net revenue (RL) | `RB × (1 − 0.04)` |
//! | 9    | Cost of goods (CMV) | `net cost × quantity` |
//! | 10   | Gross profit (LB) | `RL − CMV` |
//! | 11   | Gross margin (MB) | `LB / RL × 100`, undefined when RL is zero |
//!
//! The fixed factors (0.82, 0.06 and the two 0.04 rates) come from
//! [`PricingConfig`].
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use budget_core::calculations::common::round_half_up;
//! use budget_core::{PricingCalculator, PricingConfig, Product, RateTable, SelectedItem};
//!
//! let calculator = PricingCalculator::new(PricingConfig::default(), RateTable::default());
//! let item = SelectedItem::new(Product {
//!     id: 1,
//!     name: "Produto 1".to_string(),
//!     factory_price: dec!(1000.00),
//!     description: String::new(),
//!     segment: "Medicamentos".to_string(),
//! });
//!
//! // No client selected: no ICMS gross-up and no repasse discount.
//! let lines = calculator.calculate(None, &[item], dec!(10)).unwrap();
//!
//! assert_eq!(lines[0].adjusted_factory_price, dec!(820.00));
//! assert_eq!(round_half_up(lines[0].sale_price), dec!(902.00));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::calculations::common::percent_of;
use crate::models::{BudgetTotals, Client, LineResult, RateTable, SelectedItem, StateRates};

/// Errors that can occur while pricing a budget.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// The embedded cost factor must be in (0, 1].
    #[error("embedded cost factor must be between 0 and 1, got {0}")]
    InvalidEmbeddedCostFactor(Decimal),

    /// The distributor discount must be in [0, 1].
    #[error("distributor discount must be between 0 and 1, got {0}")]
    InvalidDistributorDiscount(Decimal),

    /// The purchase ICMS credit must be in [0, 1].
    #[error("purchase ICMS credit must be between 0 and 1, got {0}")]
    InvalidPurchaseIcmsCredit(Decimal),

    /// The output tax rate must be in [0, 1].
    #[error("output tax rate must be between 0 and 1, got {0}")]
    InvalidOutputTax(Decimal),

    /// ICMS must be in [0, 1); a rate of 1 would divide by zero.
    #[error("ICMS rate for state {state} must be in [0, 1), got {rate}")]
    InvalidIcmsRate { state: String, rate: Decimal },

    /// Repasse must be in [0, 1].
    #[error("repasse rate for state {state} must be between 0 and 1, got {rate}")]
    InvalidRepasseRate { state: String, rate: Decimal },

    /// The selected client's state is missing from the rate table.
    #[error("no ICMS/repasse rates configured for state {0}")]
    MissingRates(String),
    /// An intermediate value does not fit in a `Decimal`.
    #[error("{step} is out of range for {product}")]
    Overflow { product: String, step: &'static str },
}

/// Fixed pricing factors applied to every item regardless of state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PricingConfig {
    /// Share of the factory price kept when grossing up for ICMS (Step 2).
    pub embedded_cost_factor: Decimal,

    /// Discount taken off the repasse price to reach the final cost (Step 4).
    pub distributor_discount: Decimal,

    /// Purchase-side ICMS credit removed from the final cost (Step 5).
    pub purchase_icms_credit: Decimal,

    /// Output tax removed from gross revenue (Step 8).
    pub output_tax: Decimal,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            embedded_cost_factor: Decimal::new(82, 2),
            distributor_discount: Decimal::new(6, 2),
            purchase_icms_credit: Decimal::new(4, 2),
            output_tax: Decimal::new(4, 2),
        }
    }
}

fn is_fraction(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= Decimal::ONE
}

impl PricingConfig {
    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError`] if:
    /// - `embedded_cost_factor` is not in (0, 1]
    /// - `distributor_discount`, `purchase_icms_credit` or `output_tax`
    ///   is not in [0, 1]
    pub fn validate(&self) -> Result<(), PricingError> {
        if self.embedded_cost_factor <= Decimal::ZERO || self.embedded_cost_factor > Decimal::ONE {
            return Err(PricingError::InvalidEmbeddedCostFactor(
                self.embedded_cost_factor,
            ));
        }
        if !is_fraction(self.distributor_discount) {
            return Err(PricingError::InvalidDistributorDiscount(
                self.distributor_discount,
            ));
        }
        if !is_fraction(self.purchase_icms_credit) {
            return Err(PricingError::InvalidPurchaseIcmsCredit(
                self.purchase_icms_credit,
            ));
        }
        if !is_fraction(self.output_tax) {
            return Err(PricingError::InvalidOutputTax(self.output_tax));
        }
        Ok(())
    }
}

/// Prices selected items against a rate table.
///
/// The calculator holds no selection state: every call to
/// [`calculate`](Self::calculate) derives a fresh result list from its inputs.
#[derive(Debug, Clone)]
pub struct PricingCalculator {
    config: PricingConfig,
    rates: RateTable,
}

impl PricingCalculator {
    pub fn new(
        config: PricingConfig,
        rates: RateTable,
    ) -> Self {
        Self { config, rates }
    }

    /// Prices every item, preserving input order.
    ///
    /// An empty item list yields an empty result; no client means zero
    /// ICMS and zero repasse.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError`] if the configuration is invalid, if the
    /// client's state has no rates or out-of-range rates, or if a value
    /// does not fit in a [`Decimal`].
    pub fn calculate(
        &self,
        client: Option<&Client>,
        items: &[SelectedItem],
        margin_percent: Decimal,
    ) -> Result<Vec<LineResult>, PricingError> {
        self.config.validate()?;
        let rates = self.state_rates(client)?;

        debug!(
            client = client.map(|c| c.id),
            items = items.len(),
            margin = %margin_percent,
            icms = %rates.icms,
            repasse = %rates.repasse,
            "pricing budget"
        );

        items
            .iter()
            .map(|item| self.calculate_line(item, rates, margin_percent))
            .collect()
    }

    /// Sums a set of line results into budget totals.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::Overflow`] if a sum does not fit in a
    /// [`Decimal`].
    pub fn totals(
        client: Option<&Client>,
        lines: &[LineResult],
    ) -> Result<BudgetTotals, PricingError> {
        let overflow = |step| PricingError::Overflow {
            product: "budget totals".to_string(),
            step,
        };

        let mut totals = BudgetTotals::default();
        for line in lines {
            totals.gross_revenue = totals
                .gross_revenue
                .checked_add(line.gross_revenue)
                .ok_or_else(|| overflow("gross revenue"))?;
            totals.net_revenue = totals
                .net_revenue
                .checked_add(line.net_revenue)
                .ok_or_else(|| overflow("net revenue"))?;
            totals.cost_of_goods = totals
                .cost_of_goods
                .checked_add(line.cost_of_goods)
                .ok_or_else(|| overflow("cost of goods"))?;
            totals.gross_profit = totals
                .gross_profit
                .checked_add(line.gross_profit)
                .ok_or_else(|| overflow("gross profit"))?;
        }
        totals.gross_margin_percent = percent_of(totals.gross_profit, totals.net_revenue);

        if let Some(client) = client {
            if totals.gross_revenue > client.budget_ceiling {
                warn!(
                    client = client.id,
                    gross_revenue = %totals.gross_revenue,
                    ceiling = %client.budget_ceiling,
                    "budget exceeds client ceiling"
                );
                totals.exceeds_ceiling = true;
            }
        }

        Ok(totals)
    }

    /// Looks up and checks the rates for the selected client (Step 1).
    fn state_rates(
        &self,
        client: Option<&Client>,
    ) -> Result<StateRates, PricingError> {
        let Some(client) = client else {
            return Ok(StateRates::default());
        };

        let rates = self
            .rates
            .rates_for(&client.state)
            .ok_or_else(|| PricingError::MissingRates(client.state.clone()))?;

        if rates.icms < Decimal::ZERO || rates.icms >= Decimal::ONE {
            return Err(PricingError::InvalidIcmsRate {
                state: client.state.clone(),
                rate: rates.icms,
            });
        }
        if !is_fraction(rates.repasse) {
            return Err(PricingError::InvalidRepasseRate {
                state: client.state.clone(),
                rate: rates.repasse,
            });
        }

        Ok(rates)
    }

    fn calculate_line(
        &self,
        item: &SelectedItem,
        rates: StateRates,
        margin_percent: Decimal,
    ) -> Result<LineResult, PricingError> {
        let factory_price = item.product.factory_price;
        let quantity = Decimal::from(item.quantity);
        let checked = |value: Option<Decimal>, step| {
            value.ok_or_else(|| {
                warn!(product = %item.product.name, step, "value out of range");
                PricingError::Overflow {
                    product: item.product.name.clone(),
                    step,
                }
            })
        };

        // Step 2: ICMS gross-up
        let adjusted_factory_price = checked(
            self.adjusted_factory_price(factory_price, rates.icms),
            "adjusted factory price",
        )?;

        // Steps 3-5: acquisition cost chain
        let repasse_price = checked(
            self.repasse_price(factory_price, rates.repasse),
            "repasse price",
        )?;
        let final_cost = checked(self.final_cost(repasse_price), "final cost")?;
        let net_cost = checked(self.net_cost(final_cost), "net cost")?;

        // Step 6: margin is applied to the grossed-up price, not to the cost chain
        let sale_price = checked(
            self.sale_price(adjusted_factory_price, margin_percent),
            "sale price",
        )?;

        // Steps 7-10
        let gross_revenue = checked(sale_price.checked_mul(quantity), "gross revenue")?;
        let net_revenue = checked(self.net_revenue(gross_revenue), "net revenue")?;
        let cost_of_goods = checked(net_cost.checked_mul(quantity), "cost of goods")?;
        let gross_profit = checked(net_revenue.checked_sub(cost_of_goods), "gross profit")?;

        // Step 11
        let gross_margin_percent = percent_of(gross_profit, net_revenue);
        if gross_margin_percent.is_none() {
            warn!(
                product = %item.product.name,
                quantity = item.quantity,
                net_revenue = %net_revenue,
                "gross margin is undefined"
            );
        }

        Ok(LineResult {
            product_name: item.product.name.clone(),
            quantity: item.quantity,
            adjusted_factory_price,
            repasse_price,
            final_cost,
            net_cost,
            sale_price,
            gross_revenue,
            net_revenue,
            cost_of_goods,
            gross_profit,
            gross_margin_percent,
        })
    }

    fn adjusted_factory_price(
        &self,
        factory_price: Decimal,
        icms: Decimal,
    ) -> Option<Decimal> {
        factory_price
            .checked_mul(self.config.embedded_cost_factor)?
            .checked_div(Decimal::ONE - icms)
    }

    fn repasse_price(
        &self,
        factory_price: Decimal,
        repasse: Decimal,
    ) -> Option<Decimal> {
        factory_price.checked_sub(factory_price.checked_mul(repasse)?)
    }

    fn final_cost(
        &self,
        repasse_price: Decimal,
    ) -> Option<Decimal> {
        repasse_price.checked_sub(repasse_price.checked_mul(self.config.distributor_discount)?)
    }

    fn net_cost(
        &self,
        final_cost: Decimal,
    ) -> Option<Decimal> {
        final_cost.checked_mul(Decimal::ONE - self.config.purchase_icms_credit)
    }

    fn sale_price(
        &self,
        adjusted_factory_price: Decimal,
        margin_percent: Decimal,
    ) -> Option<Decimal> {
        let markup = Decimal::ONE.checked_add(margin_percent.checked_div(Decimal::ONE_HUNDRED)?)?;
        let price = adjusted_factory_price.checked_mul(markup)?;
        if price < Decimal::ZERO {
            warn!(
                adjusted_factory_price = %adjusted_factory_price,
                margin = %margin_percent,
                sale_price = %price,
                "sale price is negative"
            );
        }
        Some(price)
    }

    fn net_revenue(
        &self,
        gross_revenue: Decimal,
    ) -> Option<Decimal> {
        gross_revenue.checked_mul(Decimal::ONE - self.config.output_tax)
    }
}
