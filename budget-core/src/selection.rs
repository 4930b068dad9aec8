//! Budget view-state and the commands that change it.
//!
//! A [`Budget`] is the selected client, the ordered line items and the
//! profit margin. Every command returns a new `Budget` and leaves the
//! original untouched, so a rejected command can never corrupt the list.

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::calculations::{PricingCalculator, PricingError};
use crate::models::{BudgetTotals, Client, LineResult, Product, SelectedItem};

/// Errors returned by budget commands.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("no line item at position {index} (budget has {len} items)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("profit margin must be between -100% and {max}%, got {0}", max = MAX_MARGIN_PERCENT)]
    InvalidMargin(Decimal),
}

/// Largest accepted profit margin, in percent.
pub const MAX_MARGIN_PERCENT: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Budget {
    client: Option<Client>,
    items: Vec<SelectedItem>,
    margin_percent: Decimal,
}

impl Budget {
    /// An empty budget: no client, no items, zero margin.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn client(&self) -> Option<&Client> {
        self.client.as_ref()
    }

    pub fn items(&self) -> &[SelectedItem] {
        &self.items
    }

    pub fn margin_percent(&self) -> Decimal {
        self.margin_percent
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Selects `client`, or clears the selection with `None`.
    #[must_use]
    pub fn select_client(
        &self,
        client: Option<Client>,
    ) -> Self {
        debug!(client = client.as_ref().map(|c| c.id), "selecting client");
        Self {
            client,
            ..self.clone()
        }
    }

    /// Appends `product` with a quantity of one.
    ///
    /// Adding a product that is already on the budget creates a second,
    /// independent line item.
    #[must_use]
    pub fn add_product(
        &self,
        product: Product,
    ) -> Self {
        debug!(product = product.id, position = self.items.len(), "adding product");
        let mut next = self.clone();
        next.items.push(SelectedItem::new(product));
        next
    }

    /// Removes the line item at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::IndexOutOfRange`] if there is no item at
    /// `index`.
    pub fn remove_product(
        &self,
        index: usize,
    ) -> Result<Self, SelectionError> {
        self.check_index(index)?;
        let mut next = self.clone();
        let removed = next.items.remove(index);
        debug!(product = removed.product.id, index, "removed product");
        Ok(next)
    }

    /// Replaces the quantity of the line item at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::IndexOutOfRange`] if there is no item at
    /// `index`.
    pub fn set_quantity(
        &self,
        index: usize,
        quantity: u32,
    ) -> Result<Self, SelectionError> {
        self.check_index(index)?;
        let mut next = self.clone();
        next.items[index].quantity = quantity;
        Ok(next)
    }

    /// Replaces the profit margin, expressed as a percentage.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::InvalidMargin`] for margins below -100%,
    /// which would make the sale price negative, or above
    /// [`MAX_MARGIN_PERCENT`].
    pub fn set_margin(
        &self,
        margin_percent: Decimal,
    ) -> Result<Self, SelectionError> {
        if margin_percent < -Decimal::ONE_HUNDRED || margin_percent > MAX_MARGIN_PERCENT {
            return Err(SelectionError::InvalidMargin(margin_percent));
        }
        Ok(Self {
            margin_percent,
            ..self.clone()
        })
    }

    /// Prices the current selection.
    pub fn results(
        &self,
        calculator: &PricingCalculator,
    ) -> Result<Vec<LineResult>, PricingError> {
        calculator.calculate(self.client(), &self.items, self.margin_percent)
    }

    /// Prices the current selection and sums it.
    pub fn totals(
        &self,
        calculator: &PricingCalculator,
    ) -> Result<BudgetTotals, PricingError> {
        let lines = self.results(calculator)?;
        PricingCalculator::totals(self.client(), &lines)
    }

    fn check_index(
        &self,
        index: usize,
    ) -> Result<(), SelectionError> {
        if index >= self.items.len() {
            return Err(SelectionError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(())
    }
}
