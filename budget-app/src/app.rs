//! Application wiring and console rendering.

use std::fmt;

use budget_core::calculations::common::format_two_places;
use budget_core::{BudgetTotals, Client, LineResult, PricingError, Product, SelectionError};
use budget_data::{ReferenceDataError, ReferenceDataLoader};
use thiserror::Error;
use tracing::debug;

use crate::config::AppConfig;
use crate::export::ExportError;
use crate::state::Session;
use crate::utils::{InputError, opt_decimal_display};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("unknown client id {0}")]
    UnknownClient(u32),

    #[error("unknown product id {0}")]
    UnknownProduct(u32),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Pricing(#[from] PricingError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Data(#[from] ReferenceDataError),
}

/// Loads the reference data named by `config` and starts an empty session.
pub fn load_session(config: &AppConfig) -> Result<Session, AppError> {
    debug!(data_dir = %config.data_dir.display(), "loading reference data");
    config.pricing.validate()?;
    let data = ReferenceDataLoader::load_dir(&config.data_dir)?;
    Ok(Session::new(data, config.pricing.clone()))
}

/// Client catalogue, one status block per client.
pub struct ClientCatalog<'a>(pub &'a [Client]);

impl fmt::Display for ClientCatalog<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for client in self.0 {
            writeln!(f, "[{}]", client.id)?;
            writeln!(f, "{client}")?;
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Product catalogue as an aligned table.
pub struct ProductCatalog<'a>(pub &'a [Product]);

impl fmt::Display for ProductCatalog<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(
            f,
            "{:>3}  {:<20} {:>12}  {:<16} {}",
            "ID", "Name", "Factory R$", "Segment", "Description"
        )?;
        for p in self.0 {
            writeln!(
                f,
                "{:>3}  {:<20} {:>12}  {:<16} {}",
                p.id,
                p.name,
                format_two_places(p.factory_price),
                p.segment,
                p.description
            )?;
        }
        Ok(())
    }
}

/// Result table followed by the budget totals.
pub struct ResultsTable<'a> {
    pub client: Option<&'a Client>,
    pub lines: &'a [LineResult],
    pub totals: &'a BudgetTotals,
}

impl fmt::Display for ResultsTable<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self.client {
            Some(c) => writeln!(f, "{c}")?,
            None => writeln!(f, "No client selected")?,
        }
        writeln!(f)?;

        writeln!(
            f,
            "{:<20} {:>4} {:>12} {:>12} {:>12} {:>12} {:>8} {:>12}",
            "Product", "Qty", "Price", "RB", "RL", "LB", "MB %", "CMV"
        )?;
        for line in self.lines {
            writeln!(
                f,
                "{:<20} {:>4} {:>12} {:>12} {:>12} {:>12} {:>8} {:>12}",
                line.product_name,
                line.quantity,
                format_two_places(line.sale_price),
                format_two_places(line.gross_revenue),
                format_two_places(line.net_revenue),
                format_two_places(line.gross_profit),
                opt_decimal_display(&line.gross_margin_percent),
                format_two_places(line.cost_of_goods),
            )?;
        }
        if self.lines.is_empty() {
            writeln!(f, "(no products selected)")?;
        }
        writeln!(f)?;

        let totals = self.totals;
        let rows = [
            ("Gross revenue (RB)", format_two_places(totals.gross_revenue)),
            ("Net revenue (RL)", format_two_places(totals.net_revenue)),
            ("Cost of goods (CMV)", format_two_places(totals.cost_of_goods)),
            ("Gross profit (LB)", format_two_places(totals.gross_profit)),
            (
                "Gross margin (MB %)",
                opt_decimal_display(&totals.gross_margin_percent),
            ),
        ];
        for (label, value) in rows {
            writeln!(f, "{label:<20} {value:>12}")?;
        }
        if totals.exceeds_ceiling {
            writeln!(f, "WARNING: gross revenue exceeds the client's budget ceiling")?;
        }
        Ok(())
    }
}
