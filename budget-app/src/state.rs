//! Application state for the budget calculator.
//!
//! A [`Session`] owns the reference data, the calculator built from it and
//! the budget being edited. Commands resolve ids and user-entered text, then
//! swap in the new [`Budget`]; a rejected command leaves the session as it was.

use std::path::{Path, PathBuf};

use budget_core::{
    Budget, BudgetTotals, LineResult, PricingCalculator, PricingConfig, ReferenceData,
};
use tracing::info;

use crate::app::AppError;
use crate::export::{self, CSV_FILENAME, PDF_FILENAME, csv_report, pdf_report};
use crate::utils::{parse_margin, parse_quantity};

#[derive(Debug, Clone)]
pub struct Session {
    data: ReferenceData,
    calculator: PricingCalculator,
    budget: Budget,
}

impl Session {
    /// Starts an empty budget over `data`.
    pub fn new(
        data: ReferenceData,
        config: PricingConfig,
    ) -> Self {
        let calculator = PricingCalculator::new(config, data.rates.clone());
        Self {
            data,
            calculator,
            budget: Budget::new(),
        }
    }

    pub fn data(&self) -> &ReferenceData {
        &self.data
    }

    pub fn budget(&self) -> &Budget {
        &self.budget
    }

    /// Selects the client with `id`, or clears the selection with `None`.
    pub fn select_client_by_id(
        &mut self,
        id: Option<u32>,
    ) -> Result<(), AppError> {
        let client = match id {
            Some(id) => Some(
                self.data
                    .client(id)
                    .cloned()
                    .ok_or(AppError::UnknownClient(id))?,
            ),
            None => None,
        };
        self.budget = self.budget.select_client(client);
        Ok(())
    }

    pub fn add_product_by_id(
        &mut self,
        id: u32,
    ) -> Result<(), AppError> {
        let product = self
            .data
            .product(id)
            .cloned()
            .ok_or(AppError::UnknownProduct(id))?;
        self.budget = self.budget.add_product(product);
        Ok(())
    }

    pub fn remove_product(
        &mut self,
        index: usize,
    ) -> Result<(), AppError> {
        self.budget = self.budget.remove_product(index)?;
        Ok(())
    }

    pub fn set_quantity(
        &mut self,
        index: usize,
        quantity: u32,
    ) -> Result<(), AppError> {
        self.budget = self.budget.set_quantity(index, quantity)?;
        Ok(())
    }

    /// Parses `text` as a quantity and applies it to the item at `index`.
    pub fn set_quantity_text(
        &mut self,
        index: usize,
        text: &str,
    ) -> Result<(), AppError> {
        let quantity = parse_quantity(text)?;
        self.set_quantity(index, quantity)
    }

    /// Parses `text` as a margin percentage and applies it.
    pub fn set_margin_text(
        &mut self,
        text: &str,
    ) -> Result<(), AppError> {
        let margin = parse_margin(text)?;
        self.budget = self.budget.set_margin(margin)?;
        Ok(())
    }

    pub fn results(&self) -> Result<Vec<LineResult>, AppError> {
        Ok(self.budget.results(&self.calculator)?)
    }

    pub fn totals(&self) -> Result<BudgetTotals, AppError> {
        Ok(self.budget.totals(&self.calculator)?)
    }

    /// Writes `orcamento.csv` into `dir` and returns its path.
    pub fn export_csv(
        &self,
        dir: &Path,
    ) -> Result<PathBuf, AppError> {
        let bytes = csv_report::render(&self.results()?)?;
        let path = export::write_artifact(dir, CSV_FILENAME, &bytes)?;
        info!(items = self.budget.items().len(), "CSV budget saved");
        Ok(path)
    }

    /// Writes `orcamento.pdf` into `dir` and returns its path.
    pub fn export_pdf(
        &self,
        dir: &Path,
    ) -> Result<PathBuf, AppError> {
        let bytes = pdf_report::render(self.budget.client(), &self.results()?)?;
        let path = export::write_artifact(dir, PDF_FILENAME, &bytes)?;
        info!(items = self.budget.items().len(), "PDF budget saved");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use budget_core::calculations::common::round_half_up;
    use budget_core::{Client, Product, RateTable, SelectionError};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::utils::InputError;

    fn session() -> Session {
        let data = ReferenceData {
            clients: vec![Client {
                id: 2,
                name: "Cliente B".to_string(),
                company: "Empresa Y".to_string(),
                state: "RJ".to_string(),
                tax_id: "98.765.432/0001-00".to_string(),
                budget_ceiling: dec!(15000),
            }],
            products: vec![
                Product {
                    id: 1,
                    name: "Produto 1".to_string(),
                    factory_price: dec!(839.04),
                    description: "Descrição do Produto 1".to_string(),
                    segment: "Medicamentos".to_string(),
                },
                Product {
                    id: 2,
                    name: "Produto 2".to_string(),
                    factory_price: dec!(1200.00),
                    description: "Descrição do Produto 2".to_string(),
                    segment: "Medicamentos".to_string(),
                },
            ],
            rates: RateTable {
                icms: BTreeMap::from([("RJ".to_string(), dec!(0.18))]),
                repasse: BTreeMap::from([("RJ".to_string(), dec!(0.1458))]),
            },
        };
        Session::new(data, PricingConfig::default())
    }

    // =========================================================================
    // id resolution
    // =========================================================================

    #[test]
    fn select_known_client() {
        let mut session = session();

        session.select_client_by_id(Some(2)).unwrap();

        assert_eq!(session.budget().client().map(|c| c.name.as_str()), Some("Cliente B"));
    }

    #[test]
    fn select_unknown_client_keeps_previous_selection() {
        let mut session = session();
        session.select_client_by_id(Some(2)).unwrap();

        let result = session.select_client_by_id(Some(9));

        assert!(matches!(result, Err(AppError::UnknownClient(9))));
        assert_eq!(session.budget().client().map(|c| c.id), Some(2));
    }

    #[test]
    fn clear_client_selection() {
        let mut session = session();
        session.select_client_by_id(Some(2)).unwrap();

        session.select_client_by_id(None).unwrap();

        assert_eq!(session.budget().client(), None);
    }

    #[test]
    fn add_unknown_product_is_rejected() {
        let mut session = session();

        let result = session.add_product_by_id(7);

        assert!(matches!(result, Err(AppError::UnknownProduct(7))));
        assert!(session.budget().is_empty());
    }

    // =========================================================================
    // text inputs
    // =========================================================================

    #[test]
    fn quantity_and_margin_text_drive_results() {
        let mut session = session();
        session.select_client_by_id(Some(2)).unwrap();
        session.add_product_by_id(2).unwrap();
        session.set_quantity_text(0, "3").unwrap();
        session.set_margin_text("10").unwrap();

        let lines = session.results().unwrap();

        assert_eq!(lines[0].sale_price, dec!(1320));
        assert_eq!(round_half_up(lines[0].gross_revenue), dec!(3960.00));
        assert_eq!(round_half_up(lines[0].net_revenue), dec!(3801.60));
        assert_eq!(round_half_up(lines[0].cost_of_goods), dec!(2774.99));
        assert_eq!(round_half_up(lines[0].gross_profit), dec!(1026.61));
    }

    #[test]
    fn bad_quantity_text_keeps_previous_quantity() {
        let mut session = session();
        session.add_product_by_id(1).unwrap();
        session.set_quantity_text(0, "4").unwrap();

        let result = session.set_quantity_text(0, "-1");

        assert!(matches!(
            result,
            Err(AppError::Input(InputError::Quantity { .. }))
        ));
        assert_eq!(session.budget().items()[0].quantity, 4);
    }

    #[test]
    fn margin_below_minus_one_hundred_is_rejected() {
        let mut session = session();

        let result = session.set_margin_text("-150");

        assert!(matches!(
            result,
            Err(AppError::Selection(SelectionError::InvalidMargin(_)))
        ));
        assert_eq!(session.budget().margin_percent(), dec!(0));
    }

    #[test]
    fn huge_margin_text_is_rejected() {
        let mut session = session();
        session.add_product_by_id(1).unwrap();

        let result = session.set_margin_text("79228162514264337593543950335");

        assert!(matches!(
            result,
            Err(AppError::Selection(SelectionError::InvalidMargin(_)))
        ));
        assert!(session.results().is_ok());
    }

    #[test]
    fn margin_text_near_minus_one_hundred_prices_with_undefined_margin() {
        let mut session = session();
        session.select_client_by_id(Some(2)).unwrap();
        session.add_product_by_id(1).unwrap();

        session.set_margin_text("-99.99999999999999999999999999").unwrap();

        let lines = session.results().unwrap();
        assert_eq!(lines[0].gross_margin_percent, None);
        assert_eq!(session.totals().unwrap().gross_margin_percent, None);
    }

    #[test]
    fn remove_out_of_range_is_rejected() {
        let mut session = session();
        session.add_product_by_id(1).unwrap();

        let result = session.remove_product(1);

        assert!(matches!(
            result,
            Err(AppError::Selection(SelectionError::IndexOutOfRange { index: 1, len: 1 }))
        ));
        assert_eq!(session.budget().items().len(), 1);
    }

    // =========================================================================
    // totals / export
    // =========================================================================

    #[test]
    fn totals_flag_budget_over_ceiling() {
        let mut session = session();
        session.select_client_by_id(Some(2)).unwrap();
        session.add_product_by_id(2).unwrap();
        session.set_quantity(0, 12).unwrap();

        let totals = session.totals().unwrap();

        assert_eq!(totals.gross_revenue, dec!(14400));
        assert!(!totals.exceeds_ceiling);

        session.set_quantity(0, 13).unwrap();
        assert!(session.totals().unwrap().exceeds_ceiling);
    }

    #[test]
    fn export_writes_both_files() {
        let dir = std::env::temp_dir().join("budget-session-export-test");
        let mut session = session();
        session.add_product_by_id(1).unwrap();

        let csv_path = session.export_csv(&dir).unwrap();
        let pdf_path = session.export_pdf(&dir).unwrap();

        assert_eq!(csv_path, dir.join("orcamento.csv"));
        assert_eq!(pdf_path, dir.join("orcamento.pdf"));
        let csv_text = std::fs::read_to_string(&csv_path).unwrap();
        assert!(csv_text.starts_with("Product,Quantity,"));
        assert!(std::fs::read(&pdf_path).unwrap().starts_with(b"%PDF"));
    }
}
