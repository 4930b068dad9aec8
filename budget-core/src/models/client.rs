use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::format_two_places;

/// A customer a budget is prepared for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: u32,
    pub name: String,
    pub company: String,
    /// Two-letter state code, used to look up ICMS and repasse rates.
    pub state: String,
    /// CNPJ, formatted as `NN.NNN.NNN/NNNN-NN`.
    pub tax_id: String,
    pub budget_ceiling: Decimal,
}

impl fmt::Display for Client {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "Name:    {}", self.name)?;
        writeln!(f, "Company: {}", self.company)?;
        writeln!(f, "State:   {}", self.state)?;
        writeln!(f, "CNPJ:    {}", self.tax_id)?;
        write!(f, "Budget:  R$ {}", format_two_places(self.budget_ceiling))
    }
}
