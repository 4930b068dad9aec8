use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Per-state ICMS and repasse rates, both expressed as fractions (0.17 = 17%).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTable {
    pub icms: BTreeMap<String, Decimal>,
    pub repasse: BTreeMap<String, Decimal>,
}

/// The pair of rates that applies to one client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateRates {
    pub icms: Decimal,
    pub repasse: Decimal,
}

impl RateTable {
    /// Returns both rates for `state`, or `None` when either mapping lacks it.
    pub fn rates_for(
        &self,
        state: &str,
    ) -> Option<StateRates> {
        let icms = *self.icms.get(state)?;
        let repasse = *self.repasse.get(state)?;
        Some(StateRates { icms, repasse })
    }

    /// State codes present in both mappings, sorted.
    pub fn states(&self) -> Vec<&str> {
        self.icms
            .keys()
            .filter(|state| self.repasse.contains_key(*state))
            .map(String::as_str)
            .collect()
    }
}
