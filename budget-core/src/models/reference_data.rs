use serde::{Deserialize, Serialize};

use super::{Client, Product, RateTable};

/// Everything the calculator needs that does not come from the user:
/// the client and product catalogues and the state rate table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceData {
    pub clients: Vec<Client>,
    pub products: Vec<Product>,
    pub rates: RateTable,
}

impl ReferenceData {
    pub fn client(
        &self,
        id: u32,
    ) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    pub fn product(
        &self,
        id: u32,
    ) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }
}
