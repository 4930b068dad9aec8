use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use budget_core::{Client, Product, RateTable, ReferenceData};
use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info};

pub const CLIENTS_FILE: &str = "clients.json";
pub const PRODUCTS_FILE: &str = "products.json";
pub const RATES_FILE: &str = "rates.json";

static STATE_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}$").expect("state code pattern is valid"));

static CNPJ: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{2}\.\d{3}\.\d{3}/\d{4}-\d{2}$").expect("CNPJ pattern is valid")
});

/// Errors that can occur when loading reference data.
#[derive(Debug, Error)]
pub enum ReferenceDataError {
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("client id {0} appears more than once")]
    DuplicateClientId(u32),

    #[error("product id {0} appears more than once")]
    DuplicateProductId(u32),

    #[error("client {client}: state '{state}' is not a two-letter code")]
    InvalidStateCode { client: u32, state: String },

    #[error("client {client}: CNPJ '{tax_id}' is not formatted as NN.NNN.NNN/NNNN-NN")]
    InvalidTaxId { client: u32, tax_id: String },

    #[error("client {client}: budget ceiling must be non-negative, got {ceiling}")]
    NegativeBudgetCeiling { client: u32, ceiling: Decimal },

    #[error("product {product}: factory price must be non-negative, got {price}")]
    NegativeFactoryPrice { product: u32, price: Decimal },

    #[error("client {client}: no ICMS/repasse rates for state {state}")]
    MissingRates { client: u32, state: String },

    #[error("ICMS rate for state {state} must be in [0, 1), got {rate}")]
    InvalidIcmsRate { state: String, rate: Decimal },

    #[error("repasse rate for state {state} must be between 0 and 1, got {rate}")]
    InvalidRepasseRate { state: String, rate: Decimal },
}

impl From<serde_json::Error> for ReferenceDataError {
    fn from(err: serde_json::Error) -> Self {
        ReferenceDataError::JsonParse(err.to_string())
    }
}

/// Loader for the client, product and rate files.
///
/// Each `parse_*` method accepts any `Read`, such as a file or a byte slice.
/// [`load_dir`](Self::load_dir) reads the three standard files from one
/// directory and validates them together.
pub struct ReferenceDataLoader;

impl ReferenceDataLoader {
    /// Parse a JSON array of clients.
    pub fn parse_clients<R: Read>(reader: R) -> Result<Vec<Client>, ReferenceDataError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Parse a JSON array of products.
    pub fn parse_products<R: Read>(reader: R) -> Result<Vec<Product>, ReferenceDataError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Parse a JSON object with `icms` and `repasse` maps keyed by state code.
    pub fn parse_rates<R: Read>(reader: R) -> Result<RateTable, ReferenceDataError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Reads `clients.json`, `products.json` and `rates.json` from `dir`,
    /// then validates the combined data.
    pub fn load_dir(dir: &Path) -> Result<ReferenceData, ReferenceDataError> {
        debug!(dir = %dir.display(), "loading reference data");

        let clients = Self::parse_clients(open(&dir.join(CLIENTS_FILE))?)?;
        let products = Self::parse_products(open(&dir.join(PRODUCTS_FILE))?)?;
        let rates = Self::parse_rates(open(&dir.join(RATES_FILE))?)?;

        let data = ReferenceData {
            clients,
            products,
            rates,
        };
        Self::validate(&data)?;

        info!(
            clients = data.clients.len(),
            products = data.products.len(),
            states = data.rates.states().len(),
            "reference data loaded"
        );
        Ok(data)
    }

    /// Checks the invariants the pricing calculator relies on.
    ///
    /// - client and product ids are unique
    /// - state codes are two uppercase letters and CNPJs are well formed
    /// - ceilings and factory prices are non-negative
    /// - every rate lies in range (ICMS below 1, so the gross-up never divides by zero)
    /// - every client's state has both an ICMS and a repasse rate
    pub fn validate(data: &ReferenceData) -> Result<(), ReferenceDataError> {
        let mut seen = HashSet::new();
        for client in &data.clients {
            if !seen.insert(client.id) {
                return Err(ReferenceDataError::DuplicateClientId(client.id));
            }
            if !STATE_CODE.is_match(&client.state) {
                return Err(ReferenceDataError::InvalidStateCode {
                    client: client.id,
                    state: client.state.clone(),
                });
            }
            if !CNPJ.is_match(&client.tax_id) {
                return Err(ReferenceDataError::InvalidTaxId {
                    client: client.id,
                    tax_id: client.tax_id.clone(),
                });
            }
            if client.budget_ceiling < Decimal::ZERO {
                return Err(ReferenceDataError::NegativeBudgetCeiling {
                    client: client.id,
                    ceiling: client.budget_ceiling,
                });
            }
        }

        let mut seen = HashSet::new();
        for product in &data.products {
            if !seen.insert(product.id) {
                return Err(ReferenceDataError::DuplicateProductId(product.id));
            }
            if product.factory_price < Decimal::ZERO {
                return Err(ReferenceDataError::NegativeFactoryPrice {
                    product: product.id,
                    price: product.factory_price,
                });
            }
        }

        for (state, &rate) in &data.rates.icms {
            if rate < Decimal::ZERO || rate >= Decimal::ONE {
                return Err(ReferenceDataError::InvalidIcmsRate {
                    state: state.clone(),
                    rate,
                });
            }
        }
        for (state, &rate) in &data.rates.repasse {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(ReferenceDataError::InvalidRepasseRate {
                    state: state.clone(),
                    rate,
                });
            }
        }

        for client in &data.clients {
            if data.rates.rates_for(&client.state).is_none() {
                return Err(ReferenceDataError::MissingRates {
                    client: client.id,
                    state: client.state.clone(),
                });
            }
        }

        Ok(())
    }
}

fn open(path: &Path) -> Result<BufReader<File>, ReferenceDataError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| ReferenceDataError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const CLIENTS_JSON: &str = r#"[
  {"id": 1, "name": "Cliente A", "company": "Empresa X", "state": "SP",
   "tax_id": "12.345.678/0001-00", "budget_ceiling": 10000},
  {"id": 4, "name": "Cliente D", "company": "Empresa W", "state": "DF",
   "tax_id": "11.223.344/0001-00", "budget_ceiling": "25000.50"}
]"#;

    const PRODUCTS_JSON: &str = r#"[
  {"id": 1, "name": "Produto 1", "factory_price": "839.04",
   "description": "Descrição do Produto 1", "segment": "Medicamentos"}
]"#;

    const RATES_JSON: &str = r#"{
  "icms": {"SP": "0.17", "DF": "0.12"},
  "repasse": {"SP": "0.1354", "DF": "0.0538"}
}"#;

    fn valid_data() -> ReferenceData {
        ReferenceData {
            clients: ReferenceDataLoader::parse_clients(CLIENTS_JSON.as_bytes()).unwrap(),
            products: ReferenceDataLoader::parse_products(PRODUCTS_JSON.as_bytes()).unwrap(),
            rates: ReferenceDataLoader::parse_rates(RATES_JSON.as_bytes()).unwrap(),
        }
    }

    // -----------------------------------------------------------------------
    // Parsing
    // -----------------------------------------------------------------------

    #[test]
    fn test_parse_clients() {
        let clients =
            ReferenceDataLoader::parse_clients(CLIENTS_JSON.as_bytes()).expect("should parse");

        assert_eq!(clients.len(), 2);
        assert_eq!(
            clients[0],
            Client {
                id: 1,
                name: "Cliente A".to_string(),
                company: "Empresa X".to_string(),
                state: "SP".to_string(),
                tax_id: "12.345.678/0001-00".to_string(),
                budget_ceiling: dec!(10000),
            }
        );
    }

    #[test]
    fn test_parse_decimal_from_string_and_number() {
        let clients = ReferenceDataLoader::parse_clients(CLIENTS_JSON.as_bytes()).unwrap();

        assert_eq!(clients[0].budget_ceiling, dec!(10000));
        assert_eq!(clients[1].budget_ceiling, dec!(25000.50));
    }

    #[test]
    fn test_parse_products() {
        let products =
            ReferenceDataLoader::parse_products(PRODUCTS_JSON.as_bytes()).expect("should parse");

        assert_eq!(products.len(), 1);
        assert_eq!(products[0].factory_price, dec!(839.04));
        assert_eq!(products[0].segment, "Medicamentos");
    }

    #[test]
    fn test_parse_rates() {
        let rates = ReferenceDataLoader::parse_rates(RATES_JSON.as_bytes()).expect("should parse");

        assert_eq!(rates.icms.get("SP"), Some(&dec!(0.17)));
        assert_eq!(rates.repasse.get("DF"), Some(&dec!(0.0538)));
    }

    #[test]
    fn test_parse_missing_field() {
        let json = r#"[{"id": 1, "name": "Produto 1"}]"#;

        let err = ReferenceDataLoader::parse_products(json.as_bytes())
            .expect_err("should fail for missing field");

        let ReferenceDataError::JsonParse(msg) = err else {
            panic!("Expected JsonParse error, got: {:?}", err);
        };
        assert!(
            msg.contains("missing field"),
            "Expected 'missing field' in error, got: {}",
            msg
        );
    }

    #[test]
    fn test_parse_bad_decimal() {
        let json = r#"[{"id": 1, "name": "P", "factory_price": "abc",
                        "description": "", "segment": ""}]"#;

        let result = ReferenceDataLoader::parse_products(json.as_bytes());

        assert!(matches!(result, Err(ReferenceDataError::JsonParse(_))));
    }

    #[test]
    fn test_parse_empty_array() {
        let clients = ReferenceDataLoader::parse_clients("[]".as_bytes()).unwrap();

        assert!(clients.is_empty());
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    #[test]
    fn test_validate_accepts_valid_data() {
        assert!(ReferenceDataLoader::validate(&valid_data()).is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_client_id() {
        let mut data = valid_data();
        data.clients[1].id = 1;

        let result = ReferenceDataLoader::validate(&data);

        assert!(matches!(
            result,
            Err(ReferenceDataError::DuplicateClientId(1))
        ));
    }

    #[test]
    fn test_validate_rejects_duplicate_product_id() {
        let mut data = valid_data();
        data.products.push(data.products[0].clone());

        let result = ReferenceDataLoader::validate(&data);

        assert!(matches!(
            result,
            Err(ReferenceDataError::DuplicateProductId(1))
        ));
    }

    #[test]
    fn test_validate_rejects_lowercase_state() {
        let mut data = valid_data();
        data.clients[0].state = "sp".to_string();

        match ReferenceDataLoader::validate(&data) {
            Err(ReferenceDataError::InvalidStateCode { client, state }) => {
                assert_eq!(client, 1);
                assert_eq!(state, "sp");
            }
            other => panic!("expected InvalidStateCode, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_malformed_cnpj() {
        let mut data = valid_data();
        data.clients[1].tax_id = "11223344000100".to_string();

        match ReferenceDataLoader::validate(&data) {
            Err(ReferenceDataError::InvalidTaxId { client, tax_id }) => {
                assert_eq!(client, 4);
                assert_eq!(tax_id, "11223344000100");
            }
            other => panic!("expected InvalidTaxId, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_negative_factory_price() {
        let mut data = valid_data();
        data.products[0].factory_price = dec!(-1);

        let result = ReferenceDataLoader::validate(&data);

        assert!(matches!(
            result,
            Err(ReferenceDataError::NegativeFactoryPrice { product: 1, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_negative_ceiling() {
        let mut data = valid_data();
        data.clients[0].budget_ceiling = dec!(-0.01);

        let result = ReferenceDataLoader::validate(&data);

        assert!(matches!(
            result,
            Err(ReferenceDataError::NegativeBudgetCeiling { client: 1, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_icms_of_one() {
        let mut data = valid_data();
        data.rates.icms.insert("SP".to_string(), dec!(1));

        match ReferenceDataLoader::validate(&data) {
            Err(ReferenceDataError::InvalidIcmsRate { state, rate }) => {
                assert_eq!(state, "SP");
                assert_eq!(rate, dec!(1));
            }
            other => panic!("expected InvalidIcmsRate, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_rejects_repasse_above_one() {
        let mut data = valid_data();
        data.rates.repasse.insert("DF".to_string(), dec!(1.01));

        let result = ReferenceDataLoader::validate(&data);

        assert!(matches!(
            result,
            Err(ReferenceDataError::InvalidRepasseRate { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_client_state_without_rates() {
        let mut data = valid_data();
        data.rates.repasse.remove("DF");

        match ReferenceDataLoader::validate(&data) {
            Err(ReferenceDataError::MissingRates { client, state }) => {
                assert_eq!(client, 4);
                assert_eq!(state, "DF");
            }
            other => panic!("expected MissingRates, got {other:?}"),
        }
    }

    #[test]
    fn test_load_dir_reports_missing_file() {
        let dir = Path::new("/this/path/does/not/exist");

        match ReferenceDataLoader::load_dir(dir) {
            Err(ReferenceDataError::Io { path, .. }) => {
                assert_eq!(path, dir.join(CLIENTS_FILE));
            }
            other => panic!("expected Io error, got {other:?}"),
        }
    }
}
