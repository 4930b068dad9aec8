//! Reference data for budgets: clients, products and state rate tables.

mod loader;

pub use loader::{
    CLIENTS_FILE, PRODUCTS_FILE, RATES_FILE, ReferenceDataError, ReferenceDataLoader,
};
