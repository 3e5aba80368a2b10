//! Infrastructure layer: storage backends, store configuration, and the
//! stock ledger that ties validated domain input to a backend.

pub mod config;
pub mod error;
pub mod ledger;
pub mod store;

pub use config::{ConfigError, PostgresParts, StoreConfig, StoreTarget};
pub use error::{LedgerError, StoreError};
pub use ledger::StockLedger;
pub use store::{open_store, Decrement, Increment, InMemoryStockStore, PostgresStockStore, SqliteStockStore, StockStore};
