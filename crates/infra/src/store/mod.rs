//! Storage backends for the stock ledger.
//!
//! Every backend implements [`StockStore`]. Each mutation is a single
//! statement (or a single critical section for the in-memory store), so the
//! quantity check and the write cannot interleave with another writer.

use std::sync::Arc;

use stockroom_core::{Product, ProductName, Quantity, Weight};

use crate::config::{StoreConfig, StoreTarget};
use crate::error::StoreError;

pub mod in_memory;
pub mod postgres;
pub mod sqlite;

pub use in_memory::InMemoryStockStore;
pub use postgres::PostgresStockStore;
pub use sqlite::SqliteStockStore;

/// How often a conditional statement is re-run when its follow-up read shows
/// a concurrent writer changed the row in between.
pub(crate) const CONDITIONAL_ATTEMPTS: usize = 4;

/// Result of a bounded decrement.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Decrement {
    /// The row was updated.
    Applied,
    /// No row with that name exists.
    Missing,
    /// The row exists but holds too little stock; nothing was written.
    Insufficient { available: i64 },
}

/// Result of an add. Stock is an `i64`; an add that would carry it past
/// `i64::MAX` writes nothing.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Increment {
    Applied,
    Overflow { available: i64 },
}

/// Persistent product table.
#[async_trait::async_trait]
pub trait StockStore: Send + Sync {
    /// Create the backing table if it does not exist. Idempotent.
    async fn initialize(&self) -> Result<(), StoreError>;

    /// Insert the product, or add `quantity` to an existing row. A provided
    /// weight replaces the stored one; `None` keeps it.
    async fn add_or_increment(
        &self,
        name: &ProductName,
        quantity: Quantity,
        weight: Option<Weight>,
    ) -> Result<Increment, StoreError>;

    /// Subtract `amount` if at least that much is in stock.
    async fn decrement(&self, name: &ProductName, amount: Quantity) -> Result<Decrement, StoreError>;

    /// Set the quantity to `target` if the current quantity is at least `target`.
    async fn lower_to(&self, name: &ProductName, target: Quantity) -> Result<Decrement, StoreError>;

    /// Delete the row. Returns whether a row existed.
    async fn remove(&self, name: &ProductName) -> Result<bool, StoreError>;

    /// Product names in storage order.
    async fn names(&self) -> Result<Vec<ProductName>, StoreError>;

    /// All products in storage order.
    async fn all(&self) -> Result<Vec<Product>, StoreError>;
}

#[async_trait::async_trait]
impl<S> StockStore for Arc<S>
where
    S: StockStore + ?Sized,
{
    async fn initialize(&self) -> Result<(), StoreError> {
        (**self).initialize().await
    }

    async fn add_or_increment(
        &self,
        name: &ProductName,
        quantity: Quantity,
        weight: Option<Weight>,
    ) -> Result<Increment, StoreError> {
        (**self).add_or_increment(name, quantity, weight).await
    }

    async fn decrement(&self, name: &ProductName, amount: Quantity) -> Result<Decrement, StoreError> {
        (**self).decrement(name, amount).await
    }

    async fn lower_to(&self, name: &ProductName, target: Quantity) -> Result<Decrement, StoreError> {
        (**self).lower_to(name, target).await
    }

    async fn remove(&self, name: &ProductName) -> Result<bool, StoreError> {
        (**self).remove(name).await
    }

    async fn names(&self) -> Result<Vec<ProductName>, StoreError> {
        (**self).names().await
    }

    async fn all(&self) -> Result<Vec<Product>, StoreError> {
        (**self).all().await
    }
}

/// Open the backend named by `config`. The table is not created here; call
/// [`crate::StockLedger::initialize`] once the ledger is built.
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn StockStore>, StoreError> {
    tracing::info!(backend = config.target.kind(), "opening stock store");

    let store: Arc<dyn StockStore> = match &config.target {
        StoreTarget::Sqlite { url } => {
            Arc::new(SqliteStockStore::connect(url, config.max_connections).await?)
        }
        StoreTarget::Postgres { url } => {
            Arc::new(PostgresStockStore::connect(url, config.max_connections).await?)
        }
        StoreTarget::PostgresParts(parts) => Arc::new(
            PostgresStockStore::connect_with(parts.connect_options(), config.max_connections).await?,
        ),
        StoreTarget::InMemory => Arc::new(InMemoryStockStore::new()),
    };

    Ok(store)
}
