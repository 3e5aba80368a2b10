//! The stock ledger: validated operations over an injected [`StockStore`].
//!
//! Inputs arrive as raw scalars from the presentation layer and are validated
//! here before any statement runs. Business failures come back as
//! [`LedgerError::Domain`]; backend failures as [`LedgerError::StoreUnavailable`].

use tracing::instrument;

use stockroom_core::{Confirmation, DomainError, Product, ProductName, Quantity, Weight};

use crate::error::LedgerError;
use crate::store::{Decrement, Increment, StockStore};

#[derive(Debug, Clone)]
pub struct StockLedger<S> {
    store: S,
}

impl<S> StockLedger<S>
where
    S: StockStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Ensure the backing table exists. Safe to call on every startup.
    #[instrument(skip(self))]
    pub async fn initialize(&self) -> Result<(), LedgerError> {
        let result = self.store.initialize().await.map_err(LedgerError::from);
        observe("initialize", Access::Write, result)
    }

    /// Create the product or add to its stock.
    #[instrument(skip(self))]
    pub async fn add_or_increment(
        &self,
        name: &str,
        quantity: i64,
        weight: Option<f64>,
    ) -> Result<Confirmation, LedgerError> {
        let result = async {
            let name = ProductName::parse(name)?;
            let quantity = Quantity::positive(quantity)?;
            let weight = weight.map(Weight::new).transpose()?;

            match self.store.add_or_increment(&name, quantity, weight).await? {
                Increment::Applied => Ok::<_, LedgerError>(Confirmation::Added { name, quantity }),
                Increment::Overflow { available } => Err(DomainError::validation(format!(
                    "adding {quantity} to the {available} units of '{name}' exceeds the largest storable quantity"
                ))
                .into()),
            }
        }
        .await;
        observe("add_or_increment", Access::Write, result)
    }

    /// Sell exactly `quantity` units. No partial sales.
    #[instrument(skip(self))]
    pub async fn sell(&self, name: &str, quantity: i64) -> Result<Confirmation, LedgerError> {
        let result = async {
            let (name, quantity) = (ProductName::parse(name)?, Quantity::positive(quantity)?);
            let outcome = self.store.decrement(&name, quantity).await?;
            settle(&name, quantity, outcome)?;
            Ok::<_, LedgerError>(Confirmation::Sold { name, quantity })
        }
        .await;
        observe("sell", Access::Write, result)
    }

    /// Adjust stock downward by `reduction` units (delta semantics).
    ///
    /// Same bounds and errors as [`Self::sell`]; kept separate because callers
    /// present it as a correction rather than a sale.
    #[instrument(skip(self))]
    pub async fn reduce_by(&self, name: &str, reduction: i64) -> Result<Confirmation, LedgerError> {
        let result = async {
            let (name, quantity) = (ProductName::parse(name)?, Quantity::positive(reduction)?);
            let outcome = self.store.decrement(&name, quantity).await?;
            settle(&name, quantity, outcome)?;
            Ok::<_, LedgerError>(Confirmation::Reduced { name, quantity })
        }
        .await;
        observe("reduce_by", Access::Write, result)
    }

    /// Set stock to an absolute `target` that must not exceed the current
    /// quantity. Zero is allowed.
    #[instrument(skip(self))]
    pub async fn lower_to(&self, name: &str, target: i64) -> Result<Confirmation, LedgerError> {
        let result = async {
            let (name, quantity) = (ProductName::parse(name)?, Quantity::non_negative(target)?);
            match self.store.lower_to(&name, quantity).await? {
                Decrement::Applied => Ok::<_, LedgerError>(Confirmation::Lowered { name, quantity }),
                Decrement::Missing => Err(DomainError::not_found(name.as_str()).into()),
                Decrement::Insufficient { available } => Err(DomainError::validation(format!(
                    "new quantity {quantity} exceeds the current quantity {available} of '{name}'"
                ))
                .into()),
            }
        }
        .await;
        observe("lower_to", Access::Write, result)
    }

    /// Delete the product. Removing an unknown name is not an error.
    #[instrument(skip(self))]
    pub async fn remove(&self, name: &str) -> Result<Confirmation, LedgerError> {
        let result = async {
            let name = ProductName::parse(name)?;
            let existed = self.store.remove(&name).await?;
            Ok::<_, LedgerError>(Confirmation::Removed { name, existed })
        }
        .await;
        observe("remove", Access::Write, result)
    }

    /// Product names in storage order; empty when the ledger is empty.
    pub async fn list_names(&self) -> Result<Vec<ProductName>, LedgerError> {
        let result = self.store.names().await.map_err(LedgerError::from);
        observe("list_names", Access::Read, result)
    }

    /// Every record, read-only.
    pub async fn list_all(&self) -> Result<Vec<Product>, LedgerError> {
        let result = self.store.all().await.map_err(LedgerError::from);
        observe("list_all", Access::Read, result)
    }
}

fn settle(name: &ProductName, requested: Quantity, outcome: Decrement) -> Result<(), DomainError> {
    match outcome {
        Decrement::Applied => Ok(()),
        Decrement::Missing => Err(DomainError::not_found(name.as_str())),
        Decrement::Insufficient { available } => Err(DomainError::out_of_stock(
            name.as_str(),
            requested.get(),
            available,
        )),
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Access {
    Read,
    Write,
}

fn observe<T>(operation: &'static str, access: Access, result: Result<T, LedgerError>) -> Result<T, LedgerError> {
    match &result {
        Ok(_) if access == Access::Write => tracing::info!(operation, "ledger operation succeeded"),
        Ok(_) => tracing::debug!(operation, "ledger operation succeeded"),
        Err(LedgerError::Domain(e)) => tracing::warn!(operation, code = e.code(), "ledger operation rejected: {e}"),
        Err(LedgerError::StoreUnavailable(e)) => tracing::error!(operation, "ledger store failure: {e}"),
    }
    result
}
