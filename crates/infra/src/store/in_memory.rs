use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use stockroom_core::{Product, ProductName, Quantity, Weight};

use super::{Decrement, Increment, StockStore};
use crate::error::StoreError;

/// In-memory product table for tests/dev. Rows keep insertion order.
#[derive(Debug, Default)]
pub struct InMemoryStockStore {
    rows: RwLock<Vec<Product>>,
}

impl InMemoryStockStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self, operation: &'static str) -> Result<RwLockReadGuard<'_, Vec<Product>>, StoreError> {
        self.rows
            .read()
            .map_err(|_| StoreError::unavailable(operation, "in-memory store lock poisoned"))
    }

    fn write(&self, operation: &'static str) -> Result<RwLockWriteGuard<'_, Vec<Product>>, StoreError> {
        self.rows
            .write()
            .map_err(|_| StoreError::unavailable(operation, "in-memory store lock poisoned"))
    }

    fn bounded_update(
        &self,
        operation: &'static str,
        name: &ProductName,
        floor: i64,
        apply: impl FnOnce(i64) -> i64,
    ) -> Result<Decrement, StoreError> {
        let mut rows = self.write(operation)?;
        let Some(row) = rows.iter_mut().find(|p| &p.name == name) else {
            return Ok(Decrement::Missing);
        };
        if row.quantity < floor {
            return Ok(Decrement::Insufficient {
                available: row.quantity,
            });
        }
        row.quantity = apply(row.quantity);
        Ok(Decrement::Applied)
    }
}

#[async_trait::async_trait]
impl StockStore for InMemoryStockStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        self.read("initialize").map(|_| ())
    }

    async fn add_or_increment(
        &self,
        name: &ProductName,
        quantity: Quantity,
        weight: Option<Weight>,
    ) -> Result<Increment, StoreError> {
        let mut rows = self.write("add_or_increment")?;
        match rows.iter_mut().find(|p| &p.name == name) {
            Some(row) => {
                let Some(total) = row.quantity.checked_add(quantity.get()) else {
                    return Ok(Increment::Overflow {
                        available: row.quantity,
                    });
                };
                row.quantity = total;
                if weight.is_some() {
                    row.weight = weight;
                }
            }
            None => rows.push(Product::new(name.clone(), quantity.get(), weight)),
        }
        Ok(Increment::Applied)
    }

    async fn decrement(&self, name: &ProductName, amount: Quantity) -> Result<Decrement, StoreError> {
        let amount = amount.get();
        self.bounded_update("decrement", name, amount, |q| q - amount)
    }

    async fn lower_to(&self, name: &ProductName, target: Quantity) -> Result<Decrement, StoreError> {
        let target = target.get();
        self.bounded_update("lower_to", name, target, |_| target)
    }

    async fn remove(&self, name: &ProductName) -> Result<bool, StoreError> {
        let mut rows = self.write("remove")?;
        let before = rows.len();
        rows.retain(|p| &p.name != name);
        Ok(rows.len() != before)
    }

    async fn names(&self) -> Result<Vec<ProductName>, StoreError> {
        Ok(self.read("names")?.iter().map(|p| p.name.clone()).collect())
    }

    async fn all(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.read("list_all")?.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn behaves_like_the_sql_tables() {
        let store = InMemoryStockStore::new();
        store.initialize().await.unwrap();

        let flour = ProductName::parse("flour").unwrap();
        let q = |n| Quantity::non_negative(n).unwrap();

        store.add_or_increment(&flour, q(4), Some(Weight::new(1.0).unwrap())).await.unwrap();
        store.add_or_increment(&flour, q(2), None).await.unwrap();
        assert_eq!(store.all().await.unwrap(), vec![Product::new(flour.clone(), 6, Some(Weight::new(1.0).unwrap()))]);

        assert_eq!(store.decrement(&flour, q(7)).await.unwrap(), Decrement::Insufficient { available: 6 });
        assert_eq!(store.lower_to(&flour, q(1)).await.unwrap(), Decrement::Applied);
        assert_eq!(store.all().await.unwrap()[0].quantity, 1);

        assert!(store.remove(&flour).await.unwrap());
        assert_eq!(store.decrement(&flour, q(1)).await.unwrap(), Decrement::Missing);
    }

    #[tokio::test]
    async fn add_past_i64_max_writes_nothing() {
        let store = InMemoryStockStore::new();
        let flour = ProductName::parse("flour").unwrap();
        let q = |n| Quantity::positive(n).unwrap();

        assert_eq!(store.add_or_increment(&flour, q(i64::MAX), None).await.unwrap(), Increment::Applied);
        assert_eq!(
            store.add_or_increment(&flour, q(1), Some(Weight::new(2.0).unwrap())).await.unwrap(),
            Increment::Overflow { available: i64::MAX }
        );
        assert_eq!(store.all().await.unwrap(), vec![Product::new(flour.clone(), i64::MAX, None)]);

        // The lock is still usable.
        assert_eq!(store.decrement(&flour, q(1)).await.unwrap(), Decrement::Applied);
    }
}
