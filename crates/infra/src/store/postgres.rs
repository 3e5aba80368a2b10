//! Postgres-backed product table (networked database).
//!
//! Same contract as the SQLite store. Postgres has no implicit row order, so
//! rows carry a `created_at` stamp and listings order by it.

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow};
use sqlx::Row;

use stockroom_core::{Product, ProductName, Quantity, Weight};

use super::{Decrement, Increment, StockStore, CONDITIONAL_ATTEMPTS};
use crate::error::{map_sqlx_error, StoreError};

#[derive(Debug, Clone)]
pub struct PostgresStockStore {
    pool: PgPool,
}

impl PostgresStockStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect(url)
            .await
            .map_err(|e| StoreError::unavailable("connect", e.to_string()))?;
        Ok(Self::new(pool))
    }

    pub async fn connect_with(options: PgConnectOptions, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(|e| StoreError::unavailable("connect", e.to_string()))?;
        Ok(Self::new(pool))
    }

    async fn current_quantity(&self, operation: &'static str, name: &ProductName) -> Result<Option<i64>, StoreError> {
        let row = sqlx::query("SELECT quantity FROM products WHERE name = $1")
            .bind(name.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;

        row.map(|row| row.try_get::<i64, _>("quantity").map_err(|e| map_sqlx_error(operation, e)))
            .transpose()
    }

    /// Conditional update guarded by `quantity >= $1`. A zero-row result whose
    /// follow-up read shows enough stock (a concurrent restock) is retried.
    async fn bounded_update(
        &self,
        operation: &'static str,
        sql: &'static str,
        name: &ProductName,
        floor: i64,
    ) -> Result<Decrement, StoreError> {
        let mut outcome = Decrement::Missing;
        for _ in 0..CONDITIONAL_ATTEMPTS {
            let result = sqlx::query(sql)
                .bind(floor)
                .bind(name.as_str())
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error(operation, e))?;

            if result.rows_affected() > 0 {
                return Ok(Decrement::Applied);
            }
            match self.current_quantity(operation, name).await? {
                None => return Ok(Decrement::Missing),
                Some(available) if available < floor => return Ok(Decrement::Insufficient { available }),
                Some(available) => outcome = Decrement::Insufficient { available },
            }
        }
        Ok(outcome)
    }
}

fn product_from_row(row: &PgRow) -> Result<Product, StoreError> {
    let name: String = row.try_get("name").map_err(|e| map_sqlx_error("list_all", e))?;
    let quantity: i64 = row.try_get("quantity").map_err(|e| map_sqlx_error("list_all", e))?;
    let weight: Option<f64> = row.try_get("weight").map_err(|e| map_sqlx_error("list_all", e))?;

    Ok(Product::new(
        ProductName::from_stored(name),
        quantity,
        weight.and_then(|w| Weight::new(w).ok()),
    ))
}

#[async_trait::async_trait]
impl StockStore for PostgresStockStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                name       TEXT PRIMARY KEY,
                weight     DOUBLE PRECISION NULL,
                quantity   BIGINT NOT NULL CHECK (quantity >= 0),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("initialize", e))?;

        Ok(())
    }

    async fn add_or_increment(
        &self,
        name: &ProductName,
        quantity: Quantity,
        weight: Option<Weight>,
    ) -> Result<Increment, StoreError> {
        for _ in 0..CONDITIONAL_ATTEMPTS {
            let result = sqlx::query(
                r#"
                INSERT INTO products (name, weight, quantity)
                VALUES ($1, $2, $3)
                ON CONFLICT (name)
                DO UPDATE SET
                    quantity = products.quantity + EXCLUDED.quantity,
                    weight = COALESCE(EXCLUDED.weight, products.weight)
                WHERE products.quantity <= 9223372036854775807 - EXCLUDED.quantity
                "#,
            )
            .bind(name.as_str())
            .bind(weight.map(Weight::kg))
            .bind(quantity.get())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("add_or_increment", e))?;

            if result.rows_affected() > 0 {
                return Ok(Increment::Applied);
            }
            // Held back by the guard, or the row vanished and the insert is retried.
            if let Some(available) = self.current_quantity("add_or_increment", name).await? {
                return Ok(Increment::Overflow { available });
            }
        }
        Err(StoreError::unavailable(
            "add_or_increment",
            "row kept changing under a concurrent writer",
        ))
    }

    async fn decrement(&self, name: &ProductName, amount: Quantity) -> Result<Decrement, StoreError> {
        self.bounded_update(
            "decrement",
            "UPDATE products SET quantity = quantity - $1 WHERE name = $2 AND quantity >= $1",
            name,
            amount.get(),
        )
        .await
    }

    async fn lower_to(&self, name: &ProductName, target: Quantity) -> Result<Decrement, StoreError> {
        self.bounded_update(
            "lower_to",
            "UPDATE products SET quantity = $1 WHERE name = $2 AND quantity >= $1",
            name,
            target.get(),
        )
        .await
    }

    async fn remove(&self, name: &ProductName) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE name = $1")
            .bind(name.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("remove", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn names(&self) -> Result<Vec<ProductName>, StoreError> {
        let rows = sqlx::query("SELECT name FROM products ORDER BY created_at, name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("names", e))?;

        rows.iter()
            .map(|r| {
                r.try_get::<String, _>("name")
                    .map(ProductName::from_stored)
                    .map_err(|e| map_sqlx_error("names", e))
            })
            .collect()
    }

    async fn all(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT name, weight, quantity
            FROM products
            ORDER BY created_at, name
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_all", e))?;

        rows.iter().map(product_from_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Runs only against a real server: TEST_DATABASE_URL=postgres://...
    #[tokio::test]
    async fn postgres_lifecycle() {
        let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
            return;
        };

        let store = PostgresStockStore::connect(&url, 2).await.unwrap();
        store.initialize().await.unwrap();
        store.initialize().await.unwrap();

        let name = ProductName::parse(&format!("pgtest {}", std::process::id())).unwrap();
        let qty = |n| Quantity::non_negative(n).unwrap();
        let _ = store.remove(&name).await.unwrap();

        store.add_or_increment(&name, qty(10), None).await.unwrap();
        store.add_or_increment(&name, qty(2), Some(Weight::new(25.0).unwrap())).await.unwrap();
        assert_eq!(
            store.decrement(&name, qty(20)).await.unwrap(),
            Decrement::Insufficient { available: 12 }
        );
        assert_eq!(store.decrement(&name, qty(4)).await.unwrap(), Decrement::Applied);
        assert_eq!(store.lower_to(&name, qty(3)).await.unwrap(), Decrement::Applied);

        let row = store
            .all()
            .await
            .unwrap()
            .into_iter()
            .find(|p| p.name == name)
            .unwrap();
        assert_eq!(row.quantity, 3);
        assert_eq!(row.weight, Some(Weight::new(25.0).unwrap()));

        assert_eq!(
            store.add_or_increment(&name, qty(i64::MAX), None).await.unwrap(),
            Increment::Overflow { available: 3 }
        );

        assert!(store.remove(&name).await.unwrap());
        assert!(!store.remove(&name).await.unwrap());
        assert_eq!(store.decrement(&name, qty(1)).await.unwrap(), Decrement::Missing);
    }
}
