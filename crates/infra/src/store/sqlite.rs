//! SQLite-backed product table (local single-file database).

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use stockroom_core::{Product, ProductName, Quantity, Weight};

use super::{Decrement, Increment, StockStore, CONDITIONAL_ATTEMPTS};
use crate::error::{map_sqlx_error, StoreError};

/// SQLite stock store. Storage order is insertion order (`rowid`).
#[derive(Debug, Clone)]
pub struct SqliteStockStore {
    pool: SqlitePool,
}

impl SqliteStockStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to `url` (e.g. `sqlite://inventory.db`), creating the file if
    /// missing. In-memory URLs are pinned to one long-lived connection since
    /// every SQLite connection gets its own private memory database.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| map_sqlx_error("connect", e))?
            .create_if_missing(true);

        let pool_options = if url.contains(":memory:") || url.contains("mode=memory") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections.max(1))
        };

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| StoreError::unavailable("connect", e.to_string()))?;

        Ok(Self::new(pool))
    }

    /// Fresh private in-memory database.
    pub async fn in_memory() -> Result<Self, StoreError> {
        Self::connect("sqlite::memory:", 1).await
    }

    async fn current_quantity(&self, operation: &'static str, name: &ProductName) -> Result<Option<i64>, StoreError> {
        let row = sqlx::query("SELECT quantity FROM products WHERE name = ?1")
            .bind(name.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;

        row.map(|row| row.try_get::<i64, _>("quantity").map_err(|e| map_sqlx_error(operation, e)))
            .transpose()
    }

    /// Run `sql` (bound as `?1 = floor`, `?2 = name`), which only touches the
    /// row when `quantity >= floor`.
    ///
    /// A zero-row update is followed by a read to tell a missing row from a
    /// short one. A writer that restocks between the two statements makes the
    /// read show enough stock; the update is then retried.
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

fn product_from_row(row: &SqliteRow) -> Result<Product, StoreError> {
    let name: String = row.try_get("name").map_err(|e| map_sqlx_error("list_all", e))?;
    let quantity: i64 = row.try_get("quantity").map_err(|e| map_sqlx_error("list_all", e))?;
    let weight: Option<f64> = row.try_get("weight").map_err(|e| map_sqlx_error("list_all", e))?;

    // Non-positive legacy weights read back as unknown.
    let weight = weight.and_then(|w| Weight::new(w).ok());

    Ok(Product::new(ProductName::from_stored(name), quantity, weight))
}

#[async_trait::async_trait]
impl StockStore for SqliteStockStore {
    async fn initialize(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                name     TEXT PRIMARY KEY,
                weight   REAL NULL,
                quantity INTEGER NOT NULL CHECK (quantity >= 0)
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
        // The guard keeps the sum inside INTEGER; past it SQLite would
        // silently promote the column value to REAL.
        for _ in 0..CONDITIONAL_ATTEMPTS {
            let result = sqlx::query(
                r#"
                INSERT INTO products (name, weight, quantity)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(name)
                DO UPDATE SET
                    quantity = products.quantity + excluded.quantity,
                    weight = COALESCE(excluded.weight, products.weight)
                WHERE products.quantity <= 9223372036854775807 - excluded.quantity
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
            // Zero rows means the guard held the update back, unless the row
            // was removed in between, in which case the insert is retried.
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
            "UPDATE products SET quantity = quantity - ?1 WHERE name = ?2 AND quantity >= ?1",
            name,
            amount.get(),
        )
        .await
    }

    async fn lower_to(&self, name: &ProductName, target: Quantity) -> Result<Decrement, StoreError> {
        self.bounded_update(
            "lower_to",
            "UPDATE products SET quantity = ?1 WHERE name = ?2 AND quantity >= ?1",
            name,
            target.get(),
        )
        .await
    }

    async fn remove(&self, name: &ProductName) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE name = ?1")
            .bind(name.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("remove", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn names(&self) -> Result<Vec<ProductName>, StoreError> {
        let rows = sqlx::query("SELECT name FROM products ORDER BY rowid")
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
        let rows = sqlx::query("SELECT name, weight, quantity FROM products ORDER BY rowid")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_all", e))?;

        rows.iter().map(product_from_row).collect()
    }
}
