//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Business-rule failure of a ledger operation.
///
/// These never abort the process: callers turn them into user-facing status
/// messages. Store and connection failures are not represented here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input rejected before the operation was attempted.
    #[error("{0}")]
    Validation(String),

    /// The referenced product has no record.
    #[error("Product '{name}' not found in inventory.")]
    ProductNotFound { name: String },

    /// The requested decrement exceeds the current stock.
    #[error("Not enough stock available: requested {requested}, only {available} of '{name}' in stock.")]
    OutOfStock {
        name: String,
        requested: i64,
        available: i64,
    },
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(name: impl Into<String>) -> Self {
        Self::ProductNotFound { name: name.into() }
    }

    pub fn out_of_stock(name: impl Into<String>, requested: i64, available: i64) -> Self {
        Self::OutOfStock {
            name: name.into(),
            requested,
            available,
        }
    }

    /// Stable machine-readable code for this error kind.
    pub fn code(&self) -> &'static str {
        match self {
            DomainError::Validation(_) => "validation_error",
            DomainError::ProductNotFound { .. } => "product_not_found",
            DomainError::OutOfStock { .. } => "out_of_stock",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_user_facing() {
        assert_eq!(
            DomainError::not_found("Flour").to_string(),
            "Product 'Flour' not found in inventory."
        );
        assert_eq!(
            DomainError::out_of_stock("Flour", 10, 6).to_string(),
            "Not enough stock available: requested 10, only 6 of 'Flour' in stock."
        );
        assert_eq!(
            DomainError::validation("quantity must be a positive integer").to_string(),
            "quantity must be a positive integer"
        );
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(DomainError::validation("x").code(), "validation_error");
        assert_eq!(DomainError::not_found("x").code(), "product_not_found");
        assert_eq!(DomainError::out_of_stock("x", 2, 1).code(), "out_of_stock");
    }
}
