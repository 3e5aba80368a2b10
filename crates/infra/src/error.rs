//! Infrastructure and ledger error model.

use thiserror::Error;

use stockroom_core::DomainError;

/// Failure inside a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend cannot be reached (connection, pool, or I/O failure).
    #[error("store unavailable during {operation}: {message}")]
    Unavailable {
        operation: &'static str,
        message: String,
    },

    /// A statement was rejected by the backend.
    #[error("query failed during {operation}: {message}")]
    Query {
        operation: &'static str,
        message: String,
    },

    /// A row could not be mapped back into a product.
    #[error("failed to decode row during {operation}: {message}")]
    Decode {
        operation: &'static str,
        message: String,
    },
}

impl StoreError {
    pub fn unavailable(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Unavailable {
            operation,
            message: message.into(),
        }
    }

    pub fn decode(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Decode {
            operation,
            message: message.into(),
        }
    }
}

/// Map a sqlx error onto the store taxonomy.
pub(crate) fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => StoreError::Query {
            operation,
            message: db_err.message().to_string(),
        },
        sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::Decode(_)
        | sqlx::Error::TypeNotFound { .. } => StoreError::decode(operation, err.to_string()),
        sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::Configuration(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => StoreError::unavailable(operation, err.to_string()),
        other => StoreError::Query {
            operation,
            message: other.to_string(),
        },
    }
}

/// Error returned by [`crate::StockLedger`] operations.
///
/// Business failures stay in [`LedgerError::Domain`] and are meant to be shown
/// to the user. [`LedgerError::StoreUnavailable`] is fatal for the current
/// session and must be propagated, never rendered as a business message.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),
}

impl LedgerError {
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            LedgerError::Domain(e) => Some(e),
            LedgerError::StoreUnavailable(_) => None,
        }
    }

    /// Human-readable status for business failures; `None` for infrastructure
    /// failures, which the caller has to surface as fatal.
    pub fn user_message(&self) -> Option<String> {
        self.domain().map(ToString::to_string)
    }
}
