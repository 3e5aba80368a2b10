use axum::Router;

pub mod page;
pub mod products;
pub mod system;

/// Router for all ledger endpoints.
pub fn router() -> Router {
    Router::new().merge(page::router()).merge(products::router())
}
