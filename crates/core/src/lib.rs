//! `stockroom-core` — stock ledger domain building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! validated product names and quantities, the business error taxonomy, and
//! the display rules used to phrase confirmations.

pub mod display;
pub mod error;
pub mod product;

pub use display::{Confirmation, UnitNouns, UnitRule};
pub use error::{DomainError, DomainResult};
pub use product::{Product, ProductName, Quantity, Weight};
