//! Product record and its validated value types.

use serde::Serialize;

use crate::error::{DomainError, DomainResult};

/// Canonical product name, the ledger's primary key.
///
/// Construction normalizes user input: surrounding whitespace is trimmed, the
/// first character is upper-cased and the rest lower-cased, so `" flour"`,
/// `"FLOUR"` and `"Flour"` all address the same record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ProductName(String);

impl ProductName {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(DomainError::validation("product name cannot be empty"));
        }

        let mut chars = trimmed.chars();
        let mut normalized = String::with_capacity(trimmed.len());
        if let Some(first) = chars.next() {
            // Only the lead char of a multi-char expansion stays upper-case
            // (`ß` becomes `Ss`), so a normalized name normalizes to itself.
            let mut upper = first.to_uppercase();
            normalized.extend(upper.next());
            normalized.extend(upper.flat_map(char::to_lowercase));
        }
        normalized.extend(chars.flat_map(char::to_lowercase));

        Ok(Self(normalized))
    }

    /// Wrap a name read back from storage. Stored names were normalized on
    /// the way in, so no re-normalization happens here.
    pub fn from_stored(name: String) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl core::fmt::Display for ProductName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ProductName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A count of units. Never negative.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Quantity(i64);

impl Quantity {
    /// Quantity for add/sell/reduce: zero and negative amounts are rejected.
    pub fn positive(value: i64) -> DomainResult<Self> {
        if value <= 0 {
            return Err(DomainError::validation("quantity must be a positive integer"));
        }
        Ok(Self(value))
    }

    /// Quantity used as an absolute stock level, where zero is allowed.
    pub fn non_negative(value: i64) -> DomainResult<Self> {
        if value < 0 {
            return Err(DomainError::validation("quantity must be a non-negative integer"));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for Quantity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Descriptive unit weight in kilograms.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Weight(f64);

impl Weight {
    pub fn new(kg: f64) -> DomainResult<Self> {
        if !kg.is_finite() || kg <= 0.0 {
            return Err(DomainError::validation("weight must be a positive number"));
        }
        Ok(Self(kg))
    }

    pub fn kg(self) -> f64 {
        self.0
    }
}

impl core::fmt::Display for Weight {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// One row of the ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub name: ProductName,
    pub quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<Weight>,
}

impl Product {
    pub fn new(name: ProductName, quantity: i64, weight: Option<Weight>) -> Self {
        Self {
            name,
            quantity,
            weight,
        }
    }
}
