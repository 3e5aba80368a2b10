//! Process configuration for the API binary.

use std::net::SocketAddr;

use thiserror::Error;

use stockroom_core::{DomainError, UnitNouns};
use stockroom_infra::{ConfigError, StoreConfig};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_UNIT_RULES: &str = "bakers=bags";
pub const DEFAULT_UNIT: &str = "bales";

#[derive(Debug, Error)]
pub enum ApiConfigError {
    #[error(transparent)]
    Store(#[from] ConfigError),

    #[error("invalid BIND_ADDR '{value}': {message}")]
    BindAddr { value: String, message: String },

    #[error("invalid STOCK_UNIT_RULES: {0}")]
    UnitRules(DomainError),
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreConfig,
    pub unit_nouns: UnitNouns,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ApiConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiConfigError> {
        let store = StoreConfig::from_lookup(&lookup)?;

        let bind = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind.trim().parse().map_err(|e: std::net::AddrParseError| {
            ApiConfigError::BindAddr {
                value: bind.clone(),
                message: e.to_string(),
            }
        })?;

        let rules = lookup("STOCK_UNIT_RULES").unwrap_or_else(|| DEFAULT_UNIT_RULES.to_string());
        let default_unit = lookup("STOCK_DEFAULT_UNIT")
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_UNIT.to_string());
        let unit_nouns = UnitNouns::parse(&rules, default_unit).map_err(ApiConfigError::UnitRules)?;

        Ok(Self {
            bind_addr,
            store,
            unit_nouns,
        })
    }
}
