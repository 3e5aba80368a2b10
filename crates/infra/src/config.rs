//! Store configuration loaded from the environment.
//!
//! Resolution order:
//! 1. `DATABASE_URL` (`sqlite://…`, `sqlite::memory:`, `postgres://…`, `memory://`)
//! 2. `DB_HOST` + `DB_PORT` (or `PORT`)/`DB_USER`/`DB_PASSWORD`/`DB_DATABASE` (Postgres)
//! 3. `sqlite://inventory.db`

use sqlx::postgres::PgConnectOptions;
use thiserror::Error;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://inventory.db";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_PG_PORT: u16 = 5432;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unsupported database url scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

/// Networked database settings given as separate secrets.
#[derive(Clone, PartialEq, Eq)]
pub struct PostgresParts {
    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub database: Option<String>,
}

impl PostgresParts {
    pub fn connect_options(&self) -> PgConnectOptions {
        let mut options = PgConnectOptions::new().host(&self.host).port(self.port);
        if let Some(user) = &self.user {
            options = options.username(user);
        }
        if let Some(password) = &self.password {
            options = options.password(password);
        }
        if let Some(database) = &self.database {
            options = options.database(database);
        }
        options
    }
}

impl core::fmt::Debug for PostgresParts {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PostgresParts")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .finish()
    }
}

/// Which backend to open, and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreTarget {
    Sqlite { url: String },
    Postgres { url: String },
    PostgresParts(PostgresParts),
    InMemory,
}

impl StoreTarget {
    pub fn from_url(url: &str) -> Result<Self, ConfigError> {
        let url = url.trim();
        if url.starts_with("sqlite:") {
            Ok(StoreTarget::Sqlite { url: url.to_string() })
        } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(StoreTarget::Postgres { url: url.to_string() })
        } else if url == "memory://" || url == "memory" {
            Ok(StoreTarget::InMemory)
        } else {
            let scheme = url.split(':').next().unwrap_or(url);
            Err(ConfigError::UnsupportedScheme(scheme.to_string()))
        }
    }

    /// Backend name for logs. Never includes credentials.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreTarget::Sqlite { .. } => "sqlite",
            StoreTarget::Postgres { .. } | StoreTarget::PostgresParts(_) => "postgres",
            StoreTarget::InMemory => "memory",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub target: StoreTarget,
    pub max_connections: u32,
}

impl StoreConfig {
    pub fn new(target: StoreTarget) -> Self {
        Self {
            target,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let target = if let Some(url) = get("DATABASE_URL") {
            StoreTarget::from_url(&url)?
        } else if let Some(host) = get("DB_HOST") {
            // Older secrets files name the port plain `PORT`.
            let port_var = get("DB_PORT")
                .map(|p| ("DB_PORT", p))
                .or_else(|| get("PORT").map(|p| ("PORT", p)));
            let port = match port_var {
                Some((key, p)) => p.trim().parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                    key,
                    message: e.to_string(),
                })?,
                None => DEFAULT_PG_PORT,
            };
            StoreTarget::PostgresParts(PostgresParts {
                host,
                port,
                user: get("DB_USER"),
                password: get("DB_PASSWORD"),
                database: get("DB_DATABASE"),
            })
        } else {
            StoreTarget::from_url(DEFAULT_DATABASE_URL)?
        };

        let max_connections = match get("DB_MAX_CONNECTIONS") {
            Some(v) => match v.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                Ok(_) => {
                    return Err(ConfigError::InvalidValue {
                        key: "DB_MAX_CONNECTIONS",
                        message: "must be at least 1".to_string(),
                    });
                }
                Err(e) => {
                    return Err(ConfigError::InvalidValue {
                        key: "DB_MAX_CONNECTIONS",
                        message: e.to_string(),
                    });
                }
            },
            None => DEFAULT_MAX_CONNECTIONS,
        };

        Ok(Self {
            target,
            max_connections,
        })
    }
}
