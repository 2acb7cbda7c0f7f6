//! Database settings: fixed defaults, config files, then `DB_*` environment variables.

use crate::config::ConfigStore;
use crate::error::ConfigError;
use serde_json::{json, Map, Value};
use sqlx::postgres::PgConnectOptions;
use sqlx::sqlite::SqliteConnectOptions;

pub const NAMESPACE: &str = "database";

/// Environment variable → key inside the `database` namespace.
const ENV_KEYS: &[(&str, &str)] = &[
    ("DB_CONNECTION", "connection"),
    ("DB_HOST", "host"),
    ("DB_PORT", "port"),
    ("DB_DATABASE", "database"),
    ("DB_USERNAME", "username"),
    ("DB_PASSWORD", "password"),
    ("DB_MAX_CONNECTIONS", "max_connections"),
];

/// Supported SQL backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Driver {
    Postgres,
    Sqlite,
}

impl std::str::FromStr for Driver {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pgsql" | "postgres" | "postgresql" => Ok(Driver::Postgres),
            "sqlite" => Ok(Driver::Sqlite),
            other => Err(ConfigError::Invalid(format!(
                "unsupported database connection '{}' (expected pgsql or sqlite)",
                other
            ))),
        }
    }
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub driver: Driver,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub username: String,
    pub password: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn defaults() -> Value {
        json!({
            "connection": "pgsql",
            "host": "localhost",
            "port": 5432,
            "database": "expenses",
            "username": "postgres",
            "password": "",
            "max_connections": 5
        })
    }

    pub fn from_store(store: &ConfigStore) -> Result<Self, ConfigError> {
        let text = |key: &str| store.get_string(&format!("{}.{}", NAMESPACE, key)).unwrap_or_default();
        let driver = text("connection").parse()?;
        let port = text("port")
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("database.port '{}' is not a port", text("port"))))?;
        let max_connections = text("max_connections").parse().map_err(|_| {
            ConfigError::Invalid(format!(
                "database.max_connections '{}' is not a number",
                text("max_connections")
            ))
        })?;
        Ok(DatabaseConfig {
            driver,
            host: text("host"),
            port,
            database: text("database"),
            username: text("username"),
            password: text("password"),
            max_connections,
        })
    }

    /// For SQLite the database name is a file path or `:memory:`.
    pub fn is_in_memory(&self) -> bool {
        self.driver == Driver::Sqlite && self.database == ":memory:"
    }

    /// Credentials go in as typed fields, so reserved URL characters need no escaping.
    pub fn pg_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .database(&self.database);
        if self.password.is_empty() {
            options
        } else {
            options.password(&self.password)
        }
    }

    /// File-backed SQLite; the file is created on first connect.
    pub fn sqlite_options(&self) -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .filename(&self.database)
            .create_if_missing(true)
    }

    /// Connection target for logs only; the password is always masked.
    pub fn redacted_url(&self) -> String {
        match self.driver {
            Driver::Postgres => {
                let auth = if self.password.is_empty() {
                    self.username.clone()
                } else {
                    format!("{}:***", self.username)
                };
                format!("postgres://{}@{}:{}/{}", auth, self.host, self.port, self.database)
            }
            Driver::Sqlite if self.is_in_memory() => "sqlite::memory:".to_string(),
            Driver::Sqlite => format!("sqlite://{}", self.database),
        }
    }
}

/// Merge the built-in defaults underneath and the `DB_*` environment on top of the `database` namespace.
pub fn apply_database_settings(store: &mut ConfigStore) {
    apply_database_settings_from(store, |k| std::env::var(k).ok());
}

pub(crate) fn apply_database_settings_from<F>(store: &mut ConfigStore, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let mut merged = ConfigStore::new();
    merged.load_value(NAMESPACE, DatabaseConfig::defaults());
    if let Some(from_files) = store.get(NAMESPACE).cloned() {
        merged.load_value(NAMESPACE, from_files);
    }
    let mut overrides = Map::new();
    for (var, key) in ENV_KEYS {
        if let Some(v) = lookup(var) {
            overrides.insert((*key).to_string(), Value::String(v));
        }
    }
    merged.load_value(NAMESPACE, Value::Object(overrides));
    if let Some(value) = merged.get(NAMESPACE).cloned() {
        store.set(NAMESPACE, value);
    }
}
