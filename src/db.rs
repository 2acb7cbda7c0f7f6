//! Lazily created, shared database pool built from the `database` config namespace.

use crate::config::{DatabaseConfig, Driver};
use crate::error::AppError;
use crate::sql::{bind_pg, bind_sqlite, Dialect, QueryBuf};
use serde_json::{Map, Value};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Row as column name → JSON value.
pub type RowMap = Map<String, Value>;

#[derive(Clone, Debug)]
pub enum DbPool {
    Postgres(PgPool),
    Sqlite(SqlitePool),
}

impl DbPool {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        match config.driver {
            Driver::Postgres => {
                let pool = PgPoolOptions::new()
                    .max_connections(config.max_connections)
                    .connect_with(config.pg_options())
                    .await?;
                Ok(DbPool::Postgres(pool))
            }
            Driver::Sqlite if config.is_in_memory() => Self::connect_sqlite("sqlite::memory:", 1).await,
            Driver::Sqlite => {
                let pool = SqlitePoolOptions::new()
                    .max_connections(config.max_connections)
                    .connect_with(config.sqlite_options())
                    .await?;
                Ok(DbPool::Sqlite(pool))
            }
        }
    }

    /// An in-memory SQLite database lives as long as its single connection, so that connection is pinned.
    pub async fn connect_sqlite(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let options = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(max_connections)
        };
        Ok(DbPool::Sqlite(options.connect(url).await?))
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            DbPool::Postgres(_) => Dialect::Postgres,
            DbPool::Sqlite(_) => Dialect::Sqlite,
        }
    }

    pub async fn fetch_optional(&self, q: &QueryBuf) -> Result<Option<RowMap>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        Ok(match self {
            DbPool::Postgres(pool) => {
                let mut query = sqlx::query(&q.sql);
                for p in &q.params {
                    query = bind_pg(query, p);
                }
                query.fetch_optional(pool).await?.map(|r| pg_row_to_map(&r))
            }
            DbPool::Sqlite(pool) => {
                let mut query = sqlx::query(&q.sql);
                for p in &q.params {
                    query = bind_sqlite(query, p);
                }
                query.fetch_optional(pool).await?.map(|r| sqlite_row_to_map(&r))
            }
        })
    }

    pub async fn fetch_all(&self, q: &QueryBuf) -> Result<Vec<RowMap>, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        Ok(match self {
            DbPool::Postgres(pool) => {
                let mut query = sqlx::query(&q.sql);
                for p in &q.params {
                    query = bind_pg(query, p);
                }
                query.fetch_all(pool).await?.iter().map(pg_row_to_map).collect()
            }
            DbPool::Sqlite(pool) => {
                let mut query = sqlx::query(&q.sql);
                for p in &q.params {
                    query = bind_sqlite(query, p);
                }
                query.fetch_all(pool).await?.iter().map(sqlite_row_to_map).collect()
            }
        })
    }

    /// Execute a statement; returns rows affected.
    pub async fn execute(&self, q: &QueryBuf) -> Result<u64, AppError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "execute");
        Ok(match self {
            DbPool::Postgres(pool) => {
                let mut query = sqlx::query(&q.sql);
                for p in &q.params {
                    query = bind_pg(query, p);
                }
                query.execute(pool).await?.rows_affected()
            }
            DbPool::Sqlite(pool) => {
                let mut query = sqlx::query(&q.sql);
                for p in &q.params {
                    query = bind_sqlite(query, p);
                }
                query.execute(pool).await?.rows_affected()
            }
        })
    }

    /// Run parameterless SQL (DDL).
    pub async fn execute_raw(&self, sql: &str) -> Result<(), AppError> {
        tracing::debug!(sql = %sql, "execute");
        match self {
            DbPool::Postgres(pool) => {
                sqlx::query(sql).execute(pool).await?;
            }
            DbPool::Sqlite(pool) => {
                sqlx::query(sql).execute(pool).await?;
            }
        }
        Ok(())
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        self.execute_raw("SELECT 1").await
    }
}

/// Process-wide connection provider: the pool is created on first use and cached.
#[derive(Clone, Debug)]
pub struct Database {
    config: Option<DatabaseConfig>,
    pool: Arc<OnceCell<DbPool>>,
}

impl Database {
    pub fn new(config: DatabaseConfig) -> Self {
        Database {
            config: Some(config),
            pool: Arc::new(OnceCell::new()),
        }
    }

    /// Provider around an already connected pool.
    pub fn from_pool(pool: DbPool) -> Self {
        Database {
            config: None,
            pool: Arc::new(OnceCell::new_with(Some(pool))),
        }
    }

    /// Shared handle; the first caller connects, concurrent callers wait for it.
    pub async fn connection(&self) -> Result<&DbPool, AppError> {
        self.pool
            .get_or_try_init(|| async {
                let config = self
                    .config
                    .as_ref()
                    .ok_or_else(|| AppError::Connection("no database settings".into()))?;
                tracing::info!(url = %config.redacted_url(), "connecting to database");
                DbPool::connect(config)
                    .await
                    .map_err(|e| AppError::Connection(e.to_string()))
            })
            .await
    }

    pub fn is_connected(&self) -> bool {
        self.pool.initialized()
    }
}

fn pg_row_to_map(row: &PgRow) -> RowMap {
    let mut map = Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), pg_cell_to_value(row, name));
    }
    map
}

fn pg_cell_to_value(row: &PgRow, name: &str) -> Value {
    if let Ok(Some(n)) = row.try_get::<Option<i16>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    Value::Null
}

fn sqlite_row_to_map(row: &SqliteRow) -> RowMap {
    let mut map = Map::new();
    for col in row.columns() {
        let name = col.name();
        map.insert(name.to_string(), sqlite_cell_to_value(row, name));
    }
    map
}

fn sqlite_cell_to_value(row: &SqliteRow, name: &str) -> Value {
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    Value::Null
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connection_is_created_once() {
        let pool = DbPool::connect_sqlite("sqlite::memory:", 1).await.unwrap();
        let db = Database::from_pool(pool);
        assert!(db.is_connected());
        let a = db.connection().await.unwrap() as *const DbPool;
        let b = db.connection().await.unwrap() as *const DbPool;
        assert_eq!(a, b);
        db.connection().await.unwrap().ping().await.unwrap();
    }

    #[tokio::test]
    async fn unreachable_store_is_a_connection_error() {
        let config = DatabaseConfig {
            driver: Driver::Sqlite,
            host: String::new(),
            port: 0,
            database: "/nonexistent-dir/for/sure/ledger.db".into(),
            username: String::new(),
            password: String::new(),
            max_connections: 1,
        };
        let db = Database::new(config);
        assert!(!db.is_connected());
        assert!(matches!(db.connection().await, Err(AppError::Connection(_))));
    }

    #[tokio::test]
    async fn file_database_is_created_from_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger#1?.db");
        let config = DatabaseConfig {
            driver: Driver::Sqlite,
            host: String::new(),
            port: 0,
            database: path.display().to_string(),
            username: String::new(),
            password: String::new(),
            max_connections: 2,
        };
        let db = Database::new(config);
        db.connection().await.unwrap().ping().await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn sqlite_rows_convert_to_json() {
        let pool = DbPool::connect_sqlite("sqlite::memory:", 1).await.unwrap();
        let DbPool::Sqlite(inner) = &pool else { unreachable!() };
        let row = sqlx::query("SELECT 1 AS n, 'x' AS s, NULL AS z, 2.5 AS f")
            .fetch_one(inner)
            .await
            .unwrap();
        let map = sqlite_row_to_map(&row);
        assert_eq!(map["n"], serde_json::json!(1));
        assert_eq!(map["s"], serde_json::json!("x"));
        assert_eq!(map["z"], Value::Null);
        assert_eq!(map["f"], serde_json::json!(2.5));
    }
}
