//! Convert builder params to values each sqlx driver can bind.

use super::builder::Param;
use serde_json::Value;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::{Postgres, Sqlite};

/// Text form of a scalar; PostgreSQL placeholders carry a `::type` cast that parses it.
pub fn to_pg_text(v: &Value) -> Option<String> {
    match v {
        Value::Null => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        Value::Array(_) | Value::Object(_) => Some(v.to_string()),
    }
}

/// Natively typed SQLite value; column affinity does the rest.
#[derive(Clone, Debug, PartialEq)]
pub enum SqliteBindValue {
    Null,
    Bool(bool),
    I64(i64),
    F64(f64),
    Text(String),
}

impl SqliteBindValue {
    pub fn from_json(v: &Value) -> Self {
        match v {
            Value::Null => SqliteBindValue::Null,
            Value::Bool(b) => SqliteBindValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    SqliteBindValue::I64(i)
                } else if let Some(f) = n.as_f64() {
                    SqliteBindValue::F64(f)
                } else {
                    SqliteBindValue::Text(n.to_string())
                }
            }
            Value::String(s) => SqliteBindValue::Text(s.clone()),
            Value::Array(_) | Value::Object(_) => SqliteBindValue::Text(v.to_string()),
        }
    }
}

pub fn bind_pg<'q>(
    query: Query<'q, Postgres, PgArguments>,
    param: &Param,
) -> Query<'q, Postgres, PgArguments> {
    match param {
        Param::Id(id) => query.bind(*id),
        Param::Field { value, .. } => query.bind(to_pg_text(value)),
    }
}

pub fn bind_sqlite<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    param: &Param,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match param {
        Param::Id(id) => query.bind(*id),
        Param::Field { value, .. } => match SqliteBindValue::from_json(value) {
            SqliteBindValue::Null => query.bind(None::<String>),
            SqliteBindValue::Bool(b) => query.bind(b),
            SqliteBindValue::I64(n) => query.bind(n),
            SqliteBindValue::F64(n) => query.bind(n),
            SqliteBindValue::Text(s) => query.bind(s),
        },
    }
}
