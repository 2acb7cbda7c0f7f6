//! Builds parameterized SELECT, INSERT, UPDATE, DELETE from a table schema.

use crate::service::{Column, SqlType, TableSchema, ID_COLUMN};
use serde_json::Value;

/// Placeholder style and cast syntax differ per backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    Sqlite,
}

/// Quote identifier (safe: only from schema descriptors).
pub fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

#[derive(Clone, Debug, PartialEq)]
pub enum Param {
    /// Value for a fillable column; `sql_type` picks the bind/cast.
    Field { value: Value, sql_type: SqlType },
    Id(i64),
}

#[derive(Debug)]
pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<Param>,
    dialect: Dialect,
}

impl QueryBuf {
    fn new(dialect: Dialect) -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
            dialect,
        }
    }

    /// Push a parameter and return its placeholder.
    fn push_param(&mut self, param: Param) -> String {
        let cast = match &param {
            Param::Field { sql_type, .. } => Some(sql_type.pg_name()),
            Param::Id(_) => None,
        };
        self.params.push(param);
        match (self.dialect, cast) {
            (Dialect::Sqlite, _) => "?".to_string(),
            (Dialect::Postgres, Some(t)) => format!("${}::{}", self.params.len(), t),
            (Dialect::Postgres, None) => format!("${}", self.params.len()),
        }
    }
}

fn select_column_list(schema: &TableSchema) -> String {
    let mut cols = vec![quoted(ID_COLUMN)];
    for c in schema.fillable {
        let q = quoted(c.name);
        if c.sql_type.reads_as_text() {
            cols.push(format!("CAST({} AS TEXT) AS {}", q, q));
        } else {
            cols.push(q);
        }
    }
    cols.join(", ")
}

pub fn select_by_id(dialect: Dialect, schema: &TableSchema, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new(dialect);
    let ph = q.push_param(Param::Id(id));
    q.sql = format!(
        "SELECT {} FROM {} WHERE {} = {} LIMIT 1",
        select_column_list(schema),
        quoted(schema.table),
        quoted(ID_COLUMN),
        ph
    );
    q
}

/// SELECT every row; no ORDER BY, the store decides.
pub fn select_all(dialect: Dialect, schema: &TableSchema) -> QueryBuf {
    let mut q = QueryBuf::new(dialect);
    q.sql = format!("SELECT {} FROM {}", select_column_list(schema), quoted(schema.table));
    q
}

/// INSERT with exactly the given (already filtered) columns, in order.
pub fn insert(dialect: Dialect, schema: &TableSchema, fields: &[(&Column, Value)]) -> QueryBuf {
    let mut q = QueryBuf::new(dialect);
    let mut cols = Vec::with_capacity(fields.len());
    let mut placeholders = Vec::with_capacity(fields.len());
    for (col, value) in fields {
        cols.push(quoted(col.name));
        placeholders.push(q.push_param(Param::Field {
            value: value.clone(),
            sql_type: col.sql_type,
        }));
    }
    q.sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quoted(schema.table),
        cols.join(", "),
        placeholders.join(", ")
    );
    q
}

/// UPDATE by id: SET exactly the given (already filtered) columns.
pub fn update(dialect: Dialect, schema: &TableSchema, id: i64, fields: &[(&Column, Value)]) -> QueryBuf {
    let mut q = QueryBuf::new(dialect);
    let mut sets = Vec::with_capacity(fields.len());
    for (col, value) in fields {
        let ph = q.push_param(Param::Field {
            value: value.clone(),
            sql_type: col.sql_type,
        });
        sets.push(format!("{} = {}", quoted(col.name), ph));
    }
    let id_ph = q.push_param(Param::Id(id));
    q.sql = format!(
        "UPDATE {} SET {} WHERE {} = {}",
        quoted(schema.table),
        sets.join(", "),
        quoted(ID_COLUMN),
        id_ph
    );
    q
}

pub fn delete(dialect: Dialect, schema: &TableSchema, id: i64) -> QueryBuf {
    let mut q = QueryBuf::new(dialect);
    let ph = q.push_param(Param::Id(id));
    q.sql = format!("DELETE FROM {} WHERE {} = {}", quoted(schema.table), quoted(ID_COLUMN), ph);
    q
}

/// CREATE TABLE IF NOT EXISTS with an auto-increment `id` and the fillable columns.
pub fn create_table(dialect: Dialect, schema: &TableSchema) -> String {
    let id_def = match dialect {
        Dialect::Postgres => format!("{} BIGSERIAL PRIMARY KEY", quoted(ID_COLUMN)),
        Dialect::Sqlite => format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", quoted(ID_COLUMN)),
    };
    let mut defs = vec![id_def];
    for c in schema.fillable {
        let ty = match dialect {
            Dialect::Postgres => c.sql_type.pg_name(),
            Dialect::Sqlite => c.sql_type.sqlite_name(),
        };
        let null = if c.nullable { "" } else { " NOT NULL" };
        defs.push(format!("{} {}{}", quoted(c.name), ty, null));
    }
    format!("CREATE TABLE IF NOT EXISTS {} ({})", quoted(schema.table), defs.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static COLUMNS: &[Column] = &[
        Column::new("title", SqlType::Text).required(),
        Column::new("amount", SqlType::Numeric),
        Column::new("day", SqlType::Date),
    ];
    static TABLE: TableSchema = TableSchema {
        table: "entries",
        fillable: COLUMNS,
    };

    #[test]
    fn select_by_id_binds_the_id() {
        let q = select_by_id(Dialect::Postgres, &TABLE, 7);
        assert_eq!(
            q.sql,
            "SELECT \"id\", \"title\", CAST(\"amount\" AS TEXT) AS \"amount\", CAST(\"day\" AS TEXT) AS \"day\" \
             FROM \"entries\" WHERE \"id\" = $1 LIMIT 1"
        );
        assert_eq!(q.params, vec![Param::Id(7)]);
    }

    #[test]
    fn insert_uses_typed_placeholders_on_postgres() {
        let fields = vec![(&COLUMNS[0], json!("lunch")), (&COLUMNS[1], json!(12))];
        let q = insert(Dialect::Postgres, &TABLE, &fields);
        assert_eq!(
            q.sql,
            "INSERT INTO \"entries\" (\"title\", \"amount\") VALUES ($1::text, $2::numeric)"
        );
        assert_eq!(q.params.len(), 2);
    }

    #[test]
    fn update_places_id_last() {
        let fields = vec![(&COLUMNS[2], json!("2024-01-01"))];
        let q = update(Dialect::Sqlite, &TABLE, 3, &fields);
        assert_eq!(q.sql, "UPDATE \"entries\" SET \"day\" = ? WHERE \"id\" = ?");
        assert_eq!(q.params.last(), Some(&Param::Id(3)));

        let q = update(Dialect::Postgres, &TABLE, 3, &fields);
        assert_eq!(q.sql, "UPDATE \"entries\" SET \"day\" = $1::date WHERE \"id\" = $2");
    }

    #[test]
    fn values_never_appear_in_sql() {
        let fields = vec![(&COLUMNS[0], json!("x'); DROP TABLE entries; --"))];
        let q = insert(Dialect::Sqlite, &TABLE, &fields);
        assert!(!q.sql.contains("DROP"));
    }

    #[test]
    fn identifiers_are_quoted() {
        assert_eq!(quoted("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn ddl_per_dialect() {
        assert_eq!(
            create_table(Dialect::Sqlite, &TABLE),
            "CREATE TABLE IF NOT EXISTS \"entries\" (\"id\" INTEGER PRIMARY KEY AUTOINCREMENT, \
             \"title\" TEXT NOT NULL, \"amount\" NUMERIC, \"day\" TEXT)"
        );
        assert!(create_table(Dialect::Postgres, &TABLE).contains("\"id\" BIGSERIAL PRIMARY KEY"));
    }
}
