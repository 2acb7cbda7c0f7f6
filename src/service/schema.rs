//! Table schema descriptors: the table name and the whitelist of writable columns.

/// Logical column type; drives DDL, placeholder casts and how values are read back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
    Numeric,
    Date,
}

impl SqlType {
    /// PostgreSQL type name used for DDL and `$n::type` casts.
    pub fn pg_name(&self) -> &'static str {
        match self {
            SqlType::Text => "text",
            SqlType::Integer => "bigint",
            SqlType::Numeric => "numeric",
            SqlType::Date => "date",
        }
    }

    pub fn sqlite_name(&self) -> &'static str {
        match self {
            SqlType::Text | SqlType::Date => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::Numeric => "NUMERIC",
        }
    }

    /// Columns whose driver type has no direct JSON counterpart are selected as text.
    pub fn reads_as_text(&self) -> bool {
        matches!(self, SqlType::Numeric | SqlType::Date)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub nullable: bool,
}

impl Column {
    pub const fn new(name: &'static str, sql_type: SqlType) -> Self {
        Column {
            name,
            sql_type,
            nullable: true,
        }
    }

    pub const fn required(mut self) -> Self {
        self.nullable = false;
        self
    }
}

/// Table name plus fillable columns, in declaration order. Identifiers are trusted.
#[derive(Debug)]
pub struct TableSchema {
    pub table: &'static str,
    pub fillable: &'static [Column],
}

/// Primary key column shared by every table.
pub const ID_COLUMN: &str = "id";

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.fillable.iter().find(|c| c.name == name)
    }

    pub fn is_fillable(&self, name: &str) -> bool {
        self.column(name).is_some()
    }
}

/// A resource type backed by one table.
pub trait Schema: Send + Sync + 'static {
    fn schema() -> &'static TableSchema;
}
