//! Hydrated rows: `id` plus whitelisted attributes.

use super::schema::{TableSchema, ID_COLUMN};
use crate::db::RowMap;
use crate::error::AppError;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Record {
    pub id: i64,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Record {
    /// Keep `id` and every fillable column present in `row`; drop everything else.
    pub fn hydrate(schema: &TableSchema, row: RowMap) -> Result<Self, AppError> {
        let mut id = None;
        let mut attributes = Map::new();
        for (key, value) in row {
            if key == ID_COLUMN {
                id = value.as_i64().or_else(|| value.as_str().and_then(|s| s.parse().ok()));
            } else if schema.is_fillable(&key) {
                attributes.insert(key, value);
            }
        }
        let id = id.ok_or_else(|| {
            AppError::Db(sqlx::Error::Decode(
                format!("row from {} has no integer id", schema.table).into(),
            ))
        })?;
        Ok(Record { id, attributes })
    }

    /// Fillable attribute by name. `id` is not an attribute; read it from [`Record::id`].
    pub fn get(&self, key: &str) -> Option<&Value> {
        if key == ID_COLUMN {
            return None;
        }
        self.attributes.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{Column, SqlType};
    use serde_json::json;

    static COLUMNS: &[Column] = &[Column::new("title", SqlType::Text), Column::new("amount", SqlType::Numeric)];
    static TABLE: TableSchema = TableSchema {
        table: "entries",
        fillable: COLUMNS,
    };

    fn row(v: Value) -> RowMap {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[test]
    fn hydration_keeps_only_id_and_fillable() {
        let rec = Record::hydrate(
            &TABLE,
            row(json!({"id": 4, "title": "a", "amount": "10", "secret": "hidden", "created_at": "x"})),
        )
        .unwrap();
        assert_eq!(rec.id, 4);
        assert_eq!(rec.attributes.len(), 2);
        assert_eq!(rec.get("title"), Some(&json!("a")));
        assert_eq!(rec.get("secret"), None);
        assert_eq!(rec.get("id"), None);
    }

    #[test]
    fn missing_fillable_columns_stay_absent() {
        let rec = Record::hydrate(&TABLE, row(json!({"id": 1, "title": null}))).unwrap();
        assert_eq!(rec.get("title"), Some(&Value::Null));
        assert_eq!(rec.get("amount"), None);
    }

    #[test]
    fn row_without_id_is_rejected() {
        assert!(Record::hydrate(&TABLE, row(json!({"title": "a"}))).is_err());
    }

    #[test]
    fn serializes_flat() {
        let rec = Record::hydrate(&TABLE, row(json!({"id": 2, "title": "t"}))).unwrap();
        assert_eq!(serde_json::to_value(&rec).unwrap(), json!({"id": 2, "title": "t"}));
    }
}
