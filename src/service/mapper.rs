//! Generic record mapper: CRUD for any table described by a [`Schema`].

use super::record::Record;
use super::schema::{Column, Schema, SqlType, TableSchema};
use crate::container::{Container, Resolve};
use crate::db::Database;
use crate::error::{AppError, ContainerError};
use crate::sql::{delete, insert, select_all, select_by_id, update};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::marker::PhantomData;

/// Result of a create/update: either a statement ran, or the input had nothing writable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    NothingToWrite,
}

impl WriteOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self, WriteOutcome::Written)
    }
}

/// Capability surface of a table-backed resource.
#[async_trait]
pub trait Repository: Send + Sync {
    fn schema(&self) -> &'static TableSchema;

    async fn find(&self, id: i64) -> Result<Option<Record>, AppError>;

    async fn find_or_fail(&self, id: i64) -> Result<Record, AppError> {
        self.find(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} #{}", self.schema().table, id)))
    }

    /// Every row, in whatever order the store returns them.
    async fn all(&self) -> Result<Vec<Record>, AppError>;

    async fn create(&self, raw: &Map<String, Value>) -> Result<WriteOutcome, AppError>;

    /// `Written` means the UPDATE ran, not that a row matched.
    async fn update(&self, id: i64, raw: &Map<String, Value>) -> Result<WriteOutcome, AppError>;

    async fn delete(&self, record: &Record) -> Result<bool, AppError>;
}

pub struct Model<S: Schema> {
    db: Database,
    _schema: PhantomData<fn() -> S>,
}

impl<S: Schema> Model<S> {
    pub fn new(db: Database) -> Self {
        Model {
            db,
            _schema: PhantomData,
        }
    }

    /// Intersect `raw` with the fillable whitelist, in declaration order.
    pub fn fillable_data(raw: &Map<String, Value>) -> Result<Vec<(&'static Column, Value)>, AppError> {
        let mut out = Vec::new();
        for col in S::schema().fillable {
            let Some(value) = raw.get(col.name) else { continue };
            check_value(col, value)?;
            out.push((col, value.clone()));
        }
        Ok(out)
    }
}

impl<S: Schema> Clone for Model<S> {
    fn clone(&self) -> Self {
        Model::new(self.db.clone())
    }
}

impl<S: Schema> Resolve for Model<S> {
    fn resolve(container: &Container) -> Result<Self, ContainerError> {
        Ok(Model::new(container.make::<Database>()?))
    }
}

fn check_value(col: &Column, value: &Value) -> Result<(), AppError> {
    match value {
        Value::Array(_) | Value::Object(_) => {
            return Err(AppError::Validation(format!("{} must be a scalar value", col.name)));
        }
        Value::Null if !col.nullable => {
            return Err(AppError::Validation(format!("{} may not be null", col.name)));
        }
        _ => {}
    }
    if value.is_null() {
        return Ok(());
    }
    let (valid, expected) = match col.sql_type {
        SqlType::Text => (true, ""),
        SqlType::Date => (
            value
                .as_str()
                .map(|s| chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok())
                .unwrap_or(false),
            "a date (YYYY-MM-DD)",
        ),
        SqlType::Numeric => (
            match value {
                Value::Number(_) => true,
                Value::String(s) => s.trim().parse::<f64>().map(f64::is_finite).unwrap_or(false),
                _ => false,
            },
            "a number",
        ),
        SqlType::Integer => (
            match value {
                Value::Number(n) => n.is_i64(),
                Value::String(s) => s.trim().parse::<i64>().is_ok(),
                _ => false,
            },
            "an integer",
        ),
    };
    if !valid {
        return Err(AppError::Validation(format!("{} must be {}", col.name, expected)));
    }
    Ok(())
}

#[async_trait]
impl<S: Schema> Repository for Model<S> {
    fn schema(&self) -> &'static TableSchema {
        S::schema()
    }

    async fn find(&self, id: i64) -> Result<Option<Record>, AppError> {
        let pool = self.db.connection().await?;
        let q = select_by_id(pool.dialect(), S::schema(), id);
        match pool.fetch_optional(&q).await? {
            Some(row) => Ok(Some(Record::hydrate(S::schema(), row)?)),
            None => Ok(None),
        }
    }

    async fn all(&self) -> Result<Vec<Record>, AppError> {
        let pool = self.db.connection().await?;
        let q = select_all(pool.dialect(), S::schema());
        pool.fetch_all(&q)
            .await?
            .into_iter()
            .map(|row| Record::hydrate(S::schema(), row))
            .collect()
    }

    async fn create(&self, raw: &Map<String, Value>) -> Result<WriteOutcome, AppError> {
        let fields = Self::fillable_data(raw)?;
        if fields.is_empty() {
            tracing::debug!(table = S::schema().table, "create skipped: no fillable data");
            return Ok(WriteOutcome::NothingToWrite);
        }
        let pool = self.db.connection().await?;
        let q = insert(pool.dialect(), S::schema(), &fields);
        pool.execute(&q).await?;
        Ok(WriteOutcome::Written)
    }

    async fn update(&self, id: i64, raw: &Map<String, Value>) -> Result<WriteOutcome, AppError> {
        let fields = Self::fillable_data(raw)?;
        if fields.is_empty() {
            tracing::debug!(table = S::schema().table, id, "update skipped: no fillable data");
            return Ok(WriteOutcome::NothingToWrite);
        }
        let pool = self.db.connection().await?;
        let q = update(pool.dialect(), S::schema(), id, &fields);
        let affected = pool.execute(&q).await?;
        tracing::debug!(table = S::schema().table, id, affected, "updated");
        Ok(WriteOutcome::Written)
    }

    async fn delete(&self, record: &Record) -> Result<bool, AppError> {
        let pool = self.db.connection().await?;
        let q = delete(pool.dialect(), S::schema(), record.id);
        pool.execute(&q).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbPool;
    use crate::migration::apply_migrations;
    use serde_json::json;

    struct Note;

    static NOTE_COLUMNS: &[Column] = &[
        Column::new("title", SqlType::Text),
        Column::new("day", SqlType::Date),
        Column::new("weight", SqlType::Numeric),
    ];
    static NOTES: TableSchema = TableSchema {
        table: "notes",
        fillable: NOTE_COLUMNS,
    };

    impl Schema for Note {
        fn schema() -> &'static TableSchema {
            &NOTES
        }
    }

    async fn notes() -> Model<Note> {
        let pool = DbPool::connect_sqlite("sqlite::memory:", 1).await.unwrap();
        let db = Database::from_pool(pool);
        apply_migrations(&db, &[&NOTES]).await.unwrap();
        Model::new(db)
    }

    fn map(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => unreachable!(),
        }
    }

    #[tokio::test]
    async fn disjoint_keys_write_nothing() {
        let model = notes().await;
        let outcome = model.create(&map(json!({"nope": 1, "id": 99}))).await.unwrap();
        assert_eq!(outcome, WriteOutcome::NothingToWrite);
        let outcome = model.update(1, &map(json!({}))).await.unwrap();
        assert_eq!(outcome, WriteOutcome::NothingToWrite);
        assert!(model.all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_drops_extra_keys() {
        let model = notes().await;
        let outcome = model
            .create(&map(json!({"title": "a", "day": "2024-01-01", "weight": 3, "extra": "y", "id": 50})))
            .await
            .unwrap();
        assert!(outcome.is_written());
        let all = model.all().await.unwrap();
        assert_eq!(all.len(), 1);
        let rec = model.find(all[0].id).await.unwrap().unwrap();
        assert_eq!(
            serde_json::to_value(&rec).unwrap(),
            json!({"id": rec.id, "title": "a", "day": "2024-01-01", "weight": "3"})
        );
        assert_ne!(rec.id, 50);
    }

    #[tokio::test]
    async fn find_misses_quietly_and_find_or_fail_does_not() {
        let model = notes().await;
        assert!(model.find(12345).await.unwrap().is_none());
        assert!(matches!(model.find_or_fail(12345).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_touches_only_filtered_columns() {
        let model = notes().await;
        model.create(&map(json!({"title": "a", "weight": 1}))).await.unwrap();
        let id = model.all().await.unwrap()[0].id;
        let outcome = model.update(id, &map(json!({"title": "b", "bogus": true}))).await.unwrap();
        assert!(outcome.is_written());
        let rec = model.find_or_fail(id).await.unwrap();
        assert_eq!(rec.get("title"), Some(&json!("b")));
        assert_eq!(rec.get("weight"), Some(&json!("1")));
    }

    #[tokio::test]
    async fn update_of_missing_row_still_reports_written() {
        let model = notes().await;
        let outcome = model.update(777, &map(json!({"title": "x"}))).await.unwrap();
        assert_eq!(outcome, WriteOutcome::Written);
    }

    #[tokio::test]
    async fn delete_removes_the_row() {
        let model = notes().await;
        model.create(&map(json!({"title": "gone"}))).await.unwrap();
        let rec = model.all().await.unwrap().remove(0);
        assert!(model.delete(&rec).await.unwrap());
        assert!(model.find(rec.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn non_scalar_and_bad_dates_are_rejected() {
        let model = notes().await;
        let err = model.create(&map(json!({"title": ["a"]}))).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let err = model.create(&map(json!({"day": "01/02/2024"}))).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        for bad in [json!({"weight": "abc"}), json!({"weight": true}), json!({"weight": "NaN"}), json!({"day": true})] {
            let err = model.create(&map(bad)).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
        assert!(model.all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn numeric_strings_and_nulls_pass_the_guard() {
        let model = notes().await;
        let outcome = model
            .create(&map(json!({"title": "t", "weight": " 12.50 ", "day": null})))
            .await
            .unwrap();
        assert!(outcome.is_written());
        let rec = model.all().await.unwrap().remove(0);
        assert_eq!(rec.get("day"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn values_are_bound_not_interpolated() {
        let model = notes().await;
        let hostile = "x'); DROP TABLE notes; --";
        model.create(&map(json!({"title": hostile}))).await.unwrap();
        let all = model.all().await.unwrap();
        assert_eq!(all[0].get("title"), Some(&json!(hostile)));
    }
}
