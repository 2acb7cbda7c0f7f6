//! The `expenses` table: when, how much, and what for.

use crate::service::{Column, Schema, SqlType, TableSchema};

pub static EXPENSES: TableSchema = TableSchema {
    table: "expenses",
    fillable: &[
        Column::new("date", SqlType::Date),
        Column::new("sum", SqlType::Numeric),
        Column::new("comment", SqlType::Text),
    ],
};

/// Marker for the `expenses` table.
pub struct Expense;

impl Schema for Expense {
    fn schema() -> &'static TableSchema {
        &EXPENSES
    }
}
