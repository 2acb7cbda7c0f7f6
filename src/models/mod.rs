//! Concrete resources.

pub mod expense;
pub use expense::{Expense, EXPENSES};

use crate::service::TableSchema;

/// Every table the application owns, for migrations.
pub fn all_schemas() -> Vec<&'static TableSchema> {
    vec![&EXPENSES]
}
