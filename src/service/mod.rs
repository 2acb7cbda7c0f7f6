//! Generic record mapper over table schema descriptors.

mod mapper;
mod record;
mod schema;
pub use mapper::{Model, Repository, WriteOutcome};
pub use record::Record;
pub use schema::{Column, Schema, SqlType, TableSchema, ID_COLUMN};
