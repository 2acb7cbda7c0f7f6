//! Configuration: the namespaced store and the typed database settings drawn from it.

pub mod store;
pub mod database;

pub use store::*;
pub use database::{apply_database_settings, DatabaseConfig, Driver};
