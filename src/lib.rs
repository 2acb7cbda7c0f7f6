//! Expense ledger: a small CRUD REST backend built on a generic record mapper.

pub mod config;
pub mod container;
pub mod controllers;
pub mod db;
pub mod dispatch;
pub mod error;
pub mod handlers;
pub mod http;
pub mod migration;
pub mod models;
pub mod routes;
pub mod service;
pub mod sql;
pub mod state;

pub use config::{apply_database_settings, ConfigStore, DatabaseConfig, Driver};
pub use container::{Container, ControllerRegistration, Resolve};
pub use db::{Database, DbPool};
pub use error::{AppError, ConfigError, ContainerError};
pub use migration::apply_migrations;
pub use routes::app;
pub use service::{Model, Record, Repository, WriteOutcome};
pub use state::AppState;
