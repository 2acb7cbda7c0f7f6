//! Shared application state, built once at startup and handed to every route.

use crate::config::ConfigStore;
use crate::container::Container;
use crate::controllers;
use crate::db::Database;
use crate::models::Expense;
use crate::service::Model;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub struct AppState {
    /// Loaded configuration tree; read by operational routes.
    pub config: Arc<ConfigStore>,
    pub database: Database,
    /// Process-wide bindings; each request resolves from a scope of it.
    pub container: Arc<Container>,
}

impl AppState {
    pub fn new(config: ConfigStore, database: Database) -> Self {
        let config = Arc::new(config);
        let mut container = Container::new();
        container.instance(database.clone());
        container.bind_self::<Model<Expense>>();
        container.autoload_controllers(controllers::REGISTRY);
        tracing::debug!(?container, "container ready");
        AppState {
            config,
            database,
            container: Arc::new(container),
        }
    }
}
