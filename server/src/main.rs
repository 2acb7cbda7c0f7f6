//! Expense ledger server.
//!
//! Run from repo root: `cargo run -p expense-server`
//! Settings: `config/*.json` (or `CONFIG_DIR`), `.env`, `DB_*` overrides, `BIND_ADDR`.

use expense_ledger::{
    app, apply_database_settings, apply_migrations, models::all_schemas, AppState, ConfigStore, Database,
    DatabaseConfig,
};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("expense_ledger=info,expense_server=info")),
        )
        .init();

    let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".into());
    let mut config = ConfigStore::new();
    let loaded = config.autoload_configurations(&config_dir)?;
    tracing::info!(dir = %config_dir, files = loaded, "configuration loaded");
    apply_database_settings(&mut config);
    let db_config = DatabaseConfig::from_store(&config)?;

    let database = Database::new(db_config);
    if let Err(e) = database.connection().await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
    apply_migrations(&database, &all_schemas()).await?;

    let state = AppState::new(config, database);
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Expense ledger listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app(state)).await?;
    Ok(())
}
