//! Common routes: health, readiness, version.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

#[derive(Serialize)]
struct ReadyBody {
    status: &'static str,
    database: &'static str,
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyBody>) {
    let reachable = match state.database.connection().await {
        Ok(pool) => pool.ping().await.is_ok(),
        Err(_) => false,
    };
    if !reachable {
        tracing::warn!("readiness check: database unavailable");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadyBody {
                status: "degraded",
                database: "unavailable",
            }),
        );
    }
    (
        StatusCode::OK,
        Json(ReadyBody {
            status: "ok",
            database: "ok",
        }),
    )
}

/// `app.name` from configuration when set, else the package name.
async fn version(State(state): State<AppState>) -> Json<serde_json::Value> {
    let name = state
        .config
        .get_string("app.name")
        .unwrap_or_else(|| env!("CARGO_PKG_NAME").to_string());
    Json(serde_json::json!({
        "name": name,
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /health, GET /ready (database round-trip), GET /version.
pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .with_state(state)
}
