//! Route table: operational routes, the expense resource, CORS and body limit.

pub mod common;
pub mod expense;

pub use common::common_routes;
pub use expense::expense_routes;

use crate::dispatch::not_found;
use crate::http::cors_middleware;
use crate::state::AppState;
use axum::{middleware, Router};
use tower_http::limit::RequestBodyLimitLayer;

pub const BODY_LIMIT: usize = 1024 * 1024;

/// Full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(expense_routes(state))
        .fallback(not_found)
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(middleware::from_fn(cors_middleware))
}
