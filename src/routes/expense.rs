//! Expense resource routes under `/api/expenses`.

use crate::dispatch::method_not_allowed;
use crate::handlers::expense::{destroy, index, show, store, update};
use crate::state::AppState;
use axum::{routing::get, Router};

pub const PREFIX: &str = "/api/expenses";

pub fn expense_routes(state: AppState) -> Router {
    Router::new()
        .route(PREFIX, get(index).post(store).fallback(method_not_allowed))
        .route(
            &format!("{}/:id", PREFIX),
            get(show).patch(update).delete(destroy).fallback(method_not_allowed),
        )
        .with_state(state)
}
