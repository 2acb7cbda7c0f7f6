//! Expense route handlers: extract, then hand off to [`dispatch`].

use crate::controllers::ExpenseController;
use crate::dispatch::{dispatch, parse_id};
use crate::http::RequestData;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
};

pub async fn index(State(state): State<AppState>, request: RequestData) -> Response {
    dispatch(&state, request, |c: ExpenseController| async move { c.index().await }).await
}

pub async fn show(State(state): State<AppState>, Path(id): Path<String>, request: RequestData) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    dispatch(&state, request, |c: ExpenseController| async move { c.show(id).await }).await
}

pub async fn store(State(state): State<AppState>, request: RequestData) -> Response {
    dispatch(&state, request, |c: ExpenseController| async move { c.store().await }).await
}

pub async fn update(State(state): State<AppState>, Path(id): Path<String>, request: RequestData) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    dispatch(&state, request, |c: ExpenseController| async move { c.update(id).await }).await
}

pub async fn destroy(State(state): State<AppState>, Path(id): Path<String>, request: RequestData) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(e) => return e.into_response(),
    };
    dispatch(&state, request, |c: ExpenseController| async move { c.destroy(id).await }).await
}
