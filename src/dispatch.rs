//! Resolve a controller for one request, run an action, and map failures once.

use crate::container::Resolve;
use crate::error::AppError;
use crate::http::RequestData;
use crate::state::AppState;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::future::Future;
use tracing::Instrument;

pub async fn dispatch<C, F, Fut>(state: &AppState, request: RequestData, action: F) -> Response
where
    C: Resolve,
    F: FnOnce(C) -> Fut,
    Fut: Future<Output = Result<Response, AppError>>,
{
    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("dispatch", %request_id, controller = std::any::type_name::<C>());
    async move {
        let mut scope = state.container.scope();
        scope.instance(request);
        let controller = match scope.make::<C>() {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "controller construction failed");
                return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
            }
        };
        match action(controller).await {
            Ok(response) => {
                tracing::debug!(status = response.status().as_u16(), "handled");
                response
            }
            Err(e) => e.into_response(),
        }
    }
    .instrument(span)
    .await
}

/// Path ids are integers; anything else is a client error.
pub fn parse_id(raw: &str) -> Result<i64, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("invalid id '{}'", raw)))
}

pub async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}

pub async fn method_not_allowed() -> (StatusCode, &'static str) {
    (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}
