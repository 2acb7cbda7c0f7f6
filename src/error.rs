//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config io ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("config parse ({path}): {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("no binding registered for {0}")]
    Unbound(&'static str),
    #[error("binding for {0} produced a value of another type")]
    TypeMismatch(&'static str),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Record not found: {0}")]
    NotFound(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Malformed request body: {0}")]
    MalformedBody(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
    #[error("Database connection failed: {0}")]
    Connection(String),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::MalformedBody(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Db(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            AppError::Db(_) | AppError::Connection(_) | AppError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Uniform failure envelope: `{"status": false, "notification": "<message>"}`.
#[derive(Serialize)]
pub struct ErrorEnvelope {
    pub status: bool,
    pub notification: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }
        let body = ErrorEnvelope {
            status: false,
            notification: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(AppError::NotFound("1".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Validation("x".into()).status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(AppError::MalformedBody("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::Db(sqlx::Error::RowNotFound).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Db(sqlx::Error::PoolTimedOut).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::Connection("refused".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
