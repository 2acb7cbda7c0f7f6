//! Per-response JSON writer and the action-result envelope.

use crate::error::AppError;
use axum::{
    body::Body,
    http::{header::CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Accumulates status and headers, then finalizes once with [`JsonResponse::json`].
#[derive(Debug)]
pub struct JsonResponse {
    status: StatusCode,
    headers: HeaderMap,
}

impl Default for JsonResponse {
    fn default() -> Self {
        JsonResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
        }
    }
}

impl JsonResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn json<T: Serialize>(self, data: &T) -> Response {
        let body = match serde_json::to_vec(data) {
            Ok(b) => b,
            Err(e) => return AppError::Serialization(e).into_response(),
        };
        let mut response = Response::new(Body::from(body));
        *response.status_mut() = self.status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        response.headers_mut().extend(self.headers);
        response
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Clone, Debug, Serialize)]
pub struct Notification {
    pub title: &'static str,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
}

/// `{"status": bool, "notification": {"title", "type"}}` returned by write actions.
#[derive(Clone, Debug, Serialize)]
pub struct ActionResult {
    pub status: bool,
    pub notification: Notification,
}

impl ActionResult {
    /// Success title when `status` holds, failure title otherwise.
    pub fn new(status: bool, success_title: &'static str, failure_title: &'static str) -> Self {
        let notification = if status {
            Notification {
                title: success_title,
                kind: NotificationKind::Success,
            }
        } else {
            Notification {
                title: failure_title,
                kind: NotificationKind::Error,
            }
        };
        ActionResult { status, notification }
    }
}
