//! HTTP plumbing: request parameters, JSON responses, CORS.

pub mod cors;
pub mod request;
pub mod response;

pub use cors::cors_middleware;
pub use request::RequestData;
pub use response::{ActionResult, JsonResponse, Notification, NotificationKind};
