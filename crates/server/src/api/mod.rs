pub mod bestsellers;
pub mod category;
pub mod handlers;
pub mod history;
pub mod navigation;
pub mod routes;
pub mod search;

pub use routes::create_router;

use axum::Json;
use serde::Serialize;

/// Uniform error body for every handler.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub(crate) fn error_body(message: impl Into<String>) -> Json<ErrorResponse> {
    Json(ErrorResponse {
        error: message.into(),
    })
}
