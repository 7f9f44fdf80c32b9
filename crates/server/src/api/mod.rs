pub mod dead_letters;
pub mod handlers;
pub mod middleware;
pub mod pipeline;
pub mod routes;

pub use routes::create_router;

use axum::{http::StatusCode, Json};
use serde::Serialize;

/// Error body returned by every handler.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Handler error: status plus JSON body.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn api_error(status: StatusCode, error: impl ToString) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
}
