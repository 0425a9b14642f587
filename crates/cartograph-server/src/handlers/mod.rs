pub mod graph;
pub mod health;
pub mod queries;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use cartograph_core::CartographError;

/// Malformed entities are the upstream engine's fault, not ours.
fn status_for(error: &CartographError) -> StatusCode {
    match error {
        CartographError::MalformedResultEntity(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn error_response(context: &str, error: &CartographError) -> Response {
    (
        status_for(error),
        Json(serde_json::json!({ "error": format!("{context}: {error}") })),
    )
        .into_response()
}
