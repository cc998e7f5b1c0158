use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use campushub_core::DomainError;
use campushub_infra::StoreError;

/// Error body shape used everywhere: `{ "error": "<message>" }`.
pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": message.into(),
        })),
    )
        .into_response()
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::Conflict(msg) | StoreError::Precondition(msg) => {
            json_error(StatusCode::BAD_REQUEST, msg)
        }
        StoreError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, msg),
        // Details were logged at the store boundary; don't leak them.
        StoreError::Backend(_) => json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal server error"),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, msg),
        other => json_error(StatusCode::BAD_REQUEST, other.to_string()),
    }
}
