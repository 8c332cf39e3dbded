use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use strangerq_entropy::EntropyError;
use strangerq_keygen::KeygenError;
use thiserror::Error;

/// Actions the surface knows about, echoed by the 404 handler.
pub const AVAILABLE_ACTIONS: [&str; 6] = ["otp", "password", "uuid", "token", "pick", "key"];

#[derive(Debug, Error)]
pub enum ApiError {
    /// Caller supplied unusable parameters (zero length, empty list, ...).
    #[error("{0}")]
    Invalid(String),
    /// Request path does not name a known action.
    #[error("unknown endpoint")]
    UnknownAction,
    /// Handler asked the provider for an out-of-contract byte count. This is
    /// a server-side bug (handlers clamp lengths), so it maps to a 500.
    #[error(transparent)]
    Entropy(#[from] EntropyError),
    /// Encoder precondition violated by caller input.
    #[error(transparent)]
    Keygen(#[from] KeygenError),
    /// Invariant broken inside the service itself.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Invalid(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
            }
            ApiError::UnknownAction => (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "Unknown endpoint",
                    "available": AVAILABLE_ACTIONS,
                })),
            )
                .into_response(),
            ApiError::Entropy(error) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": error.to_string() })),
            )
                .into_response(),
            ApiError::Keygen(error) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": error.to_string() })),
            )
                .into_response(),
            ApiError::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": message })),
            )
                .into_response(),
        }
    }
}
