//! HTTP surface for the Stranger Q random-generation tools.
//!
//! Every endpoint wraps the same pair: fetch tagged random bytes from the
//! provider, run one of the pure keygen transforms, and return JSON carrying
//! the generated value plus `entropy` / `source` provenance fields. Remote
//! QRNG failures never surface here; callers always get a value.

pub mod error;
pub mod routes;

use axum::http::{header, HeaderName};
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use strangerq_entropy::RandomSource;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared handler state: the byte source behind every tool.
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn RandomSource>,
}

/// Build the application router with permissive CORS and request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/otp", get(routes::otp))
        .route("/password", get(routes::password))
        .route("/uuid", get(routes::uuid))
        .route("/token", get(routes::token))
        .route("/pick", post(routes::pick))
        .route("/key", get(routes::key))
        .fallback(routes::unknown_action)
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Open CORS: the tools are called from arbitrary web origins.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
}
