use axum::extract::DefaultBodyLimit;
use axum::http::HeaderName;
use axum::Router;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

mod auth;
mod error;
mod extract;
mod handlers;
mod response;
mod routes;

pub use auth::AuthUser;
pub use error::AppError;
pub use response::{ApiResponse, EmptyList, EmptyObject, Listing};

const REQUEST_ID_HEADER: HeaderName = HeaderName::from_static("x-request-id");

pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health())
        .merge(routes::comments())
        .merge(routes::tweets())
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .fallback(handlers::fallback)
        .with_state(state)
}

/// Request ids, request tracing and the body size cap. Every response echoes
/// the `x-request-id` it was served under. Oversized JSON bodies are rejected
/// by `ApiJson`, so they get the error envelope like any other failure.
pub fn with_layers(router: Router, max_body_bytes: usize) -> Router {
    router
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(PropagateRequestIdLayer::new(REQUEST_ID_HEADER))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(REQUEST_ID_HEADER, MakeRequestUuid))
}
