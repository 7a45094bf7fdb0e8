pub mod health;

use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::timeout::TimeoutLayer;

use crate::analysis::handlers;
use crate::errors::AppError;
use crate::state::AppState;
use crate::storage::handlers as upload_handlers;

// Per-endpoint upper bounds on a whole request. Analysis covers download,
// extraction and the model call; chat is a single model call.
pub const PRESIGN_TIMEOUT: Duration = Duration::from_secs(60);
pub const ANALYZE_TIMEOUT: Duration = Duration::from_secs(300);
pub const CHAT_TIMEOUT: Duration = Duration::from_secs(120);

/// Any verb other than the one a route declares.
async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/uploads/presign",
            post(upload_handlers::handle_presign)
                .fallback(method_not_allowed)
                .layer(TimeoutLayer::new(PRESIGN_TIMEOUT)),
        )
        .route(
            "/api/v1/resumes/analyze",
            post(handlers::handle_analyze)
                .fallback(method_not_allowed)
                .layer(TimeoutLayer::new(ANALYZE_TIMEOUT)),
        )
        .route(
            "/api/v1/chat",
            post(handlers::handle_chat)
                .fallback(method_not_allowed)
                .layer(TimeoutLayer::new(CHAT_TIMEOUT)),
        )
        .with_state(state)
}
