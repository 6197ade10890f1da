pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::sop::handlers;
use crate::state::AppState;

/// Room for the text fields and multipart framing on top of the CV itself.
const FORM_OVERHEAD_BYTES: usize = 256 * 1024;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + FORM_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(health::health_handler))
        .route("/", get(handlers::handle_index))
        .route("/api/v1/sop/preview", post(handlers::handle_preview))
        .route("/api/v1/sop/generate", post(handlers::handle_generate))
        .route(
            "/api/v1/sop/:session_id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        .route("/api/v1/sop/:session_id/view", get(handlers::handle_view))
        .route(
            "/api/v1/sop/:session_id/download",
            get(handlers::handle_download),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
