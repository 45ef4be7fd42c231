// GET handlers: metrics, version

use axum::{extract::State, http::header, response::IntoResponse};

use super::AppState;
use crate::exposition;

/// GET <metrics_path> — renders the latest published snapshot. Collection
/// failures never surface here; the last good (or empty) snapshot is served.
pub(super) async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.store.read();
    (
        [(header::CONTENT_TYPE, exposition::CONTENT_TYPE)],
        exposition::render(&snapshot),
    )
}

const NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// GET /version — returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}
