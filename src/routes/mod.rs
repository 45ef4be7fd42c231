// HTTP routes

mod http;

use axum::{Router, routing::get};
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::snapshot_store::SnapshotStore;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) store: SnapshotStore,
}

pub fn app(store: SnapshotStore, config: &AppConfig) -> Router {
    let state = AppState { store };
    Router::new()
        .route(&config.server.metrics_path, get(http::metrics_handler)) // GET /metrics
        .route("/version", get(http::version_handler)) // GET /version
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
