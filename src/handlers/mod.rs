pub mod analyze;
pub mod health;

pub use analyze::*;
pub use health::*;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::middleware::logging_middleware;
use crate::services::ReportPipeline;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pipeline: ReportPipeline,
}

impl AppState {
    pub fn new(config: Arc<Config>, pipeline: ReportPipeline) -> Self {
        Self { config, pipeline }
    }
}

pub fn create_router(state: AppState) -> Router {
    // room for multipart framing and the email field; the file itself is checked in the handler
    let body_limit = state.config.max_file_size_bytes() + 64 * 1024;

    Router::new()
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/analyze-blood-test", post(analyze_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(body_limit))
                .layer(axum::middleware::from_fn(logging_middleware)),
        )
}
