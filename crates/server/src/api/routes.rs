use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{dead_letters, handlers, middleware as mw, pipeline};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // API routes
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Pipeline
        .route("/process", post(pipeline::process))
        .route("/run", post(pipeline::run_job))
        .route("/metrics", get(handlers::get_metrics))
        // Dead letters
        .route("/dead-letters", get(dead_letters::list_dead_letters))
        .route("/dead-letters/prune", post(dead_letters::prune_dead_letters));

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::prometheus_metrics))
        .with_state(state)
        .layer(middleware::from_fn(mw::metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(mw::make_request_span))
        .layer(middleware::from_fn(mw::request_id_middleware))
}
