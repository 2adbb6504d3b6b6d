//! Router and middleware stack.

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::HttpConfig;
use crate::handlers;
use crate::state::AppState;

/// Create the application router with all routes and middleware
pub fn router(state: AppState, http: &HttpConfig) -> Router {
    Router::new()
        .route("/sensing-requests", post(handlers::create_sensing_request))
        .route("/process-csi", post(handlers::process_csi))
        .route("/areas/:area_id/topology", get(handlers::get_topology))
        .route("/capabilities", get(handlers::list_capabilities))
        .route("/healthz", get(handlers::health))
        .layer(DefaultBodyLimit::max(http.max_body_size))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(TimeoutLayer::new(Duration::from_secs(http.timeout_secs))),
        )
        .with_state(state)
}
