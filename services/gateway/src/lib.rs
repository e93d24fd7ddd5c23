//! Warden Gateway
//!
//! Forward-auth service for reverse proxies.
//!
//! ## Endpoints
//!
//! - `GET /login` - Login form
//! - `POST /login` - Exchange credentials for a session cookie
//! - `GET /verify` - Forward-auth check (200 or redirect to login)
//! - `GET /` - Liveness probe
//! - `GET /metrics` - Prometheus metrics (when enabled)

pub mod config;
pub mod cookies;
pub mod handlers;
pub mod state;
pub mod template;

use axum::routing::get;
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub use config::{Config, ConfigError};
pub use state::AppState;

/// Build the HTTP router
pub fn build_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let request_timeout = state.request_timeout();

    let gateway_routes = Router::new()
        .route("/login", get(handlers::login_page).post(handlers::login))
        .route("/verify", get(handlers::verify));

    // Liveness route (no timeout - must always respond quickly)
    let health_routes = Router::new().route("/", get(handlers::alive));

    // Metrics route (no timeout)
    let metrics_route = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    // Build middleware stack (order matters - outermost first)
    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
        )
        .layer(TimeoutLayer::new(request_timeout));

    Router::new()
        .merge(gateway_routes)
        .layer(middleware)
        .merge(health_routes)
        .merge(metrics_route)
        .with_state(state)
}
