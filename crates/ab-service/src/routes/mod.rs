//! HTTP routes for the authentication bridge.

use crate::handlers::{self, AppState};
use crate::middleware::{http_metrics_middleware, require_bearer_token, AuthState};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};

pub use crate::observability::metrics::init_metrics_recorder;

/// Build the application routes.
///
/// Creates an Axum router with:
/// - `/health` - Liveness probe (simple "OK") - public
/// - `/metrics` - Prometheus metrics endpoint - public
/// - `/api/auth/login` - Directory login, returns an identity token - public
/// - `/api/auth/validate` - Token validation - public
/// - `/api/auth/me` - Current user - requires a bearer token
/// - `/api/test/*` - Directory diagnostics, only when enabled in config
/// - TraceLayer for request logging, CORS for any origin
/// - 30 second request timeout
pub fn build_routes(state: Arc<AppState>, metrics_handle: PrometheusHandle) -> Router {
    let auth_state = Arc::new(AuthState {
        token_service: state.token_service.clone(),
    });

    let mut public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/auth/login", post(handlers::handle_login))
        .route("/api/auth/validate", post(handlers::handle_validate));

    if state.config.diagnostics_enabled {
        tracing::warn!(target: "ab.routes", "Directory diagnostic routes are enabled");
        public_routes = public_routes
            .route("/api/test/ldap-connection", get(handlers::handle_connection_test))
            .route("/api/test/sync-users", get(handlers::handle_sync_users))
            .route("/api/test/authenticate", post(handlers::handle_authenticate_test));
    }

    let public_routes = public_routes.with_state(state.clone());

    let metrics_routes = Router::new()
        .route("/metrics", get(handlers::metrics_handler))
        .with_state(metrics_handle);

    let protected_routes = Router::new()
        .route("/api/auth/me", get(handlers::handle_me))
        .route_layer(middleware::from_fn_with_state(
            auth_state,
            require_bearer_token,
        ))
        .with_state(state);

    // Layer order (bottom-to-top execution):
    // 1. TimeoutLayer - Timeout the request (innermost)
    // 2. TraceLayer - Log request details
    // 3. CorsLayer - Answer preflight requests
    // 4. http_metrics_middleware - Record ALL responses (outermost)
    public_routes
        .merge(metrics_routes)
        .merge(protected_routes)
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(middleware::from_fn(http_metrics_middleware))
}
