//! Middleware for the authentication bridge.
//!
//! - `auth` - bearer-token verification for protected routes
//! - `http_metrics` - HTTP request metrics

pub mod auth;
pub mod http_metrics;

pub use auth::{require_bearer_token, AuthState, AuthenticatedUser};
pub use http_metrics::http_metrics_middleware;
