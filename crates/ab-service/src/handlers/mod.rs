//! HTTP request handlers for the authentication bridge.

pub mod auth_handler;
pub mod diagnostics_handler;
pub mod health;
pub mod metrics;

pub use auth_handler::{handle_login, handle_me, handle_validate, AppState};
pub use diagnostics_handler::{handle_authenticate_test, handle_connection_test, handle_sync_users};
pub use health::health_check;
pub use metrics::metrics_handler;
