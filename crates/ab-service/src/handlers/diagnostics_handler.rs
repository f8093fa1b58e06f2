//! Directory diagnostics.
//!
//! Mounted only when `DIAGNOSTICS_ENABLED=true`. These endpoints are not on
//! the authentication path and do not issue tokens.

use crate::handlers::auth_handler::AppState;
use crate::models::{
    AuthenticateTestResponse, ConnectionTestResponse, LoginRequest, SyncUsersResponse,
};
use axum::{extract::State, Json};
use common::secret::SecretString;
use std::sync::Arc;
use tracing::instrument;

/// GET /api/test/ldap-connection
#[instrument(skip_all, name = "ab.diagnostics.connection")]
pub async fn handle_connection_test(State(state): State<Arc<AppState>>) -> Json<ConnectionTestResponse> {
    let connected = state.authenticator.test_connection().await;
    let message = if connected {
        "LDAP connection successful"
    } else {
        "LDAP connection failed"
    };

    Json(ConnectionTestResponse {
        connected,
        message: message.to_string(),
    })
}

/// GET /api/test/sync-users
///
/// An empty list means either no users or a failed search; the logs say
/// which.
#[instrument(skip_all, name = "ab.diagnostics.sync_users")]
pub async fn handle_sync_users(State(state): State<Arc<AppState>>) -> Json<SyncUsersResponse> {
    let users = state.authenticator.sync_users().await;

    Json(SyncUsersResponse {
        count: users.len(),
        users,
    })
}

/// POST /api/test/authenticate
///
/// Credentials come in a JSON body so the password never appears in a URL.
#[instrument(skip_all, name = "ab.diagnostics.authenticate")]
pub async fn handle_authenticate_test(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Json<AuthenticateTestResponse> {
    let username = payload.username.unwrap_or_default();
    let password = payload.password.unwrap_or_else(|| SecretString::from(""));

    let authenticated = state.authenticator.authenticate(&username, &password).await;

    Json(AuthenticateTestResponse {
        authenticated,
        username,
    })
}
