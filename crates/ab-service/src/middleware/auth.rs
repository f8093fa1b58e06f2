//! Bearer-token middleware for protected routes.
//!
//! Extracts the token from the `Authorization` header, verifies it with the
//! token service, and injects [`AuthenticatedUser`] into the request
//! extensions.

use crate::errors::AbError;
use crate::services::token_service::{TokenService, INVALID_TOKEN_MESSAGE};
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::IntoResponse,
};
use common::jwt::extract_bearer_token;
use std::fmt;
use std::sync::Arc;
use tracing::instrument;

/// State for the authentication middleware.
#[derive(Clone)]
pub struct AuthState {
    pub token_service: Arc<TokenService>,
}

/// The verified subject of the request's bearer token.
#[derive(Clone)]
pub struct AuthenticatedUser {
    pub username: String,
}

impl fmt::Debug for AuthenticatedUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedUser")
            .field("username", &"[REDACTED]")
            .finish()
    }
}

/// Authentication middleware for bearer tokens.
///
/// # Response
///
/// - Returns 401 Unauthorized if the header is missing, not `Bearer`, or the
///   token is invalid or expired
/// - Continues to next handler with `AuthenticatedUser` in extensions otherwise
#[instrument(skip_all, name = "ab.middleware.auth")]
pub async fn require_bearer_token(
    State(state): State<Arc<AuthState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, AbError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token)
        .ok_or_else(|| {
            tracing::debug!(target: "ab.middleware.auth", "Missing or malformed Authorization header");
            AbError::InvalidToken("Missing or invalid Authorization header".to_string())
        })?;

    let claims = state
        .token_service
        .verify(token)
        .map_err(|_| AbError::InvalidToken(INVALID_TOKEN_MESSAGE.to_string()))?;

    req.extensions_mut().insert(AuthenticatedUser {
        username: claims.sub,
    });

    Ok(next.run(req).await)
}
