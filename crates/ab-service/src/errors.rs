use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced at the HTTP boundary.
///
/// Core components never return these for expected conditions (bad
/// credentials, invalid tokens); they return booleans and the handlers map
/// a `false` to the matching variant here.
#[derive(Debug, Error)]
pub enum AbError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Cryptographic error: {0}")]
    Crypto(String),
}

impl AbError {
    /// HTTP status code for this error (for metrics recording).
    pub fn status_code(&self) -> u16 {
        match self {
            AbError::BadRequest(_) => 400,
            AbError::InvalidCredentials | AbError::InvalidToken(_) => 401,
            AbError::Crypto(_) => 500,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    success: bool,
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for AbError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AbError::BadRequest(reason) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", reason.clone())
            }
            AbError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "INVALID_CREDENTIALS",
                "Invalid credentials".to_string(),
            ),
            AbError::InvalidToken(reason) => {
                (StatusCode::UNAUTHORIZED, "INVALID_TOKEN", reason.clone())
            }
            AbError::Crypto(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CRYPTO_ERROR",
                "An internal cryptographic error occurred".to_string(),
            ),
        };

        let error_response = ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        let mut response = (status, Json(error_response)).into_response();

        // RFC 6750 Section 3: 401 on a bearer-protected resource carries a challenge
        if matches!(self, AbError::InvalidToken(_)) {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Bearer error=\"invalid_token\""),
            );
        }

        response
    }
}
