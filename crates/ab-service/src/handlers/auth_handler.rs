use crate::config::Config;
use crate::directory::DirectoryConnector;
use crate::errors::AbError;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{LoginRequest, LoginResponse, MeResponse, ValidateRequest, ValidateResponse};
use crate::observability::metrics::{record_error, record_login};
use crate::observability::ErrorCategory;
use crate::services::directory_authenticator::DirectoryAuthenticator;
use crate::services::token_service::TokenService;
use axum::{extract::State, Extension, Json};
use common::secret::ExposeSecret;
use std::sync::Arc;
use tracing::instrument;

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub authenticator: DirectoryAuthenticator,
    pub token_service: Arc<TokenService>,
}

impl AppState {
    /// Wire both core components from one immutable configuration.
    ///
    /// # Errors
    ///
    /// `AbError::Crypto` if the token signing secret is unusable.
    pub fn new(config: Config, connector: Arc<dyn DirectoryConnector>) -> Result<Self, AbError> {
        let token_service = Arc::new(TokenService::new(&config.token)?);
        let authenticator = DirectoryAuthenticator::new(connector, &config.directory);

        Ok(Self {
            config,
            authenticator,
            token_service,
        })
    }
}

/// Handle login request
///
/// POST /api/auth/login
///
/// Binds to the directory as the user and, on success, returns a signed
/// identity token. Bad password, unknown user and directory failure all
/// produce the same 401.
///
/// Surrounding whitespace is stripped from the username before the bind, so
/// the token subject is the trimmed name.
#[instrument(skip_all, name = "ab.auth.login")]
pub async fn handle_login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AbError> {
    match login_internal(&state, payload).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            let category = ErrorCategory::from(&e);
            record_error("login", category.as_str(), e.status_code());
            Err(e)
        }
    }
}

async fn login_internal(state: &AppState, payload: LoginRequest) -> Result<LoginResponse, AbError> {
    let username = match payload.username.as_deref().map(str::trim) {
        Some(u) if !u.is_empty() => u,
        _ => {
            record_login("invalid_request");
            return Err(AbError::BadRequest("Username is required".to_string()));
        }
    };

    let password = match payload.password.as_ref() {
        Some(p) if !p.expose_secret().is_empty() => p,
        _ => {
            record_login("invalid_request");
            return Err(AbError::BadRequest("Password is required".to_string()));
        }
    };

    if !state.authenticator.authenticate(username, password).await {
        record_login("rejected");
        return Err(AbError::InvalidCredentials);
    }

    let token = state.token_service.issue_token(username).inspect_err(|_| {
        record_login("error");
    })?;

    record_login("success");

    Ok(LoginResponse {
        success: true,
        token: token.into_string(),
        token_type: "Bearer".to_string(),
        expires_in: state.token_service.lifetime_seconds(),
        username: username.to_string(),
        message: "Authentication successful".to_string(),
    })
}

/// Handle token validation request
///
/// POST /api/auth/validate
///
/// Always 200; `valid` carries the answer and `username` is only present
/// for a valid token.
#[instrument(skip_all, name = "ab.auth.validate")]
pub async fn handle_validate(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ValidateRequest>,
) -> Json<ValidateResponse> {
    let verified = payload
        .token
        .as_deref()
        .map(|token| state.token_service.verify(token));

    let response = match verified {
        Some(Ok(claims)) => ValidateResponse {
            valid: true,
            username: Some(claims.sub),
        },
        Some(Err(_)) | None => ValidateResponse {
            valid: false,
            username: None,
        },
    };

    Json(response)
}

/// Handle current-user request
///
/// GET /api/auth/me
///
/// The bearer middleware has already verified the token.
pub async fn handle_me(Extension(user): Extension<AuthenticatedUser>) -> Json<MeResponse> {
    Json(MeResponse {
        username: user.username,
        message: "User authenticated".to_string(),
    })
}
