use crate::config::{TokenConfig, MIN_JWT_SECRET_BYTES};
use crate::crypto::{self, Claims, SigningKeys, TokenRejection};
use crate::errors::AbError;
use crate::observability::metrics::{record_token_issuance, record_token_validation};
use chrono::Utc;
use std::fmt;
use std::time::Duration;
use tracing::instrument;

/// Generic message for every token failure surfaced to callers.
pub const INVALID_TOKEN_MESSAGE: &str = "The access token is invalid or expired";

/// A signed identity token plus the claims it was built from.
#[derive(Clone)]
pub struct IdentityToken {
    encoded: String,
    claims: Claims,
}

impl IdentityToken {
    /// Compact JWT serialization, safe for an HTTP header or JSON field.
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    pub fn into_string(self) -> String {
        self.encoded
    }

    pub fn subject(&self) -> &str {
        &self.claims.sub
    }

    pub fn issued_at(&self) -> i64 {
        self.claims.iat
    }

    pub fn expires_at(&self) -> i64 {
        self.claims.exp
    }
}

impl fmt::Debug for IdentityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityToken")
            .field("encoded", &"[REDACTED]")
            .field("claims", &self.claims)
            .finish()
    }
}

/// Issues and verifies HS256 identity tokens.
///
/// Holds only immutable key material and lifetimes, so a single instance is
/// shared by every request.
#[derive(Debug, Clone)]
pub struct TokenService {
    keys: SigningKeys,
    lifetime_seconds: i64,
    clock_skew: Duration,
}

impl TokenService {
    /// Build the service from token configuration.
    ///
    /// # Errors
    ///
    /// `AbError::Crypto` if the signing secret is unusable. Callers treat
    /// this as fatal at startup.
    pub fn new(config: &TokenConfig) -> Result<Self, AbError> {
        let keys = SigningKeys::from_secret(&config.signing_secret, MIN_JWT_SECRET_BYTES)?;

        Ok(Self {
            keys,
            lifetime_seconds: config.expiration_seconds,
            clock_skew: Duration::from_secs(config.clock_skew_seconds.unsigned_abs()),
        })
    }

    /// Configured token lifetime in seconds.
    pub fn lifetime_seconds(&self) -> i64 {
        self.lifetime_seconds
    }

    pub fn issue_token(&self, subject: &str) -> Result<IdentityToken, AbError> {
        self.issue_token_at(subject, Utc::now().timestamp())
    }

    /// Issue a token for `subject` as of `now` (Unix seconds).
    #[instrument(skip_all)]
    pub fn issue_token_at(&self, subject: &str, now: i64) -> Result<IdentityToken, AbError> {
        let claims = Claims {
            sub: subject.to_string(),
            iat: now,
            exp: now.saturating_add(self.lifetime_seconds),
        };

        match crypto::sign_jwt(&claims, &self.keys) {
            Ok(encoded) => {
                record_token_issuance("success");
                Ok(IdentityToken { encoded, claims })
            }
            Err(e) => {
                tracing::error!(target: "ab.service.token", error = %e, "Token signing failed");
                record_token_issuance("error");
                Err(e)
            }
        }
    }

    /// Full verification, keeping the rejection reason.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenRejection> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Verify signature, expiry and `iat` as of `now`.
    #[instrument(skip_all)]
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Claims, TokenRejection> {
        let result = crypto::verify_jwt_at(token, &self.keys, now, self.clock_skew);

        match &result {
            Ok(_) => record_token_validation("success", None),
            Err(rejection) => {
                tracing::debug!(
                    target: "ab.service.token",
                    reason = rejection.as_str(),
                    "Token rejected"
                );
                record_token_validation("error", Some(rejection.as_str()));
            }
        }

        result
    }

    pub fn validate(&self, token: &str) -> bool {
        self.validate_at(token, Utc::now().timestamp())
    }

    /// True only if the signature is intact and `now < exp`.
    pub fn validate_at(&self, token: &str, now: i64) -> bool {
        self.verify_at(token, now).is_ok()
    }

    pub fn extract_subject(&self, token: &str) -> Result<String, AbError> {
        self.extract_subject_at(token, Utc::now().timestamp())
    }

    /// Subject of a valid token. Invalid tokens yield the generic
    /// `InvalidToken` error; the subject of an unverified token is never
    /// returned.
    pub fn extract_subject_at(&self, token: &str, now: i64) -> Result<String, AbError> {
        self.verify_at(token, now)
            .map(|claims| claims.sub)
            .map_err(|_| AbError::InvalidToken(INVALID_TOKEN_MESSAGE.to_string()))
    }

    pub fn is_expired(&self, token: &str) -> bool {
        self.is_expired_at(token, Utc::now().timestamp())
    }

    /// Unparseable or unverifiable tokens count as expired.
    pub fn is_expired_at(&self, token: &str, now: i64) -> bool {
        self.verify_at(token, now).is_err()
    }
}
