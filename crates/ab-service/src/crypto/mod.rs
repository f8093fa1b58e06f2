use crate::errors::AbError;
use common::jwt::{check_token_size, validate_iat_at, JwtValidationError};
use common::secret::{ExposeSecret, SecretString};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::instrument;

/// Signing algorithm for identity tokens. Tokens whose header names any other
/// algorithm (including `none`) are rejected.
pub const TOKEN_ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT Claims structure.
///
/// The `sub` field contains the directory username, which should not be
/// exposed in logs. A custom Debug implementation redacts this field.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (verified directory username)
    pub iat: i64,    // Issued at timestamp
    pub exp: i64,    // Expiration timestamp
}

impl fmt::Debug for Claims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Claims")
            .field("sub", &"[REDACTED]")
            .field("iat", &self.iat)
            .field("exp", &self.exp)
            .finish()
    }
}

/// Why a token failed verification.
///
/// Internal only: every variant collapses to the same generic failure for
/// callers, but logs and metrics keep the distinction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    /// Larger than `MAX_JWT_SIZE_BYTES`; rejected before decoding.
    Oversized,
    /// Not a decodable JWT, wrong algorithm, or missing claims.
    Malformed,
    /// Signature does not match the configured secret.
    BadSignature,
    /// `now >= exp`.
    Expired,
    /// `iat` is further in the future than the clock skew allows.
    IssuedInFuture,
}

impl TokenRejection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenRejection::Oversized => "oversized",
            TokenRejection::Malformed => "malformed",
            TokenRejection::BadSignature => "bad_signature",
            TokenRejection::Expired => "expired",
            TokenRejection::IssuedInFuture => "issued_in_future",
        }
    }
}

impl From<JwtValidationError> for TokenRejection {
    fn from(err: JwtValidationError) -> Self {
        match err {
            JwtValidationError::TokenTooLarge => TokenRejection::Oversized,
            JwtValidationError::MalformedToken => TokenRejection::Malformed,
            JwtValidationError::IatTooFarInFuture => TokenRejection::IssuedInFuture,
        }
    }
}

/// HMAC key material derived from the configured shared secret.
///
/// Built once at startup; holds both halves so signing and verification
/// never touch the raw secret again.
#[derive(Clone)]
pub struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKeys {
    /// Derive HS256 keys from the secret's bytes.
    ///
    /// # Errors
    ///
    /// Returns `AbError::Crypto` if the secret is shorter than
    /// `min_len` bytes.
    pub fn from_secret(secret: &SecretString, min_len: usize) -> Result<Self, AbError> {
        let bytes = secret.expose_secret().as_bytes();
        if bytes.len() < min_len {
            return Err(AbError::Crypto(format!(
                "Signing secret too short: {} bytes (expected at least {})",
                bytes.len(),
                min_len
            )));
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        })
    }
}

impl fmt::Debug for SigningKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKeys")
            .field("algorithm", &TOKEN_ALGORITHM)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

/// Sign JWT with the HMAC key
#[instrument(skip_all)]
pub fn sign_jwt(claims: &Claims, keys: &SigningKeys) -> Result<String, AbError> {
    let mut header = Header::new(TOKEN_ALGORITHM);
    header.typ = Some("JWT".to_string());

    encode(&header, claims, &keys.encoding)
        .map_err(|e| AbError::Crypto(format!("JWT signing operation failed: {}", e)))
}

/// Verify JWT with the HMAC key against an explicit `now`.
///
/// Validates:
/// - Token size and shape (before any decoding)
/// - Algorithm (HS256 only) and signature
/// - Presence of `sub`, `iat` and `exp`
/// - Expiration: valid only while `now < exp`
/// - Issued-at time (`iat`) with clock skew tolerance
#[instrument(skip_all)]
pub fn verify_jwt_at(
    token: &str,
    keys: &SigningKeys,
    now: i64,
    clock_skew: Duration,
) -> Result<Claims, TokenRejection> {
    check_token_size(token).map_err(TokenRejection::from)?;

    let mut validation = Validation::new(TOKEN_ALGORITHM);
    // Expiry is checked below against the caller-supplied clock.
    validation.validate_exp = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["sub", "iat", "exp"]);

    let token_data = decode::<Claims>(token, &keys.decoding, &validation).map_err(|e| {
        tracing::debug!(target: "ab.crypto", error = %e, "Token verification failed");
        match e.kind() {
            ErrorKind::InvalidSignature => TokenRejection::BadSignature,
            _ => TokenRejection::Malformed,
        }
    })?;

    let claims = token_data.claims;

    if now >= claims.exp {
        tracing::debug!(
            target: "ab.crypto",
            exp = claims.exp,
            now = now,
            "Token rejected: expired"
        );
        return Err(TokenRejection::Expired);
    }

    validate_iat_at(claims.iat, clock_skew, now).map_err(TokenRejection::from)?;

    Ok(claims)
}
