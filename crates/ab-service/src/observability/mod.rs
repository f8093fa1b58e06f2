//! Observability for the authentication bridge.
//!
//! # Privacy by Default
//!
//! Instrumentation uses `#[instrument(skip_all)]` with explicit safe fields.
//! Fields are categorized as:
//! - **SAFE**: Can be logged in plaintext (outcome tags, rejection reasons)
//! - **HASHED**: Must be SHA-256 hashed for correlation (usernames)
//! - **NEVER**: Must never appear in logs (passwords, tokens, the signing secret)

pub mod metrics;

use sha2::{Digest, Sha256};

/// Hash a field value for correlation in logs (SHA-256, first 8 hex chars)
///
/// Used for usernames, which need correlation across log entries but should
/// not be stored in plaintext.
///
/// # Privacy
///
/// This is NOT cryptographically secure for secrets - it's a one-way hash
/// for correlation purposes only.
pub fn hash_for_correlation(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    let result = hasher.finalize();
    // First 4 bytes (8 hex chars): enough for correlation, limits reversibility
    hex::encode(result.get(..4).unwrap_or_default())
}

/// Error categories for metrics labels (bounded cardinality)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Rejected input or credentials
    Authentication,
    /// Invalid or expired token
    Token,
    /// Signing/key errors
    Internal,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Authentication => "authentication",
            ErrorCategory::Token => "token",
            ErrorCategory::Internal => "internal",
        }
    }
}

impl From<&crate::errors::AbError> for ErrorCategory {
    fn from(err: &crate::errors::AbError) -> Self {
        use crate::errors::AbError;
        match err {
            AbError::BadRequest(_) | AbError::InvalidCredentials => ErrorCategory::Authentication,
            AbError::InvalidToken(_) => ErrorCategory::Token,
            AbError::Crypto(_) => ErrorCategory::Internal,
        }
    }
}
