//! Builder patterns for test data construction
//!
//! Produces signed tokens with arbitrary claims, e.g. already expired or
//! issued in the future, which the service itself would never mint.

use crate::test_ids::{TEST_JWT_SECRET, TEST_USER_ALICE};
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;

/// Builder for signed test tokens
///
/// # Example
/// ```rust,ignore
/// let token = TestTokenBuilder::new()
///     .for_user("alice")
///     .expired_seconds_ago(60)
///     .build();
/// ```
pub struct TestTokenBuilder {
    sub: String,
    iat: i64,
    exp: i64,
    secret: String,
    algorithm: Algorithm,
}

impl TestTokenBuilder {
    /// Alice, issued now, one hour lifetime, signed with the test secret
    pub fn new() -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: TEST_USER_ALICE.to_string(),
            iat: now,
            exp: now + 3600,
            secret: TEST_JWT_SECRET.to_string(),
            algorithm: Algorithm::HS256,
        }
    }

    pub fn for_user(mut self, subject: &str) -> Self {
        self.sub = subject.to_string();
        self
    }

    pub fn issued_at(mut self, timestamp: i64) -> Self {
        self.iat = timestamp;
        self
    }

    pub fn expires_at(mut self, timestamp: i64) -> Self {
        self.exp = timestamp;
        self
    }

    /// Set expiration in seconds from now
    pub fn expires_in(mut self, seconds: i64) -> Self {
        self.exp = Utc::now().timestamp() + seconds;
        self
    }

    /// Issued an hour before it expired, `seconds` ago
    pub fn expired_seconds_ago(mut self, seconds: i64) -> Self {
        self.exp = Utc::now().timestamp() - seconds;
        self.iat = self.exp - 3600;
        self
    }

    pub fn signed_with(mut self, secret: &str) -> Self {
        self.secret = secret.to_string();
        self
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Encode and sign
    pub fn build(self) -> String {
        let claims = json!({
            "sub": self.sub,
            "iat": self.iat,
            "exp": self.exp,
        });

        let mut header = Header::new(self.algorithm);
        header.typ = Some("JWT".to_string());

        encode(
            &header,
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .expect("HMAC signing of test token should not fail")
    }
}

impl Default for TestTokenBuilder {
    fn default() -> Self {
        Self::new()
    }
}
