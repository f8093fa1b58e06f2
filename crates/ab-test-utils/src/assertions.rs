//! Custom test assertions for expressive tests
//!
//! Provides trait-based assertions for identity tokens.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::Deserialize;

/// JWT header structure
#[derive(Debug, Deserialize)]
struct JwtHeader {
    pub alg: String,
    pub typ: String,
}

/// JWT claims structure
#[derive(Debug, Deserialize)]
struct JwtClaims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

fn decode_part<T: for<'de> Deserialize<'de>>(token: &str, index: usize, what: &str) -> T {
    let part = token
        .split('.')
        .nth(index)
        .unwrap_or_else(|| panic!("JWT has no {what} segment"));
    let bytes = URL_SAFE_NO_PAD
        .decode(part)
        .unwrap_or_else(|e| panic!("Failed to base64 decode JWT {what}: {e:?}"));
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("Failed to parse JWT {what} JSON: {e:?}"))
}

/// Custom assertions for identity tokens
///
/// # Example
/// ```rust,ignore
/// token
///     .assert_valid_jwt()
///     .assert_for_subject("alice")
///     .assert_lifetime(3600);
/// ```
pub trait TokenAssertions {
    /// Assert HS256 compact JWT with `sub`, `iat` and `exp`
    fn assert_valid_jwt(&self) -> &Self;

    /// Assert that the token is for the specified subject
    fn assert_for_subject(&self, subject: &str) -> &Self;

    /// Assert that the token expires within the specified seconds (±5s)
    fn assert_expires_in(&self, seconds: u64) -> &Self;

    /// Assert that `exp - iat` equals the specified seconds exactly
    fn assert_lifetime(&self, seconds: i64) -> &Self;
}

impl TokenAssertions for String {
    fn assert_valid_jwt(&self) -> &Self {
        let parts = self.split('.').count();
        assert_eq!(
            parts, 3,
            "JWT must have 3 parts (header.payload.signature), got {parts}"
        );

        let header: JwtHeader = decode_part(self, 0, "header");
        assert_eq!(header.alg, "HS256", "Expected HS256 algorithm");
        assert_eq!(header.typ, "JWT", "Expected JWT type");

        let claims: JwtClaims = decode_part(self, 1, "payload");
        assert!(!claims.sub.is_empty(), "JWT subject must not be empty");
        assert!(claims.exp > claims.iat, "JWT must expire after it was issued");

        self
    }

    fn assert_for_subject(&self, subject: &str) -> &Self {
        let claims: JwtClaims = decode_part(self, 1, "payload");
        assert_eq!(
            claims.sub, subject,
            "Expected subject '{}', got '{}'",
            subject, claims.sub
        );

        self
    }

    fn assert_expires_in(&self, seconds: u64) -> &Self {
        let claims: JwtClaims = decode_part(self, 1, "payload");
        let expires_in = claims.exp - chrono::Utc::now().timestamp();

        // Allow 5-second tolerance for slow test runners
        assert!(
            (expires_in - seconds as i64).abs() <= 5,
            "Expected token to expire in {seconds} seconds, but expires in {expires_in} seconds"
        );

        self
    }

    fn assert_lifetime(&self, seconds: i64) -> &Self {
        let claims: JwtClaims = decode_part(self, 1, "payload");
        assert_eq!(
            claims.exp - claims.iat,
            seconds,
            "Expected lifetime of {seconds} seconds"
        );

        self
    }
}
