//! Fixed test identities for deterministic tests
//!
//! The directory layout mirrors a small OpenLDAP tree:
//! `dc=example,dc=org` with people under `ou=users` and the service account
//! at `cn=admin`.

pub const TEST_BASE_DN: &str = "dc=example,dc=org";

// Service identity
pub const TEST_ADMIN_DN: &str = "cn=admin,dc=example,dc=org";
pub const TEST_ADMIN_PASSWORD: &str = "admin-password-do-not-use-in-production";

// Users with a password in the fake directory
pub const TEST_USER_ALICE: &str = "alice";
pub const TEST_ALICE_PASSWORD: &str = "alice-password";
pub const TEST_USER_BOB: &str = "bob";
pub const TEST_BOB_PASSWORD: &str = "bob-password";

// Present in the directory listing but without a password
pub const TEST_USER_CAROL: &str = "carol";

// Token settings
pub const TEST_JWT_SECRET: &str = "test-jwt-secret-do-not-use-in-production-0123";
pub const TEST_TOKEN_LIFETIME_SECONDS: i64 = 3600;

/// DN produced by the default user DN template for `username`.
pub fn test_user_dn(username: &str) -> String {
    format!("uid={username},ou=users,{TEST_BASE_DN}")
}
