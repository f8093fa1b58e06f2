//! Deterministic configuration and directory fixtures.

use crate::test_ids::*;
use ab_service::config::{
    Config, DirectoryConfig, TokenConfig, TransportSecurity, DEFAULT_JWT_CLOCK_SKEW_SECONDS,
    DEFAULT_USER_DN_TEMPLATE, DEFAULT_USER_FILTER,
};
use ab_service::directory::mock::FakeDirectory;
use ab_service::directory::DirectoryRecord;
use common::secret::SecretString;
use std::time::Duration;

/// Configuration pointing at a directory that is never dialed; tests pair it
/// with a [`FakeDirectory`].
pub fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".to_string(),
        directory: DirectoryConfig {
            url: "ldaps://ldap.test.invalid".to_string(),
            base_dn: TEST_BASE_DN.to_string(),
            bind_dn: TEST_ADMIN_DN.to_string(),
            bind_password: SecretString::from(TEST_ADMIN_PASSWORD),
            user_dn_template: DEFAULT_USER_DN_TEMPLATE.to_string(),
            user_filter: DEFAULT_USER_FILTER.to_string(),
            transport: TransportSecurity::Tls,
            tls_no_verify: false,
            connect_timeout: Duration::from_secs(1),
            operation_timeout: Duration::from_secs(1),
        },
        token: TokenConfig {
            signing_secret: SecretString::from(TEST_JWT_SECRET),
            expiration_seconds: TEST_TOKEN_LIFETIME_SECONDS,
            clock_skew_seconds: DEFAULT_JWT_CLOCK_SKEW_SECONDS,
        },
        diagnostics_enabled: true,
    }
}

/// Fake directory with the service account, alice and bob able to bind,
/// and three person entries (bob, carol, dave) with uneven attributes.
pub fn test_directory() -> FakeDirectory {
    FakeDirectory::new()
        .with_credential(TEST_ADMIN_DN, TEST_ADMIN_PASSWORD)
        .with_credential(&test_user_dn(TEST_USER_ALICE), TEST_ALICE_PASSWORD)
        .with_credential(&test_user_dn(TEST_USER_BOB), TEST_BOB_PASSWORD)
        .with_entry(
            DirectoryRecord::new(test_user_dn(TEST_USER_BOB))
                .with_attr("uid", TEST_USER_BOB)
                .with_attr("cn", "Bob Jones")
                .with_attr("mail", "bob@x.com"),
        )
        .with_entry(
            DirectoryRecord::new(test_user_dn(TEST_USER_CAROL))
                .with_attr("uid", TEST_USER_CAROL)
                .with_attr("cn", "Carol Lee"),
        )
        .with_entry(
            DirectoryRecord::new(test_user_dn("dave"))
                .with_attr("uid", "dave")
                .with_attr("mail", "dave@x.com"),
        )
}
