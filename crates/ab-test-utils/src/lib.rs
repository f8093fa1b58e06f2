//! # AuthBridge Test Utilities
//!
//! Shared test utilities for the AuthBridge service.
//!
//! This crate provides:
//! - Fixed test identities and secrets
//! - Configuration and fake-directory fixtures
//! - Signed token builders (TestTokenBuilder)
//! - Server test harness (TestBridgeServer for E2E tests)
//! - Custom assertions (TokenAssertions trait)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ab_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() -> Result<(), anyhow::Error> {
//!     let server = TestBridgeServer::spawn().await?;
//!
//!     let expired = TestTokenBuilder::new().expired_seconds_ago(60).build();
//!
//!     expired.assert_valid_jwt().assert_for_subject("alice");
//!     Ok(())
//! }
//! ```

pub mod assertions;
pub mod fixtures;
pub mod server_harness;
pub mod test_ids;
pub mod token_builders;

// Re-export commonly used items
pub use assertions::*;
pub use fixtures::*;
pub use server_harness::*;
pub use test_ids::*;
pub use token_builders::*;
